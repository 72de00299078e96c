use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    CliError,
    ImplError,
    PlaybackConfig,
    Result,
};

pub const CONFIG_FILE_NAME: &str = "minvideo_config.json";

pub const RECOMMENDED_WIDTH: i32 = 128;
pub const RECOMMENDED_HEIGHT: i32 = 96;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Target width for `convert`; -1 keeps the source width.
    pub convert_width: i32,
    /// Target height for `convert`; -1 keeps the source height.
    pub convert_height: i32,
    pub fps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_limit: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            convert_width: RECOMMENDED_WIDTH,
            convert_height: RECOMMENDED_HEIGHT,
            fps: 30.0,
            queue_capacity: None,
            frame_limit: None,
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl Config
{
    /// Reads `minvideo_config.json` from `dir`, or the defaults if there is none.
    pub fn load_or_default(dir: &Path) -> Result<Config>
    {
        let config_file = dir.join(CONFIG_FILE_NAME);
        if !config_file.is_file()
        {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(&config_file).map_err(CliError::ConfigRead)?;
        let config = serde_json::from_str(&config_str).map_err(CliError::ConfigParse)?;
        log::debug!("Loaded {}", config_file.display());
        Ok(config)
    }

    pub fn write_default(dir: &Path) -> Result<PathBuf>
    {
        fs::create_dir_all(dir).map_err(ImplError::CreateDirectory)?;
        let config_file = dir.join(CONFIG_FILE_NAME);
        let config_str =
            serde_json::to_string_pretty(&Config::default()).map_err(ImplError::JsonPrettifier)?;
        fs::write(&config_file, config_str).map_err(ImplError::FileWrite)?;
        Ok(config_file)
    }

    pub fn playback(&self) -> PlaybackConfig
    {
        PlaybackConfig {
            fps: self.fps,
            queue_capacity: self.queue_capacity,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn writes_then_loads_defaults()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::write_default(dir.path()).unwrap();
        assert!(path.ends_with(CONFIG_FILE_NAME));
        assert_eq!(Config::load_or_default(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults()
    {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "fps": 12.5, "queue_capacity": 3 }"#)
            .unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.fps, 12.5);
        assert_eq!(config.playback().queue_capacity, Some(3));
        assert_eq!(config.convert_width, RECOMMENDED_WIDTH);
    }

    #[test]
    fn bad_json_is_reported()
    {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ fps: }").unwrap();
        let err = Config::load_or_default(dir.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn absent_file_uses_defaults()
    {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn unwritable_config_dir_is_reported()
    {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();
        let err = Config::write_default(&blocker.join("nested")).unwrap_err();
        assert!(err.to_string().contains("Failed to create the config directory"));

        let err = Config::write_default(&blocker).unwrap_err();
        assert!(err.to_string().starts_with("minvideo: Failed to"));
    }
}
