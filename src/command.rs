use std::fmt::{
    Display,
    Formatter,
};

use minvideo::FormatResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command
{
    Help,
    Init,
    Parse,
    Convert,
    Pack,
    Export,
    Play,
}

impl Command
{
    const ALL: [Command; 7] = [
        Self::Help,
        Self::Init,
        Self::Parse,
        Self::Convert,
        Self::Pack,
        Self::Export,
        Self::Play,
    ];
    const CONVERT: &'static str = "convert";
    const EXPORT: &'static str = "export";
    const HELP: &'static str = "help";
    const INIT: &'static str = "init";
    const PACK: &'static str = "pack";
    const PARSE: &'static str = "parse";
    const PLAY: &'static str = "play";

    pub fn name(&self) -> &'static str
    {
        match self
        {
            Self::Help => Self::HELP,
            Self::Init => Self::INIT,
            Self::Parse => Self::PARSE,
            Self::Convert => Self::CONVERT,
            Self::Pack => Self::PACK,
            Self::Export => Self::EXPORT,
            Self::Play => Self::PLAY,
        }
    }

    pub fn usage(&self) -> &'static str
    {
        match self
        {
            Self::Help => "",
            Self::Init => "[dir]",
            Self::Parse => "<path>",
            Self::Convert => "<input file> <output file> [width] [height]",
            Self::Pack => "<frames dir> <output file>",
            Self::Export => "<path> <frame> [png file]",
            Self::Play => "<path> [fps] [frame limit]",
        }
    }

    pub fn description(&self) -> &'static str
    {
        match self
        {
            Self::Help => "Shows this message",
            Self::Init => "Writes a default config file",
            Self::Parse => "Shows info of a video saved in the MinVideo format",
            Self::Convert => "Converts a standard video to MinVideo (-1 keeps the source size)",
            Self::Pack => "Packs numbered frame_<n>.png images into a MinVideo file",
            Self::Export => "Saves one frame (counting from 1) as a PNG",
            Self::Play => "Plays a MinVideo file in the terminal, looping",
        }
    }

    pub fn from_name(name: &str) -> Option<Self>
    {
        Self::ALL.into_iter().find(|cmd| {
            name == cmd.name()
                || name == cmd.alias_long()
                || cmd.alias_short().is_some_and(|alias| name == alias)
        })
    }

    pub fn all() -> [Command; 7]
    {
        Self::ALL
    }

    // parse, pack and play share a first letter, so they only get long aliases
    fn alias_short(&self) -> Option<String>
    {
        match self
        {
            Self::Help | Self::Init | Self::Convert | Self::Export =>
            {
                self.name().chars().next().map(|c| format!("-{}", c))
            },
            Self::Parse | Self::Pack | Self::Play => None,
        }
    }

    fn alias_long(&self) -> String
    {
        format!("--{}", self.name())
    }
}

impl Display for Command
{
    fn fmt(
        &self,
        f: &mut Formatter,
    ) -> FormatResult
    {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn resolves_names_and_aliases()
    {
        assert_eq!(Command::from_name("play"), Some(Command::Play));
        assert_eq!(Command::from_name("--parse"), Some(Command::Parse));
        assert_eq!(Command::from_name("-h"), Some(Command::Help));
        assert_eq!(Command::from_name("-c"), Some(Command::Convert));
        assert_eq!(Command::from_name("-p"), None);
        assert_eq!(Command::from_name("seek"), None);
    }
}
