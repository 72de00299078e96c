use std::{
    env,
    path::PathBuf,
    str::FromStr,
};

use minvideo::{
    CliError,
    Result,
};

pub fn get_path_or_curr_dir(path: Option<PathBuf>) -> Result<PathBuf>
{
    match path
    {
        None => env::current_dir().map_err(|_| CliError::AccessCurrentDirectory.into()),
        Some(path) => Ok(path),
    }
}

pub fn required_arg(
    arg: Option<String>,
    command: &'static str,
    arg_name: &'static str,
) -> Result<String>
{
    arg.ok_or_else(|| CliError::MissingArg(command, arg_name).into())
}

/// Parses an optional positional argument, failing only if it is present and malformed.
pub fn optional_arg<T: FromStr>(
    arg: Option<String>,
    arg_name: &'static str,
) -> Result<Option<T>>
{
    match arg
    {
        None => Ok(None),
        Some(value) => match value.parse()
        {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(CliError::InvalidArg(arg_name, value).into()),
        },
    }
}

pub fn format_duration(miliseconds: u128) -> String
{
    if miliseconds < 1000
    {
        format!("{}ms", miliseconds)
    }
    else
    {
        format!("{:.2}s", miliseconds as f64 / 1000.0)
    }
}
