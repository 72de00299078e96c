use std::{
    error::Error,
    fmt::{
        Display,
        Formatter,
    },
    path::PathBuf,
};

use crate::{
    FormatResult,
    IoError,
    SerdeJsonError,
};

#[derive(Debug)]
pub enum VideoError
{
    DimensionOverflow(usize),
    DimensionMismatch
    {
        expected: (u16, u16),
        found: (u16, u16),
    },
    Format(FormatError),
    OutOfRange
    {
        x: usize,
        y: usize,
        width: u16,
        height: u16,
    },
    FrameOutOfRange
    {
        index: usize,
        frame_count: usize,
    },
    InvalidFrameRate(f64),
    InvalidQueueCapacity,
    PlaybackStarted,
    Display(DisplayError),
    PlaybackThread(&'static str),
    Image(image::ImageError),
    Io(IoError),
}

impl Error for VideoError
{
    fn source(&self) -> Option<&(dyn Error + 'static)>
    {
        match self
        {
            Self::Format(e) => Some(e),
            Self::Display(e) => Some(e),
            Self::Image(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for VideoError
{
    fn fmt(
        &self,
        f: &mut Formatter,
    ) -> FormatResult
    {
        write!(f, "minvideo: ")?;
        match self
        {
            Self::DimensionOverflow(value) =>
            {
                write!(f, "Dimension {} exceeds the maximum of {}", value, crate::MAX_DIMENSION)
            },
            Self::DimensionMismatch {
                expected,
                found,
            } => write!(
                f,
                "Frame is {}x{} but the video is {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            Self::Format(e) => write!(f, "Invalid container data: {}", e),
            Self::OutOfRange {
                x,
                y,
                width,
                height,
            } => write!(f, "Pixel ({}, {}) is outside of a {}x{} frame", x, y, width, height),
            Self::FrameOutOfRange {
                index,
                frame_count,
            } => write!(f, "Frame index {} is out of range of frame count: {}", index, frame_count),
            Self::InvalidFrameRate(fps) => write!(f, "Frame rate must be above 0, got {}", fps),
            Self::InvalidQueueCapacity => write!(f, "Frame queue capacity must be above 0"),
            Self::PlaybackStarted => write!(f, "Playback was already started"),
            Self::Display(e) => write!(f, "Display failed: {}", e),
            Self::PlaybackThread(role) => write!(f, "Playback {} thread panicked", role),
            Self::Image(e) => write!(f, "Image processing failed: {}", e),
            Self::Io(e) => write!(f, "{}", e),
        }
    }
}

impl From<FormatError> for VideoError
{
    fn from(e: FormatError) -> Self
    {
        Self::Format(e)
    }
}

impl From<DisplayError> for VideoError
{
    fn from(e: DisplayError) -> Self
    {
        Self::Display(e)
    }
}

impl From<IoError> for VideoError
{
    fn from(e: IoError) -> Self
    {
        Self::Io(e)
    }
}

/// Structural problems found while reading container bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError
{
    HeaderTooShort(usize),
    UnalignedFrameData
    {
        payload: usize,
        frame_size: usize,
    },
    ZeroAreaWithData(usize),
    PixelDataSize
    {
        expected: usize,
        found: usize,
    },
    NoFrames,
}

impl Error for FormatError {}

impl Display for FormatError
{
    fn fmt(
        &self,
        f: &mut Formatter,
    ) -> FormatResult
    {
        match self
        {
            Self::HeaderTooShort(len) =>
            {
                write!(f, "{} bytes is too short for the {} byte header", len, crate::HEADER_SIZE)
            },
            Self::UnalignedFrameData {
                payload,
                frame_size,
            } => write!(
                f,
                "{} bytes of frame data is not a multiple of the {} byte frame size",
                payload, frame_size
            ),
            Self::ZeroAreaWithData(payload) =>
            {
                write!(f, "Header declares an empty frame but {} bytes follow it", payload)
            },
            Self::PixelDataSize {
                expected,
                found,
            } => write!(f, "Expected {} bytes of pixel data, found {}", expected, found),
            Self::NoFrames => write!(f, "Video has no frames"),
        }
    }
}

#[derive(Debug)]
pub enum DisplayError
{
    Closed,
    Write(IoError),
    Backend(String),
}

impl Error for DisplayError {}

impl Display for DisplayError
{
    fn fmt(
        &self,
        f: &mut Formatter,
    ) -> FormatResult
    {
        match self
        {
            Self::Closed => write!(f, "Display is not open"),
            Self::Write(e) => write!(f, "Failed to write to the display: {}", e),
            Self::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug)]
pub enum CliError
{
    NoCommand,
    UnknownCommand(String),
    MissingArg(&'static str, &'static str),
    InvalidArg(&'static str, String),
    ConfigRead(IoError),
    ConfigParse(SerdeJsonError),
    AccessCurrentDirectory,
    InvalidExportFrame(usize, usize),
    FFmpegDisabled,
}

impl Error for CliError {}

impl Display for CliError
{
    fn fmt(
        &self,
        f: &mut Formatter,
    ) -> FormatResult
    {
        write!(f, "minvideo: ")?;
        match self
        {
            Self::NoCommand => write!(f, "Type --help for usage"),
            Self::UnknownCommand(cmd) => write!(f, "Unknown command: '{}'", cmd),
            Self::MissingArg(command, arg_name) =>
            {
                write!(f, "'{}' command requires a {}", command, arg_name)
            },
            Self::InvalidArg(arg_name, value) =>
            {
                write!(f, "Invalid {}: '{}'", arg_name, value)
            },
            Self::ConfigParse(serde_err) =>
            {
                write!(f, "Failed to parse '{}': {}", crate::config::CONFIG_FILE_NAME, serde_err)
            },
            Self::ConfigRead(io_err) =>
            {
                write!(f, "Failed to read '{}': {}", crate::config::CONFIG_FILE_NAME, io_err)
            },
            Self::AccessCurrentDirectory => write!(f, "Could not access current directory"),
            Self::InvalidExportFrame(frame, frame_count) =>
            {
                write!(f, "Frame {} is out of range of frame count: {}", frame, frame_count)
            },
            Self::FFmpegDisabled =>
            {
                write!(f, "'convert' needs minvideo to be built with the 'ffmpeg' feature")
            },
        }
    }
}

#[derive(Debug)]
pub enum ImplError
{
    ReadInput(PathBuf, IoError),
    FileWrite(IoError),
    CreateDirectory(IoError),
    JsonPrettifier(SerdeJsonError),
    ImageLoad(PathBuf, image::ImageError),
    FetchVideoStream,
    #[cfg(feature = "ffmpeg")]
    FFmpeg(crate::FFmpegError),
}

impl Error for ImplError {}

impl Display for ImplError
{
    fn fmt(
        &self,
        f: &mut Formatter,
    ) -> FormatResult
    {
        write!(f, "minvideo: ")?;
        match self
        {
            Self::ReadInput(path, e) =>
            {
                write!(f, "Failed to read '{}': {}", path.display(), e)
            },
            Self::FileWrite(e) => write!(f, "Failed to write the config file: {}", e),
            Self::CreateDirectory(e) => write!(f, "Failed to create the config directory: {}", e),
            Self::JsonPrettifier(e) => write!(f, "Failed to format the default config: {}", e),
            Self::ImageLoad(path, e) =>
            {
                write!(f, "Failed to load image '{}': {}", path.display(), e)
            },
            Self::FetchVideoStream => write!(f, "Somehow failed to fetch video stream"),
            #[cfg(feature = "ffmpeg")]
            Self::FFmpeg(e) => write!(f, "Somehow failed during video processing: {}", e),
        }
    }
}
