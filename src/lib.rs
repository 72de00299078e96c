//! MinVideo: a raw RGB video container and a paced playback pipeline.
//!
//! A container is a 16 byte header holding the sum-encoded width and height,
//! followed by uncompressed row-major RGB frames. The frame count is never
//! stored; it falls out of the buffer length.

pub mod config;
#[cfg(feature = "ffmpeg")]
pub mod decoder;
pub mod dimension;
pub mod display;
pub mod error;
pub mod frame;
pub mod images;
pub mod playback;
pub mod reader;
pub mod video;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg_next as ffmpeg;

pub use crate::{
    config::Config,
    display::{
        FrameDisplay,
        FramePixels,
        PixelLayout,
        TerminalDisplay,
    },
    error::{
        CliError,
        DisplayError,
        FormatError,
        ImplError,
        VideoError,
    },
    frame::PixelFrame,
    playback::{
        PlaybackConfig,
        PlaybackState,
        PlaybackStats,
        Player,
    },
    reader::ContainerInfo,
    video::VideoContainer,
};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
pub type VideoResult<T> = std::result::Result<T, VideoError>;
pub type FormatResult = std::fmt::Result;
pub type IoError = std::io::Error;
pub type SerdeJsonError = serde_json::Error;
#[cfg(feature = "ffmpeg")]
pub type FFmpegError = ffmpeg::Error;

/// Bytes used to store one encoded dimension.
pub const DIMENSION_BYTES: usize = 8;
/// Largest width or height the header can describe.
pub const MAX_DIMENSION: usize = DIMENSION_BYTES * u8::MAX as usize;
pub const HEADER_SIZE: usize = DIMENSION_BYTES * 2;
pub const BYTES_PER_PIXEL: usize = 3;
