use std::{
    fs,
    path::Path,
};

use rayon::prelude::*;

use crate::{
    HEADER_SIZE,
    MAX_DIMENSION,
    PixelFrame,
    VideoError,
    VideoResult,
    dimension,
    reader,
};

/// An in-memory video: a fixed frame size and an append-only list of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoContainer
{
    frames: Vec<PixelFrame>,
    width: u16,
    height: u16,
}

impl VideoContainer
{
    pub fn new(
        width: usize,
        height: usize,
    ) -> VideoResult<VideoContainer>
    {
        for dimension in [width, height]
        {
            if dimension > MAX_DIMENSION
            {
                return Err(VideoError::DimensionOverflow(dimension));
            }
        }
        Ok(VideoContainer {
            frames: Vec::new(),
            width: width as u16,
            height: height as u16,
        })
    }

    pub fn width(&self) -> u16
    {
        self.width
    }

    pub fn height(&self) -> u16
    {
        self.height
    }

    pub fn len(&self) -> usize
    {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[PixelFrame]
    {
        &self.frames
    }

    pub fn append_frame(
        &mut self,
        frame: PixelFrame,
    ) -> VideoResult<()>
    {
        if frame.width() != self.width || frame.height() != self.height
        {
            return Err(VideoError::DimensionMismatch {
                expected: (self.width, self.height),
                found: (frame.width(), frame.height()),
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn frame_byte_size(&self) -> usize
    {
        reader::frame_byte_size(self.width, self.height)
    }

    pub fn serialize(&self) -> VideoResult<Vec<u8>>
    {
        let mut data = Vec::with_capacity(HEADER_SIZE + self.len() * self.frame_byte_size());
        data.extend_from_slice(&dimension::encode(self.width as usize)?);
        data.extend_from_slice(&dimension::encode(self.height as usize)?);
        for frame in &self.frames
        {
            data.extend_from_slice(frame.as_bytes());
        }
        Ok(data)
    }

    /// Rebuilds every frame eagerly, decoding them in parallel.
    pub fn deserialize(data: &[u8]) -> VideoResult<VideoContainer>
    {
        let info = reader::probe(data)?;
        let frames = (0..info.frame_count)
            .into_par_iter()
            .map(|index| reader::read_frame(data, &info, index))
            .collect::<VideoResult<Vec<_>>>()?;

        log::debug!(
            "Deserialized {} frames of {}x{}",
            frames.len(),
            info.width,
            info.height
        );
        Ok(VideoContainer {
            frames,
            width: info.width,
            height: info.height,
        })
    }

    pub fn write_to(
        &self,
        path: &Path,
    ) -> VideoResult<()>
    {
        fs::write(path, self.serialize()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> VideoResult<VideoContainer>
    {
        VideoContainer::deserialize(&fs::read(path)?)
    }
}
