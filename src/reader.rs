//! Read-only access to serialized containers.
//!
//! Everything here works on the raw byte buffer, so a caller can look up a
//! single frame or stream frames one at a time without building a
//! [`VideoContainer`](crate::VideoContainer) first.

use std::iter::FusedIterator;

use crate::{
    BYTES_PER_PIXEL,
    DIMENSION_BYTES,
    FormatError,
    HEADER_SIZE,
    PixelFrame,
    VideoError,
    VideoResult,
    dimension,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo
{
    pub width: u16,
    pub height: u16,
    pub frame_count: usize,
    pub frame_byte_size: usize,
}

pub fn parse_header(buf: &[u8]) -> Result<(u16, u16), FormatError>
{
    let header: &[u8; HEADER_SIZE] = buf
        .get(..HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or(FormatError::HeaderTooShort(buf.len()))?;

    let mut width = [0u8; DIMENSION_BYTES];
    let mut height = [0u8; DIMENSION_BYTES];
    width.copy_from_slice(&header[..DIMENSION_BYTES]);
    height.copy_from_slice(&header[DIMENSION_BYTES..]);

    // A sum of eight bytes is at most 2040, so both fit
    Ok((dimension::decode(&width) as u16, dimension::decode(&height) as u16))
}

pub fn frame_byte_size(
    width: u16,
    height: u16,
) -> usize
{
    width as usize * height as usize * BYTES_PER_PIXEL
}

pub fn frame_count(buf: &[u8]) -> Result<usize, FormatError>
{
    probe(buf).map(|info| info.frame_count)
}

/// Validates the whole buffer layout and reports what it holds.
pub fn probe(buf: &[u8]) -> Result<ContainerInfo, FormatError>
{
    let (width, height) = parse_header(buf)?;
    let frame_byte_size = frame_byte_size(width, height);
    let payload = buf.len() - HEADER_SIZE;

    let frame_count = if frame_byte_size == 0
    {
        if payload > 0
        {
            return Err(FormatError::ZeroAreaWithData(payload));
        }
        0
    }
    else
    {
        if payload % frame_byte_size != 0
        {
            return Err(FormatError::UnalignedFrameData {
                payload,
                frame_size: frame_byte_size,
            });
        }
        payload / frame_byte_size
    };

    Ok(ContainerInfo {
        width,
        height,
        frame_count,
        frame_byte_size,
    })
}

pub fn frame_at(
    buf: &[u8],
    index: usize,
) -> VideoResult<PixelFrame>
{
    let info = probe(buf)?;
    read_frame(buf, &info, index)
}

/// Frame lookup for callers that already validated the layout with [`probe`].
pub(crate) fn read_frame(
    buf: &[u8],
    info: &ContainerInfo,
    index: usize,
) -> VideoResult<PixelFrame>
{
    if index >= info.frame_count
    {
        return Err(VideoError::FrameOutOfRange {
            index,
            frame_count: info.frame_count,
        });
    }

    let begin = HEADER_SIZE + index * info.frame_byte_size;
    let end = begin + info.frame_byte_size;
    let data = buf.get(begin..end).ok_or(FormatError::PixelDataSize {
        expected: end,
        found: buf.len(),
    })?;
    PixelFrame::from_rgb(info.width as usize, info.height as usize, data.to_vec())
}

/// Lazily decodes frames `0..frame_count` in order.
///
/// The layout is validated up front, so a malformed buffer fails here rather
/// than midway through iteration. Call again to start over from frame 0.
pub fn iterate(buf: &[u8]) -> Result<Frames<'_>, FormatError>
{
    let info = probe(buf)?;
    Ok(Frames {
        buf,
        info,
        next: 0,
    })
}

pub struct Frames<'a>
{
    buf: &'a [u8],
    info: ContainerInfo,
    next: usize,
}

impl Iterator for Frames<'_>
{
    type Item = PixelFrame;

    fn next(&mut self) -> Option<PixelFrame>
    {
        if self.next >= self.info.frame_count
        {
            return None;
        }
        let frame = read_frame(self.buf, &self.info, self.next).ok()?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        let remaining = self.info.frame_count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl FusedIterator for Frames<'_> {}
