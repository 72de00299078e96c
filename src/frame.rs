use std::path::Path;

use image::{
    ImageBuffer,
    Rgb,
    RgbImage,
};

use crate::{
    BYTES_PER_PIXEL,
    FormatError,
    MAX_DIMENSION,
    VideoError,
    VideoResult,
};

const BLACK: (u8, u8, u8) = (0, 0, 0);

/// One still image stored as row-major R,G,B bytes.
///
/// Pixels that were never written read back as black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame
{
    data: Vec<u8>,
    width: u16,
    height: u16,
}

impl PixelFrame
{
    pub fn new(
        width: usize,
        height: usize,
    ) -> VideoResult<PixelFrame>
    {
        let (width, height) = checked_dimensions(width, height)?;
        Ok(PixelFrame {
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
            width,
            height,
        })
    }

    /// Takes ownership of an already packed RGB buffer.
    pub fn from_rgb(
        width: usize,
        height: usize,
        data: Vec<u8>,
    ) -> VideoResult<PixelFrame>
    {
        let (width, height) = checked_dimensions(width, height)?;
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected
        {
            return Err(FormatError::PixelDataSize {
                expected,
                found: data.len(),
            }
            .into());
        }
        Ok(PixelFrame {
            data,
            width,
            height,
        })
    }

    /// Copies RGB rows out of a decoder buffer whose rows are `stride` bytes apart.
    pub fn from_rgb_rows(
        width: usize,
        height: usize,
        data: &[u8],
        stride: usize,
    ) -> VideoResult<PixelFrame>
    {
        checked_dimensions(width, height)?;
        let row_len = width * BYTES_PER_PIXEL;
        if row_len == 0 || height == 0
        {
            return PixelFrame::new(width, height);
        }
        if stride == row_len
        {
            let expected = row_len * height;
            let packed = data.get(..expected).ok_or(FormatError::PixelDataSize {
                expected,
                found: data.len(),
            })?;
            return PixelFrame::from_rgb(width, height, packed.to_vec());
        }

        let needed = stride
            .checked_mul(height - 1)
            .and_then(|n| n.checked_add(row_len))
            .unwrap_or(usize::MAX);
        if stride < row_len || data.len() < needed
        {
            return Err(FormatError::PixelDataSize {
                expected: needed.max(row_len * height),
                found: data.len(),
            }
            .into());
        }

        let mut frame = PixelFrame::new(width, height)?;
        for (dst, src) in frame.data.chunks_exact_mut(row_len).zip(data.chunks(stride))
        {
            dst.copy_from_slice(&src[..row_len]);
        }
        Ok(frame)
    }

    pub fn from_image(image: RgbImage) -> VideoResult<PixelFrame>
    {
        let (width, height) = image.dimensions();
        PixelFrame::from_rgb(width as usize, height as usize, image.into_raw())
    }

    pub fn width(&self) -> u16
    {
        self.width
    }

    pub fn height(&self) -> u16
    {
        self.height
    }

    /// Row-major pixel index, or `None` outside the frame.
    pub fn index(
        &self,
        x: usize,
        y: usize,
    ) -> Option<usize>
    {
        if x >= self.width as usize || y >= self.height as usize
        {
            return None;
        }
        Some(y * self.width as usize + x)
    }

    pub fn set(
        &mut self,
        x: usize,
        y: usize,
        rgb: (u8, u8, u8),
    ) -> VideoResult<()>
    {
        let begin = match self.index(x, y)
        {
            Some(index) => index * BYTES_PER_PIXEL,
            None =>
            {
                return Err(VideoError::OutOfRange {
                    x,
                    y,
                    width: self.width,
                    height: self.height,
                });
            },
        };
        self.data[begin..begin + BYTES_PER_PIXEL].copy_from_slice(&[rgb.0, rgb.1, rgb.2]);
        Ok(())
    }

    /// Never fails: anything outside the frame is black.
    pub fn get(
        &self,
        x: usize,
        y: usize,
    ) -> (u8, u8, u8)
    {
        let pixel = self
            .index(x, y)
            .and_then(|i| self.data.get(i * BYTES_PER_PIXEL..(i + 1) * BYTES_PER_PIXEL));
        match pixel
        {
            Some(&[r, g, b]) => (r, g, b),
            _ => BLACK,
        }
    }

    pub fn as_bytes(&self) -> &[u8]
    {
        &self.data
    }

    pub fn serialize(&self) -> Vec<u8>
    {
        self.data.clone()
    }

    /// Packs every pixel as `0x00RRGGBB`.
    pub fn to_xrgb(&self) -> Vec<u32>
    {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32)
            .collect()
    }

    pub fn save_png(
        &self,
        filename: &Path,
    ) -> VideoResult<()>
    {
        let img: ImageBuffer<Rgb<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width as u32, self.height as u32, self.data.as_slice())
                .ok_or(FormatError::PixelDataSize {
                    expected: self.width as usize * self.height as usize * BYTES_PER_PIXEL,
                    found: self.data.len(),
                })?;

        img.save(filename).map_err(VideoError::Image)?;
        log::info!("Saved PNG to {}", filename.display());
        Ok(())
    }
}

fn checked_dimensions(
    width: usize,
    height: usize,
) -> VideoResult<(u16, u16)>
{
    for dimension in [width, height]
    {
        if dimension > MAX_DIMENSION
        {
            return Err(VideoError::DimensionOverflow(dimension));
        }
    }
    Ok((width as u16, height as u16))
}
