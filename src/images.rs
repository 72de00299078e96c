use std::{
    error::Error,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use rayon::prelude::*;

use crate::{
    ImplError,
    PixelFrame,
    Result,
    VideoContainer,
};

/// Finds `frame_<n>.png` files in `dir`, ordered by `n`.
pub fn numbered_frames(dir: &Path) -> Result<Vec<PathBuf>>
{
    let entries = fs::read_dir(dir).map_err(|e| ImplError::ReadInput(dir.to_owned(), e))?;

    let mut frames: Vec<(u64, PathBuf)> = Vec::new();
    for entry in entries
    {
        let path = entry.map_err(|e| ImplError::ReadInput(dir.to_owned(), e))?.path();
        if let Some(number) = frame_number(&path)
        {
            frames.push((number, path));
        }
    }
    frames.sort_unstable_by_key(|(number, _)| *number);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

fn frame_number(path: &Path) -> Option<u64>
{
    if !path.extension()?.eq_ignore_ascii_case("png")
    {
        return None;
    }
    path.file_stem()?.to_str()?.strip_prefix("frame_")?.parse().ok()
}

/// Packs images into a container, all resized to the first image's size
/// unless `size` is given.
pub fn pack_images(
    paths: &[PathBuf],
    size: Option<(u32, u32)>,
) -> Result<VideoContainer>
{
    let size = match (size, paths.first())
    {
        (Some(size), _) => size,
        (None, Some(first)) =>
        {
            image::image_dimensions(first).map_err(|e| ImplError::ImageLoad(first.clone(), e))?
        },
        (None, None) => (0, 0),
    };

    let frames = paths
        .par_iter()
        .map(|path| load_frame(path, size))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| -> Box<dyn Error> { e })?;

    let mut video = VideoContainer::new(size.0 as usize, size.1 as usize)?;
    for frame in frames
    {
        video.append_frame(frame)?;
    }
    log::info!("Packed {} images at {}x{}", video.len(), size.0, size.1);
    Ok(video)
}

fn load_frame(
    path: &Path,
    (width, height): (u32, u32),
) -> std::result::Result<PixelFrame, Box<dyn Error + Send + Sync>>
{
    let mut image =
        image::open(path).map_err(|e| ImplError::ImageLoad(path.to_owned(), e))?.to_rgb8();
    if image.dimensions() != (width, height)
    {
        log::debug!("Resizing {} to {}x{}", path.display(), width, height);
        image =
            image::imageops::resize(&image, width, height, image::imageops::FilterType::Nearest);
    }
    Ok(PixelFrame::from_image(image)?)
}
