use std::path::Path;

use crate::{
    ImplError,
    PixelFrame,
    Result,
    VideoContainer,
    ffmpeg,
};

/// Decodes the best video stream of `video_path` into a container.
///
/// A negative `width` or `height` keeps the source size for that axis.
pub fn convert_video<P>(
    video_path: P,
    width: i32,
    height: i32,
) -> Result<VideoContainer>
where
    P: AsRef<Path>,
{
    ffmpeg::init().map_err(ImplError::FFmpeg)?;

    let mut input = ffmpeg::format::input(video_path.as_ref()).map_err(ImplError::FFmpeg)?;

    let video_stream =
        input.streams().best(ffmpeg::media::Type::Video).ok_or(ImplError::FetchVideoStream)?;

    let video_stream_index = video_stream.index();

    let mut decoder = ffmpeg::codec::context::Context::from_parameters(video_stream.parameters())
        .map_err(ImplError::FFmpeg)?
        .decoder()
        .video()
        .map_err(ImplError::FFmpeg)?;

    let out_width = if width < 0 { decoder.width() } else { width as u32 };
    let out_height = if height < 0 { decoder.height() } else { height as u32 };
    log::info!(
        "Decoding {}x{} video to {}x{} RGB",
        decoder.width(),
        decoder.height(),
        out_width,
        out_height
    );

    let mut rgb_ctx = ffmpeg::software::scaling::context::Context::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        ffmpeg::format::Pixel::RGB24,
        out_width,
        out_height,
        ffmpeg::software::scaling::flag::Flags::BILINEAR,
    )
    .map_err(ImplError::FFmpeg)?;

    let mut video = VideoContainer::new(out_width as usize, out_height as usize)?;

    for (stream, packet) in input.packets()
    {
        if stream.index() == video_stream_index
        {
            decoder.send_packet(&packet).map_err(ImplError::FFmpeg)?;
            receive_frames(&mut decoder, &mut rgb_ctx, &mut video)?;
        }
    }
    // Flush decoder (could be storing extra frames)
    decoder.send_eof().map_err(ImplError::FFmpeg)?;
    receive_frames(&mut decoder, &mut rgb_ctx, &mut video)?;

    log::info!("Decoded {} frames", video.len());
    Ok(video)
}

fn receive_frames(
    decoder: &mut ffmpeg::decoder::Video,
    rgb_ctx: &mut ffmpeg::software::scaling::context::Context,
    video: &mut VideoContainer,
) -> Result<()>
{
    let mut decoded = ffmpeg::util::frame::video::Video::empty();
    while decoder.receive_frame(&mut decoded).is_ok()
    {
        let mut rgb_frame = ffmpeg::util::frame::video::Video::empty();
        rgb_ctx.run(&decoded, &mut rgb_frame).map_err(ImplError::FFmpeg)?;

        // Rows may be padded past width * 3
        let frame = PixelFrame::from_rgb_rows(
            rgb_frame.width() as usize,
            rgb_frame.height() as usize,
            rgb_frame.data(0),
            rgb_frame.stride(0),
        )?;
        video.append_frame(frame)?;
        if video.len() % 100 == 0
        {
            log::debug!("Decoded {} frames", video.len());
        }
    }
    Ok(())
}
