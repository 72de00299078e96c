use minvideo::{
    FormatError,
    HEADER_SIZE,
    PixelFrame,
    VideoContainer,
    VideoError,
    dimension,
    reader,
};

fn gradient_video(
    width: usize,
    height: usize,
    frames: usize,
) -> VideoContainer
{
    let mut video = VideoContainer::new(width, height).unwrap();
    for f in 0..frames
    {
        let mut frame = PixelFrame::new(width, height).unwrap();
        for y in 0..height
        {
            for x in 0..width
            {
                frame.set(x, y, ((x * 7 + f) as u8, (y * 13) as u8, f as u8)).unwrap();
            }
        }
        video.append_frame(frame).unwrap();
    }
    video
}

#[test]
fn header_dimensions_survive_serialization()
{
    for (width, height) in [(1, 1), (255, 3), (256, 2), (2040, 1), (1, 2040)]
    {
        let data = VideoContainer::new(width, height).unwrap().serialize().unwrap();
        assert_eq!(data.len(), HEADER_SIZE);
        assert_eq!(reader::parse_header(&data), Ok((width as u16, height as u16)));
        assert!(data.iter().all(|&b| b as usize <= 255));
    }
}

#[test]
fn three_frame_round_trip()
{
    let video = gradient_video(2, 2, 3);
    let data = video.serialize().unwrap();
    assert_eq!(data.len(), 52);
    assert_eq!(reader::frame_count(&data), Ok(3));

    let decoded = VideoContainer::deserialize(&data).unwrap();
    assert_eq!((decoded.width(), decoded.height(), decoded.len()), (2, 2, 3));
    assert_eq!(decoded, video);
}

#[test]
fn lazy_iteration_matches_random_access()
{
    let video = gradient_video(5, 3, 7);
    let data = video.serialize().unwrap();

    let streamed: Vec<_> = reader::iterate(&data).unwrap().collect();
    assert_eq!(streamed.as_slice(), video.frames());
    for (i, frame) in video.frames().iter().enumerate().rev()
    {
        assert_eq!(&reader::frame_at(&data, i).unwrap(), frame);
    }
}

#[test]
fn non_canonical_header_still_decodes()
{
    let mut data = gradient_video(2, 2, 2).serialize().unwrap();
    // width 2 as 1 + 1, height 2 as 0 + .. + 2
    data[..16].copy_from_slice(&[1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);
    assert_eq!(reader::parse_header(&data), Ok((2, 2)));
    assert_eq!(VideoContainer::deserialize(&data).unwrap(), gradient_video(2, 2, 2));
    assert_eq!(dimension::decode(&[1, 1, 0, 0, 0, 0, 0, 0]), 2);
}

#[test]
fn corrupt_lengths_are_rejected()
{
    let mut data = gradient_video(2, 2, 0).serialize().unwrap();
    data.extend([0u8; 11]);
    assert_eq!(data.len(), 27);
    assert!(matches!(
        reader::frame_count(&data),
        Err(FormatError::UnalignedFrameData { .. })
    ));
    assert!(matches!(VideoContainer::deserialize(&data), Err(VideoError::Format(_))));
    assert!(matches!(
        VideoContainer::deserialize(&data[..10]),
        Err(VideoError::Format(FormatError::HeaderTooShort(10)))
    ));
}
