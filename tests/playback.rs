use std::{
    sync::{
        Arc,
        Mutex,
    },
    thread,
    time::{
        Duration,
        Instant,
    },
};

use minvideo::{
    DisplayError,
    FrameDisplay,
    FramePixels,
    PixelFrame,
    PixelLayout,
    PlaybackConfig,
    PlaybackState,
    Player,
    VideoContainer,
    VideoError,
};

/// Container whose frame `i` has red channel `i` at (0, 0).
fn numbered_video(frames: u8) -> Arc<[u8]>
{
    let mut video = VideoContainer::new(2, 2).unwrap();
    for i in 0..frames
    {
        let mut frame = PixelFrame::new(2, 2).unwrap();
        frame.set(0, 0, (i, 0, 0)).unwrap();
        video.append_frame(frame).unwrap();
    }
    video.serialize().unwrap().into()
}

#[derive(Default)]
struct Log
{
    opened: bool,
    closed: bool,
    shown: Vec<u8>,
}

/// Records the frame number of everything it is handed.
struct RecordingDisplay
{
    log: Arc<Mutex<Log>>,
    layout: PixelLayout,
    quit_after: Option<usize>,
    fail_on: Option<usize>,
}

impl RecordingDisplay
{
    fn new(log: &Arc<Mutex<Log>>) -> RecordingDisplay
    {
        RecordingDisplay {
            log: Arc::clone(log),
            layout: PixelLayout::Rgb24,
            quit_after: None,
            fail_on: None,
        }
    }
}

impl FrameDisplay for RecordingDisplay
{
    fn layout(&self) -> PixelLayout
    {
        self.layout
    }

    fn open(
        &mut self,
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError>
    {
        assert_eq!((width, height), (2, 2));
        self.log.lock().unwrap().opened = true;
        Ok(())
    }

    fn present(
        &mut self,
        pixels: FramePixels<'_>,
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError>
    {
        assert_eq!((width, height), (2, 2));
        let mut log = self.log.lock().unwrap();
        if self.fail_on == Some(log.shown.len())
        {
            return Err(DisplayError::Backend("lost the window".into()));
        }
        let number = match pixels
        {
            FramePixels::Rgb24(data) => data[0],
            FramePixels::Xrgb32(data) => (data[0] >> 16) as u8,
        };
        log.shown.push(number);
        Ok(())
    }

    fn quit_requested(&mut self) -> bool
    {
        self.quit_after.is_some_and(|n| self.log.lock().unwrap().shown.len() >= n)
    }

    fn close(&mut self)
    {
        self.log.lock().unwrap().closed = true;
    }
}

#[test]
fn plays_frames_in_order_and_loops()
{
    let log = Arc::new(Mutex::new(Log::default()));
    let mut display = RecordingDisplay::new(&log);
    display.quit_after = Some(10);

    let mut player = Player::new();
    let config = PlaybackConfig::new(500.0).with_queue_capacity(2);
    player.start(numbered_video(5), config, display).unwrap();
    let stats = player.wait().unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.shown, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
    assert!(log.opened && log.closed);
    assert_eq!(stats.frames_presented, 10);
    assert!(stats.max_queue_depth <= 2);
    assert!(stats.frames_decoded >= 10);
    assert_eq!(player.state(), PlaybackState::Stopped);
}

#[test]
fn converts_to_the_display_layout()
{
    let log = Arc::new(Mutex::new(Log::default()));
    let mut display = RecordingDisplay::new(&log);
    display.layout = PixelLayout::Xrgb32;
    display.quit_after = Some(4);

    let mut player = Player::new();
    player.start(numbered_video(3), PlaybackConfig::new(500.0), display).unwrap();
    player.wait().unwrap();

    assert_eq!(log.lock().unwrap().shown, vec![0, 1, 2, 0]);
}

#[test]
fn stop_while_source_is_blocked()
{
    let log = Arc::new(Mutex::new(Log::default()));
    let display = RecordingDisplay::new(&log);

    // One tick every two seconds keeps the queue full
    let mut player = Player::new();
    let config = PlaybackConfig::new(0.5).with_queue_capacity(1);
    player.start(numbered_video(5), config, display).unwrap();
    assert_eq!(player.state(), PlaybackState::Running);
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    let stats = player.request_stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1), "stop took {:?}", started.elapsed());
    assert_eq!(player.state(), PlaybackState::Stopped);
    assert!(player.is_finished());

    // Whatever was decoded was either shown or is the one frame left queued
    assert!(stats.frames_decoded <= stats.frames_presented + 1);
    assert!(log.lock().unwrap().closed);
}

#[test]
fn display_failure_stops_playback()
{
    let log = Arc::new(Mutex::new(Log::default()));
    let mut display = RecordingDisplay::new(&log);
    display.fail_on = Some(3);

    let mut player = Player::new();
    player.start(numbered_video(5), PlaybackConfig::new(500.0), display).unwrap();
    let err = player.wait().unwrap_err();

    assert!(matches!(err, VideoError::Display(DisplayError::Backend(_))));
    assert_eq!(log.lock().unwrap().shown, vec![0, 1, 2]);
    assert!(log.lock().unwrap().closed);
    assert_eq!(player.state(), PlaybackState::Stopped);
}

#[test]
fn refuses_unplayable_input()
{
    let log = Arc::new(Mutex::new(Log::default()));

    let mut player = Player::new();
    let empty = numbered_video(0);
    assert!(matches!(
        player.start(empty, PlaybackConfig::default(), RecordingDisplay::new(&log)),
        Err(VideoError::Format(minvideo::FormatError::NoFrames))
    ));

    let mut corrupt = numbered_video(1).to_vec();
    corrupt.pop();
    assert!(matches!(
        player.start(corrupt.into(), PlaybackConfig::default(), RecordingDisplay::new(&log)),
        Err(VideoError::Format(_))
    ));

    for fps in [-1.0, 1e-30]
    {
        assert!(matches!(
            player.start(numbered_video(1), PlaybackConfig::new(fps), RecordingDisplay::new(&log)),
            Err(VideoError::InvalidFrameRate(_))
        ));
    }
    assert_eq!(player.state(), PlaybackState::Idle);
    assert!(!log.lock().unwrap().opened);
}

#[test]
fn cannot_start_twice()
{
    let log = Arc::new(Mutex::new(Log::default()));
    let mut player = Player::new();
    let config = PlaybackConfig::new(100.0);
    player.start(numbered_video(2), config, RecordingDisplay::new(&log)).unwrap();
    assert!(matches!(
        player.start(numbered_video(2), PlaybackConfig::new(100.0), RecordingDisplay::new(&log)),
        Err(VideoError::PlaybackStarted)
    ));
    player.request_stop().unwrap();
}

#[test]
fn raised_stop_reports_stopping_until_joined()
{
    let log = Arc::new(Mutex::new(Log::default()));
    let mut player = Player::new();
    player.start(numbered_video(3), PlaybackConfig::new(2.0), RecordingDisplay::new(&log)).unwrap();
    assert_eq!(player.state(), PlaybackState::Running);

    player.stop_signal().raise();
    assert_eq!(player.state(), PlaybackState::Stopping);
    player.wait().unwrap();
    assert_eq!(player.state(), PlaybackState::Stopped);
    assert!(log.lock().unwrap().closed);
}

#[test]
fn display_quit_reports_stopping_until_joined()
{
    let log = Arc::new(Mutex::new(Log::default()));
    let mut display = RecordingDisplay::new(&log);
    display.quit_after = Some(2);

    let mut player = Player::new();
    player.start(numbered_video(3), PlaybackConfig::new(500.0), display).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !player.is_finished() && Instant::now() < deadline
    {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(player.is_finished());
    assert_eq!(player.state(), PlaybackState::Stopping);

    let stats = player.wait().unwrap();
    assert_eq!(stats.frames_presented, 2);
    assert_eq!(player.state(), PlaybackState::Stopped);
}
