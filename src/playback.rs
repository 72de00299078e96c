//! Looping playback of a serialized container.
//!
//! Two threads share one bounded channel. The frame source decodes frames in
//! order and blocks while the channel is full; the presenter polls the channel
//! once per tick, hands whatever it finds to a [`FrameDisplay`] and sleeps
//! until the next tick. A shared [`StopSignal`] ends both.

use std::{
    sync::{
        Arc,
        Mutex,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    thread::{
        self,
        JoinHandle,
    },
    time::{
        Duration,
        Instant,
    },
};

use crossbeam_channel::{
    Receiver,
    RecvTimeoutError,
    Sender,
    TryRecvError,
    bounded,
    select,
};

use crate::{
    FrameDisplay,
    FramePixels,
    PixelFrame,
    PixelLayout,
    VideoError,
    VideoResult,
    reader::{
        self,
        ContainerInfo,
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig
{
    pub fps: f64,
    /// Overrides the frame rate based queue size.
    pub queue_capacity: Option<usize>,
}

impl PlaybackConfig
{
    pub fn new(fps: f64) -> PlaybackConfig
    {
        PlaybackConfig {
            fps,
            queue_capacity: None,
        }
    }

    pub fn with_queue_capacity(
        mut self,
        capacity: usize,
    ) -> PlaybackConfig
    {
        self.queue_capacity = Some(capacity);
        self
    }

    fn frame_period(&self) -> VideoResult<Duration>
    {
        if !self.fps.is_finite() || self.fps <= 0.0
        {
            return Err(VideoError::InvalidFrameRate(self.fps));
        }
        Duration::try_from_secs_f64(1.0 / self.fps)
            .map_err(|_| VideoError::InvalidFrameRate(self.fps))
    }

    fn capacity(&self) -> VideoResult<usize>
    {
        match self.queue_capacity
        {
            Some(0) => Err(VideoError::InvalidQueueCapacity),
            Some(capacity) => Ok(capacity),
            None => Ok(queue_capacity_for(self.fps)),
        }
    }
}

impl Default for PlaybackConfig
{
    fn default() -> Self
    {
        PlaybackConfig::new(30.0)
    }
}

/// Faster playback gets a deeper queue to ride out decode jitter; slower
/// playback keeps it short to bound memory and latency.
pub fn queue_capacity_for(fps: f64) -> usize
{
    if fps >= 40.0
    {
        20
    }
    else if fps >= 20.0
    {
        10
    }
    else
    {
        5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState
{
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStats
{
    pub frames_decoded: u64,
    pub frames_presented: u64,
    /// Ticks where the presenter found the queue empty.
    pub starved_ticks: u64,
    /// Deepest queue the presenter saw before popping.
    pub max_queue_depth: usize,
}

/// One-shot cancellation shared by both playback threads.
///
/// Raising it drops the only sender of `wake`, which makes any blocked
/// `select!` or `recv_timeout` on it return at once.
#[derive(Clone)]
pub struct StopSignal
{
    inner: Arc<StopInner>,
}

struct StopInner
{
    raised: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    wake: Receiver<()>,
}

impl StopSignal
{
    pub fn new() -> StopSignal
    {
        let (trigger, wake) = bounded(0);
        StopSignal {
            inner: Arc::new(StopInner {
                raised: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                wake,
            }),
        }
    }

    pub fn raise(&self)
    {
        if !self.inner.raised.swap(true, Ordering::SeqCst)
        {
            if let Ok(mut trigger) = self.inner.trigger.lock()
            {
                trigger.take();
            }
        }
    }

    pub fn is_raised(&self) -> bool
    {
        self.inner.raised.load(Ordering::SeqCst)
    }

    /// Becomes disconnected once the signal is raised.
    pub fn wake(&self) -> &Receiver<()>
    {
        &self.inner.wake
    }

    /// Sleeps up to `timeout`, returning `true` early if the signal is raised.
    pub fn wait_timeout(
        &self,
        timeout: Duration,
    ) -> bool
    {
        match self.inner.wake.recv_timeout(timeout)
        {
            Err(RecvTimeoutError::Timeout) => self.is_raised(),
            _ => true,
        }
    }
}

impl Default for StopSignal
{
    fn default() -> Self
    {
        StopSignal::new()
    }
}

#[derive(Default)]
struct PresenterReport
{
    presented: u64,
    starved_ticks: u64,
    max_queue_depth: usize,
}

/// Owns the display for the lifetime of the presenter thread.
///
/// The display is opened on construction and closed on drop, so it is torn
/// down on every exit path, errors included.
struct PresenterContext<D: FrameDisplay>
{
    display: D,
    stop: StopSignal,
}

impl<D: FrameDisplay> PresenterContext<D>
{
    fn open(
        mut display: D,
        stop: StopSignal,
        width: u16,
        height: u16,
    ) -> VideoResult<PresenterContext<D>>
    {
        display.open(width, height)?;
        Ok(PresenterContext {
            display,
            stop,
        })
    }

    fn submit(
        &mut self,
        frame: &PixelFrame,
    ) -> VideoResult<()>
    {
        let (width, height) = (frame.width(), frame.height());
        match self.display.layout()
        {
            PixelLayout::Rgb24 =>
            {
                self.display.present(FramePixels::Rgb24(frame.as_bytes()), width, height)?
            },
            PixelLayout::Xrgb32 =>
            {
                self.display.present(FramePixels::Xrgb32(&frame.to_xrgb()), width, height)?
            },
        }
        Ok(())
    }
}

impl<D: FrameDisplay> Drop for PresenterContext<D>
{
    fn drop(&mut self)
    {
        self.display.close();
    }
}

/// Plays a container in a loop until stopped.
pub struct Player
{
    state: PlaybackState,
    stop: StopSignal,
    source: Option<JoinHandle<VideoResult<u64>>>,
    presenter: Option<JoinHandle<VideoResult<PresenterReport>>>,
    stats: PlaybackStats,
}

impl Player
{
    pub fn new() -> Player
    {
        Player {
            state: PlaybackState::Idle,
            stop: StopSignal::new(),
            source: None,
            presenter: None,
            stats: PlaybackStats::default(),
        }
    }

    pub fn state(&self) -> PlaybackState
    {
        match self.state
        {
            PlaybackState::Running if self.stop.is_raised() => PlaybackState::Stopping,
            state => state,
        }
    }

    /// `true` once both threads have exited on their own.
    pub fn is_finished(&self) -> bool
    {
        self.source.as_ref().is_none_or(|h| h.is_finished())
            && self.presenter.as_ref().is_none_or(|h| h.is_finished())
    }

    pub fn stop_signal(&self) -> &StopSignal
    {
        &self.stop
    }

    /// Validates `data` and spawns the frame source and presenter threads.
    pub fn start<D>(
        &mut self,
        data: Arc<[u8]>,
        config: PlaybackConfig,
        display: D,
    ) -> VideoResult<()>
    where
        D: FrameDisplay + Send + 'static,
    {
        if self.state != PlaybackState::Idle
        {
            return Err(VideoError::PlaybackStarted);
        }

        let period = config.frame_period()?;
        let capacity = config.capacity()?;
        let info = reader::probe(&data)?;
        if info.frame_count == 0
        {
            return Err(crate::FormatError::NoFrames.into());
        }

        let (tx, rx) = bounded(capacity);
        log::info!(
            "Playing {} frames of {}x{} at {} fps, queue of {}",
            info.frame_count,
            info.width,
            info.height,
            config.fps,
            capacity
        );

        let source_stop = self.stop.clone();
        let source = thread::Builder::new()
            .name("minvideo-source".into())
            .spawn(move || run_frame_source(&data, info, tx, source_stop))?;

        let presenter_stop = self.stop.clone();
        let presenter = thread::Builder::new().name("minvideo-presenter".into()).spawn(move || {
            let context =
                PresenterContext::open(display, presenter_stop.clone(), info.width, info.height)
                    .inspect_err(|_| presenter_stop.raise())?;
            run_presenter(context, rx, period)
        });

        self.source = Some(source);
        self.state = PlaybackState::Running;
        match presenter
        {
            Ok(handle) =>
            {
                self.presenter = Some(handle);
                Ok(())
            },
            Err(e) =>
            {
                self.stop.raise();
                let _ = self.join();
                Err(e.into())
            },
        }
    }

    /// Signals both threads to stop and joins them.
    pub fn request_stop(&mut self) -> VideoResult<PlaybackStats>
    {
        if self.state == PlaybackState::Running
        {
            log::info!("Stopping playback");
        }
        self.stop.raise();
        self.join()
    }

    /// Blocks until playback stops by itself, e.g. the display asked to quit.
    pub fn wait(&mut self) -> VideoResult<PlaybackStats>
    {
        self.join()
    }

    fn join(&mut self) -> VideoResult<PlaybackStats>
    {
        let source = self
            .source
            .take()
            .map(|h| h.join().unwrap_or(Err(VideoError::PlaybackThread("frame source"))));
        let presenter = self
            .presenter
            .take()
            .map(|h| h.join().unwrap_or(Err(VideoError::PlaybackThread("presenter"))));
        self.state = PlaybackState::Stopped;

        if let Some(decoded) = source
        {
            self.stats.frames_decoded = decoded?;
        }
        if let Some(report) = presenter
        {
            let report = report?;
            self.stats.frames_presented = report.presented;
            self.stats.starved_ticks = report.starved_ticks;
            self.stats.max_queue_depth = report.max_queue_depth;
        }
        log::debug!("Playback stopped: {:?}", self.stats);
        Ok(self.stats)
    }
}

impl Default for Player
{
    fn default() -> Self
    {
        Player::new()
    }
}

impl Drop for Player
{
    fn drop(&mut self)
    {
        if self.source.is_some() || self.presenter.is_some()
        {
            self.stop.raise();
            let _ = self.join();
        }
    }
}

fn run_frame_source(
    data: &[u8],
    info: ContainerInfo,
    tx: Sender<PixelFrame>,
    stop: StopSignal,
) -> VideoResult<u64>
{
    let wake = stop.wake().clone();
    let mut index = 0;
    let mut pushed = 0;
    while !stop.is_raised()
    {
        let frame = reader::read_frame(data, &info, index).inspect_err(|e| {
            log::error!("Failed to decode frame {}: {}", index, e);
            stop.raise();
        })?;

        if stop.is_raised()
        {
            break;
        }

        // Blocks while the queue is full, but not past a stop
        let sent = select! {
            send(tx, frame) -> res => res.is_ok(),
            recv(wake) -> _ => false,
        };
        if !sent
        {
            break;
        }
        log::trace!("Queued frame {}", index);
        pushed += 1;
        index = (index + 1) % info.frame_count;
    }
    Ok(pushed)
}

fn run_presenter<D: FrameDisplay>(
    mut context: PresenterContext<D>,
    rx: Receiver<PixelFrame>,
    period: Duration,
) -> VideoResult<PresenterReport>
{
    let mut report = PresenterReport::default();
    let mut next_tick = Instant::now();
    while !context.stop.is_raised()
    {
        if context.display.quit_requested()
        {
            log::info!("Display requested quit");
            context.stop.raise();
            break;
        }

        report.max_queue_depth = report.max_queue_depth.max(rx.len());
        match rx.try_recv()
        {
            Ok(frame) =>
            {
                context.submit(&frame).inspect_err(|_| context.stop.raise())?;
                report.presented += 1;
            },
            Err(TryRecvError::Empty) =>
            {
                report.starved_ticks += 1;
                log::trace!("No frame ready for tick");
            },
            Err(TryRecvError::Disconnected) => break,
        }

        next_tick += period;
        let now = Instant::now();
        if next_tick <= now
        {
            // Running late, so don't try to catch up with a burst
            next_tick = now;
            continue;
        }
        if context.stop.wait_timeout(next_tick - now)
        {
            break;
        }
    }
    Ok(report)
}
