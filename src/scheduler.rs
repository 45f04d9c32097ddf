//! Fixed-rate frame scheduler
//!
//! Each tick runs the whole pipeline synchronously:
//!
//! ```text
//! sample size → engine.update_frame → interpret commands → flush
//! ```
//!
//! The next tick is armed a fixed interval after the current one finishes.
//! There is no drift correction and no frame skipping, so a slow frame
//! simply delays everything after it.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::core::layout::{FrameInput, LayoutEngine, PointerState};
use crate::ui::compositor::Compositor;
use crate::ui::flusher::terminal_size;
use crate::ui::interpreter::BorderMode;

pub const DEFAULT_COLS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;

/// Where the scheduler learns the output size each frame
pub trait SizeSource {
    fn size(&self) -> Option<(u16, u16)>;
}

/// The controlling terminal
pub struct TerminalSize;

impl SizeSource for TerminalSize {
    fn size(&self) -> Option<(u16, u16)> {
        terminal_size()
    }
}

/// A constant size, for tests and headless output
pub struct FixedSize(pub u16, pub u16);

impl SizeSource for FixedSize {
    fn size(&self) -> Option<(u16, u16)> {
        Some((self.0, self.1))
    }
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No frame rendered yet
    Idle,
    Running,
    Stopped,
}

/// Cloneable handle that ends `FrameScheduler::run`
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub target_fps: u32,
    /// Size used when the environment reports none
    pub fallback_size: (u16, u16),
    /// Stop after this many frames
    pub frame_limit: Option<u64>,
    pub border_mode: BorderMode,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            target_fps: 30,
            fallback_size: (DEFAULT_COLS, DEFAULT_ROWS),
            frame_limit: None,
            border_mode: BorderMode::FullBox,
        }
    }
}

impl SchedulerOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub cols: u16,
    pub rows: u16,
    pub elapsed_seconds: f32,
    /// Commands in the engine's array, when it could be read
    pub commands: Option<usize>,
    pub flushed: bool,
}

pub struct FrameScheduler<E, S, W> {
    engine: E,
    sizes: S,
    out: W,
    compositor: Compositor,
    options: SchedulerOptions,
    state: SchedulerState,
    previous_frame: Option<Instant>,
    frames: u64,
    stop: StopHandle,
}

impl<E, S, W> FrameScheduler<E, S, W>
where
    E: LayoutEngine,
    S: SizeSource,
    W: Write,
{
    pub fn new(engine: E, sizes: S, out: W, options: SchedulerOptions) -> Self {
        let (cols, rows) = options.fallback_size;
        Self {
            engine,
            sizes,
            out,
            compositor: Compositor::new(cols, rows, options.border_mode),
            options,
            state: SchedulerState::Idle,
            previous_frame: None,
            frames: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Give back the output stream, consuming the scheduler
    pub fn into_output(self) -> W {
        self.out
    }

    /// Explicitly stop. `run` returns before the next tick.
    pub fn stop(&mut self) {
        self.stop.stop();
        self.state = SchedulerState::Stopped;
    }

    /// Run one frame as of `now`. Returns `None` without rendering once the
    /// scheduler has been stopped.
    pub fn tick(&mut self, now: Instant) -> Option<FrameReport> {
        if self.state == SchedulerState::Stopped || self.stop.is_stopped() {
            self.state = SchedulerState::Stopped;
            return None;
        }
        if self.state == SchedulerState::Idle {
            info!("frame loop starting at {} fps", self.options.target_fps);
            self.state = SchedulerState::Running;
        }

        let (cols, rows) = self.sizes.size().unwrap_or(self.options.fallback_size);
        // First frame measures from itself
        let previous = self.previous_frame.unwrap_or(now);
        let elapsed_seconds = now.saturating_duration_since(previous).as_secs_f32();
        self.previous_frame = Some(now);
        self.frames += 1;

        let mut report = FrameReport {
            frame: self.frames,
            cols,
            rows,
            elapsed_seconds,
            commands: None,
            flushed: false,
        };

        let input = FrameInput {
            width: cols,
            height: rows,
            pointer: PointerState::default(),
            delta_seconds: elapsed_seconds,
        };
        if let Err(e) = self.engine.update_frame(&input) {
            error!("frame {}: layout update failed: {}", self.frames, e);
            return Some(report);
        }

        self.compositor.begin_frame(cols, rows);
        match self
            .compositor
            .compose(self.engine.memory(), self.engine.scratch_address())
        {
            Ok(count) => report.commands = Some(count),
            Err(e) => warn!("frame {}: command decode stopped early: {}", self.frames, e),
        }

        match self.compositor.present(&mut self.out) {
            Ok(()) => report.flushed = true,
            Err(e) => error!("frame {}: flush failed: {}", self.frames, e),
        }

        debug!(
            "frame {} {}x{} dt={:.3}s commands={:?}",
            report.frame, cols, rows, elapsed_seconds, report.commands
        );
        Some(report)
    }

    fn limit_reached(&self) -> bool {
        self.options
            .frame_limit
            .map_or(false, |limit| self.frames >= limit)
    }

    /// Tick at the target rate until stopped or the frame limit is reached
    pub fn run(&mut self) {
        let interval = self.options.interval();
        while !self.stop.is_stopped() && !self.limit_reached() {
            if self.tick(Instant::now()).is_none() || self.limit_reached() {
                break;
            }
            thread::sleep(interval);
        }
        self.state = SchedulerState::Stopped;
        info!("frame loop stopped after {} frames", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::{BoundingBox, Rgba};
    use crate::core::encode::CommandBuffer;
    use crate::core::layout::LayoutError;
    use std::io;

    /// Engine that draws one red cell and records its inputs
    struct RecordingEngine {
        memory: Vec<u8>,
        inputs: Vec<FrameInput>,
        fail: bool,
    }

    impl RecordingEngine {
        fn new() -> Self {
            Self {
                memory: Vec::new(),
                inputs: Vec::new(),
                fail: false,
            }
        }
    }

    impl LayoutEngine for RecordingEngine {
        fn update_frame(&mut self, input: &FrameInput) -> Result<(), LayoutError> {
            self.inputs.push(*input);
            if self.fail {
                return Err(LayoutError::Update("boom".to_string()));
            }
            let mut buf = CommandBuffer::new(4);
            buf.rectangle(
                BoundingBox { x: 0.0, y: 0.0, width: 1.0, height: 1.0 },
                Rgba { r: 255.0, g: 0.0, b: 0.0, a: 255.0 },
            );
            buf.finish_into(&mut self.memory);
            Ok(())
        }

        fn memory(&self) -> &[u8] {
            &self.memory
        }

        fn scratch_address(&self) -> usize {
            4
        }
    }

    struct NoSize;

    impl SizeSource for NoSize {
        fn size(&self) -> Option<(u16, u16)> {
            None
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_first_frame_has_zero_elapsed() {
        let mut scheduler = FrameScheduler::new(
            RecordingEngine::new(),
            FixedSize(10, 4),
            Vec::new(),
            SchedulerOptions::default(),
        );
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        let start = Instant::now();
        let first = scheduler.tick(start).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(first.elapsed_seconds, 0.0);
        assert_eq!(first.commands, Some(1));
        assert!(first.flushed);

        let second = scheduler.tick(start + Duration::from_millis(250)).unwrap();
        assert!((second.elapsed_seconds - 0.25).abs() < 1e-6);
        assert_eq!(second.frame, 2);

        let inputs = &scheduler.engine().inputs;
        assert_eq!(inputs.len(), 2);
        assert_eq!((inputs[0].width, inputs[0].height), (10, 4));
        assert_eq!(inputs[1].pointer, PointerState::default());
    }

    #[test]
    fn test_falls_back_to_default_size() {
        let mut scheduler = FrameScheduler::new(
            RecordingEngine::new(),
            NoSize,
            Vec::new(),
            SchedulerOptions::default(),
        );
        let report = scheduler.tick(Instant::now()).unwrap();
        assert_eq!((report.cols, report.rows), (80, 24));
        assert_eq!(scheduler.compositor().canvas().cols(), 80);
    }

    #[test]
    fn test_output_per_frame() {
        let mut scheduler = FrameScheduler::new(
            RecordingEngine::new(),
            FixedSize(2, 1),
            Vec::new(),
            SchedulerOptions::default(),
        );
        scheduler.tick(Instant::now());

        let out = String::from_utf8(scheduler.into_output()).unwrap();
        assert_eq!(out, "\x1b[2J\x1b[H\x1b[41m \x1b[0m \n");
    }

    #[test]
    fn test_flush_failure_keeps_running() {
        let mut scheduler = FrameScheduler::new(
            RecordingEngine::new(),
            FixedSize(4, 2),
            BrokenPipe,
            SchedulerOptions::default(),
        );
        let now = Instant::now();
        let first = scheduler.tick(now).unwrap();
        assert!(!first.flushed);
        assert_eq!(first.commands, Some(1));

        let second = scheduler.tick(now).unwrap();
        assert_eq!(second.frame, 2);
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[test]
    fn test_engine_failure_skips_frame() {
        let mut engine = RecordingEngine::new();
        engine.fail = true;
        let mut scheduler =
            FrameScheduler::new(engine, FixedSize(4, 2), Vec::new(), SchedulerOptions::default());

        let report = scheduler.tick(Instant::now()).unwrap();
        assert_eq!(report.commands, None);
        assert!(!report.flushed);
        assert!(scheduler.output().is_empty());
    }

    #[test]
    fn test_tick_after_stop_renders_nothing() {
        let mut scheduler = FrameScheduler::new(
            RecordingEngine::new(),
            FixedSize(3, 1),
            Vec::new(),
            SchedulerOptions::default(),
        );
        let now = Instant::now();
        assert!(scheduler.tick(now).is_some());
        let written = scheduler.output().len();

        scheduler.stop();
        assert_eq!(scheduler.tick(now), None);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.frames(), 1);
        assert_eq!(scheduler.output().len(), written);
        assert_eq!(scheduler.engine().inputs.len(), 1);
    }

    #[test]
    fn test_tick_after_stop_handle() {
        let mut scheduler = FrameScheduler::new(
            RecordingEngine::new(),
            FixedSize(3, 1),
            Vec::new(),
            SchedulerOptions::default(),
        );
        scheduler.stop_handle().stop();

        assert_eq!(scheduler.tick(Instant::now()), None);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.output().is_empty());
    }

    #[test]
    fn test_run_honors_frame_limit() {
        let options = SchedulerOptions {
            target_fps: 1000,
            frame_limit: Some(3),
            ..SchedulerOptions::default()
        };
        let mut scheduler =
            FrameScheduler::new(RecordingEngine::new(), FixedSize(3, 1), Vec::new(), options);
        scheduler.run();

        assert_eq!(scheduler.frames(), 3);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.compositor().frames_written(), 3);
    }

    #[test]
    fn test_stop_before_run() {
        let mut scheduler = FrameScheduler::new(
            RecordingEngine::new(),
            FixedSize(3, 1),
            Vec::new(),
            SchedulerOptions::default(),
        );
        let handle = scheduler.stop_handle();
        handle.stop();
        scheduler.run();

        assert_eq!(scheduler.frames(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_stop_from_another_thread() {
        let options = SchedulerOptions {
            target_fps: 200,
            ..SchedulerOptions::default()
        };
        let mut scheduler =
            FrameScheduler::new(RecordingEngine::new(), FixedSize(3, 1), io::sink(), options);
        let handle = scheduler.stop_handle();

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            handle.stop();
        });
        scheduler.run();
        stopper.join().unwrap();

        assert!(scheduler.frames() >= 1);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_interval() {
        let options = SchedulerOptions {
            target_fps: 5,
            ..SchedulerOptions::default()
        };
        assert_eq!(options.interval(), Duration::from_millis(200));

        let options = SchedulerOptions {
            target_fps: 0,
            ..SchedulerOptions::default()
        };
        assert_eq!(options.interval(), Duration::from_secs(1));
    }
}
