//! Visualization controller
//!
//! Owns the audio graph (context, analyser, one signal source), the drawing
//! surface and the renderer registry, and drives them through the lifecycle
//! `Idle -> Starting -> Running -> Stopping -> Idle`, with `Errored` on a
//! failed start. Scheduling is cooperative: the embedder calls [`Visualizer::
//! on_frame`] once per display frame and the controller keeps at most one
//! tick pending at a time.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::audio::analyser::{Analyser, AnalyserConfig, FftSize};
use crate::audio::capture::{CaptureBackend, CaptureStream};
use crate::audio::context::{AudioContext, ContextState, TapNode};
use crate::audio::element::MediaElement;
use crate::color::{Background, BarColor, Style};
use crate::error::{Error, Result};
use crate::mode::{DataKind, Mode};
use crate::render::{Frame, Registry};
use crate::surface::Surface;

/// Where the analysed signal comes from.
#[derive(Clone)]
pub enum Source {
    /// Live input device capture.
    Microphone,
    /// A decoded media element, tapped without interrupting playback.
    Element(MediaElement),
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Starting,
    Running,
    Stopping,
    Errored,
}

type Callback = Box<dyn FnMut() + Send>;
type ErrorCallback = Box<dyn FnMut(&Error) + Send>;

/// Configuration accepted by [`Visualizer::new`].
///
/// Everything has a usable default except the source, which defaults to the
/// microphone.
pub struct VisualizerOptions {
    pub source: Source,
    pub mode: Mode,
    pub fft_size: FftSize,
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
    pub bar_color: BarColor,
    pub background: Background,
    pub line_width: f32,
    /// Capture device selector, matched against device names.
    pub device_id: Option<String>,
    pub mirror: bool,
    pub on_start: Option<Callback>,
    pub on_stop: Option<Callback>,
    pub on_error: Option<ErrorCallback>,
}

impl Default for VisualizerOptions {
    fn default() -> Self {
        Self {
            source: Source::Microphone,
            mode: Mode::Spectrum,
            fft_size: FftSize::default(),
            smoothing: 0.85,
            min_decibels: -90.0,
            max_decibels: -10.0,
            bar_color: BarColor::default(),
            background: Background::default(),
            line_width: 2.0,
            device_id: None,
            mirror: false,
            on_start: None,
            on_stop: None,
            on_error: None,
        }
    }
}

/// The public visualizer handle.
pub struct Visualizer {
    source: Source,
    mode: Mode,
    fft_size: FftSize,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
    device_id: Option<String>,
    style: Style,

    state: State,
    surface: Surface,
    registry: Registry,
    backend: Box<dyn CaptureBackend>,

    context: Option<AudioContext>,
    analyser: Option<Analyser>,
    capture: Option<Box<dyn CaptureStream>>,
    tap: Option<Arc<TapNode>>,

    freq_buf: Vec<u8>,
    time_buf: Vec<u8>,

    tick_scheduled: bool,
    restart_pending: bool,
    last_error: Option<Error>,

    on_start: Option<Callback>,
    on_stop: Option<Callback>,
    on_error: Option<ErrorCallback>,
}

impl Visualizer {
    /// Creates a visualizer using the cpal capture backend for the
    /// microphone source.
    #[cfg(feature = "audio")]
    pub fn new(options: VisualizerOptions) -> Self {
        Self::with_backend(options, Box::new(crate::audio::capture::CpalCapture))
    }

    /// Creates a visualizer with an explicit capture backend.
    pub fn with_backend(options: VisualizerOptions, backend: Box<dyn CaptureBackend>) -> Self {
        let style = Style {
            bar_color: options.bar_color,
            background: options.background,
            line_width: options.line_width,
            mirror: options.mirror,
        };
        Self {
            source: options.source,
            mode: options.mode,
            fft_size: options.fft_size,
            smoothing: options.smoothing,
            min_decibels: options.min_decibels,
            max_decibels: options.max_decibels,
            device_id: options.device_id,
            style,
            state: State::Idle,
            surface: Surface::unmeasured(1.0),
            registry: Registry::new(),
            backend,
            context: None,
            analyser: None,
            capture: None,
            tap: None,
            freq_buf: Vec::new(),
            time_buf: Vec::new(),
            tick_scheduled: false,
            restart_pending: false,
            last_error: None,
            on_start: options.on_start,
            on_stop: options.on_stop,
            on_error: options.on_error,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// The error recorded by the most recent failed start, if any.
    pub fn error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Starts the visualization. A failure is never returned to the caller:
    /// it is stored on the handle, forwarded to `on_error`, and followed by
    /// an implicit [`stop`](Self::stop) so no partial resources remain.
    pub fn start(&mut self) {
        if matches!(self.state, State::Running | State::Starting) {
            debug!("start ignored, already {:?}", self.state);
            return;
        }
        self.state = State::Starting;
        self.last_error = None;
        match self.acquire_graph() {
            Ok(()) => {
                self.state = State::Running;
                self.tick_scheduled = true;
                if let Some(cb) = &mut self.on_start {
                    cb();
                }
            }
            Err(err) => {
                warn!("start failed: {err}");
                self.state = State::Errored;
                if let Some(cb) = &mut self.on_error {
                    cb(&err);
                }
                self.last_error = Some(err);
                self.stop();
            }
        }
    }

    fn acquire_graph(&mut self) -> Result<()> {
        // Reuse the context unless a previous stop closed it.
        let reusable = self
            .context
            .as_ref()
            .is_some_and(|c| c.state() != ContextState::Closed);
        if !reusable {
            self.context = Some(AudioContext::new());
        }
        let ctx = match self.context.as_mut() {
            Some(ctx) => ctx,
            None => {
                return Err(Error::UnsupportedEnvironment(
                    "no audio context available".into(),
                ))
            }
        };
        ctx.resume()?;

        let config = AnalyserConfig {
            fft_size: self.fft_size,
            smoothing: self.smoothing,
            min_decibels: self.min_decibels,
            max_decibels: self.max_decibels,
        };
        let analyser = Analyser::new(config)?;

        match self.source.clone() {
            Source::Microphone => {
                // The tap cache only serves element sources.
                if let Some(tap) = self.tap.take() {
                    ctx.disconnect(&tap);
                }
                let stream = self.backend.open(self.device_id.as_deref())?;
                self.capture = Some(stream);
            }
            Source::Element(element) => {
                if !element.has_source() {
                    return Err(Error::InvalidSource(
                        "media element has no playable source".into(),
                    ));
                }
                let tap = ctx.tap_for(&element)?;
                // Rewire defensively; disconnect of a clean tap is a no-op.
                ctx.disconnect(&tap);
                ctx.connect(&tap);
                self.tap = Some(tap);
            }
        }

        self.freq_buf = vec![0; analyser.frequency_bin_count()];
        self.time_buf = vec![0; analyser.fft_size()];
        self.analyser = Some(analyser);
        self.surface.rescale();
        Ok(())
    }

    /// Stops the visualization and releases owned resources. Safe to call
    /// in any state; repeated calls are no-ops.
    pub fn stop(&mut self) {
        let was_active = self.state != State::Idle
            || self.capture.is_some()
            || self.analyser.is_some();
        if !was_active {
            return;
        }
        self.state = State::Stopping;
        self.tick_scheduled = false;
        // An explicit stop is final; a pending source-change restart must
        // not resurrect the visualizer on the next frame.
        self.restart_pending = false;

        if let Some(mut stream) = self.capture.take() {
            stream.stop();
        }
        // Element taps are retained: they are bound to their element and
        // context pair and are reused by the next start.
        if let (Some(ctx), Some(tap)) = (self.context.as_mut(), self.tap.as_ref()) {
            ctx.disconnect(tap);
        }
        self.analyser = None;
        if self.tap.is_none() {
            if let Some(mut ctx) = self.context.take() {
                ctx.close();
            }
        }
        self.freq_buf.clear();
        self.time_buf.clear();
        self.registry.reset_all();

        self.state = State::Idle;
        if let Some(cb) = &mut self.on_stop {
            cb();
        }
    }

    /// Switches the signal source. While running this schedules a stop and
    /// restart at the next [`on_frame`](Self::on_frame) pump so the audio
    /// graph rewires cleanly; while idle only the bookkeeping changes.
    pub fn set_source(&mut self, source: Source) {
        self.source = source;
        if self.state == State::Running {
            debug!("source changed while running, restart pending");
            self.restart_pending = true;
        }
    }

    /// Switches the visualization mode. Takes effect on the next tick
    /// without a restart; the renderer is preloaded here so the first frame
    /// of the new mode does not stall.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if let Err(err) = self.registry.preload(mode) {
            warn!("renderer preload for {mode} failed: {err}");
        }
    }

    /// Drives one display frame. Call once per frame; a tick runs only when
    /// one is scheduled, and reschedules itself while the controller stays
    /// Running.
    pub fn on_frame(&mut self) {
        if self.restart_pending {
            self.restart_pending = false;
            self.stop();
            self.start();
            return;
        }
        if !self.tick_scheduled || self.state != State::Running {
            return;
        }
        self.tick_scheduled = false;
        self.tick();
        if self.state == State::Running {
            self.tick_scheduled = true;
        }
    }

    fn tick(&mut self) {
        // Drain whatever arrived since the last frame into the ring buffer.
        if let Some(analyser) = self.analyser.as_mut() {
            if let Some(capture) = self.capture.as_mut() {
                while let Some(chunk) = capture.try_chunk() {
                    analyser.push_samples(&chunk);
                }
            }
            if let Some(tap) = self.tap.as_ref() {
                let chunk = tap.take_chunk();
                if !chunk.is_empty() {
                    analyser.push_samples(&chunk);
                }
            }

            match self.mode.data_kind() {
                DataKind::Frequency => analyser.byte_frequency_data(&mut self.freq_buf),
                DataKind::Time => analyser.byte_time_domain_data(&mut self.time_buf),
                DataKind::Both => {
                    analyser.byte_frequency_data(&mut self.freq_buf);
                    analyser.byte_time_domain_data(&mut self.time_buf);
                }
            }
        }

        let renderer = match self.registry.resolve(self.mode) {
            Ok(r) => r,
            Err(err) => {
                warn!("renderer for {} unavailable: {err}", self.mode);
                return;
            }
        };
        let frame = Frame {
            freq: &self.freq_buf,
            time: &self.time_buf,
        };
        // One bad frame must not end the session.
        let surface = &mut self.surface;
        let style = &self.style;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            renderer.draw(surface, &frame, style);
        }));
        if outcome.is_err() {
            warn!("renderer for {} panicked, frame dropped", self.mode);
        }
    }
}

impl Drop for Visualizer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::capture::MockCapture;
    use crate::audio::element::{Clock, MediaElement};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mic_visualizer(backend: MockCapture) -> Visualizer {
        Visualizer::with_backend(VisualizerOptions::default(), Box::new(backend))
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let backend = MockCapture::granting();
        let mut viz = mic_visualizer(backend.clone());
        assert_eq!(viz.state(), State::Idle);

        viz.start();
        assert!(viz.is_running());
        assert!(viz.error().is_none());
        assert_eq!(backend.open_count(), 1);

        viz.stop();
        assert!(!viz.is_running());
        assert_eq!(viz.state(), State::Idle);
        assert_eq!(backend.stop_count(), 1);
    }

    #[test]
    fn test_double_start_opens_one_stream() {
        let backend = MockCapture::granting();
        let mut viz = mic_visualizer(backend.clone());
        viz.start();
        viz.start();
        assert_eq!(backend.open_count(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let backend = MockCapture::granting();
        let mut viz = mic_visualizer(backend.clone());
        viz.start();
        viz.stop();
        viz.stop();
        assert_eq!(backend.stop_count(), 1);
    }

    #[test]
    fn test_denied_capture_reports_permission_error() {
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        let options = VisualizerOptions {
            on_error: Some(Box::new(move |err| {
                assert!(err.is_permission());
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };
        let mut viz = Visualizer::with_backend(options, Box::new(MockCapture::denying("denied")));

        viz.start();
        assert!(!viz.is_running());
        assert_eq!(viz.state(), State::Idle);
        assert!(viz.error().is_some_and(Error::is_permission));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_element_without_source_fails_start() {
        let options = VisualizerOptions {
            source: Source::Element(MediaElement::detached()),
            ..Default::default()
        };
        let mut viz = Visualizer::with_backend(options, Box::new(MockCapture::granting()));
        viz.start();
        assert!(!viz.is_running());
        assert!(viz.error().is_some_and(Error::is_invalid_source));
    }

    #[test]
    fn test_element_source_ticks_and_draws() {
        let element = MediaElement::from_samples(vec![0.5; 48_000], 48_000);
        element.set_clock(Clock::Manual(1024));
        element.play();
        let options = VisualizerOptions {
            source: Source::Element(element),
            mode: Mode::Waveform,
            ..Default::default()
        };
        let mut viz = Visualizer::with_backend(options, Box::new(MockCapture::granting()));
        viz.start();
        assert!(viz.is_running());
        for _ in 0..5 {
            viz.on_frame();
        }
        assert!(viz.is_running());
        viz.stop();
    }

    #[test]
    fn test_source_switch_while_running_restarts_once() {
        let starts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&starts);
        let backend = MockCapture::granting();
        let options = VisualizerOptions {
            on_start: Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };
        let mut viz = Visualizer::with_backend(options, Box::new(backend.clone()));
        viz.start();
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        let element = MediaElement::from_samples(vec![0.0; 1024], 44_100);
        viz.set_source(Source::Element(element));
        assert!(viz.is_running());

        // The pending restart is honored on the next pump.
        viz.on_frame();
        assert!(viz.is_running());
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert_eq!(backend.stop_count(), 1);
        assert_eq!(backend.open_count(), 1);
    }

    #[test]
    fn test_explicit_stop_cancels_pending_restart() {
        let backend = MockCapture::granting();
        let mut viz = mic_visualizer(backend.clone());
        viz.start();

        let element = MediaElement::from_samples(vec![0.0; 1024], 44_100);
        viz.set_source(Source::Element(element));
        viz.stop();
        assert_eq!(viz.state(), State::Idle);

        viz.on_frame();
        assert_eq!(viz.state(), State::Idle);
        assert_eq!(backend.open_count(), 1);
    }

    #[test]
    fn test_source_switch_while_idle_takes_no_action() {
        let backend = MockCapture::granting();
        let mut viz = mic_visualizer(backend.clone());
        viz.set_source(Source::Element(MediaElement::from_samples(
            vec![0.0; 64],
            44_100,
        )));
        viz.on_frame();
        assert_eq!(viz.state(), State::Idle);
        assert_eq!(backend.open_count(), 0);
    }

    #[test]
    fn test_mode_switch_preloads_without_restart() {
        let backend = MockCapture::granting();
        let mut viz = mic_visualizer(backend);
        viz.start();
        viz.set_mode(Mode::Nebula);
        assert!(viz.is_running());
        assert_eq!(viz.mode(), Mode::Nebula);
        viz.on_frame();
        assert!(viz.is_running());
    }

    #[test]
    fn test_buffers_sized_from_fft() {
        let options = VisualizerOptions {
            fft_size: FftSize::Large,
            ..Default::default()
        };
        let mut viz = Visualizer::with_backend(options, Box::new(MockCapture::granting()));
        viz.start();
        assert_eq!(viz.freq_buf.len(), 512);
        assert_eq!(viz.time_buf.len(), 1024);
        viz.stop();
        assert!(viz.freq_buf.is_empty());
    }

    #[test]
    fn test_drop_stops_capture() {
        let backend = MockCapture::granting();
        {
            let mut viz = mic_visualizer(backend.clone());
            viz.start();
        }
        assert_eq!(backend.stop_count(), 1);
    }
}
