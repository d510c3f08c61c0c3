//! Microphone capture
//!
//! Capture sits behind a small trait so the controller never talks to the
//! platform audio host directly. The real backend is cpal; tests use
//! [`MockCapture`] to script device denial and to count stop calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

/// A live capture stream delivering mono sample chunks.
pub trait CaptureStream {
    /// Capture sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Drains pending samples, or `None` when nothing arrived since the
    /// last call.
    fn try_chunk(&mut self) -> Option<Vec<f32>>;

    /// Stops capture and releases the device. Safe to call more than once;
    /// only the first call has any effect.
    fn stop(&mut self);
}

impl std::fmt::Debug for dyn CaptureStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureStream")
            .field("sample_rate", &self.sample_rate())
            .finish()
    }
}

/// Opens capture streams on input devices.
pub trait CaptureBackend {
    /// Opens a stream on the named device, or the default input when `None`.
    fn open(&mut self, device_id: Option<&str>) -> Result<Box<dyn CaptureStream>>;
}

#[cfg(feature = "audio")]
pub use cpal_backend::CpalCapture;

#[cfg(feature = "audio")]
mod cpal_backend {
    use super::*;
    use crate::error::Error;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleFormat, StreamConfig};
    use crossbeam_channel::{bounded, Receiver, Sender};

    /// Capture backend over the system audio host.
    #[derive(Default)]
    pub struct CpalCapture;

    struct CpalStream {
        // Keeps the device open; dropping it ends the callback.
        stream: Option<cpal::Stream>,
        receiver: Receiver<Vec<f32>>,
        sample_rate: u32,
    }

    impl CaptureStream for CpalStream {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn try_chunk(&mut self) -> Option<Vec<f32>> {
            let mut out = Vec::new();
            while let Ok(chunk) = self.receiver.try_recv() {
                out.extend_from_slice(&chunk);
            }
            if out.is_empty() {
                None
            } else {
                Some(out)
            }
        }

        fn stop(&mut self) {
            if let Some(stream) = self.stream.take() {
                if let Err(e) = stream.pause() {
                    warn!("pausing capture stream failed: {e}");
                }
                debug!("capture stream stopped");
            }
        }
    }

    impl Drop for CpalStream {
        fn drop(&mut self) {
            self.stop();
        }
    }

    impl CaptureBackend for CpalCapture {
        fn open(&mut self, device_id: Option<&str>) -> Result<Box<dyn CaptureStream>> {
            let host = cpal::default_host();

            let device = match device_id {
                Some(wanted) => host
                    .input_devices()
                    .map_err(|e| {
                        Error::UnsupportedEnvironment(format!("cannot enumerate inputs: {e}"))
                    })?
                    .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                    .ok_or_else(|| {
                        Error::Permission(format!("no input device named {wanted:?}"))
                    })?,
                None => host.default_input_device().ok_or_else(|| {
                    Error::UnsupportedEnvironment("no default input device".into())
                })?,
            };

            let supported = device
                .default_input_config()
                .map_err(|e| Error::Permission(format!("input config unavailable: {e}")))?;
            let config: StreamConfig = supported.config();
            let sample_format = supported.sample_format();
            let sample_rate = config.sample_rate;
            let channels = config.channels.max(1) as usize;

            let (tx, rx) = bounded::<Vec<f32>>(64);
            let stream = build_stream(&device, &config, sample_format, channels, tx)
                .map_err(|e| Error::Permission(format!("opening capture failed: {e}")))?;

            stream
                .play()
                .map_err(|e| Error::Permission(format!("starting capture failed: {e}")))?;

            debug!(
                "capture opened: {} at {} Hz, {} ch",
                device.name().unwrap_or_else(|_| "<unnamed>".into()),
                sample_rate,
                channels
            );

            Ok(Box::new(CpalStream {
                stream: Some(stream),
                receiver: rx,
                sample_rate,
            }))
        }
    }

    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        format: SampleFormat,
        channels: usize,
        tx: Sender<Vec<f32>>,
    ) -> std::result::Result<cpal::Stream, cpal::BuildStreamError> {
        let err_fn = |e| warn!("capture stream error: {e}");
        match format {
            SampleFormat::F32 => device.build_input_stream(
                config,
                move |data: &[f32], _: &_| send_mono(&tx, data.iter().copied(), channels),
                err_fn,
                None,
            ),
            SampleFormat::I16 => device.build_input_stream(
                config,
                move |data: &[i16], _: &_| {
                    send_mono(&tx, data.iter().map(|&s| s as f32 / i16::MAX as f32), channels)
                },
                err_fn,
                None,
            ),
            SampleFormat::U16 => device.build_input_stream(
                config,
                move |data: &[u16], _: &_| {
                    send_mono(
                        &tx,
                        data.iter().map(|&s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0),
                        channels,
                    )
                },
                err_fn,
                None,
            ),
            other => {
                warn!("unsupported capture sample format {other:?}");
                Err(cpal::BuildStreamError::StreamConfigNotSupported)
            }
        }
    }

    fn send_mono(
        tx: &Sender<Vec<f32>>,
        samples: impl Iterator<Item = f32>,
        channels: usize,
    ) {
        let interleaved: Vec<f32> = samples.collect();
        let mono: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        // Drop chunks when the consumer stalls instead of blocking the
        // audio callback.
        let _ = tx.try_send(mono);
    }
}

/// Scriptable capture backend for tests.
#[derive(Clone, Default)]
pub struct MockCapture {
    shared: Arc<MockShared>,
}

#[derive(Default)]
struct MockShared {
    deny: Mutex<Option<String>>,
    devices: Mutex<Option<Vec<String>>>,
    chunks: Mutex<VecDeque<Vec<f32>>>,
    opens: AtomicUsize,
    stops: AtomicUsize,
}

impl MockCapture {
    /// Creates a backend that grants every open call.
    pub fn granting() -> Self {
        Self::default()
    }

    /// Creates a backend that fails every open with a permission error.
    pub fn denying(reason: &str) -> Self {
        let mock = Self::default();
        *mock.shared.deny.lock() = Some(reason.to_string());
        mock
    }

    /// Creates a backend that only recognizes the given device names.
    pub fn with_devices(names: &[&str]) -> Self {
        let mock = Self::default();
        *mock.shared.devices.lock() = Some(names.iter().map(|s| s.to_string()).collect());
        mock
    }

    /// Queues a chunk to be delivered by the next stream read.
    pub fn push_chunk(&self, chunk: Vec<f32>) {
        self.shared.chunks.lock().push_back(chunk);
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Number of effective stop calls across all streams.
    pub fn stop_count(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }
}

struct MockStream {
    shared: Arc<MockShared>,
    stopped: bool,
}

impl CaptureStream for MockStream {
    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn try_chunk(&mut self) -> Option<Vec<f32>> {
        if self.stopped {
            return None;
        }
        self.shared.chunks.lock().pop_front()
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.shared.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.stop();
    }
}

impl CaptureBackend for MockCapture {
    fn open(&mut self, device_id: Option<&str>) -> Result<Box<dyn CaptureStream>> {
        if let Some(reason) = self.shared.deny.lock().clone() {
            return Err(crate::error::Error::Permission(reason));
        }
        if let (Some(wanted), Some(known)) = (device_id, self.shared.devices.lock().as_ref()) {
            if !known.iter().any(|name| name == wanted) {
                return Err(crate::error::Error::Permission(format!(
                    "no input device named {wanted:?}"
                )));
            }
        }
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            shared: Arc::clone(&self.shared),
            stopped: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_grants_and_delivers() {
        let mut mock = MockCapture::granting();
        mock.push_chunk(vec![0.1, 0.2]);
        let mut stream = mock.open(None).unwrap();
        assert_eq!(stream.try_chunk(), Some(vec![0.1, 0.2]));
        assert_eq!(stream.try_chunk(), None);
        assert_eq!(mock.open_count(), 1);
    }

    #[test]
    fn test_mock_denies() {
        let mut mock = MockCapture::denying("user said no");
        let err = mock.open(None).unwrap_err();
        assert!(err.is_permission());
    }

    #[test]
    fn test_unknown_device_maps_to_permission() {
        let mut mock = MockCapture::with_devices(&["Built-in Microphone"]);
        let err = mock.open(Some("USB Interface")).unwrap_err();
        assert!(err.is_permission());
        assert!(mock.open(Some("Built-in Microphone")).is_ok());
        assert_eq!(mock.open_count(), 1);
    }

    #[test]
    fn test_stop_counted_once() {
        let mut mock = MockCapture::granting();
        let mut stream = mock.open(None).unwrap();
        stream.stop();
        stream.stop();
        drop(stream);
        assert_eq!(mock.stop_count(), 1);
    }
}
