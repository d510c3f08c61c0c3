//! Media element playback source
//!
//! A lightweight stand-in for an `<audio>`-style element: decoded mono
//! samples with a playback cursor, play/pause state and optional looping.
//! Elements are cheaply cloneable handles; the tap layer holds weak
//! references so caching a tap never keeps an element alive.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// How the playback cursor advances between chunk reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Advance by wall-clock time elapsed since the previous read.
    Realtime,
    /// Advance by a fixed number of samples per read. Used for offline
    /// rendering and deterministic tests.
    Manual(usize),
}

pub(crate) struct ElementInner {
    id: u64,
    samples: Option<Vec<f32>>,
    sample_rate: u32,
    position: usize,
    playing: bool,
    looping: bool,
    clock: Clock,
    last_read: Option<Instant>,
}

impl ElementInner {
    pub(crate) fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn advance_len(&mut self) -> usize {
        match self.clock {
            Clock::Manual(step) => step,
            Clock::Realtime => {
                let now = Instant::now();
                let elapsed = self
                    .last_read
                    .map(|t| now.duration_since(t).as_secs_f64())
                    .unwrap_or(0.0)
                    // Cap catch-up after a stall at a quarter second.
                    .min(0.25);
                self.last_read = Some(now);
                (elapsed * self.sample_rate as f64) as usize
            }
        }
    }

    pub(crate) fn take_chunk(&mut self) -> Vec<f32> {
        if !self.playing || self.samples.as_ref().map_or(true, Vec::is_empty) {
            return Vec::new();
        }
        let mut want = self.advance_len();
        let Some(samples) = &self.samples else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(want);
        while want > 0 {
            if self.position >= samples.len() {
                if self.looping {
                    self.position = 0;
                } else {
                    self.playing = false;
                    break;
                }
            }
            let end = (self.position + want).min(samples.len());
            out.extend_from_slice(&samples[self.position..end]);
            want -= end - self.position;
            self.position = end;
        }
        out
    }
}

/// Cloneable handle to a playback element.
#[derive(Clone)]
pub struct MediaElement {
    inner: Arc<Mutex<ElementInner>>,
}

impl MediaElement {
    fn from_inner(samples: Option<Vec<f32>>, sample_rate: u32) -> Self {
        let id = NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Arc::new(Mutex::new(ElementInner {
                id,
                samples,
                sample_rate,
                position: 0,
                playing: false,
                looping: false,
                clock: Clock::Realtime,
                last_read: None,
            })),
        }
    }

    /// Creates an element with no media attached. Starting a visualizer on
    /// it fails with an invalid-source error until media is loaded.
    pub fn detached() -> Self {
        Self::from_inner(None, 44_100)
    }

    /// Creates an element from decoded mono samples.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::from_inner(Some(samples), sample_rate)
    }

    /// Loads a WAV file, mixing all channels down to mono.
    pub fn from_wav_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let mono: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        debug!(
            "loaded {:?}: {} samples at {} Hz ({} ch)",
            path,
            mono.len(),
            spec.sample_rate,
            channels
        );
        Ok(Self::from_samples(mono, spec.sample_rate))
    }

    /// Stable identifier, unique per element.
    pub fn id(&self) -> u64 {
        self.inner.lock().id
    }

    /// Whether media is attached.
    pub fn has_source(&self) -> bool {
        self.inner.lock().samples.is_some()
    }

    /// Sample rate of the attached media.
    pub fn sample_rate(&self) -> u32 {
        self.inner.lock().sample_rate
    }

    /// Total duration in seconds, or zero when detached.
    pub fn duration(&self) -> f64 {
        let inner = self.inner.lock();
        match &inner.samples {
            Some(s) => s.len() as f64 / inner.sample_rate as f64,
            None => 0.0,
        }
    }

    /// Starts playback from the current position.
    pub fn play(&self) {
        let mut inner = self.inner.lock();
        inner.playing = true;
        inner.last_read = None;
    }

    /// Pauses playback, keeping the position.
    pub fn pause(&self) {
        self.inner.lock().playing = false;
    }

    /// Whether the element is currently playing.
    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    /// Restart from the beginning when the end is reached.
    pub fn set_looping(&self, looping: bool) {
        self.inner.lock().looping = looping;
    }

    /// Moves the playback cursor to the given time.
    pub fn seek(&self, seconds: f64) {
        let mut inner = self.inner.lock();
        let pos = (seconds.max(0.0) * inner.sample_rate as f64) as usize;
        let len = inner.samples.as_ref().map(Vec::len).unwrap_or(0);
        inner.position = pos.min(len);
    }

    /// Current playback position in seconds.
    pub fn position(&self) -> f64 {
        let inner = self.inner.lock();
        inner.position as f64 / inner.sample_rate as f64
    }

    /// Playback ran past the end without looping.
    pub fn ended(&self) -> bool {
        let inner = self.inner.lock();
        match &inner.samples {
            Some(s) => !inner.playing && inner.position >= s.len() && !s.is_empty(),
            None => false,
        }
    }

    /// Selects how the cursor advances between reads.
    pub fn set_clock(&self, clock: Clock) {
        self.inner.lock().clock = clock;
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<ElementInner>> {
        Arc::downgrade(&self.inner)
    }

    /// Reads the next chunk of samples, advancing the cursor.
    pub fn take_chunk(&self) -> Vec<f32> {
        self.inner.lock().take_chunk()
    }
}

impl std::fmt::Debug for MediaElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MediaElement")
            .field("id", &inner.id)
            .field("attached", &inner.samples.is_some())
            .field("sample_rate", &inner.sample_rate)
            .field("playing", &inner.playing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = MediaElement::from_samples(vec![0.0; 10], 44_100);
        let b = MediaElement::from_samples(vec![0.0; 10], 44_100);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_detached_has_no_source() {
        let element = MediaElement::detached();
        assert!(!element.has_source());
        element.play();
        assert!(element.take_chunk().is_empty());
    }

    #[test]
    fn test_manual_clock_reads_fixed_chunks() {
        let element = MediaElement::from_samples((0..100).map(|i| i as f32).collect(), 44_100);
        element.set_clock(Clock::Manual(30));
        element.play();

        assert_eq!(element.take_chunk().len(), 30);
        assert_eq!(element.take_chunk().len(), 30);
        let chunk = element.take_chunk();
        assert_eq!(chunk.len(), 30);
        assert_eq!(chunk[0], 60.0);
    }

    #[test]
    fn test_playback_stops_at_end() {
        let element = MediaElement::from_samples(vec![0.5; 50], 44_100);
        element.set_clock(Clock::Manual(40));
        element.play();

        assert_eq!(element.take_chunk().len(), 40);
        assert_eq!(element.take_chunk().len(), 10);
        assert!(!element.is_playing());
        assert!(element.ended());
        assert!(element.take_chunk().is_empty());
    }

    #[test]
    fn test_looping_wraps_around() {
        let element = MediaElement::from_samples((0..10).map(|i| i as f32).collect(), 44_100);
        element.set_clock(Clock::Manual(15));
        element.set_looping(true);
        element.play();

        let chunk = element.take_chunk();
        assert_eq!(chunk.len(), 15);
        assert_eq!(chunk[10], 0.0);
        assert_eq!(chunk[14], 4.0);
        assert!(element.is_playing());
    }

    #[test]
    fn test_paused_reads_nothing() {
        let element = MediaElement::from_samples(vec![0.5; 100], 44_100);
        element.set_clock(Clock::Manual(10));
        assert!(element.take_chunk().is_empty());
        element.play();
        assert_eq!(element.take_chunk().len(), 10);
        element.pause();
        assert!(element.take_chunk().is_empty());
    }

    #[test]
    fn test_seek_moves_cursor() {
        let element = MediaElement::from_samples(vec![0.0; 44_100], 44_100);
        element.set_clock(Clock::Manual(10));
        element.seek(0.5);
        assert!((element.position() - 0.5).abs() < 1e-9);
        element.seek(100.0);
        assert!((element.position() - 1.0).abs() < 1e-9);
    }
}
