//! Audio input, taps and FFT analysis.

pub mod analyser;
pub mod capture;
pub mod context;
pub mod element;

pub use analyser::{Analyser, AnalyserConfig, FftSize};
#[cfg(feature = "audio")]
pub use capture::CpalCapture;
pub use capture::{CaptureBackend, CaptureStream, MockCapture};
pub use context::{AudioContext, ContextState, TapNode};
pub use element::{Clock, MediaElement};
