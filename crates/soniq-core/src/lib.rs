//! Real-time audio visualization engine.
//!
//! The crate is organized in three layers:
//!
//! - [`audio`]: the analysis stage. An [`audio::Analyser`] turns PCM chunks
//!   into byte-quantized frequency and time-domain snapshots; signal sources
//!   are either a capture device ([`audio::capture`]) or a decoded media
//!   element tapped through an [`audio::AudioContext`].
//! - [`render`]: one renderer per [`Mode`], drawing onto a DPI-aware
//!   [`Surface`]. Stateful renderers (particles, histories, phase
//!   accumulators) own their state through the per-controller
//!   [`render::Registry`].
//! - [`controller`]: the [`Visualizer`] lifecycle state machine wiring the
//!   two together, driven by a once-per-display-frame pump.
//!
//! ```no_run
//! use soniq_core::{Mode, Source, Visualizer, VisualizerOptions};
//! use soniq_core::audio::MediaElement;
//!
//! # fn main() -> soniq_core::Result<()> {
//! let element = MediaElement::from_wav_file("track.wav")?;
//! element.play();
//! let mut viz = Visualizer::new(VisualizerOptions {
//!     source: Source::Element(element),
//!     mode: Mode::Spectrum,
//!     ..Default::default()
//! });
//! viz.start();
//! loop {
//!     viz.on_frame();
//!     // present viz.surface().pixmap() ...
//! }
//! # }
//! ```

pub mod audio;
pub mod color;
pub mod controller;
pub mod error;
pub mod mode;
pub mod render;
pub mod sample;
pub mod surface;

pub use color::{Background, BarColor, Rgb, Style};
pub use controller::{Source, State, Visualizer, VisualizerOptions};
pub use error::{Error, Result};
pub use mode::{DataKind, Mode};
pub use surface::Surface;

// Re-exported so embedders can present or encode the backing pixmap without
// pinning their own copy of the drawing crate.
pub use tiny_skia;
