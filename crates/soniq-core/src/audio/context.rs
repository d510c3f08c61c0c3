//! Audio context and element taps
//!
//! An element may only ever be tapped once per context, so taps are cached
//! by element id and handed back on repeat requests. The cache holds weak
//! references; it never extends an element's lifetime.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use super::element::{ElementInner, MediaElement};
use crate::error::{Error, Result};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Context lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Created but not yet processing
    Suspended,
    /// Actively processing
    Running,
    /// Torn down; unusable from here on
    Closed,
}

/// A cached tap pulling samples from one media element.
pub struct TapNode {
    element_id: u64,
    element: Weak<Mutex<ElementInner>>,
}

impl TapNode {
    /// Id of the tapped element.
    pub fn element_id(&self) -> u64 {
        self.element_id
    }

    /// Whether the tapped element still exists.
    pub fn is_alive(&self) -> bool {
        self.element.strong_count() > 0
    }

    /// Sample rate of the tapped element, if it still exists.
    pub fn sample_rate(&self) -> Option<u32> {
        self.element.upgrade().map(|e| e.lock().sample_rate())
    }

    /// Reads the next chunk from the element, or nothing if it was dropped.
    pub fn take_chunk(&self) -> Vec<f32> {
        match self.element.upgrade() {
            Some(inner) => inner.lock().take_chunk(),
            None => Vec::new(),
        }
    }
}

/// Processing context owning the tap cache and connection bookkeeping.
pub struct AudioContext {
    id: u64,
    state: ContextState,
    taps: HashMap<u64, Arc<TapNode>>,
    /// Element ids currently wired into the analysis chain
    connected: HashSet<u64>,
}

impl AudioContext {
    /// Creates a suspended context.
    pub fn new() -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!("audio context {id} created");
        Self {
            id,
            state: ContextState::Suspended,
            taps: HashMap::new(),
            connected: HashSet::new(),
        }
    }

    /// Context id, unique per process.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Moves to `Running`. Idempotent while open; fails once closed.
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            ContextState::Closed => Err(Error::UnsupportedEnvironment(
                "audio context is closed".into(),
            )),
            _ => {
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    /// Moves to `Suspended`. Idempotent while open; fails once closed.
    pub fn suspend(&mut self) -> Result<()> {
        match self.state {
            ContextState::Closed => Err(Error::UnsupportedEnvironment(
                "audio context is closed".into(),
            )),
            _ => {
                self.state = ContextState::Suspended;
                Ok(())
            }
        }
    }

    /// Tears the context down, dropping all taps and connections.
    /// Idempotent.
    pub fn close(&mut self) {
        if self.state != ContextState::Closed {
            debug!("audio context {} closed", self.id);
        }
        self.state = ContextState::Closed;
        self.taps.clear();
        self.connected.clear();
    }

    /// Returns the tap for an element, creating and caching it on first
    /// request. Repeat requests for the same element return the same tap.
    pub fn tap_for(&mut self, element: &MediaElement) -> Result<Arc<TapNode>> {
        if self.state == ContextState::Closed {
            return Err(Error::UnsupportedEnvironment(
                "audio context is closed".into(),
            ));
        }
        // Entries whose element has been dropped are dead weight.
        self.taps.retain(|_, tap| tap.is_alive());

        let id = element.id();
        if let Some(tap) = self.taps.get(&id) {
            return Ok(Arc::clone(tap));
        }
        let tap = Arc::new(TapNode {
            element_id: id,
            element: element.downgrade(),
        });
        self.taps.insert(id, Arc::clone(&tap));
        debug!("context {}: tap created for element {}", self.id, id);
        Ok(tap)
    }

    /// Wires a tap into the analysis chain. Connecting an already connected
    /// tap is a no-op.
    pub fn connect(&mut self, tap: &TapNode) {
        self.connected.insert(tap.element_id());
    }

    /// Unwires a tap. Disconnecting a tap that is not connected is a no-op.
    pub fn disconnect(&mut self, tap: &TapNode) {
        self.connected.remove(&tap.element_id());
    }

    /// Whether the tap is currently wired in.
    pub fn is_connected(&self, tap: &TapNode) -> bool {
        self.connected.contains(&tap.element_id())
    }

    /// Number of live cached taps.
    pub fn tap_count(&mut self) -> usize {
        self.taps.retain(|_, tap| tap.is_alive());
        self.taps.len()
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("taps", &self.taps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_cached_per_element() {
        let mut ctx = AudioContext::new();
        let element = MediaElement::from_samples(vec![0.0; 10], 44_100);
        let a = ctx.tap_for(&element).unwrap();
        let b = ctx.tap_for(&element).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ctx.tap_count(), 1);
    }

    #[test]
    fn test_tap_does_not_keep_element_alive() {
        let mut ctx = AudioContext::new();
        let tap = {
            let element = MediaElement::from_samples(vec![0.5; 10], 44_100);
            ctx.tap_for(&element).unwrap()
        };
        assert!(!tap.is_alive());
        assert!(tap.take_chunk().is_empty());
        assert_eq!(ctx.tap_count(), 0);
    }

    #[test]
    fn test_resume_and_close_idempotent() {
        let mut ctx = AudioContext::new();
        assert_eq!(ctx.state(), ContextState::Suspended);
        ctx.resume().unwrap();
        ctx.resume().unwrap();
        assert_eq!(ctx.state(), ContextState::Running);
        ctx.close();
        ctx.close();
        assert_eq!(ctx.state(), ContextState::Closed);
        assert!(ctx.resume().is_err());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut ctx = AudioContext::new();
        let element = MediaElement::from_samples(vec![0.0; 10], 44_100);
        let tap = ctx.tap_for(&element).unwrap();
        ctx.disconnect(&tap);
        ctx.connect(&tap);
        assert!(ctx.is_connected(&tap));
        ctx.connect(&tap);
        ctx.disconnect(&tap);
        ctx.disconnect(&tap);
        assert!(!ctx.is_connected(&tap));
    }

    #[test]
    fn test_closed_context_refuses_taps() {
        let mut ctx = AudioContext::new();
        ctx.close();
        let element = MediaElement::from_samples(vec![0.0; 10], 44_100);
        assert!(ctx.tap_for(&element).is_err());
    }
}
