//=========================================================================
// Pointer Input System
//
// Render-thread consumer of pointer batches pushed by the host.
//
// Responsibilities:
// - Process each batch strictly in submission order
// - Check per-device phase sequences (diagnostics only)
// - Forward every sample to the registered pointer sinks
//
// Notes:
// Owned by the render loop; never touched from the host thread.
//
//=========================================================================

//=== Submodules ==========================================================
pub mod event;
mod state_tracker;

//=== Public Exports ======================================================
pub use event::{PointerEvent, PointerPhase, WindowMetrics};
pub use state_tracker::{PointerSequenceError, PointerTracker};

//=== External Crates =====================================================
use log::warn;

//=== PointerSink =========================================================

/// Engine-side consumer of pointer samples.
///
/// Implemented for any `FnMut(&PointerEvent) + Send` closure.
pub trait PointerSink: Send {
    fn on_pointer_event(&mut self, event: &PointerEvent);
}

impl<F> PointerSink for F
where
    F: FnMut(&PointerEvent) + Send,
{
    fn on_pointer_event(&mut self, event: &PointerEvent) {
        self(event)
    }
}

//=== PointerSystem =======================================================

/// Validates and fans out pointer batches.
pub(crate) struct PointerSystem {
    tracker: PointerTracker,
    sinks: Vec<Box<dyn PointerSink>>,
}

impl PointerSystem {
    pub(crate) fn new(sinks: Vec<Box<dyn PointerSink>>) -> Self {
        Self {
            tracker: PointerTracker::new(),
            sinks,
        }
    }

    /// Delivers one batch in array order.
    pub(crate) fn process_batch(&mut self, batch: &[PointerEvent]) {
        for event in batch {
            if let Err(violation) = self.tracker.observe(event) {
                warn!(target: "embedder::input", "Pointer sequence violation: {}", violation);
            }
            for sink in &mut self.sinks {
                sink.on_pointer_event(event);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
