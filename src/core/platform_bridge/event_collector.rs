//=========================================================================
// Event Collector
//=========================================================================
//
// Render-side event collector with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<EngineEvent> → collect_frame(timeout) → pending events → TickControl
//
// Waits up to one frame for the first event, then drains what is queued
// (bounded to prevent starvation of frame production).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::EngineEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Collects host events for one render tick.
pub(crate) struct EventCollector {
    receiver: Receiver<EngineEvent>,
    pending: Vec<EngineEvent>,
}

impl EventCollector {
    const MAX_EVENTS_PER_FRAME: usize = 100;

    pub(crate) fn new(receiver: Receiver<EngineEvent>) -> Self {
        Self {
            receiver,
            pending: Vec::with_capacity(16),
        }
    }

    /// Collects pending events, waiting at most `timeout` for the first one.
    ///
    /// Returns `Exit` on `Shutdown` or when every sender is gone. Events
    /// queued before the shutdown request are still kept in `pending`, and
    /// the render loop applies them before exiting.
    pub(crate) fn collect_frame(&mut self, timeout: Duration) -> TickControl {
        self.pending.clear();

        match self.receiver.recv_timeout(timeout) {
            Ok(event) => {
                if self.accept(event) == TickControl::Exit {
                    return TickControl::Exit;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return TickControl::Exit,
            Err(RecvTimeoutError::Timeout) => return TickControl::Continue,
        }

        let mut drained = 1;
        while drained < Self::MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accept(event) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_FRAME {
            warn!(target: "embedder::events", "Event queue backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    /// Takes the events collected this frame, leaving an empty vec.
    pub(crate) fn take_pending(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending)
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> &[EngineEvent] {
        &self.pending
    }

    fn accept(&mut self, event: EngineEvent) -> TickControl {
        match event {
            EngineEvent::Shutdown => TickControl::Exit,
            other => {
                self.pending.push(other);
                TickControl::Continue
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
