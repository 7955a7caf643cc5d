//=========================================================================
// Pointer State Tracker
//=========================================================================
//
// Per-device pointer state used to check sample sequences.
//
// Architecture:
//   PointerEvent → observe() → HashMap<device, DeviceState> → diagnostics
//
// Valid sequence per device: Down → Move* → Up, with Cancel allowed at
// any point. Timestamps must not go backwards. Violations are reported
// to the caller; the tracker always adopts the new sample so a single
// bad sample does not poison the rest of the stream.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::event::{PointerEvent, PointerPhase};

//=== PointerSequenceError ================================================

/// A pointer sample that does not follow the expected sequence.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSequenceError {
    #[error("device {device}: down while already down")]
    DownWhileDown { device: u32 },

    #[error("device {device}: {phase:?} without a preceding down")]
    NotDown { device: u32, phase: PointerPhase },

    #[error("device {device}: timestamp went backwards ({previous} -> {current})")]
    TimestampRegression { device: u32, previous: u64, current: u64 },
}

//=== DeviceState =========================================================

#[derive(Debug, Clone, Copy, Default)]
struct DeviceState {
    down: bool,
    last_timestamp: u64,
}

//=== PointerTracker ======================================================

/// Tracks contact state and last timestamp for every pointer device.
#[derive(Debug, Default)]
pub struct PointerTracker {
    devices: HashMap<u32, DeviceState>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample, returning the first rule it breaks (if any).
    pub fn observe(&mut self, event: &PointerEvent) -> Result<(), PointerSequenceError> {
        let device = event.device;
        let state = self.devices.entry(device).or_default();

        let timestamp_check = if event.timestamp < state.last_timestamp {
            Err(PointerSequenceError::TimestampRegression {
                device,
                previous: state.last_timestamp,
                current: event.timestamp,
            })
        } else {
            Ok(())
        };
        state.last_timestamp = state.last_timestamp.max(event.timestamp);

        let phase_check = match event.phase {
            PointerPhase::Down if state.down => Err(PointerSequenceError::DownWhileDown { device }),
            PointerPhase::Move | PointerPhase::Up if !state.down => {
                Err(PointerSequenceError::NotDown { device, phase: event.phase })
            }
            _ => Ok(()),
        };

        state.down = matches!(event.phase, PointerPhase::Down | PointerPhase::Move);

        phase_check.and(timestamp_check)
    }

    /// Returns `true` if the device is currently in contact.
    pub fn is_down(&self, device: u32) -> bool {
        self.devices.get(&device).map(|s| s.down).unwrap_or(false)
    }

    /// Number of devices that have reported at least one sample.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
