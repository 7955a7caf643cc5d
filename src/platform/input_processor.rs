//=========================================================================
// Pointer Input Processor
//=========================================================================
//
// Converts winit mouse events into engine pointer samples.
//
// Architecture:
//   winit events → InputProcessor → PointerEvent (engine type) → pending batch
//
// Only the primary button produces contact. Cursor motion without a
// pressed button is hover, which this ABI has no phase for, so it only
// updates the cached position. Leaving the window mid-drag cancels.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Instant;

use winit::event::{ElementState, MouseButton};

//=== Internal Dependencies ===============================================

use crate::core::input::{PointerEvent, PointerPhase};

//=== InputProcessor ======================================================

/// Tracks cursor position and primary-button state for one window.
pub(crate) struct InputProcessor {
    position: (f64, f64),
    pressed: bool,
    epoch: Instant,
}

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            position: (0.0, 0.0),
            pressed: false,
            epoch: Instant::now(),
        }
    }

    /// Microseconds since this processor was created (monotonic).
    pub(crate) fn timestamp(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    #[cfg(test)]
    pub(crate) fn is_pressed(&self) -> bool {
        self.pressed
    }

    //--- Event Processing -------------------------------------------------

    /// Cursor moved to physical position `(x, y)`.
    pub(crate) fn process_cursor_moved(&mut self, x: f64, y: f64, timestamp: u64) -> Option<PointerEvent> {
        self.position = (x, y);
        self.pressed
            .then(|| self.sample(PointerPhase::Move, timestamp))
    }

    /// Mouse button changed state at the cached position.
    pub(crate) fn process_mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
        timestamp: u64,
    ) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }

        match (state, self.pressed) {
            (ElementState::Pressed, false) => {
                self.pressed = true;
                Some(self.sample(PointerPhase::Down, timestamp))
            }
            (ElementState::Released, true) => {
                self.pressed = false;
                Some(self.sample(PointerPhase::Up, timestamp))
            }
            _ => None,
        }
    }

    /// Cursor left the window, or the window lost the pointer.
    pub(crate) fn process_cursor_left(&mut self, timestamp: u64) -> Option<PointerEvent> {
        if !self.pressed {
            return None;
        }
        self.pressed = false;
        Some(self.sample(PointerPhase::Cancel, timestamp))
    }

    //--- Internal Helpers -------------------------------------------------

    fn sample(&self, phase: PointerPhase, timestamp: u64) -> PointerEvent {
        PointerEvent::new(phase, timestamp, self.position.0, self.position.1)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
