//=========================================================================
// Host Input Event Types
//
// Engine-side representation of the input a host pushes across the
// embedding boundary: window geometry and pointer samples.
//
// Responsibilities:
// - Represent window metrics and pointer samples in a portable form
// - Validate values before they are enqueued
// - Map the ABI phase discriminants onto `PointerPhase`
//
// Event Flow:
// ```text
// Host (C ABI / Rust API / winit host)
//         ↓
//    WindowMetrics, PointerEvent (this module)
//         ↓
//    EngineEvent (platform bridge channel)
//         ↓
//    PointerTracker → PointerSink
// ```
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::error::EmbedderError;

//=== WindowMetrics =======================================================

/// Drawable size and scale of the host window.
///
/// Width and height are physical pixels. A zero-sized drawable is valid
/// (minimized windows report it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMetrics {
    pub width: usize,
    pub height: usize,
    pub pixel_ratio: f64,
}

impl WindowMetrics {
    pub fn new(width: usize, height: usize, pixel_ratio: f64) -> Self {
        Self { width, height, pixel_ratio }
    }

    /// Checks that the pixel ratio is finite and strictly positive.
    pub fn validate(&self) -> Result<(), EmbedderError> {
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            return Err(EmbedderError::InvalidArguments(
                "pixel ratio must be finite and positive",
            ));
        }
        Ok(())
    }
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self::new(0, 0, 1.0)
    }
}

//=== PointerPhase ========================================================

/// Phase of a pointer sample.
///
/// Discriminants match the ABI encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PointerPhase {
    /// The gesture was aborted (focus loss, pointer left the surface).
    Cancel = 0,

    /// Contact ended.
    Up = 1,

    /// Contact started.
    Down = 2,

    /// Contact moved.
    Move = 3,
}

impl TryFrom<u32> for PointerPhase {
    type Error = EmbedderError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Cancel),
            1 => Ok(Self::Up),
            2 => Ok(Self::Down),
            3 => Ok(Self::Move),
            _ => Err(EmbedderError::InvalidArguments("unknown pointer phase")),
        }
    }
}

//=== PointerEvent ========================================================

/// One pointer sample.
///
/// `timestamp` is monotonic and expressed in microseconds. `device`
/// distinguishes concurrent pointers; the C ABI always reports device 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub device: u32,
    pub phase: PointerPhase,
    pub timestamp: u64,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    /// Creates a sample for the primary pointer (device 0).
    pub fn new(phase: PointerPhase, timestamp: u64, x: f64, y: f64) -> Self {
        Self { device: 0, phase, timestamp, x, y }
    }

    /// Returns the same sample attributed to another device.
    pub fn with_device(mut self, device: u32) -> Self {
        self.device = device;
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //=====================================================================
    // WindowMetrics Tests
    //=====================================================================

    #[test]
    fn zero_sized_drawable_is_valid() {
        assert!(WindowMetrics::new(0, 0, 1.0).validate().is_ok());
    }

    #[test]
    fn zero_pixel_ratio_is_rejected() {
        assert_eq!(
            WindowMetrics::new(800, 600, 0.0).validate(),
            Err(EmbedderError::InvalidArguments("pixel ratio must be finite and positive"))
        );
    }

    #[test]
    fn negative_and_nan_pixel_ratio_are_rejected() {
        assert!(WindowMetrics::new(800, 600, -2.0).validate().is_err());
        assert!(WindowMetrics::new(800, 600, f64::NAN).validate().is_err());
        assert!(WindowMetrics::new(800, 600, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn default_metrics_are_valid() {
        assert!(WindowMetrics::default().validate().is_ok());
    }

    //=====================================================================
    // PointerPhase Tests
    //=====================================================================

    #[test]
    fn phase_round_trips_abi_discriminants() {
        for phase in [PointerPhase::Cancel, PointerPhase::Up, PointerPhase::Down, PointerPhase::Move] {
            assert_eq!(PointerPhase::try_from(phase as u32), Ok(phase));
        }
    }

    #[test]
    fn unknown_phase_is_rejected() {
        assert!(PointerPhase::try_from(4).is_err());
        assert!(PointerPhase::try_from(u32::MAX).is_err());
    }

    //=====================================================================
    // PointerEvent Tests
    //=====================================================================

    #[test]
    fn new_event_targets_primary_device() {
        let event = PointerEvent::new(PointerPhase::Down, 10, 1.0, 2.0);
        assert_eq!(event.device, 0);
        assert_eq!(event.with_device(3).device, 3);
    }
}
