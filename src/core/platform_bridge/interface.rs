//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Host-to-engine message types.
//
// Defines the contract for communication between the host thread and
// the render thread.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::{PointerEvent, WindowMetrics};
use crate::core::message_bus::PlatformMessage;

//=== EngineEvent =========================================================

/// Events sent from the host thread to the render thread.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineEvent {
    /// New drawable size/scale.
    WindowMetrics(WindowMetrics),

    /// One ordered pointer batch.
    Pointers(Vec<PointerEvent>),

    /// Opaque payload for a named channel.
    PlatformMessage(PlatformMessage),

    /// Stop the render loop.
    Shutdown,
}
