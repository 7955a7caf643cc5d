//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_embedder::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine lifecycle
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::EmbedderError;
pub use crate::project::ProjectArgs;
pub use crate::ENGINE_VERSION;

// Rendering and surfaces
pub use crate::core::frame::{FrameInfo, FrameObserver};
pub use crate::renderer::{OpenGlRenderer, RendererConfig};
pub use crate::surface::SurfaceId;

// Input
pub use crate::core::input::{PointerEvent, PointerPhase, PointerSink, WindowMetrics};

// Platform messages
pub use crate::core::message_bus::{MessageHandler, PlatformMessage};

// Host
pub use crate::platform::{PlatformError, WinitHost};
