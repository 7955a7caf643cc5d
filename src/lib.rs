//=========================================================================
// Aetheric Embedder: Library Root
//
// Embeds the engine into a host process that owns the native window, the
// GL context and the platform event source.
//
// Responsibilities:
// - Expose the Rust embedding API (`EngineBuilder` / `Engine`)
// - Export the C ABI (`ffi`) for hosts written in other languages
// - Keep the reference winit host (`platform`) internal, surfaced only
//   through `WinitHost`
//
// Typical usage:
// ```no_run
// use aetheric_embedder::{EngineBuilder, ProjectArgs, RendererConfig, OpenGlRenderer, ENGINE_VERSION};
//
// struct Gl;
// impl OpenGlRenderer for Gl {
//     fn make_current(&mut self) -> bool { true }
//     fn clear_current(&mut self) -> bool { true }
//     fn present(&mut self) -> bool { true }
//     fn fbo(&mut self) -> u32 { 0 }
// }
//
// let engine = EngineBuilder::new(
//     RendererConfig::open_gl(Gl),
//     ProjectArgs::new("app.flx", "lib/main.dart", ".packages"),
// )
// .start(ENGINE_VERSION)
// .unwrap();
// engine.shutdown().unwrap();
// ```
//
//=========================================================================

/// ABI version a host must pass when starting an engine.
pub const ENGINE_VERSION: usize = 1;

//--- Public Modules ------------------------------------------------------
//
// `core` holds the render-thread machinery (input, channels, frames).
// Its plugin traits are public so embedders can observe the engine.
//
pub mod core;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod prelude;
pub mod project;
pub mod registry;
pub mod renderer;
pub mod surface;

//--- Internal Modules ----------------------------------------------------
//
// `platform` is the winit host. Only `WinitHost` and its error leave it.
//
mod platform;

//--- Public Exports ------------------------------------------------------

pub use core::frame::{FrameInfo, FrameObserver};
pub use core::input::{PointerEvent, PointerPhase, PointerSink, WindowMetrics};
pub use core::message_bus::{MessageHandler, PlatformMessage};
pub use engine::{Engine, EngineBuilder};
pub use error::EmbedderError;
pub use ffi::EmbedderResult;
pub use platform::{PlatformError, WinitHost};
pub use project::ProjectArgs;
pub use registry::EngineHandle;
pub use renderer::{OpenGlRenderer, RendererConfig};
pub use surface::{SurfaceController, SurfaceId};
