//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the host thread (C ABI, Rust API, winit host) with the render
// thread.
//
// Components:
// - `interface`: Event types crossing the thread boundary (the contract)
// - `event_collector`: Render-side event collection and buffering
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::{EventCollector, TickControl};
pub(crate) use interface::EngineEvent;
