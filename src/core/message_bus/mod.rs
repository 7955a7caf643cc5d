//=========================================================================
// Platform Message Bus
//=========================================================================
//
// Routes opaque byte payloads from the host to named engine channels.
//
// Architecture:
//   Host → send_platform_message() → EngineEvent::PlatformMessage
//                                          ↓ (render thread)
//   ChannelRegistry::dispatch() → HashMap<channel, Box<dyn MessageHandler>>
//
// Delivery is broadcast-inbox style: a message for a channel nobody
// registered is dropped without error.
//
//=========================================================================

//=== Module Declarations =================================================

mod channel_registry;

//=== Public API ==========================================================

pub use channel_registry::{ChannelRegistry, MessageHandler};

//=== PlatformMessage =====================================================

/// Opaque payload addressed to a named channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMessage {
    pub channel: String,
    pub payload: Vec<u8>,
}

impl PlatformMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}
