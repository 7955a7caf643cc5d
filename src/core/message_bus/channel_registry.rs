//=========================================================================
// Channel Registry
//=========================================================================
//
// Maps channel names to the engine subsystem listening on them.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::PlatformMessage;

//=== MessageHandler ======================================================

/// Engine-side receiver for one platform channel.
///
/// Implemented for any `FnMut(&[u8]) + Send` closure.
pub trait MessageHandler: Send {
    fn on_message(&mut self, payload: &[u8]);
}

impl<F> MessageHandler for F
where
    F: FnMut(&[u8]) + Send,
{
    fn on_message(&mut self, payload: &[u8]) {
        self(payload)
    }
}

//=== ChannelRegistry =====================================================

/// Channel name → handler table, owned by the render loop.
#[derive(Default)]
pub struct ChannelRegistry {
    handlers: HashMap<String, Box<dyn MessageHandler>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `channel`, replacing any previous one.
    pub fn register(&mut self, channel: impl Into<String>, handler: Box<dyn MessageHandler>) {
        let channel = channel.into();
        if self.handlers.insert(channel.clone(), handler).is_some() {
            debug!(target: "embedder::messages", "Replaced handler for channel '{}'", channel);
        }
    }

    /// Returns `true` if a handler listens on `channel`.
    pub fn is_registered(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    /// Delivers the message; returns `false` if it was dropped.
    pub fn dispatch(&mut self, message: &PlatformMessage) -> bool {
        match self.handlers.get_mut(&message.channel) {
            Some(handler) => {
                handler.on_message(&message.payload);
                true
            }
            None => {
                trace!(
                    target: "embedder::messages",
                    "No handler for channel '{}', dropping {} bytes",
                    message.channel,
                    message.payload.len()
                );
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

//=========================================================================
// Tests
//=========================================================================
