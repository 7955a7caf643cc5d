//=========================================================================
// Embedder Errors
//=========================================================================
//
// Recoverable failures of the embedding API.
//
// Every variant collapses onto one of the three ABI result codes via
// `EmbedderError::result()`. Surface lifecycle misuse is not represented
// here: it is a programming error and panics at the call site.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::ffi::EmbedderResult;

//=== EmbedderError =======================================================

/// Errors returned by engine lifecycle and event-injection operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedderError {
    /// The caller was built against a different ABI version.
    #[error("library version mismatch: expected {expected}, got {found}")]
    InvalidLibraryVersion {
        /// Version this library implements.
        expected: usize,
        /// Version supplied by the caller.
        found: usize,
    },

    /// A required argument was missing or failed validation.
    #[error("invalid arguments: {0}")]
    InvalidArguments(&'static str),

    /// The engine was already shut down.
    #[error("engine has been shut down")]
    EngineShutDown,

    /// The render thread could not be started.
    #[error("failed to spawn render thread: {0}")]
    RenderThreadSpawn(String),
}

impl EmbedderError {
    /// Maps the error onto the ABI result taxonomy.
    pub fn result(&self) -> EmbedderResult {
        match self {
            Self::InvalidLibraryVersion { .. } => EmbedderResult::InvalidLibraryVersion,
            Self::InvalidArguments(_) | Self::EngineShutDown | Self::RenderThreadSpawn(_) => {
                EmbedderResult::InvalidArguments
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
