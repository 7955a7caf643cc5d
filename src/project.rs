//=========================================================================
// Project Arguments
//=========================================================================
//
// Immutable description of what the engine runs. The engine keeps its
// own copy; callers may free their strings once start returns.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};

//=== Internal Dependencies ===============================================

use crate::error::EmbedderError;

//=== ProjectArgs =========================================================

/// Asset bundle, entry point and package manifest locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectArgs {
    assets_path: PathBuf,
    main_path: PathBuf,
    packages_path: PathBuf,
}

impl ProjectArgs {
    pub fn new(
        assets_path: impl Into<PathBuf>,
        main_path: impl Into<PathBuf>,
        packages_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            assets_path: assets_path.into(),
            main_path: main_path.into(),
            packages_path: packages_path.into(),
        }
    }

    /// Path to the project asset bundle.
    pub fn assets_path(&self) -> &Path {
        &self.assets_path
    }

    /// Path to the script containing the entry point.
    pub fn main_path(&self) -> &Path {
        &self.main_path
    }

    /// Path to the package manifest.
    pub fn packages_path(&self) -> &Path {
        &self.packages_path
    }

    /// Rejects descriptors the engine cannot run.
    ///
    /// The package manifest may be empty (projects without dependencies).
    pub(crate) fn validate(&self) -> Result<(), EmbedderError> {
        if self.assets_path.as_os_str().is_empty() {
            return Err(EmbedderError::InvalidArguments("assets path is empty"));
        }
        if self.main_path.as_os_str().is_empty() {
            return Err(EmbedderError::InvalidArguments("main path is empty"));
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
