//! Service container for dependency injection
//!
//! Wires up the shared store and services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::{HierarchyStore, TeamService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraResult, SharedHierarchy};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// The team structure, shared between callers
    pub hierarchy: SharedHierarchy,

    /// Import/export and validated creation
    pub team: TeamService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let team = TeamService::with_limit(Arc::clone(&fs), settings.max_import_bytes);
        Self {
            settings: Arc::new(settings),
            fs,
            hierarchy: SharedHierarchy::new(HierarchyStore::new()),
            team,
        }
    }

    /// Import the team file if it exists; returns whether anything was loaded.
    pub fn load_team(&self, path: &Path) -> InfraResult<bool> {
        if !self.fs.exists(path) {
            debug!("load_team: {} does not exist, starting empty", path.display());
            return Ok(false);
        }
        self.hierarchy
            .write(|store| self.team.restore_file(store, path))?;
        Ok(true)
    }

    /// Export the current team to `path`.
    pub fn save_team(&self, path: &Path) -> InfraResult<()> {
        let pretty = self.settings.pretty;
        self.hierarchy
            .read(|store| self.team.export_file(store, path, pretty))
    }
}
