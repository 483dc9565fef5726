//! Builder for creating and configuring Planner instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use super::{LocalSyncTarget, Planner, SyncPolicy, SyncTarget};
use crate::{
    error::{CairnError, Result, StoreResultExt},
    events::Notifier,
    store::{SqliteStore, Stores},
};

/// Builder for creating and configuring Planner instances.
#[derive(Clone)]
pub struct PlannerBuilder {
    database_path: Option<PathBuf>,
    stores: Option<Stores>,
    notifier: Option<Notifier>,
    online: bool,
    sync_target: Option<Arc<dyn SyncTarget>>,
    sync_policy: SyncPolicy,
}

impl PlannerBuilder {
    /// Creates a new builder with default settings: SQLite storage at the
    /// XDG default path, online, local sync target.
    pub fn new() -> Self {
        Self {
            database_path: None,
            stores: None,
            notifier: None,
            online: true,
            sync_target: None,
            sync_policy: SyncPolicy::default(),
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/cairn/cairn.db` or `~/.local/share/cairn/cairn.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Uses the given repositories instead of opening a database.
    pub fn with_stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Shares an existing notifier, e.g. one a cache is already attached to.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Starts the planner offline; mutations are queued until
    /// [`Planner::set_online`] flips it back.
    pub fn offline(mut self, offline: bool) -> Self {
        self.online = !offline;
        self
    }

    pub fn with_sync_target(mut self, target: Arc<dyn SyncTarget>) -> Self {
        self.sync_target = Some(target);
        self
    }

    pub fn with_sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.sync_policy = policy;
        self
    }

    /// Builds the configured planner instance.
    ///
    /// # Errors
    ///
    /// Returns `CairnError::Configuration` for an unusable sync policy,
    /// `CairnError::FileSystem` if the database directory cannot be
    /// created, and `CairnError::Storage` if store initialization fails
    pub async fn build(self) -> Result<Planner> {
        self.sync_policy.validate()?;

        let stores = match self.stores {
            Some(stores) => stores,
            None => {
                let db_path = match self.database_path {
                    Some(path) => path,
                    None => Self::default_database_path()?,
                };

                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| CairnError::FileSystem {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }

                debug!("Using database at {}", db_path.display());
                Stores::shared(SqliteStore::new(db_path))
            }
        };

        stores
            .documents
            .initialize()
            .await
            .store_context("Failed to initialize store")?;

        Ok(Planner::new(
            stores,
            self.notifier.unwrap_or_default(),
            self.online,
            self.sync_target
                .unwrap_or_else(|| Arc::new(LocalSyncTarget)),
            self.sync_policy,
        ))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("cairn")
            .place_data_file("cairn.db")
            .map_err(|e| CairnError::XdgDirectory(e.to_string()))
    }
}

impl Default for PlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
