//! Locked access to the store file.
//!
//! Every command loads the store, possibly mutates it, and saves it. An
//! advisory lock on `<store>.lock` keeps two `urd` processes from
//! interleaving those steps and losing an update.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use urd_core::Store;

use crate::Config;

/// A loaded store plus the lock that guards it.
///
/// The lock is released when the handle is dropped.
#[derive(Debug)]
pub struct StoreHandle {
    path: PathBuf,
    store: Store,
    _lock: File,
}

impl StoreHandle {
    /// Opens the store for reading, sharing the lock with other readers.
    pub fn open_shared(config: &Config) -> Result<Self> {
        Self::open(config, false)
    }

    /// Opens the store for modification with an exclusive lock.
    pub fn open_exclusive(config: &Config) -> Result<Self> {
        Self::open(config, true)
    }

    fn open(config: &Config, exclusive: bool) -> Result<Self> {
        let path = config.store_path.as_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("failed to create store directory")?;
        }

        let lock_path = config.lock_path();
        let lock = File::create(&lock_path)
            .with_context(|| format!("failed to create lock file {}", lock_path.display()))?;
        let locked = if exclusive {
            lock.lock_exclusive()
        } else {
            lock.lock_shared()
        };
        locked.context("failed to acquire store lock")?;
        tracing::debug!(path = %lock_path.display(), exclusive, "acquired store lock");

        let store = Store::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            store,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn store(&self) -> &Store {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Saves the store back to disk.
    pub fn commit(&self) -> Result<()> {
        self.store
            .save(&self.path)
            .with_context(|| format!("failed to save {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        Config {
            store_path: dir.join("nested").join("urd.json"),
        }
    }

    #[test]
    fn open_creates_parent_directory_and_lock_file() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());

        let handle = StoreHandle::open_shared(&config).unwrap();

        assert!(handle.store().streams().is_empty());
        assert!(temp.path().join("nested").is_dir());
        assert!(temp.path().join("nested/urd.json.lock").exists());
    }

    #[test]
    fn commit_persists_changes() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());

        let mut handle = StoreHandle::open_exclusive(&config).unwrap();
        handle.store_mut().add_stream("Reading", 0);
        handle.commit().unwrap();
        drop(handle);

        let reopened = StoreHandle::open_shared(&config).unwrap();
        assert_eq!(reopened.store().streams()[0].name(), "Reading");
    }

    #[test]
    fn open_reports_inconsistent_store() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            store_path: temp.path().join("urd.json"),
        };
        fs::write(
            &config.store_path,
            r#"{"streams":[],"sessions":[{"start":"2024-01-15T10:00:00Z","end":"2024-01-15T11:00:00Z"}]}"#,
        )
        .unwrap();

        let err = StoreHandle::open_shared(&config).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to load"));
        assert!(message.contains("inconsistent data"));
    }
}
