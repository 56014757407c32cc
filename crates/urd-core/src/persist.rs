//! Loading and saving the store as JSON.
//!
//! Saves are atomic: the document is written to `<path>.tmp` and renamed
//! over `<path>`, so a reader sees either the old file or the new one and a
//! crash mid-write leaves the previous file intact.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clock;
use crate::store::Store;

/// Errors from loading or saving a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing, or renaming a file failed.
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not a valid store document.
    #[error("malformed data in {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The recorded stream time is less than the de-duplicated wall clock.
    #[error(
        "inconsistent data in {}: total stream time ({stream_total}s) is less than wall-clock time ({wall_clock}s)",
        .path.display()
    )]
    Inconsistent {
        path: PathBuf,
        stream_total: i64,
        wall_clock: i64,
    },

    /// The store could not be serialized.
    #[error("failed to encode store")]
    Encode(#[source] serde_json::Error),
}

impl Store {
    /// Loads a store from `path`. See [`Store::load_at`].
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Self::load_at(path, clock::now())
    }

    /// Loads and validates a store from `path` as of `now`.
    ///
    /// A missing file yields an empty store. Banked stream time, deleted
    /// streams included, must cover the wall clock of closed sessions;
    /// otherwise the file is rejected. The open session is left out because
    /// its time is banked only when it closes. Minor damage, such as an
    /// active stream without a start time or a stray open session, is
    /// repaired in place.
    pub fn load_at(path: &Path, now: DateTime<Utc>) -> Result<Self, StoreError> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no store file, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut store: Self =
            serde_json::from_slice(&content).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let stream_total = store.banked_seconds();
        let wall_clock = store.closed_wall_clock();
        if wall_clock > 0 && stream_total < wall_clock {
            return Err(StoreError::Inconsistent {
                path: path.to_path_buf(),
                stream_total,
                wall_clock,
            });
        }

        store.repair_at(now);
        tracing::debug!(
            path = %path.display(),
            streams = store.streams.len(),
            sessions = store.sessions.len(),
            "loaded store"
        );
        Ok(store)
    }

    /// Writes the store to `path` atomically.
    ///
    /// The in-memory store is untouched on failure, so the caller may retry.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self).map_err(StoreError::Encode)?;
        let tmp_path = tmp_path(path);

        fs::write(&tmp_path, json).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

        if let Err(source) = fs::rename(&tmp_path, path) {
            if let Err(e) = fs::remove_file(&tmp_path) {
                tracing::warn!(
                    path = %tmp_path.display(),
                    error = %e,
                    "failed to clean up temp file"
                );
            }
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::debug!(path = %path.display(), "saved store");
        Ok(())
    }
}

/// `<path>.tmp`, keeping the original extension.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::session::Session;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn write_fixture(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("urd.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn load_missing_file_returns_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(store, Store::new());
    }

    #[test]
    fn save_then_load_reproduces_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urd.json");

        let mut store = Store::new();
        let a = store.add_stream_at("A", 0, at(0));
        let b = store.add_stream_at("B", 1, at(0));
        store.add_stream_at("C", 2, at(0));
        store.toggle_stream_at(&a, at(0));
        store.toggle_stream_at(&b, at(10));
        store.stop_all_at(at(40));
        store.toggle_stream_at(&a, at(100));

        store.save(&path).unwrap();
        let loaded = Store::load_at(&path, at(120)).unwrap();

        assert_eq!(loaded, store);
        assert_eq!(loaded.last_active(), [a.clone(), b]);
        assert_eq!(loaded.stream(&a).unwrap().started_at(), Some(at(100)));
    }

    #[test]
    fn save_omits_absent_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urd.json");

        let mut store = Store::new();
        store.add_stream_at("A", 0, at(0));
        store.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("started_at"));
        assert!(!content.contains("last_active"));
        assert!(!content.contains("deleted_seconds"));
        assert!(!content.contains("null"));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urd.json");

        Store::new().save(&path).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("urd.json.tmp").exists());
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("urd.json");

        let err = Store::new().save(&path).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn failed_rename_keeps_old_file_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("urd.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = Store::new().save(&path).unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert!(path.join("keep").exists());
        assert!(!dir.path().join("urd.json.tmp").exists());
    }

    #[test]
    fn load_rejects_malformed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "{ not json");

        let err = Store::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn load_rejects_non_utf8_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urd.json");
        fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();

        let err = Store::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }), "{err:?}");
    }

    #[test]
    fn load_rejects_empty_stream_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{"streams":[{"id":"","name":"A","seconds":0,"active":false,"created_at":"2024-01-15T10:00:00Z"}],"sessions":[]}"#,
        );

        let err = Store::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn load_rejects_stream_time_below_wall_clock() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{
                "streams": [{"id": "a1", "name": "A", "seconds": 60, "active": false, "created_at": "2024-01-15T10:00:00Z"}],
                "sessions": [{"start": "2024-01-15T10:00:00Z", "end": "2024-01-15T12:00:00Z"}]
            }"#,
        );

        let err = Store::load(&path).unwrap_err();
        match err {
            StoreError::Inconsistent {
                stream_total,
                wall_clock,
                ..
            } => {
                assert_eq!(stream_total, 60);
                assert_eq!(wall_clock, 7_200);
            }
            other => panic!("expected inconsistent data, got {other:?}"),
        }
    }

    #[test]
    fn inconsistent_error_reports_both_totals() {
        let err = StoreError::Inconsistent {
            path: PathBuf::from("urd.json"),
            stream_total: 60,
            wall_clock: 7_200,
        };
        assert_eq!(
            err.to_string(),
            "inconsistent data in urd.json: total stream time (60s) is less than wall-clock time (7200s)"
        );
    }

    #[test]
    fn running_stream_does_not_cover_missing_banked_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{
                "streams": [{"id": "a1", "name": "A", "seconds": 0, "active": true, "started_at": "2020-01-01T00:00:00Z", "created_at": "2020-01-01T00:00:00Z"}],
                "sessions": [{"start": "2024-01-15T10:00:00Z", "end": "2024-01-15T12:00:00Z"}]
            }"#,
        );

        let err = Store::load_at(&path, at(0)).unwrap_err();
        assert!(
            matches!(
                err,
                StoreError::Inconsistent {
                    stream_total: 0,
                    wall_clock: 7_200,
                    ..
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn load_closes_stray_open_session_when_nothing_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urd.json");

        let mut store = Store::new();
        let a = store.add_stream_at("A", 0, at(0));
        store.toggle_stream_at(&a, at(0));
        store.toggle_stream_at(&a, at(60));
        store.sessions.push(Session::open(at(100)));
        store.save(&path).unwrap();

        let loaded = Store::load_at(&path, at(3_600)).unwrap();

        assert!(loaded.sessions().iter().all(|s| !s.is_open()));
        assert_eq!(loaded.total_wall_clock_at(at(3_600)).num_seconds(), 60);
    }

    #[test]
    fn load_accepts_stream_time_above_wall_clock() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{
                "streams": [{"id": "a1", "name": "A", "seconds": 7200, "active": false, "created_at": "2024-01-15T10:00:00Z"}],
                "sessions": [{"start": "2024-01-15T10:00:00Z", "end": "2024-01-15T11:00:00Z"}]
            }"#,
        );

        let store = Store::load(&path).unwrap();
        assert_eq!(store.streams()[0].seconds(), 7_200);
    }

    #[test]
    fn load_accepts_store_saved_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urd.json");

        let mut store = Store::new();
        let a = store.add_stream_at("A", 0, at(0));
        store.toggle_stream_at(&a, at(0));
        store.save(&path).unwrap();

        let loaded = Store::load_at(&path, at(3_600)).unwrap();
        assert!(loaded.has_active());
        assert_eq!(loaded.total_wall_clock_at(at(3_600)).num_seconds(), 3_600);
    }

    #[test]
    fn load_counts_deleted_stream_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urd.json");

        let mut store = Store::new();
        let a = store.add_stream_at("A", 0, at(0));
        store.toggle_stream_at(&a, at(0));
        store.toggle_stream_at(&a, at(500));
        store.delete_stream_at(&a, at(600));
        store.save(&path).unwrap();

        let loaded = Store::load_at(&path, at(700)).unwrap();
        assert!(loaded.streams().is_empty());
        assert_eq!(loaded.deleted_seconds(), 500);
    }

    #[test]
    fn load_repairs_active_stream_without_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{
                "streams": [{"id": "a1", "name": "A", "seconds": 30, "active": true, "created_at": "2024-01-15T10:00:00Z"}],
                "sessions": []
            }"#,
        );

        let store = Store::load_at(&path, at(0)).unwrap();
        let stream = &store.streams()[0];
        assert!(stream.is_active());
        assert_eq!(stream.started_at(), Some(at(0)));
        assert_eq!(stream.seconds(), 30);
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/urd.json")),
            PathBuf::from("/data/urd.json.tmp")
        );
    }
}
