pub mod error;
pub mod models;
pub mod queries;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::info;

pub use error::DbError;
pub use models::{Chirp, RefreshToken, Snapshot, User};

/// File-backed snapshot store. Every operation is a full
/// load-modify-save cycle under one lock, so two concurrent writers can
/// neither hand out the same ID nor clobber each other's save.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Database {
    /// Open the store at `path`, creating the parent directory if needed.
    ///
    /// Performs one load up front so an unreadable or corrupt snapshot is
    /// fatal at startup rather than on the first request. A missing file is
    /// not an error: the store starts empty and the file appears on the
    /// first save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let db = Self {
            path,
            lock: Mutex::new(()),
        };
        db.load_snapshot()?;

        info!("snapshot store opened at {}", db.path.display());
        Ok(db)
    }

    /// Run a read-only operation against a freshly loaded snapshot.
    pub fn with_snapshot<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Snapshot) -> Result<T, DbError>,
    {
        let _guard = self.lock.lock().map_err(|_| DbError::LockPoisoned)?;
        let snapshot = self.load_snapshot()?;
        f(&snapshot)
    }

    /// Run a mutating operation: load, apply `f`, save atomically. The lock
    /// is held for the whole cycle. If `f` fails nothing is written and the
    /// previous snapshot stays on disk untouched.
    pub fn with_snapshot_mut<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Snapshot) -> Result<T, DbError>,
    {
        let _guard = self.lock.lock().map_err(|_| DbError::LockPoisoned)?;
        let mut snapshot = self.load_snapshot()?;
        let value = f(&mut snapshot)?;
        self.save_snapshot(&snapshot)?;
        Ok(value)
    }

    /// Discard all persisted state. Debug/bootstrap use only.
    pub fn reset(&self) -> Result<(), DbError> {
        let _guard = self.lock.lock().map_err(|_| DbError::LockPoisoned)?;
        self.save_snapshot(&Snapshot::default())
    }

    fn load_snapshot(&self) -> Result<Snapshot, DbError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Snapshot::default());
            }
            Err(err) => return Err(DbError::Io(err)),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Write the whole snapshot to a sibling temp file, then rename it over
    /// the live path. A concurrent reader sees either the old file or the
    /// new one, never a partial write.
    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), DbError> {
        let payload = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_in(dir: &tempfile::TempDir) -> Database {
        Database::open(dir.path().join("store.json")).unwrap()
    }

    #[test]
    fn missing_file_loads_as_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_in(&dir);
        let count = db.with_snapshot(|s| Ok(s.chirps.len())).unwrap();
        assert_eq!(count, 0);
        // Nothing was written yet either.
        assert!(!dir.path().join("store.json").exists());
    }

    #[test]
    fn save_then_load_round_trips_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_in(&dir);

        let expires = chrono::Utc::now() + chrono::Duration::days(60);
        db.with_snapshot_mut(|s| {
            s.users.insert(
                1,
                User {
                    id: 1,
                    email: "ann@example.com".into(),
                    hashed_password: "$argon2id$stub".into(),
                },
            );
            s.chirps.insert(
                1,
                Chirp {
                    id: 1,
                    body: "hello world".into(),
                    author_id: 1,
                },
            );
            s.refresh_tokens.insert(
                "deadbeef".into(),
                RefreshToken {
                    user_id: 1,
                    expires_at: expires,
                },
            );
            Ok(())
        })
        .unwrap();

        // Re-open so the read comes off disk, not from anything in memory.
        let reopened = open_in(&dir);
        reopened
            .with_snapshot(|s| {
                assert_eq!(s.users[&1].email, "ann@example.com");
                assert_eq!(s.users[&1].hashed_password, "$argon2id$stub");
                assert_eq!(s.chirps[&1].body, "hello world");
                assert_eq!(s.chirps[&1].author_id, 1);
                assert_eq!(s.refresh_tokens["deadbeef"].user_id, 1);
                assert_eq!(s.refresh_tokens["deadbeef"].expires_at, expires);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_in(&dir);
        db.with_snapshot_mut(|_| Ok(())).unwrap();
        assert!(dir.path().join("store.json").exists());
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_fatal_on_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("store.json"), b"{ this is not json").unwrap();
        let err = Database::open(dir.path().join("store.json")).unwrap_err();
        assert!(matches!(err, DbError::Corrupt(_)));
    }

    #[test]
    fn failed_mutation_leaves_disk_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_in(&dir);
        db.with_snapshot_mut(|s| {
            s.chirps.insert(
                1,
                Chirp {
                    id: 1,
                    body: "kept".into(),
                    author_id: 1,
                },
            );
            Ok(())
        })
        .unwrap();

        let err = db
            .with_snapshot_mut(|s| -> Result<(), DbError> {
                s.chirps.clear();
                Err(DbError::NotFound("chirp"))
            })
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound("chirp")));

        let body = db
            .with_snapshot(|s| Ok(s.chirps[&1].body.clone()))
            .unwrap();
        assert_eq!(body, "kept");
    }

    #[test]
    fn snapshot_with_missing_mappings_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        // A file written before refresh tokens existed.
        std::fs::write(
            dir.path().join("store.json"),
            br#"{"chirps": {}, "users": {}}"#,
        )
        .unwrap();
        let db = open_in(&dir);
        let count = db.with_snapshot(|s| Ok(s.refresh_tokens.len())).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn reset_discards_all_state() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_in(&dir);
        db.with_snapshot_mut(|s| {
            s.chirps.insert(
                1,
                Chirp {
                    id: 1,
                    body: "gone soon".into(),
                    author_id: 1,
                },
            );
            Ok(())
        })
        .unwrap();

        db.reset().unwrap();

        let snapshot = db.with_snapshot(|s| {
            Ok((s.chirps.len(), s.users.len(), s.refresh_tokens.len()))
        });
        assert_eq!(snapshot.unwrap(), (0, 0, 0));
    }
}
