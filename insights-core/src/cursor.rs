//! Durable per-feeder cursors.
//!
//! A cursor is the ordering key of the last item a feeder has fully handed
//! to its pipeline. It lives in a flat text file that is read once when the
//! feeder starts and overwritten after every forwarded batch. A missing file
//! means first run: the feeder's default seed is written and used.

use crate::utils::Version;
use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::Date;
use time::macros::format_description;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cursor file {path} holds an invalid value {value:?}: {reason}")]
    Parse {
        path: PathBuf,
        value: String,
        reason: String,
    },
}

/// A value that can be used as a feeder cursor.
///
/// Cursors are totally ordered and round-trip through their textual form.
pub trait CursorValue: Clone + Ord + Debug + Display + Send + Sync + 'static {
    fn parse_cursor(text: &str) -> Result<Self, String>;
}

impl CursorValue for u64 {
    fn parse_cursor(text: &str) -> Result<Self, String> {
        text.parse().map_err(|e: std::num::ParseIntError| e.to_string())
    }
}

/// Dates are stored as `yyyy-MM-dd`.
impl CursorValue for Date {
    fn parse_cursor(text: &str) -> Result<Self, String> {
        Date::parse(text, format_description!("[year]-[month]-[day]")).map_err(|e| e.to_string())
    }
}

impl CursorValue for Version {
    fn parse_cursor(text: &str) -> Result<Self, String> {
        text.parse()
    }
}

/// File-backed storage for one feeder's cursor.
///
/// Each store is owned by exactly one feeder, so no locking is involved.
#[derive(Debug)]
pub struct CursorStore<C> {
    path: PathBuf,
    _marker: PhantomData<fn() -> C>,
}

impl<C: CursorValue> CursorStore<C> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted cursor, seeding the file with `default` when it
    /// does not exist yet.
    pub async fn load_or_seed(&self, default: C) -> Result<C, CursorError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                let value = text.trim();
                C::parse_cursor(value).map_err(|reason| CursorError::Parse {
                    path: self.path.clone(),
                    value: value.to_string(),
                    reason,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.store(&default).await?;
                Ok(default)
            }
            Err(source) => Err(CursorError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Overwrite the cursor file as a whole.
    ///
    /// The value is written to a sibling temp file, flushed to disk and
    /// renamed over the target, so a crash or power loss mid-write leaves
    /// either the old or the new value.
    pub async fn store(&self, value: &C) -> Result<(), CursorError> {
        let io_err = |source: std::io::Error| CursorError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let mut file = tokio::fs::File::create(&temp_path).await.map_err(io_err)?;
        file.write_all(value.to_string().as_bytes())
            .await
            .map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[tokio::test]
    async fn test_missing_file_is_seeded_with_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::<u64>::new(dir.path().join("last_swap_id"));

        let value = store.load_or_seed(32).await.unwrap();
        assert_eq!(value, 32);

        let on_disk = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "32");
        assert!(!dir.path().join("last_swap_id.tmp").exists());
    }

    #[tokio::test]
    async fn test_store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::<u64>::new(dir.path().join("last_swap_id"));

        store.store(&35).await.unwrap();
        assert_eq!(store.load_or_seed(0).await.unwrap(), 35);
        assert!(!dir.path().join("last_swap_id.tmp").exists());
    }

    #[tokio::test]
    async fn test_whitespace_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_cfe_version");
        std::fs::write(&path, "2024-02-03\n").unwrap();

        let store = CursorStore::<Date>::new(path);
        let loaded = store.load_or_seed(date!(2000 - 01 - 01)).await.unwrap();
        assert_eq!(loaded, date!(2024 - 02 - 03));

        store.store(&date!(2024 - 02 - 04)).await.unwrap();
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "2024-02-04");
    }

    #[tokio::test]
    async fn test_store_replaces_stale_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_epoch_id");
        // Left behind by a write that never reached the rename.
        std::fs::write(dir.path().join("last_epoch_id.tmp"), "").unwrap();
        std::fs::write(&path, "7").unwrap();

        let store = CursorStore::<u64>::new(&path);
        store.store(&8).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "8");
        assert!(!dir.path().join("last_epoch_id.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_cursor_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_epoch_id");
        std::fs::write(&path, "not a number").unwrap();

        let store = CursorStore::<u64>::new(path);
        let err = store.load_or_seed(0).await.unwrap_err();
        assert!(matches!(err, CursorError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_store_creates_state_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::<Version>::new(dir.path().join("state").join("last_swap_limits"));
        store.store(&Version::new(1, 3, 0)).await.unwrap();
        assert_eq!(
            store.load_or_seed(Version::default()).await.unwrap(),
            Version::new(1, 3, 0)
        );
    }
}
