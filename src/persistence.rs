//! JSON persistence of response objects to the cache directory.
//!
//! An adjacent convenience, not part of the dispatch pipeline: callers that
//! want to keep the last good payload around between launches can write it
//! here and read it back on startup.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ErrorKind, NetworkError, Result};

/// Stores serializable values as JSON files in a cache directory.
///
/// Writes are atomic (temp file then rename), so a crash mid-save never
/// leaves a truncated file behind. Loads are forgiving: any read or parse
/// failure yields `None`.
///
/// # Example
///
/// ```ignore
/// let store = CacheStore::new("my-app")?;
/// store.save(&banner_page, "banner.json")?;
///
/// let cached: Option<BannerPage> = store.load("banner.json");
/// ```
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Create a store under the platform cache directory for `app_name`.
    pub fn new(app_name: &str) -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", app_name).ok_or_else(|| {
            NetworkError::new(ErrorKind::Io("no cache directory available".to_string()))
        })?;
        Self::with_dir(dirs.cache_dir().join("persistence"))
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory files are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `value` as UTF-8 JSON and write it atomically under
    /// `file_name`.
    pub fn save<T: Serialize>(&self, value: &T, file_name: &str) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| ErrorKind::Encode(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.persist(self.dir.join(file_name))
            .map_err(|e| NetworkError::new(ErrorKind::Io(e.to_string())))?;
        Ok(())
    }

    /// Load and deserialize the file saved under `file_name`.
    ///
    /// Returns `None` if the file is missing, unreadable, or not valid JSON
    /// for `T`.
    pub fn load<T: DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        let bytes = fs::read(self.dir.join(file_name)).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    target: "relaykit::persistence",
                    "discarding cached '{file_name}': {e}"
                );
                None
            }
        }
    }

    /// Delete the file saved under `file_name`, if present.
    pub fn remove(&self, file_name: &str) -> bool {
        fs::remove_file(self.dir.join(file_name)).is_ok()
    }
}
