// # File Cache Store
//
// Plain text implementation of `CacheStore`.
//
// ## File Format
//
// The file holds exactly the string form of the last-applied address, with
// no trailing newline:
//
// ```text
// 203.0.113.7
// ```
//
// ## Writes
//
// - Atomic: the value is written to `<path>.tmp`, then renamed over `<path>`
// - Parent directories are not created; a missing directory is a write error
// - No locking: a single running instance is assumed

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::CacheStore;

/// File-backed cache store
///
/// # Example
///
/// ```rust,no_run
/// use dynflare_core::state::FileCacheStore;
/// use dynflare_core::traits::CacheStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileCacheStore::new("/tmp/.dynamic-dns-cloudflare.cache");
///
///     store.store("203.0.113.7").await?;
///     assert_eq!(store.load().await?.as_deref(), Some("203.0.113.7"));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    /// Create a store for the cache file at `path`
    ///
    /// Nothing is touched on disk until the first load or store.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn load(&self) -> Result<Option<String>, Error> {
        match fs::read(&self.path).await {
            Ok(content) => Ok(Some(String::from_utf8_lossy(&content).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Cache file does not exist: {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(Error::cache(format!(
                "unexpected error reading cache {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn store(&self, value: &str) -> Result<(), Error> {
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::cache(format!(
                    "unexpected error writing cache {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(value.as_bytes()).await.map_err(|e| {
                Error::cache(format!(
                    "unexpected error writing cache {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::cache(format!(
                    "failed to flush cache {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::cache(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Cache written: {}", self.path.display());
        Ok(())
    }
}
