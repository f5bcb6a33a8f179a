// # Cache Store
//
// Change detection against the persisted last-applied address, plus the
// file-backed `CacheStore` implementation.

pub mod file;

pub use file::FileCacheStore;

use crate::error::Result;
use crate::traits::CacheStore;
use std::net::Ipv4Addr;

/// Result of comparing a candidate address with the cache
#[derive(Debug)]
pub enum CacheCheck {
    /// The cache already holds the candidate; nothing was written
    Unchanged,

    /// The candidate differs and now replaces the cached value
    Changed {
        /// Previously cached value, if any
        previous: Option<String>,
    },

    /// The candidate differs but the cache write failed
    ///
    /// The address still counts as changed: the provider record is the
    /// source of truth, so the caller proceeds with the update and surfaces
    /// `error` afterwards.
    ChangedUnsaved {
        /// Previously cached value, if any
        previous: Option<String>,
        /// The write failure
        error: crate::Error,
    },
}

impl CacheCheck {
    /// Whether the candidate differs from the cached value
    pub fn is_changed(&self) -> bool {
        !matches!(self, CacheCheck::Unchanged)
    }
}

/// Compare `candidate` with the cached value and store it on change
///
/// A read failure other than absence aborts without writing. An equal value
/// is a no-op. A differing value is written, replacing the previous one.
pub async fn check_and_store(store: &dyn CacheStore, candidate: Ipv4Addr) -> Result<CacheCheck> {
    let previous = store.load().await?;
    let candidate = candidate.to_string();

    if previous.as_deref() == Some(candidate.as_str()) {
        tracing::debug!("Cached address {} is current", candidate);
        return Ok(CacheCheck::Unchanged);
    }

    match store.store(&candidate).await {
        Ok(()) => Ok(CacheCheck::Changed { previous }),
        Err(error) => Ok(CacheCheck::ChangedUnsaved { previous, error }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_first_run_writes_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip.cache");
        let store = FileCacheStore::new(&path);

        let check = check_and_store(&store, Ipv4Addr::new(203, 0, 113, 7))
            .await
            .unwrap();

        assert!(matches!(check, CacheCheck::Changed { previous: None }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "203.0.113.7");
    }

    #[tokio::test]
    async fn test_same_address_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip.cache");
        std::fs::write(&path, "203.0.113.7").unwrap();
        let store = FileCacheStore::new(&path);

        let check = check_and_store(&store, Ipv4Addr::new(203, 0, 113, 7))
            .await
            .unwrap();

        assert!(!check.is_changed());
    }

    #[tokio::test]
    async fn test_changed_address_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip.cache");
        std::fs::write(&path, "198.51.100.1").unwrap();
        let store = FileCacheStore::new(&path);

        let check = check_and_store(&store, Ipv4Addr::new(203, 0, 113, 7))
            .await
            .unwrap();

        match check {
            CacheCheck::Changed { previous } => {
                assert_eq!(previous.as_deref(), Some("198.51.100.1"))
            }
            other => panic!("expected Changed, got {:?}", other),
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "203.0.113.7");
    }

    #[tokio::test]
    async fn test_trailing_newline_counts_as_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip.cache");
        std::fs::write(&path, "203.0.113.7\n").unwrap();
        let store = FileCacheStore::new(&path);

        let check = check_and_store(&store, Ipv4Addr::new(203, 0, 113, 7))
            .await
            .unwrap();

        assert!(check.is_changed());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "203.0.113.7");
    }

    #[tokio::test]
    async fn test_write_failure_still_reports_change() {
        let dir = tempdir().unwrap();
        // Parent directory does not exist, so the write fails
        let path = dir.path().join("missing").join("ip.cache");
        let store = FileCacheStore::new(&path);

        let check = check_and_store(&store, Ipv4Addr::new(203, 0, 113, 7))
            .await
            .unwrap();

        match check {
            CacheCheck::ChangedUnsaved { previous, error } => {
                assert_eq!(previous, None);
                assert!(matches!(error, crate::Error::Cache(_)));
            }
            other => panic!("expected ChangedUnsaved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_failure_aborts() {
        let dir = tempdir().unwrap();
        // A directory cannot be read as a file
        let store = FileCacheStore::new(dir.path());

        let err = check_and_store(&store, Ipv4Addr::new(203, 0, 113, 7))
            .await
            .unwrap_err();

        assert!(matches!(err, crate::Error::Cache(_)));
    }
}
