// # Cache Store Trait
//
// Defines the interface for the persisted last-applied address.
//
// The cache holds a single textual value. Absence is a valid initial state;
// the value is created on the first detected change and overwritten on
// every later change. It is never deleted.
//
// ## Implementations
//
// - Plain text file: [`crate::state::FileCacheStore`]

use async_trait::async_trait;

/// Trait for cache store implementations
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the stored value
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: The stored value, verbatim
    /// - `Ok(None)`: Nothing stored yet
    /// - `Err(Error::Cache)`: Any other read failure
    async fn load(&self) -> Result<Option<String>, crate::Error>;

    /// Replace the stored value
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The value is durable
    /// - `Err(Error::Cache)`: The write failed
    async fn store(&self, value: &str) -> Result<(), crate::Error>;
}
