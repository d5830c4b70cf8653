use std::io;

/// Error raised by a catalog backend for an individual operation.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct CatalogIoError(#[from] io::Error);

/// A hierarchical string key/value store.
///
/// Keys are backslash-separated paths compared case-insensitively, matching
/// the semantics of the Windows registry: creating a key creates its
/// ancestors, and a key exists as soon as any descendant does. Handles
/// acquired during an operation are released when the operation returns.
pub trait CatalogStore {
    /// Returns true when `key` exists.
    fn exists(&self, key: &str) -> bool;

    /// Enumerates the names of the direct children of `key`.
    fn enumerate(&self, key: &str) -> Result<Vec<String>, CatalogIoError>;

    /// Reads the named string value stored on `key`.
    fn read_value(&self, key: &str, name: &str) -> Result<String, CatalogIoError>;

    /// Creates `key` if needed and stores a named string value on it.
    fn write_value(&self, key: &str, name: &str, value: &str) -> Result<(), CatalogIoError>;
}
