//! Catalog storage for registering Python tooling components.
//!
//! Visual Studio keeps its Python interpreter catalog in the per-user
//! registry hive. This crate exposes that store behind the [`CatalogStore`]
//! trait so resolution logic can run against an in-memory store in tests and
//! on non-Windows hosts.

mod memory;
#[cfg(windows)]
mod registry;
mod store;

pub use memory::MemoryCatalog;
#[cfg(windows)]
pub use registry::RegistryCatalog;
pub use store::{CatalogIoError, CatalogStore};

/// An entity that can reconcile itself with and persist itself into a
/// [`CatalogStore`].
pub trait Registerable {
    /// Error surfaced when a catalog precondition is not met.
    type Error;

    /// Match this entity against the catalog, adopting an existing identity
    /// if one is found.
    fn resolve(&mut self, catalog: &dyn CatalogStore) -> Result<(), Self::Error>;

    /// Persist this entity into the catalog. Returns `Ok(false)` when the
    /// write failed without violating a precondition.
    fn register(&self, catalog: &dyn CatalogStore) -> Result<bool, Self::Error>;
}
