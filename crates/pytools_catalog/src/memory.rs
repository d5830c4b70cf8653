use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;

use crate::store::{CatalogIoError, CatalogStore};

/// In-memory [`CatalogStore`] with registry semantics: key paths are
/// case-insensitive and every ancestor of a stored key exists.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entries: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `key` without storing any values on it, like `CreateKey` on a
    /// registry hive.
    pub fn create_key(&self, key: &str) {
        self.entries
            .lock()
            .unwrap()
            .entry(normalize(key))
            .or_default();
    }
}

fn normalize(key: &str) -> String {
    key.trim_matches('\\').to_ascii_lowercase()
}

fn not_found(key: &str) -> CatalogIoError {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("catalog key '{key}' not found"),
    )
    .into()
}

impl CatalogStore for MemoryCatalog {
    fn exists(&self, key: &str) -> bool {
        let key = normalize(key);
        let prefix = format!("{key}\\");
        let entries = self.entries.lock().unwrap();
        entries
            .keys()
            .any(|stored| *stored == key || stored.starts_with(&prefix))
    }

    fn enumerate(&self, key: &str) -> Result<Vec<String>, CatalogIoError> {
        let normalized = normalize(key);
        let prefix = format!("{normalized}\\");
        let entries = self.entries.lock().unwrap();
        if !entries
            .keys()
            .any(|stored| *stored == normalized || stored.starts_with(&prefix))
        {
            return Err(not_found(key));
        }

        // Keys are sorted, so duplicate child names are adjacent.
        let mut children: Vec<String> = entries
            .keys()
            .filter_map(|stored| stored.strip_prefix(&prefix))
            .map(|rest| rest.split('\\').next().unwrap_or(rest).to_string())
            .collect();
        children.dedup();
        Ok(children)
    }

    fn read_value(&self, key: &str, name: &str) -> Result<String, CatalogIoError> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(&normalize(key))
            .and_then(|values| values.get(name))
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    fn write_value(&self, key: &str, name: &str, value: &str) -> Result<(), CatalogIoError> {
        self.entries
            .lock()
            .unwrap()
            .entry(normalize(key))
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_values_can_be_read_back() {
        let catalog = MemoryCatalog::new();
        catalog
            .write_value(r"Software\Vendor\Tool", "Description", "A tool")
            .unwrap();

        assert_eq!(
            catalog
                .read_value(r"Software\Vendor\Tool", "Description")
                .unwrap(),
            "A tool"
        );
    }

    #[test]
    fn keys_are_case_insensitive() {
        let catalog = MemoryCatalog::new();
        catalog
            .write_value(r"Software\Vendor\Tool", "Description", "A tool")
            .unwrap();

        assert!(catalog.exists(r"SOFTWARE\vendor\TOOL"));
        assert_eq!(
            catalog
                .read_value(r"software\VENDOR\tool", "Description")
                .unwrap(),
            "A tool"
        );
    }

    #[test]
    fn ancestors_exist_once_a_descendant_does() {
        let catalog = MemoryCatalog::new();
        catalog
            .write_value(r"Software\Vendor\Tool\Entries\One", "Name", "first")
            .unwrap();

        assert!(catalog.exists(r"Software\Vendor"));
        assert!(catalog.exists(r"Software\Vendor\Tool\Entries"));
        assert!(!catalog.exists(r"Software\Other"));
    }

    #[test]
    fn enumerate_lists_direct_children_only() {
        let catalog = MemoryCatalog::new();
        catalog
            .write_value(r"Root\Entries\One", "Name", "first")
            .unwrap();
        catalog
            .write_value(r"Root\Entries\Two", "Name", "second")
            .unwrap();
        catalog
            .write_value(r"Root\Entries\Two\Nested", "Name", "nested")
            .unwrap();

        let children = catalog.enumerate(r"Root\Entries").unwrap();
        assert_eq!(children, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn enumerate_missing_key_is_an_error() {
        let catalog = MemoryCatalog::new();
        assert!(catalog.enumerate(r"Root\Missing").is_err());
    }

    #[test]
    fn created_key_exists_without_values() {
        let catalog = MemoryCatalog::new();
        catalog.create_key(r"Root\Empty");

        assert!(catalog.exists(r"Root\Empty"));
        assert!(catalog.enumerate(r"Root\Empty").unwrap().is_empty());
        assert!(catalog.read_value(r"Root\Empty", "Name").is_err());
    }
}
