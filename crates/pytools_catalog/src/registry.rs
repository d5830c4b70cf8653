use winreg::enums::HKEY_CURRENT_USER;
use winreg::RegKey;

use crate::store::{CatalogIoError, CatalogStore};

/// [`CatalogStore`] backed by a Windows registry hive.
///
/// Keys are opened relative to the hive root and closed when the operation
/// returns.
pub struct RegistryCatalog {
    root: RegKey,
}

impl RegistryCatalog {
    /// Catalog rooted at `HKEY_CURRENT_USER`, where Visual Studio keeps its
    /// per-user interpreter entries.
    pub fn current_user() -> Self {
        Self {
            root: RegKey::predef(HKEY_CURRENT_USER),
        }
    }
}

impl Default for RegistryCatalog {
    fn default() -> Self {
        Self::current_user()
    }
}

impl CatalogStore for RegistryCatalog {
    fn exists(&self, key: &str) -> bool {
        self.root.open_subkey(key).is_ok()
    }

    fn enumerate(&self, key: &str) -> Result<Vec<String>, CatalogIoError> {
        let subkey = self.root.open_subkey(key)?;
        let mut children = Vec::new();
        for name in subkey.enum_keys() {
            children.push(name?);
        }
        Ok(children)
    }

    fn read_value(&self, key: &str, name: &str) -> Result<String, CatalogIoError> {
        let subkey = self.root.open_subkey(key)?;
        Ok(subkey.get_value::<String, _>(name)?)
    }

    fn write_value(&self, key: &str, name: &str, value: &str) -> Result<(), CatalogIoError> {
        let (subkey, _) = self.root.create_subkey(key)?;
        subkey.set_value(name, &value)?;
        tracing::debug!("wrote '{name}' under '{key}'");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = r"Software\pytools-catalog-test";

    fn cleanup() {
        let _ = RegKey::predef(HKEY_CURRENT_USER).delete_subkey_all(TEST_KEY);
    }

    #[test]
    fn write_read_enumerate_round_trip() {
        cleanup();

        let catalog = RegistryCatalog::current_user();
        let entry = format!(r"{TEST_KEY}\Entries\One");
        catalog.write_value(&entry, "Description", "A tool").unwrap();

        assert!(catalog.exists(TEST_KEY));
        assert_eq!(catalog.read_value(&entry, "Description").unwrap(), "A tool");
        assert_eq!(
            catalog.enumerate(&format!(r"{TEST_KEY}\Entries")).unwrap(),
            vec!["One".to_string()]
        );

        cleanup();
    }

    #[test]
    fn missing_key_reports_not_found() {
        let catalog = RegistryCatalog::current_user();
        assert!(!catalog.exists(r"Software\pytools-catalog-missing"));
        assert!(catalog
            .enumerate(r"Software\pytools-catalog-missing")
            .is_err());
    }
}
