use std::path::{Path, PathBuf};

use pytools_catalog::{CatalogStore, Registerable};
use uuid::Uuid;

use crate::architecture::Architecture;
use crate::{probe, venv};

/// Default environment variable used for module search path injection.
pub const SEARCH_PATH_VARIABLE: &str = "PYTHONPATH";

const CONSOLE_BINARY: &str = "python.exe";
const WINDOWED_BINARY: &str = "pythonw.exe";
const SCRIPTS_DIR: &str = "Scripts";

// Value names PythonTools stores on an interpreter entry.
const VALUE_ARCHITECTURE: &str = "Architecture";
const VALUE_DESCRIPTION: &str = "Description";
const VALUE_INTERPRETER_PATH: &str = "InterpreterPath";
const VALUE_VERSION: &str = "Version";
const VALUE_WINDOWS_INTERPRETER_PATH: &str = "WindowsInterpreterPath";
const VALUE_SEARCH_PATH_VARIABLE: &str = "PathEnvironmentVariable";

fn python_tools_key(catalog_version: &str) -> String {
    format!(r"Software\Microsoft\VisualStudio\{catalog_version}\PythonTools")
}

fn interpreters_key(catalog_version: &str) -> String {
    format!(r"{}\Interpreters", python_tools_key(catalog_version))
}

/// Errors raised while reconciling or registering a record against the
/// catalog.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The record carries no catalog version to resolve against.
    #[error("cannot resolve an interpreter without a catalog version")]
    MissingCatalogVersion,

    /// The per-version catalog root is absent from the store.
    #[error("catalog root '{0}' does not exist; is the Python tooling installed for that version?")]
    CatalogUnavailable(String),
}

/// Optional overrides applied while constructing an [`InterpreterRecord`].
///
/// Every field left as `None` falls back to the documented default.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// Identity to assign instead of generating a fresh one.
    pub identity: Option<Uuid>,

    /// Human-readable description override.
    pub description: Option<String>,

    /// Environment variable used for module search path injection. Defaults
    /// to [`SEARCH_PATH_VARIABLE`].
    pub search_path_variable: Option<String>,

    /// Catalog version to reconcile and register against (e.g. `"15.0"`).
    pub catalog_version: Option<String>,
}

/// Metadata describing one Python interpreter installation or virtual
/// environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterRecord {
    /// Unique identity of the interpreter within the catalog.
    pub identity: Uuid,

    /// Identity of the base installation. Equals [`identity`] except for a
    /// virtual environment, where it references the installation the
    /// environment was created from.
    ///
    /// [`identity`]: Self::identity
    pub base_interpreter: Uuid,

    /// Reported CPU architecture, if it could be probed.
    pub architecture: Option<Architecture>,

    /// `major.minor` version string; empty when undeterminable.
    pub version: String,

    /// Human-readable label.
    pub description: String,

    /// Absolute installation (or environment) root directory.
    pub root: PathBuf,

    /// Console interpreter location, relative to [`root`]. Records loaded
    /// from the catalog hold an absolute path here, since the catalog only
    /// stores absolute paths.
    ///
    /// [`root`]: Self::root
    pub interpreter_path: PathBuf,

    /// Absolute console interpreter location.
    pub interpreter_abs_path: PathBuf,

    /// Windowed (no console) interpreter location relative to [`root`], when
    /// one exists.
    ///
    /// [`root`]: Self::root
    pub windowed_interpreter_path: Option<PathBuf>,

    /// Absolute windowed interpreter location, when one exists.
    pub windowed_interpreter_abs_path: Option<PathBuf>,

    /// Name of the environment variable used for module search path
    /// injection.
    pub search_path_variable: String,

    /// Catalog version this record resolves and registers against.
    pub catalog_version: Option<String>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn paths_equal_ignore_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy()
        .eq_ignore_ascii_case(&b.to_string_lossy())
}

fn entry_identity(entry_key: &str) -> Option<Uuid> {
    let segment = entry_key.rsplit('\\').next()?;
    segment
        .trim_start_matches('{')
        .trim_end_matches('}')
        .parse()
        .ok()
}

impl InterpreterRecord {
    /// Resolves a Python installation directory into a record.
    ///
    /// Returns `Ok(None)` when `directory` does not contain a console
    /// interpreter binary. A resolved record is immediately reconciled with
    /// the catalog (see [`resolve`]), so the catalog preconditions apply
    /// here as well.
    ///
    /// [`resolve`]: Self::resolve
    pub fn from_installation(
        directory: &Path,
        options: &RecordOptions,
        catalog: &dyn CatalogStore,
    ) -> Result<Option<Self>, ResolveError> {
        let Ok(root) = std::path::absolute(directory) else {
            return Ok(None);
        };
        let console = root.join(CONSOLE_BINARY);
        if !console.exists() {
            return Ok(None);
        }

        let identity = options.identity.unwrap_or_else(Uuid::new_v4);
        let windowed = root.join(WINDOWED_BINARY);
        let mut record = Self {
            identity,
            base_interpreter: identity,
            architecture: None,
            version: String::new(),
            description: options
                .description
                .clone()
                .unwrap_or_else(|| file_name(&root)),
            interpreter_path: PathBuf::from(CONSOLE_BINARY),
            interpreter_abs_path: console.clone(),
            windowed_interpreter_path: windowed
                .exists()
                .then(|| PathBuf::from(WINDOWED_BINARY)),
            windowed_interpreter_abs_path: windowed.exists().then_some(windowed),
            search_path_variable: options
                .search_path_variable
                .clone()
                .unwrap_or_else(|| SEARCH_PATH_VARIABLE.to_string()),
            catalog_version: options.catalog_version.clone(),
            root,
        };

        let facts = probe::probe(&console);
        if let Some(version) = facts.version {
            record.version = version;
        }
        record.architecture = facts.architecture;

        record.resolve(catalog)?;
        Ok(Some(record))
    }

    /// Resolves a Python virtual environment directory into a record.
    ///
    /// Returns `Ok(None)` when the directory has no `Scripts\python.exe`,
    /// when no base installation reference can be determined from its marker
    /// files, or when the base installation itself does not resolve: a
    /// virtual environment is only representable relative to a resolvable
    /// base.
    pub fn from_virtual_environment(
        directory: &Path,
        options: &RecordOptions,
        catalog: &dyn CatalogStore,
    ) -> Result<Option<Self>, ResolveError> {
        let Ok(root) = std::path::absolute(directory) else {
            return Ok(None);
        };
        let console = root.join(SCRIPTS_DIR).join(CONSOLE_BINARY);
        if !console.exists() {
            return Ok(None);
        }

        let Some(base_dir) = venv::base_prefix(&root) else {
            return Ok(None);
        };
        let Some(base) = Self::from_installation(&base_dir, options, catalog)? else {
            return Ok(None);
        };

        let windowed = root.join(SCRIPTS_DIR).join(WINDOWED_BINARY);
        let mut record = Self {
            identity: options.identity.unwrap_or_else(Uuid::new_v4),
            base_interpreter: base.identity,
            architecture: None,
            version: String::new(),
            description: options
                .description
                .clone()
                .unwrap_or_else(|| format!("{} ({})", file_name(&root), base.description)),
            interpreter_path: Path::new(SCRIPTS_DIR).join(CONSOLE_BINARY),
            interpreter_abs_path: console.clone(),
            windowed_interpreter_path: windowed
                .exists()
                .then(|| Path::new(SCRIPTS_DIR).join(WINDOWED_BINARY)),
            windowed_interpreter_abs_path: windowed.exists().then_some(windowed),
            search_path_variable: options
                .search_path_variable
                .clone()
                .unwrap_or_else(|| SEARCH_PATH_VARIABLE.to_string()),
            catalog_version: options.catalog_version.clone(),
            root,
        };

        let facts = probe::probe(&console);
        if let Some(version) = facts.version {
            record.version = version;
        }
        record.architecture = facts.architecture;

        // The base installation was already reconciled; the environment
        // keeps its fresh identity.
        Ok(Some(record))
    }

    /// Loads a record from a single catalog entry.
    ///
    /// Returns `None` when the entry has no interpreter path or its key does
    /// not end in a parseable identity. The installation root is derived
    /// from the stored interpreter path.
    pub fn from_catalog_entry(catalog: &dyn CatalogStore, entry_key: &str) -> Option<Self> {
        let interpreter_abs_path =
            PathBuf::from(catalog.read_value(entry_key, VALUE_INTERPRETER_PATH).ok()?);
        let identity = entry_identity(entry_key)?;

        let architecture = catalog
            .read_value(entry_key, VALUE_ARCHITECTURE)
            .ok()
            .and_then(|value| value.parse().ok());
        let windowed = catalog
            .read_value(entry_key, VALUE_WINDOWS_INTERPRETER_PATH)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Some(Self {
            identity,
            base_interpreter: identity,
            architecture,
            version: catalog.read_value(entry_key, VALUE_VERSION).unwrap_or_default(),
            description: catalog
                .read_value(entry_key, VALUE_DESCRIPTION)
                .unwrap_or_default(),
            root: interpreter_abs_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            interpreter_path: interpreter_abs_path.clone(),
            interpreter_abs_path,
            windowed_interpreter_path: windowed.clone(),
            windowed_interpreter_abs_path: windowed,
            search_path_variable: catalog
                .read_value(entry_key, VALUE_SEARCH_PATH_VARIABLE)
                .ok()
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| SEARCH_PATH_VARIABLE.to_string()),
            catalog_version: None,
        })
    }

    /// Reconciles this record with the interpreters already in the catalog.
    ///
    /// The catalog is shared with other tools on the machine, so a freshly
    /// resolved interpreter must adopt the identity of an existing entry
    /// with the same console interpreter path (compared case-insensitively)
    /// instead of registering a duplicate. When no entry matches, the
    /// record keeps its generated identity and will register as new.
    pub fn resolve(&mut self, catalog: &dyn CatalogStore) -> Result<(), ResolveError> {
        let catalog_version = self
            .catalog_version
            .as_deref()
            .ok_or(ResolveError::MissingCatalogVersion)?;
        let tools_key = python_tools_key(catalog_version);
        if !catalog.exists(&tools_key) {
            return Err(ResolveError::CatalogUnavailable(tools_key));
        }

        let interpreters = interpreters_key(catalog_version);
        let children = match catalog.enumerate(&interpreters) {
            Ok(children) => children,
            Err(err) => {
                tracing::debug!("cannot enumerate '{interpreters}': {err}");
                return Ok(());
            }
        };

        for child in children {
            let entry_key = format!(r"{interpreters}\{child}");
            let Some(existing) = Self::from_catalog_entry(catalog, &entry_key) else {
                continue;
            };
            if paths_equal_ignore_case(&existing.interpreter_abs_path, &self.interpreter_abs_path)
            {
                tracing::debug!(
                    "adopting identity {} for {}",
                    existing.identity,
                    self.interpreter_abs_path.display()
                );
                self.identity = existing.identity;
                self.base_interpreter = existing.identity;
                break;
            }
        }

        Ok(())
    }

    /// Persists this record into the catalog under its identity.
    ///
    /// All fields are written as flat string values on a single entry.
    /// Returns `Ok(false)` when a value could not be written.
    pub fn register(&self, catalog: &dyn CatalogStore) -> Result<bool, ResolveError> {
        let catalog_version = self
            .catalog_version
            .as_deref()
            .ok_or(ResolveError::MissingCatalogVersion)?;
        let tools_key = python_tools_key(catalog_version);
        if !catalog.exists(&tools_key) {
            return Err(ResolveError::CatalogUnavailable(tools_key));
        }

        let entry_key = format!(
            r"{}\{{{}}}",
            interpreters_key(catalog_version),
            self.identity
        );
        let windowed = self
            .windowed_interpreter_abs_path
            .as_deref()
            .map(|path| dunce::simplified(path).display().to_string())
            .unwrap_or_default();
        let values = [
            (
                VALUE_ARCHITECTURE,
                self.architecture
                    .map(Architecture::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
            (VALUE_DESCRIPTION, self.description.clone()),
            (
                VALUE_INTERPRETER_PATH,
                dunce::simplified(&self.interpreter_abs_path)
                    .display()
                    .to_string(),
            ),
            (VALUE_VERSION, self.version.clone()),
            (VALUE_WINDOWS_INTERPRETER_PATH, windowed),
            (VALUE_SEARCH_PATH_VARIABLE, self.search_path_variable.clone()),
        ];
        for (name, value) in values {
            if let Err(err) = catalog.write_value(&entry_key, name, &value) {
                tracing::warn!("failed to write '{name}' on '{entry_key}': {err}");
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl Registerable for InterpreterRecord {
    type Error = ResolveError;

    fn resolve(&mut self, catalog: &dyn CatalogStore) -> Result<(), ResolveError> {
        InterpreterRecord::resolve(self, catalog)
    }

    fn register(&self, catalog: &dyn CatalogStore) -> Result<bool, ResolveError> {
        InterpreterRecord::register(self, catalog)
    }
}
