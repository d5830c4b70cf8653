//! Configuration-driven batch resolution.

use std::path::PathBuf;

use configparser::ini::Ini;
use pytools_catalog::CatalogStore;

use crate::record::{InterpreterRecord, RecordOptions, ResolveError};

/// The configuration collaborator interpreter sections are read from.
pub trait InterpreterConfig {
    /// Names of all sections present.
    fn sections(&self) -> Vec<String>;

    /// Returns true when `section` exists.
    fn has_section(&self, section: &str) -> bool {
        self.sections()
            .iter()
            .any(|name| name.eq_ignore_ascii_case(section))
    }

    /// Reads a single string setting.
    fn get(&self, section: &str, key: &str) -> Option<String>;

    /// Reads a directory-list setting: the value split on `;` and newlines,
    /// entries trimmed, empty entries dropped.
    fn get_dirs(&self, section: &str, key: &str) -> Vec<PathBuf> {
        self.get(section, key)
            .map(|value| {
                value
                    .split([';', '\n'])
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl InterpreterConfig for Ini {
    fn sections(&self) -> Vec<String> {
        Ini::sections(self)
    }

    fn get(&self, section: &str, key: &str) -> Option<String> {
        Ini::get(self, section, key)
    }
}

/// Errors raised by [`InterpreterRecord::from_config_section`].
#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    /// The requested section does not exist.
    #[error("section [{section}] not found in [{available}]")]
    UnknownSection {
        /// The section that was requested.
        section: String,
        /// Comma-separated names of the sections that do exist.
        available: String,
    },

    /// A catalog precondition failed while resolving an entry.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl InterpreterRecord {
    /// Resolves every interpreter or virtual environment listed in a
    /// configuration section.
    ///
    /// A section names either `interpreter_paths` (installation
    /// directories) or `environment_paths` (virtual-environment
    /// directories), not both; when both are present only the installation
    /// list is used. Entries that do not resolve are skipped. A
    /// `description` setting on the section renames every resolved record.
    pub fn from_config_section(
        config: &dyn InterpreterConfig,
        section: &str,
        options: &RecordOptions,
        catalog: &dyn CatalogStore,
    ) -> Result<Vec<InterpreterRecord>, SectionError> {
        if !config.has_section(section) {
            return Err(SectionError::UnknownSection {
                section: section.to_string(),
                available: config.sections().join(", "),
            });
        }

        let interpreter_paths = config.get_dirs(section, "interpreter_paths");
        let environment_paths = config.get_dirs(section, "environment_paths");

        let mut records = Vec::new();
        if !interpreter_paths.is_empty() {
            for directory in interpreter_paths {
                if let Some(record) =
                    InterpreterRecord::from_installation(&directory, options, catalog)?
                {
                    records.push(record);
                }
            }
        } else if !environment_paths.is_empty() {
            for directory in environment_paths {
                if let Some(record) =
                    InterpreterRecord::from_virtual_environment(&directory, options, catalog)?
                {
                    records.push(record);
                }
            }
        }

        if let Some(description) = config.get(section, "description") {
            for record in &mut records {
                record.description.clone_from(&description);
            }
        }

        Ok(records)
    }
}
