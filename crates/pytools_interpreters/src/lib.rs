#![deny(missing_docs)]

//! Discovery of Python interpreters and virtual environments, and
//! registration with the Visual Studio PythonTools interpreter catalog.
//!
//! Visual Studio's Python tooling keeps its per-user interpreter catalog in
//! the registry under
//! `Software\Microsoft\VisualStudio\<version>\PythonTools\Interpreters`.
//! This crate resolves candidate directories into [`InterpreterRecord`]s by
//! probing the interpreter binary for its version and architecture, parsing
//! virtual-environment metadata (`pyvenv.cfg`, `Lib\orig-prefix.txt`), and
//! reconciling the result against the existing catalog so an interpreter
//! that is already registered keeps its identity instead of gaining a
//! duplicate entry.
//!
//! The catalog itself is abstracted by [`pytools_catalog::CatalogStore`]:
//! use `pytools_catalog::RegistryCatalog` on Windows and
//! [`pytools_catalog::MemoryCatalog`] elsewhere and in tests.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use pytools_catalog::MemoryCatalog;
//! use pytools_interpreters::{InterpreterRecord, RecordOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = MemoryCatalog::new();
//!     let options = RecordOptions {
//!         catalog_version: Some("15.0".to_string()),
//!         ..RecordOptions::default()
//!     };
//!
//!     if let Some(record) =
//!         InterpreterRecord::from_installation(Path::new(r"C:\Python39"), &options, &catalog)?
//!     {
//!         println!("found {} {}", record.description, record.version);
//!         record.register(&catalog)?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod architecture;
pub mod config;
pub mod probe;
mod record;
mod venv;

pub use architecture::{Architecture, ParseArchitectureError};
pub use config::{InterpreterConfig, SectionError};
pub use record::{InterpreterRecord, RecordOptions, ResolveError, SEARCH_PATH_VARIABLE};
