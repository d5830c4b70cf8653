//! Virtual-environment marker files.

use std::path::{Path, PathBuf};

/// Returns the base installation directory the virtual environment at
/// `root` was created from.
///
/// Reads the legacy `Lib\orig-prefix.txt` marker (first line) and the
/// modern `pyvenv.cfg` (`key = value` lines, keys case-insensitive, last
/// `home` wins); `pyvenv.cfg` takes precedence when both are present.
/// Returns `None` when neither yields a value.
pub(crate) fn base_prefix(root: &Path) -> Option<PathBuf> {
    let mut base = orig_prefix(&root.join("Lib").join("orig-prefix.txt"));
    if let Some(home) = pyvenv_home(&root.join("pyvenv.cfg")) {
        base = Some(home);
    }
    base.map(PathBuf::from)
}

fn read_marker(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs_err::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(err) => {
            tracing::debug!("{err}");
            None
        }
    }
}

fn orig_prefix(path: &Path) -> Option<String> {
    read_marker(path)?
        .lines()
        .next()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
}

fn pyvenv_home(path: &Path) -> Option<String> {
    let contents = read_marker(path)?;
    let mut home = None;
    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("home") {
            let value = value.trim();
            if !value.is_empty() {
                home = Some(value.to_string());
            }
        }
    }
    home
}
