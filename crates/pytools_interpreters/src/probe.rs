//! Direct execution of a candidate interpreter binary to extract facts.
//!
//! Each probe spawns one short-lived child process and blocks until it
//! terminates; there is no timeout and no retry. Every failure mode
//! (launch failure, abnormal exit, unrecognized output) degrades to `None`
//! rather than an error.

use std::path::Path;
use std::process::Command;

use crate::architecture::Architecture;

const VERSION_SNIPPET: &str =
    "import sys;print('.'.join(str(v) for v in sys.version_info[:2]))";
const ARCHITECTURE_SNIPPET: &str =
    "import platform;print('x64' if '64bit' in platform.architecture()[0] else 'x86')";

/// Facts gathered by probing an interpreter binary.
///
/// A `None` field means that probe failed, which is distinct from a probe
/// that ran and produced a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpreterFacts {
    /// The `major.minor` version string.
    pub version: Option<String>,
    /// The reported CPU architecture.
    pub architecture: Option<Architecture>,
}

/// Runs both probes against `interpreter`.
pub fn probe(interpreter: &Path) -> InterpreterFacts {
    InterpreterFacts {
        version: version_of(interpreter),
        architecture: architecture_of(interpreter),
    }
}

/// Returns the `major.minor` version reported by the binary at
/// `interpreter`, or `None` when it cannot be executed.
pub fn version_of(interpreter: &Path) -> Option<String> {
    run_snippet(interpreter, VERSION_SNIPPET)
}

/// Returns the CPU architecture reported by the binary at `interpreter`, or
/// `None` when it cannot be executed or reports something unrecognized.
pub fn architecture_of(interpreter: &Path) -> Option<Architecture> {
    let output = run_snippet(interpreter, ARCHITECTURE_SNIPPET)?;
    match output.parse() {
        Ok(architecture) => Some(architecture),
        Err(err) => {
            tracing::debug!("{}: {err}", interpreter.display());
            None
        }
    }
}

fn run_snippet(interpreter: &Path, code: &str) -> Option<String> {
    let output = match Command::new(interpreter).arg("-c").arg(code).output() {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!("failed to launch {}: {err}", interpreter.display());
            return None;
        }
    };

    if !output.status.success() {
        tracing::debug!(
            "{} exited with {}: {}",
            interpreter.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn missing_binary_probes_to_unknown() {
        let missing = Path::new("/definitely/not/a/python.exe");
        assert_eq!(version_of(missing), None);
        assert_eq!(architecture_of(missing), None);
        assert_eq!(probe(missing), InterpreterFacts::default());
    }

    #[cfg(unix)]
    mod unix {
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};

        use super::super::*;

        // A stand-in interpreter: answers the architecture snippet with one
        // line and everything else with a version.
        fn fake_interpreter(dir: &Path, script: &str) -> PathBuf {
            let path = dir.join("python.exe");
            fs_err::write(&path, script).unwrap();
            fs_err::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn reads_version_and_architecture() {
            let dir = tempfile::tempdir().unwrap();
            let script =
                "#!/bin/sh\ncase \"$2\" in *platform*) echo x64 ;; *) echo 3.11 ;; esac\n";
            let python = fake_interpreter(dir.path(), script);

            assert_eq!(version_of(&python).as_deref(), Some("3.11"));
            assert_eq!(architecture_of(&python), Some(Architecture::X64));

            let facts = probe(&python);
            assert_eq!(facts.version.as_deref(), Some("3.11"));
            assert_eq!(facts.architecture, Some(Architecture::X64));
        }

        #[test]
        fn unrecognized_architecture_is_unknown() {
            let dir = tempfile::tempdir().unwrap();
            let python = fake_interpreter(dir.path(), "#!/bin/sh\necho sparc\n");
            assert_eq!(architecture_of(&python), None);
        }

        #[test]
        fn failing_interpreter_is_unknown() {
            let dir = tempfile::tempdir().unwrap();
            let python = fake_interpreter(dir.path(), "#!/bin/sh\nexit 3\n");
            assert_eq!(version_of(&python), None);
            assert_eq!(architecture_of(&python), None);
        }

        #[test]
        fn silent_interpreter_is_unknown() {
            let dir = tempfile::tempdir().unwrap();
            let python = fake_interpreter(dir.path(), "#!/bin/sh\nexit 0\n");
            assert_eq!(version_of(&python), None);
        }
    }
}
