use std::fmt;
use std::str::FromStr;

/// CPU architecture reported by an interpreter binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X64,
}

impl Architecture {
    /// Returns the canonical string for this architecture.
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
        }
    }
}

/// An error that can occur when parsing an architecture from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{string}' is not a known architecture")]
pub struct ParseArchitectureError {
    /// The string that could not be parsed.
    pub string: String,
}

impl FromStr for Architecture {
    type Err = ParseArchitectureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86" => Ok(Architecture::X86),
            "x64" => Ok(Architecture::X64),
            string => Err(ParseArchitectureError {
                string: string.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
