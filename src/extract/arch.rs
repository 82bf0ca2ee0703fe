use crate::{ExtractError, ExtractResult};
use std::fmt;

/// CPU architecture of a driver build
///
/// The vendor labels builds `x86`/`x64`; downstream tooling uses the FreeBSD
/// names `i386`/`amd64`. Only those two tokens map; anything else is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    I386,
    Amd64,
}

impl Arch {
    /// Maps a vendor architecture token
    ///
    /// # Examples
    ///
    /// ```
    /// use gpu_driver_specs::Arch;
    ///
    /// assert_eq!(Arch::from_vendor("x86").unwrap(), Arch::I386);
    /// assert_eq!(Arch::from_vendor("x64").unwrap().as_str(), "amd64");
    /// assert!(Arch::from_vendor("arm64").is_err());
    /// ```
    pub fn from_vendor(token: &str) -> ExtractResult<Self> {
        match token {
            "x86" => Ok(Self::I386),
            "x64" => Ok(Self::Amd64),
            other => Err(ExtractError::ArchitectureUnmapped(other.to_string())),
        }
    }

    /// The vendor's label for this architecture
    pub fn vendor_token(&self) -> &'static str {
        match self {
            Self::I386 => "x86",
            Self::Amd64 => "x64",
        }
    }

    /// The FreeBSD name used in cache keys and output records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I386 => "i386",
            Self::Amd64 => "amd64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Architecture slot of a listing entry
///
/// Entries decomposed from a bare `os_version` link carry no architecture.
/// They get a numbered placeholder instead, unique within their listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryArch {
    Mapped(Arch),
    Unresolved(u32),
}

impl fmt::Display for EntryArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapped(arch) => arch.fmt(f),
            Self::Unresolved(n) => write!(f, "unknown{}", n),
        }
    }
}
