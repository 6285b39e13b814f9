//! Fluid Runtime kind definitions
//!
//! This module provides a centralized enum for the Fluid runtime CRD kinds.
//! This eliminates hardcoded strings throughout the codebase and provides
//! type safety for runtime kind references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Enumeration of the Fluid runtime kinds.
///
/// A Dataset is bound 1:1 to exactly one runtime CR; the runtime's type tag
/// (as declared in `status.runtimes[].type`) selects which CRD backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    Alluxio,
    Jindo,
    Juicefs,
    Goosefs,
    Vineyard,
    Efc,
    Thin,
    /// A type tag outside the known set. Never produced by `parse_optional`;
    /// exists so downstream consumers have a stable wire value for it.
    Unknown,
}

/// Which components a runtime kind deploys.
///
/// Static domain knowledge, not derived from any cluster object: the
/// warning detector consults this so a kind without a master never raises
/// a spurious MASTER_MISSING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentMatrix {
    pub has_master: bool,
    pub has_worker: bool,
    pub has_fuse: bool,
}

impl RuntimeKind {
    /// Get the type tag as a string (the value used in `status.runtimes[].type`
    /// and in role labels like `alluxio-master`)
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Alluxio => "alluxio",
            RuntimeKind::Jindo => "jindo",
            RuntimeKind::Juicefs => "juicefs",
            RuntimeKind::Goosefs => "goosefs",
            RuntimeKind::Vineyard => "vineyard",
            RuntimeKind::Efc => "efc",
            RuntimeKind::Thin => "thin",
            RuntimeKind::Unknown => "unknown",
        }
    }

    /// The CRD kind name for this runtime (e.g. `AlluxioRuntime`)
    pub fn cr_kind(&self) -> &'static str {
        match self {
            RuntimeKind::Alluxio => "AlluxioRuntime",
            RuntimeKind::Jindo => "JindoRuntime",
            RuntimeKind::Juicefs => "JuiceFSRuntime",
            RuntimeKind::Goosefs => "GooseFSRuntime",
            RuntimeKind::Vineyard => "VineyardRuntime",
            RuntimeKind::Efc => "EFCRuntime",
            RuntimeKind::Thin => "ThinRuntime",
            RuntimeKind::Unknown => "Runtime",
        }
    }

    /// The plural resource name used in API paths (e.g. `alluxioruntimes`)
    pub fn plural(&self) -> &'static str {
        match self {
            RuntimeKind::Alluxio => "alluxioruntimes",
            RuntimeKind::Jindo => "jindoruntimes",
            RuntimeKind::Juicefs => "juicefsruntimes",
            RuntimeKind::Goosefs => "goosefsruntimes",
            RuntimeKind::Vineyard => "vineyardruntimes",
            RuntimeKind::Efc => "efcruntimes",
            RuntimeKind::Thin => "thinruntimes",
            RuntimeKind::Unknown => "runtimes",
        }
    }

    /// Try to parse a type tag into a RuntimeKind, returning None if it is
    /// not one of the known kinds
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// All known runtime kinds (excludes `Unknown`)
    pub fn all() -> &'static [Self] {
        &[
            RuntimeKind::Alluxio,
            RuntimeKind::Jindo,
            RuntimeKind::Juicefs,
            RuntimeKind::Goosefs,
            RuntimeKind::Vineyard,
            RuntimeKind::Efc,
            RuntimeKind::Thin,
        ]
    }

    /// Look up a runtime kind by its CRD kind name (e.g. `AlluxioRuntime`).
    /// Used for owner-reference recognition.
    pub fn from_cr_kind(kind: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.cr_kind() == kind)
    }

    /// The components this runtime kind is expected to deploy.
    ///
    /// Unknown kinds default to the full three-component shape: missing
    /// components are surfaced aggressively rather than suppressed.
    pub fn components(&self) -> ComponentMatrix {
        match self {
            RuntimeKind::Juicefs => ComponentMatrix {
                has_master: false,
                has_worker: true,
                has_fuse: true,
            },
            RuntimeKind::Thin => ComponentMatrix {
                has_master: false,
                has_worker: false,
                has_fuse: true,
            },
            _ => ComponentMatrix {
                has_master: true,
                has_worker: true,
                has_fuse: true,
            },
        }
    }
}

impl FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alluxio" => Ok(RuntimeKind::Alluxio),
            "jindo" => Ok(RuntimeKind::Jindo),
            "juicefs" => Ok(RuntimeKind::Juicefs),
            "goosefs" => Ok(RuntimeKind::Goosefs),
            "vineyard" => Ok(RuntimeKind::Vineyard),
            "efc" => Ok(RuntimeKind::Efc),
            "thin" => Ok(RuntimeKind::Thin),
            _ => Err(format!("unknown runtime type: {}", s)),
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
