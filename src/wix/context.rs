//! Per-generation state shared by the mapper and the feature assemblers.

use crate::wix::ids::IdentifierRegistry;
use std::fmt;
use std::path::PathBuf;

/// A degradation that did not abort generation.
///
/// The affected feature is omitted (or falls back) and generation continues.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Warning {
    /// A feature needs the main executable but none was detected.
    MissingMainExecutable {
        /// Feature that was skipped
        feature: &'static str,
    },
    /// Several root executables qualified; the first in lexical order won.
    AmbiguousMainExecutable {
        /// File that was chosen
        chosen: String,
        /// All candidates, in lexical order
        candidates: Vec<String>,
    },
    /// The configured main executable is not a file in the publish root.
    ConfiguredExecutableNotFound {
        /// Configured file name
        name: String,
    },
    /// A referenced resource file does not exist.
    MissingResource {
        /// Resource kind ("icon", "banner", "dialog", "license")
        kind: &'static str,
        /// Path as configured
        path: PathBuf,
    },
    /// A symbolic link was not followed.
    SymlinkSkipped {
        /// Path relative to the publish root
        path: PathBuf,
    },
    /// An entry name contains characters an XML document cannot carry.
    InvalidName {
        /// Path relative to the publish root
        path: PathBuf,
    },
    /// No upgrade identity was supplied; one was derived from the product.
    DerivedUpgradeCode {
        /// The derived identity
        upgrade_code: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingMainExecutable { feature } => write!(
                f,
                "no main executable found in the publish root; {feature} skipped"
            ),
            Warning::AmbiguousMainExecutable { chosen, candidates } => write!(
                f,
                "multiple executables in the publish root ({}); using {chosen}",
                candidates.join(", ")
            ),
            Warning::ConfiguredExecutableNotFound { name } => write!(
                f,
                "configured main executable {name} is not in the publish root"
            ),
            Warning::MissingResource { kind, path } => write!(
                f,
                "{kind} file '{}' not found; it will not be included",
                path.display()
            ),
            Warning::SymlinkSkipped { path } => {
                write!(f, "skipped symbolic link {}", path.display())
            }
            Warning::InvalidName { path } => write!(
                f,
                "skipped {}: name contains characters not allowed in XML",
                path.display()
            ),
            Warning::DerivedUpgradeCode { upgrade_code } => write!(
                f,
                "no upgrade code supplied; derived {{{upgrade_code}}}. Save it to keep upgrades working"
            ),
        }
    }
}

/// Mutable state of one generation call.
///
/// Owns the identifier registry and collects warnings. Discarded after the
/// document is emitted.
#[derive(Debug)]
pub struct GenerationContext {
    /// Identifier allocation for this document.
    pub registry: IdentifierRegistry,
    warnings: Vec<Warning>,
}

impl GenerationContext {
    /// Creates a context around `registry`.
    pub fn new(registry: IdentifierRegistry) -> Self {
        Self {
            registry,
            warnings: Vec::new(),
        }
    }

    /// Records and logs a warning.
    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consumes the context, returning its warnings.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
