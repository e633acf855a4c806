//! Error types for descriptor generation.
//!
//! Every fatal condition of the generation pipeline has its own error type so
//! callers can tell user mistakes (bad configuration, missing publish
//! directory) apart from internal invariant violations (coverage).
//!
//! Feature-level degradations are not errors; they are collected as
//! [`Warning`](crate::wix::Warning)s and returned with the document.

use std::path::PathBuf;
use thiserror::Error as DeriveError;

/// Errors returned by the generator.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// The publish directory could not be scanned.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A name could not be turned into a usable identifier.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// The configuration failed validation.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A component is not reachable from any feature.
    #[error(transparent)]
    Coverage(#[from] CoverageError),

    /// Descriptor serialization failed.
    #[error("failed to serialize descriptor: {0}")]
    Xml(String),

    /// An assembler left the layout inconsistent.
    #[error("invalid layout: {0}")]
    Layout(String),
}

/// Failures while walking the publish directory.
#[derive(Debug, DeriveError)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("publish directory {0} does not exist")]
    RootNotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("publish directory {0} is not a directory")]
    NotADirectory(PathBuf),

    /// An entry below the root could not be read.
    #[error("failed to read {path}: {reason}")]
    Walk {
        /// Entry that failed
        path: PathBuf,
        /// Reason reported by the walker
        reason: String,
    },
}

/// A hint sanitized down to nothing.
#[derive(Debug, DeriveError)]
#[error("cannot derive an identifier from {hint:?}: no usable characters remain")]
pub struct IdentifierError {
    /// The human-readable hint that was rejected
    pub hint: String,
}

/// Configuration validation failures, raised before scanning.
#[derive(Debug, DeriveError)]
pub enum ConfigurationError {
    /// A required field is empty.
    #[error("{field} is required")]
    MissingField {
        /// Field name
        field: &'static str,
    },

    /// Version is not a valid installer product version.
    #[error("invalid product version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// A product or upgrade identity is not a GUID.
    #[error("invalid {field} '{value}': expected a GUID")]
    InvalidGuid {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// A file association extension is malformed.
    #[error("invalid file association extension '{0}'")]
    InvalidExtension(String),

    /// An exclusion pattern failed to compile.
    #[error("invalid exclusion pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern text
        pattern: String,
        /// Reason for the error
        reason: String,
    },

    /// An unrecognized enumerated value.
    #[error("invalid {field} '{value}', expected one of: {expected}")]
    InvalidChoice {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
        /// Accepted values
        expected: &'static str,
    },
}

/// Internal invariant violation: components the emitter would silently drop.
///
/// Indicates a bug in an assembler, never a user mistake.
#[derive(Debug, DeriveError)]
#[error(
    "feature coverage violated: unreferenced components {unreferenced:?}, dangling references {dangling:?}"
)]
pub struct CoverageError {
    /// Components not referenced by any feature
    pub unreferenced: Vec<String>,
    /// Feature references naming no component
    pub dangling: Vec<String>,
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;
