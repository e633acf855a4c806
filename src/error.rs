//! Application error types for the installer project generator.
//!
//! This module defines the errors of the command-line layer with actionable
//! messages and recovery suggestions. Generation failures come from
//! [`crate::wix::Error`] and are wrapped here unchanged.

use crate::wix::{self, ConfigurationError, ScanError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, CreatorError>;

/// Main error type for all generator operations
#[derive(Error, Debug)]
pub enum CreatorError {
    /// Descriptor generation errors
    #[error("Generation error: {0}")]
    Wix(#[from] wix::Error),

    /// Persisted settings errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Template registration errors
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// Template rendering errors
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigurationError> for CreatorError {
    fn from(error: ConfigurationError) -> Self {
        CreatorError::Wix(wix::Error::Configuration(error))
    }
}

/// Settings file errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file does not exist
    #[error("Settings file not found: {path}")]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// No previous project to resume
    #[error("No publish directory given and no previous project found at {path}")]
    NoPreviousProject {
        /// Location of the last-project file
        path: PathBuf,
    },

    /// Settings file could not be parsed
    #[error("Settings file {path} is corrupted: {reason}")]
    Corrupted {
        /// Settings file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Settings do not name a publish directory
    #[error("No publish directory configured")]
    NoPublishDir,
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

impl CreatorError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            CreatorError::Wix(wix::Error::Scan(ScanError::RootNotFound(path))) => vec![
                format!("Publish the application first so that {} exists", path.display()),
                "Pass the publish output directory as the first argument".to_string(),
            ],
            CreatorError::Wix(wix::Error::Scan(ScanError::NotADirectory(_))) => vec![
                "Pass the publish output directory, not a single file".to_string(),
            ],
            CreatorError::Wix(wix::Error::Configuration(ConfigurationError::MissingField {
                field,
            })) => vec![
                format!("Provide {field} on the command line or in the settings file"),
            ],
            CreatorError::Wix(wix::Error::Configuration(
                ConfigurationError::InvalidVersion { .. },
            )) => vec![
                "Use a product version of the form major.minor[.build[.revision]]".to_string(),
                "Major and minor must not exceed 255, build and revision 65535".to_string(),
            ],
            CreatorError::Wix(wix::Error::Configuration(ConfigurationError::InvalidGuid {
                ..
            })) => vec![
                "Use a GUID such as {6A1B7F8E-5D0B-4C9B-9C1E-2E3A4B5C6D7E}".to_string(),
                "Omit the upgrade code to derive one from manufacturer and product".to_string(),
            ],
            CreatorError::Wix(wix::Error::Coverage(_)) => vec![
                "This is a bug in the generator; please report it with the publish tree layout"
                    .to_string(),
            ],
            CreatorError::Settings(SettingsError::NoPreviousProject { .. })
            | CreatorError::Settings(SettingsError::NoPublishDir) => vec![
                "Pass the publish output directory as the first argument".to_string(),
                "Load a saved project with --settings <file>.json".to_string(),
            ],
            CreatorError::Settings(SettingsError::Corrupted { path, .. }) => vec![
                format!("Fix or delete {}", path.display()),
                "Run again with --save-settings to write a fresh settings file".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CreatorError::Wix(wix::Error::Coverage(_))
                | CreatorError::Wix(wix::Error::Identifier(_))
                | CreatorError::Wix(wix::Error::Layout(_))
                | CreatorError::Template(_)
        )
    }
}
