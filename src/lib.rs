//! # Kodegen WiX Bundler
//!
//! Generates WiX v4+ installer projects for published application
//! directories.
//!
//! The [`wix`] module is the generation engine: it scans a publish
//! directory, mirrors it as installer components, layers optional features
//! (shortcuts, PATH, file associations, product icon, launch after install)
//! and emits a deterministic `.wxs` descriptor. It performs no writes.
//!
//! Around it, [`project`] renders the sibling `.wixproj`, README and license
//! files, [`settings_file`] persists the answers of a run as JSON, and
//! [`cli`] ties everything together.
//!
//! ## Features
//!
//! - **Full coverage**: every component is referenced by a feature, checked before emitting
//! - **Deterministic output**: same tree and configuration, same document
//! - **Graceful degradation**: missing icons, licenses or executables become warnings
//! - **Stable upgrades**: the upgrade code is derived once and saved for later runs
//!
//! ## Usage
//!
//! ```bash
//! kodegen_bundler_wix ./publish --product-name MyApp --manufacturer Acme --add-to-path
//! kodegen_bundler_wix ./publish -o Installer --ui minimal --save-settings
//! kodegen_bundler_wix              # regenerate the last saved project
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod project;
pub mod settings_file;
pub mod utils;
pub mod wix;

// Re-export main types for public API
pub use cli::Args;
pub use error::{CliError, CreatorError, Result, SettingsError};
pub use project::{Artifact, ProjectRenderer};
pub use settings_file::ProjectSettings;
pub use wix::{Configuration, ConfigurationBuilder, Generation, Generator, Warning};
