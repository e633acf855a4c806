//! WiX v4 installer descriptor generation.
//!
//! Turns a publish directory (application build output) plus a validated
//! [`Configuration`] into a complete `.wxs` document.
//!
//! # Pipeline
//!
//! 1. [`scan`] walks the publish directory into an ordered tree
//! 2. [`mapper`] mirrors it under `INSTALLDIR`, one component per file
//! 3. [`features`] layer shortcuts, PATH, associations, icon and launch
//! 4. [`emit`] verifies feature coverage and serializes the document
//!
//! Fatal conditions are [`Error`]s; degraded features are [`Warning`]s
//! returned alongside the document.
//!
//! # Examples
//!
//! ```no_run
//! use kodegen_bundler_wix::wix::{self, ConfigurationBuilder};
//! use std::path::Path;
//!
//! # fn example() -> wix::Result<()> {
//! let config = ConfigurationBuilder::new()
//!     .product_name("MyApp")
//!     .version("1.0.0")
//!     .manufacturer("Example Inc.")
//!     .add_to_path(true)
//!     .build()?;
//!
//! let generation = wix::generate(&config, Path::new("publish"))?;
//! std::fs::write("MyApp.wxs", &generation.document).ok();
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod emit;
pub mod error;
pub mod features;
pub mod generator;
pub mod ids;
pub mod mapper;
pub mod model;
pub mod resources;
pub mod scan;
pub mod settings;

pub use context::{GenerationContext, Warning};
pub use emit::{Namespaces, PackageMetadata};
pub use error::{
    ConfigurationError, CoverageError, Error, IdentifierError, Result, ScanError,
};
pub use generator::{Generation, GenerationSummary, Generator, generate};
pub use ids::{Identifier, IdentifierRegistry};
pub use settings::{Configuration, ConfigurationBuilder, InstallScope, LicenseMode, UiLevel};
