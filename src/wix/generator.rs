//! Generation pipeline.
//!
//! Scanner → mapper → feature assemblers → emitter, over one
//! [`GenerationContext`]. The only side effect is reading the publish
//! directory and resource files; the descriptor is returned as text.

use crate::wix::context::{GenerationContext, Warning};
use crate::wix::emit::{self, Namespaces, PackageMetadata};
use crate::wix::error::Result;
use crate::wix::features::{Assembler, default_assemblers};
use crate::wix::ids::IdentifierRegistry;
use crate::wix::mapper;
use crate::wix::model::Layout;
use crate::wix::resources;
use crate::wix::scan;
use crate::wix::settings::Configuration;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Counts describing a generated descriptor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GenerationSummary {
    /// Output directories, including predefined system directories.
    pub directories: usize,
    /// Components.
    pub components: usize,
    /// Installed files.
    pub files: usize,
    /// Component references across all features.
    pub feature_refs: usize,
}

impl GenerationSummary {
    fn of(layout: &Layout) -> Self {
        let units = layout.units();
        Self {
            directories: layout.install_dir.directory_count()
                + layout
                    .standard_dirs
                    .iter()
                    .map(|d| d.directory_count())
                    .sum::<usize>(),
            components: units.len(),
            files: units.iter().map(|u| u.files.len()).sum(),
            feature_refs: layout.features.iter().map(|f| f.components.len()).sum(),
        }
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files in {} components across {} directories ({} feature references)",
            self.files, self.components, self.directories, self.feature_refs
        )
    }
}

/// Result of a successful generation.
#[derive(Debug)]
pub struct Generation {
    /// Descriptor text.
    pub document: String,
    /// Product identity written to the package.
    pub product_code: Uuid,
    /// Upgrade identity written to the package.
    pub upgrade_code: Uuid,
    /// Extension schemas the descriptor uses.
    pub namespaces: Namespaces,
    /// Degradations, in the order they occurred.
    pub warnings: Vec<Warning>,
    /// Counts for display.
    pub summary: GenerationSummary,
}

/// Configurable generation pipeline.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_wix::wix::{ConfigurationBuilder, Generator};
/// use std::path::Path;
///
/// # fn example() -> kodegen_bundler_wix::wix::Result<()> {
/// let config = ConfigurationBuilder::new()
///     .product_name("MyApp")
///     .version("1.0.0")
///     .manufacturer("Example Inc.")
///     .build()?;
///
/// let generation = Generator::new().generate(&config, Path::new("publish"))?;
/// for warning in &generation.warnings {
///     eprintln!("warning: {warning}");
/// }
/// println!("{}", generation.document);
/// # Ok(())
/// # }
/// ```
pub struct Generator {
    seed: Option<u64>,
    assemblers: Vec<Box<dyn Assembler>>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// A generator with every feature assembler and fresh random GUIDs.
    pub fn new() -> Self {
        Self {
            seed: None,
            assemblers: default_assemblers(),
        }
    }

    /// Makes fresh GUIDs reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the feature assemblers.
    pub fn with_assemblers(mut self, assemblers: Vec<Box<dyn Assembler>>) -> Self {
        self.assemblers = assemblers;
        self
    }

    /// Generates the descriptor for `publish_dir`.
    ///
    /// # Errors
    ///
    /// Fails when the publish directory cannot be scanned, an entry name
    /// yields no identifier, or the finished layout violates feature
    /// coverage. Missing optional inputs are reported as warnings instead.
    pub fn generate(&self, config: &Configuration, publish_dir: &Path) -> Result<Generation> {
        let tree = scan::scan(publish_dir)?;

        let registry = match self.seed {
            Some(seed) => IdentifierRegistry::with_seed(seed),
            None => IdentifierRegistry::new(),
        };
        let mut ctx = GenerationContext::new(registry);
        for warning in &tree.warnings {
            ctx.warn(warning.clone());
        }

        let upgrade_code = match config.upgrade_code() {
            Some(code) => {
                ctx.registry.reserve_guid(code);
                code
            }
            None => {
                let seed = format!("{}/{}", config.manufacturer(), config.product_name());
                let code = ctx.registry.allocate_stable(&seed);
                ctx.warn(Warning::DerivedUpgradeCode {
                    upgrade_code: code.hyphenated().to_string().to_uppercase(),
                });
                code
            }
        };
        let product_code = match config.product_code() {
            Some(code) => {
                ctx.registry.reserve_guid(code);
                code
            }
            None => ctx.registry.allocate_guid(),
        };

        let mut layout = mapper::map(&tree, config, &mut ctx)?;
        for assembler in &self.assemblers {
            log::debug!("Assembling {}", assembler.name());
            assembler.assemble(&mut layout, config, &mut ctx)?;
        }

        let package = PackageMetadata {
            product_code,
            upgrade_code,
            ui: resources::resolve_ui_resources(config, &mut ctx),
        };
        let document = emit::emit(&layout, config, &package)?;
        let summary = GenerationSummary::of(&layout);
        log::info!("Generated descriptor: {summary}");

        Ok(Generation {
            document,
            product_code,
            upgrade_code,
            namespaces: Namespaces::required(&layout, config),
            warnings: ctx.into_warnings(),
            summary,
        })
    }
}

/// Generates with the default pipeline.
///
/// # Errors
///
/// See [`Generator::generate`].
pub fn generate(config: &Configuration, publish_dir: &Path) -> Result<Generation> {
    Generator::new().generate(config, publish_dir)
}
