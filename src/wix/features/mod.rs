//! Optional installer behaviors layered onto the mapped layout.
//!
//! Each feature is an [`Assembler`]: it reads the configuration and the
//! layout produced by the mapper and adds entries to it. Assemblers do not
//! depend on each other, so applying them in a different order only changes
//! the order of entries inside a unit.
//!
//! | Assembler | Adds |
//! |-----------|------|
//! | [`Shortcuts`] | desktop shortcut on the main unit, start-menu unit |
//! | [`PathEnvironment`] | `PATH` append on the main unit |
//! | [`FileAssociations`] | ProgId + extension + open verb per extension |
//! | [`ProductIcon`] | package icon and add/remove-programs icon |
//! | [`LaunchAfterInstall`] | post-install custom action |
//!
//! A feature whose prerequisite is missing is skipped with a
//! [`Warning`](crate::wix::Warning); assemblers only fail on identifier or
//! layout errors.

mod associations;
mod environment;
mod icon;
mod launch;
mod shortcuts;

pub use associations::FileAssociations;
pub use environment::PathEnvironment;
pub use icon::ProductIcon;
pub use launch::LaunchAfterInstall;
pub use shortcuts::Shortcuts;

use crate::wix::context::{GenerationContext, Warning};
use crate::wix::error::{Error, Result};
use crate::wix::ids::Identifier;
use crate::wix::model::{InstallUnit, Layout, MainExecutable};
use crate::wix::settings::Configuration;

/// One optional installer behavior.
pub trait Assembler {
    /// Short name used in logs and warnings.
    fn name(&self) -> &'static str;

    /// Extends `layout` according to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error only for identifier allocation failures or a layout
    /// that lacks a directory the assembler placed itself.
    fn assemble(
        &self,
        layout: &mut Layout,
        config: &Configuration,
        ctx: &mut GenerationContext,
    ) -> Result<()>;
}

/// All assemblers, in the order the generator applies them.
pub fn default_assemblers() -> Vec<Box<dyn Assembler>> {
    vec![
        Box::new(ProductIcon),
        Box::new(Shortcuts),
        Box::new(PathEnvironment),
        Box::new(FileAssociations),
        Box::new(LaunchAfterInstall),
    ]
}

/// Returns the main executable, or records that `feature` was skipped.
fn require_main_executable(
    layout: &Layout,
    feature: &'static str,
    ctx: &mut GenerationContext,
) -> Option<MainExecutable> {
    let main = layout.main_executable.clone();
    if main.is_none() {
        ctx.warn(Warning::MissingMainExecutable { feature });
    }
    main
}

/// Places a unit, turning a missing directory into an error.
fn place_unit(layout: &mut Layout, directory: &Identifier, unit: InstallUnit) -> Result<()> {
    layout.add_unit(directory, unit).map_err(|unit| {
        Error::Layout(format!(
            "cannot place component {}: directory {directory} does not exist",
            unit.id
        ))
    })
}

/// Runs the main unit lookup, turning a dangling reference into an error.
fn main_unit<'a>(layout: &'a mut Layout, main: &MainExecutable) -> Result<&'a mut InstallUnit> {
    layout.find_unit_mut(&main.unit_id).ok_or_else(|| {
        Error::Layout(format!(
            "main executable component {} is not in the layout",
            main.unit_id
        ))
    })
}
