//! Maps a scanned publish directory onto the installer directory structure.
//!
//! The scan root becomes `INSTALLDIR`; every subdirectory becomes a nested
//! directory with its own identifier. Each file is wrapped in exactly one
//! unit keyed by that file. Directories left without content get a
//! registry-keyed unit that creates them, so the installer still does.
//!
//! Identifiers are derived from entry names in tree order, so mapping the
//! same tree twice yields the same structure.

use crate::wix::context::{GenerationContext, Warning};
use crate::wix::error::Result;
use crate::wix::ids::Identifier;
use crate::wix::model::{
    DirectoryNode, FileEntry, InstallUnit, Layout, MainExecutable, RegistryValue,
};
use crate::wix::scan::{FileSystemNode, ScannedTree};
use crate::wix::settings::Configuration;
use std::path::PathBuf;

/// Extension of files eligible as the main executable.
pub const EXECUTABLE_EXTENSION: &str = "exe";

/// Maps `tree` into a [`Layout`] whose single feature references every unit.
///
/// # Errors
///
/// Returns an identifier error when an entry name has no usable characters.
pub fn map(tree: &ScannedTree, config: &Configuration, ctx: &mut GenerationContext) -> Result<Layout> {
    let mut install_dir = DirectoryNode::named(
        Identifier::well_known("INSTALLDIR"),
        config.install_dir_name(),
    );
    install_dir.relative_path = Some(PathBuf::new());

    map_directory(&tree.root, tree, config, ctx, &mut install_dir)?;

    let main_executable = detect_main_executable(&install_dir, config, ctx);
    if let Some(main) = &main_executable {
        log::info!("Main executable: {}", main.name);
    }

    let mut layout = Layout::new(install_dir, config.product_name());
    layout.main_executable = main_executable;

    log::info!(
        "Mapped {} component(s) in {} director(ies)",
        layout.units().len(),
        layout.install_dir.directory_count()
    );
    Ok(layout)
}

fn map_directory(
    node: &FileSystemNode,
    tree: &ScannedTree,
    config: &Configuration,
    ctx: &mut GenerationContext,
    out: &mut DirectoryNode,
) -> Result<()> {
    for file in node.files() {
        if config.is_excluded(&file.relative_path) {
            log::debug!("Excluding {}", file.relative_path.display());
            continue;
        }

        let entry = FileEntry {
            id: ctx.registry.allocate_prefixed("File_", &file.name)?,
            name: file.name.clone(),
            source: tree.source_path(file),
            relative_path: file.relative_path.clone(),
        };
        let unit_id = ctx.registry.allocate_prefixed("Cmp_", &file.name)?;
        log::debug!("{} -> {}", file.relative_path.display(), unit_id);
        out.units.push(InstallUnit::for_file(unit_id, entry));
    }

    for dir in node.directories() {
        let mut child = DirectoryNode::named(
            ctx.registry.allocate_prefixed("Dir_", &dir.name)?,
            dir.name.clone(),
        );
        child.relative_path = Some(dir.relative_path.clone());
        map_directory(dir, tree, config, ctx, &mut child)?;

        if child.units.is_empty() && child.children.is_empty() {
            let unit_id = ctx.registry.allocate_prefixed("Cmp_", &dir.name)?;
            let mut unit = InstallUnit::registry_keyed(unit_id.clone(), registry_keypath(config, &unit_id));
            unit.create_folder = true;
            log::debug!("Empty directory {} -> {}", dir.relative_path.display(), unit_id);
            child.units.push(unit);
        }

        out.children.push(child);
    }

    Ok(())
}

/// Registry value keying a payload-less unit, in the hive matching the install scope.
pub(crate) fn registry_keypath(config: &Configuration, unit_id: &Identifier) -> RegistryValue {
    RegistryValue {
        root: config.install_scope().registry_root(),
        key: config.registry_key(),
        name: unit_id.to_string(),
    }
}

fn is_executable(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXECUTABLE_EXTENSION))
}

fn main_from(unit: &InstallUnit) -> Option<MainExecutable> {
    let file = unit.file()?;
    Some(MainExecutable {
        file_id: file.id.clone(),
        unit_id: unit.id.clone(),
        name: file.name.clone(),
    })
}

/// Picks the main executable among the root's files.
///
/// A configured name wins when present. Otherwise the first root file with
/// the executable extension in lexical order is used; more than one
/// candidate is reported.
fn detect_main_executable(
    root: &DirectoryNode,
    config: &Configuration,
    ctx: &mut GenerationContext,
) -> Option<MainExecutable> {
    if let Some(name) = config.main_executable() {
        let configured = root
            .units
            .iter()
            .find(|u| u.file().is_some_and(|f| f.name.eq_ignore_ascii_case(name)));
        if let Some(unit) = configured {
            return main_from(unit);
        }
        ctx.warn(Warning::ConfiguredExecutableNotFound {
            name: name.to_string(),
        });
    }

    let candidates: Vec<&InstallUnit> = root
        .units
        .iter()
        .filter(|u| u.file().is_some_and(|f| is_executable(&f.name)))
        .collect();

    let chosen = main_from(candidates.first()?)?;
    if candidates.len() > 1 {
        ctx.warn(Warning::AmbiguousMainExecutable {
            chosen: chosen.name.clone(),
            candidates: candidates
                .iter()
                .filter_map(|u| u.file())
                .map(|f| f.name.clone())
                .collect(),
        });
    }
    Some(chosen)
}
