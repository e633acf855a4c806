//! Desktop and start-menu shortcuts to the main executable.
//!
//! The desktop shortcut rides on the main executable's unit and points its
//! `Directory` at `DesktopFolder`. The start-menu shortcut lives in its own
//! registry-keyed unit inside `ProgramMenuFolder` (or a named folder below it,
//! which that unit removes on uninstall).

use super::{Assembler, main_unit, place_unit, require_main_executable};
use crate::wix::context::GenerationContext;
use crate::wix::error::Result;
use crate::wix::ids::Identifier;
use crate::wix::mapper::registry_keypath;
use crate::wix::model::{DirectoryNode, InstallUnit, Layout, MainExecutable, Shortcut};
use crate::wix::settings::Configuration;

/// Shortcut assembler.
pub struct Shortcuts;

impl Assembler for Shortcuts {
    fn name(&self) -> &'static str {
        "shortcuts"
    }

    fn assemble(
        &self,
        layout: &mut Layout,
        config: &Configuration,
        ctx: &mut GenerationContext,
    ) -> Result<()> {
        if !config.desktop_shortcut() && !config.start_menu_shortcut() {
            return Ok(());
        }
        let Some(main) = require_main_executable(layout, self.name(), ctx) else {
            return Ok(());
        };

        if config.desktop_shortcut() {
            add_desktop_shortcut(layout, config, ctx, &main)?;
        }
        if config.start_menu_shortcut() {
            add_start_menu_shortcut(layout, config, ctx, &main)?;
        }
        Ok(())
    }
}

fn shortcut(id: Identifier, config: &Configuration, main: &MainExecutable) -> Shortcut {
    Shortcut {
        id,
        name: config.product_name().to_string(),
        description: format!("Launch {}", config.product_name()),
        directory: None,
        target: main.file_id.clone(),
        working_directory: Identifier::well_known("INSTALLDIR"),
    }
}

fn add_desktop_shortcut(
    layout: &mut Layout,
    config: &Configuration,
    ctx: &mut GenerationContext,
    main: &MainExecutable,
) -> Result<()> {
    let desktop = layout.standard_dir_mut("DesktopFolder").id.clone();

    let mut entry = shortcut(ctx.registry.allocate("DesktopShortcut")?, config, main);
    entry.directory = Some(desktop);
    log::debug!("Desktop shortcut {} -> {}", entry.id, main.name);

    main_unit(layout, main)?.shortcuts.push(entry);
    Ok(())
}

fn add_start_menu_shortcut(
    layout: &mut Layout,
    config: &Configuration,
    ctx: &mut GenerationContext,
    main: &MainExecutable,
) -> Result<()> {
    let unit_id = ctx.registry.allocate_prefixed("Cmp_", "StartMenuShortcut")?;
    let mut unit = InstallUnit::registry_keyed(unit_id.clone(), registry_keypath(config, &unit_id));
    unit.shortcuts.push(shortcut(
        ctx.registry.allocate("StartMenuShortcut")?,
        config,
        main,
    ));

    let program_menu = layout.standard_dir_mut("ProgramMenuFolder");
    let directory = match config.start_menu_folder() {
        Some(folder) => {
            let id = Identifier::well_known("ShortcutFolder");
            if !program_menu.children.iter().any(|d| d.id == id) {
                program_menu
                    .children
                    .push(DirectoryNode::named(id.clone(), folder));
            }
            unit.remove_folders.push(ctx.registry.allocate("RemoveShortcutFolder")?);
            id
        }
        None => program_menu.id.clone(),
    };

    log::debug!("Start menu shortcut in {directory} -> {}", main.name);
    place_unit(layout, &directory, unit)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::wix::Warning;
    use crate::wix::model::KeyPath;

    #[test]
    fn test_desktop_shortcut_on_main_unit() {
        let config = builder().start_menu_shortcut(false).build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["app.dll", "app.exe"], &config);
        Shortcuts.assemble(&mut layout, &config, &mut ctx).unwrap();

        assert_eq!(layout.units().len(), 2);
        assert_eq!(layout.standard_dirs.len(), 1);
        assert_eq!(layout.standard_dirs[0].id.as_str(), "DesktopFolder");

        let main = layout.main_unit_mut().unwrap();
        assert_eq!(main.shortcuts.len(), 1);
        let shortcut = &main.shortcuts[0];
        assert_eq!(shortcut.target.as_str(), "File_app.exe");
        assert_eq!(shortcut.directory.as_ref().unwrap().as_str(), "DesktopFolder");
        assert!(matches!(main.keypath, KeyPath::File(_)));
    }

    #[test]
    fn test_start_menu_unit_is_registry_keyed() {
        let config = builder().desktop_shortcut(false).build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["app.exe"], &config);
        Shortcuts.assemble(&mut layout, &config, &mut ctx).unwrap();

        let menu = &layout.standard_dirs[0];
        assert_eq!(menu.id.as_str(), "ProgramMenuFolder");
        assert!(menu.children.is_empty());
        let unit = &menu.units[0];
        assert!(unit.files.is_empty());
        assert!(unit.remove_folders.is_empty());
        assert!(matches!(&unit.keypath, KeyPath::Registry(v) if v.root == "HKCU"));
        assert_eq!(unit.shortcuts[0].target.as_str(), "File_app.exe");
        assert!(layout.features[0].components.contains(&unit.id));
    }

    #[test]
    fn test_start_menu_folder_removed_on_uninstall() {
        let config = builder()
            .desktop_shortcut(false)
            .start_menu_folder("Acme Tools")
            .all_users(true)
            .build()
            .unwrap();
        let (mut layout, mut ctx) = layout_for(&["app.exe"], &config);
        Shortcuts.assemble(&mut layout, &config, &mut ctx).unwrap();

        let folder = &layout.standard_dirs[0].children[0];
        assert_eq!(folder.id.as_str(), "ShortcutFolder");
        assert_eq!(folder.name.as_deref(), Some("Acme Tools"));
        let unit = &folder.units[0];
        assert_eq!(unit.remove_folders.len(), 1);
        assert!(matches!(&unit.keypath, KeyPath::Registry(v) if v.root == "HKLM"));
    }

    #[test]
    fn test_no_executable_skips_shortcuts() {
        let config = builder().build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["readme.txt"], &config);
        Shortcuts.assemble(&mut layout, &config, &mut ctx).unwrap();

        assert!(layout.standard_dirs.is_empty());
        assert!(matches!(
            ctx.warnings(),
            [Warning::MissingMainExecutable { feature: "shortcuts" }]
        ));
    }
}
