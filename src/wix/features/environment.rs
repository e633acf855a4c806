//! Appends the install directory to `PATH`.
//!
//! The entry rides on the main executable's unit so it is installed and
//! removed with the application. Without a main executable it gets its own
//! registry-keyed unit in `INSTALLDIR`. The user or system environment is
//! edited to match the install scope.

use super::{Assembler, place_unit};
use crate::wix::context::GenerationContext;
use crate::wix::error::Result;
use crate::wix::ids::Identifier;
use crate::wix::mapper::registry_keypath;
use crate::wix::model::{EnvironmentEntry, InstallUnit, Layout};
use crate::wix::settings::Configuration;

const VARIABLE: &str = "PATH";
const VALUE: &str = "[INSTALLDIR]";

/// PATH assembler.
pub struct PathEnvironment;

impl Assembler for PathEnvironment {
    fn name(&self) -> &'static str {
        "PATH"
    }

    fn assemble(
        &self,
        layout: &mut Layout,
        config: &Configuration,
        ctx: &mut GenerationContext,
    ) -> Result<()> {
        if !config.add_to_path() {
            return Ok(());
        }

        let system = config.install_scope().is_system();

        if let Some(unit) = layout.main_unit_mut() {
            if has_path_entry(unit) {
                log::debug!("{} already appends to {VARIABLE}", unit.id);
                return Ok(());
            }
            let entry = path_entry(ctx.registry.allocate("Env_PATH")?, system);
            log::debug!("{VARIABLE} append on {}", unit.id);
            unit.environment.push(entry);
            return Ok(());
        }

        if let Some(unit) = layout.units().into_iter().find(|u| has_path_entry(u)) {
            log::debug!("{} already appends to {VARIABLE}", unit.id);
            return Ok(());
        }

        let unit_id = ctx.registry.allocate_prefixed("Cmp_", "EnvironmentPath")?;
        let mut unit = InstallUnit::registry_keyed(unit_id.clone(), registry_keypath(config, &unit_id));
        unit.environment
            .push(path_entry(ctx.registry.allocate("Env_PATH")?, system));
        log::debug!("{VARIABLE} append on dedicated unit {unit_id}");
        place_unit(layout, &Identifier::well_known("INSTALLDIR"), unit)
    }
}

fn path_entry(id: Identifier, system: bool) -> EnvironmentEntry {
    EnvironmentEntry {
        id,
        name: VARIABLE.to_string(),
        value: VALUE.to_string(),
        system,
    }
}

fn has_path_entry(unit: &InstallUnit) -> bool {
    unit.environment
        .iter()
        .any(|e| e.name.eq_ignore_ascii_case(VARIABLE) && e.value == VALUE)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::wix::model::KeyPath;

    #[test]
    fn test_path_on_main_unit_is_idempotent() {
        let config = builder().add_to_path(true).build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["app.exe"], &config);
        PathEnvironment.assemble(&mut layout, &config, &mut ctx).unwrap();
        PathEnvironment.assemble(&mut layout, &config, &mut ctx).unwrap();

        assert_eq!(layout.units().len(), 1);
        let main = layout.main_unit_mut().unwrap();
        assert_eq!(main.environment.len(), 1);
        let entry = &main.environment[0];
        assert_eq!(entry.name, "PATH");
        assert_eq!(entry.value, "[INSTALLDIR]");
        assert!(!entry.system);
    }

    #[test]
    fn test_path_scope_follows_install_scope() {
        let config = builder().add_to_path(true).all_users(true).build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["app.exe"], &config);
        PathEnvironment.assemble(&mut layout, &config, &mut ctx).unwrap();
        assert!(layout.main_unit_mut().unwrap().environment[0].system);
    }

    #[test]
    fn test_path_without_executable_uses_dedicated_unit() {
        let config = builder().add_to_path(true).build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["tool.dll"], &config);
        PathEnvironment.assemble(&mut layout, &config, &mut ctx).unwrap();
        PathEnvironment.assemble(&mut layout, &config, &mut ctx).unwrap();

        let units = layout.units();
        assert_eq!(units.len(), 2);
        let entries: usize = units.iter().map(|u| u.environment.len()).sum();
        assert_eq!(entries, 1);
        let dedicated = units.iter().find(|u| u.files.is_empty()).unwrap();
        assert_eq!(dedicated.environment.len(), 1);
        assert_eq!(layout.features[0].components.len(), 2);
        assert!(matches!(&dedicated.keypath, KeyPath::Registry(_)));
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_disabled() {
        let config = builder().build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["app.exe"], &config);
        PathEnvironment.assemble(&mut layout, &config, &mut ctx).unwrap();
        assert!(layout.main_unit_mut().unwrap().environment.is_empty());
    }
}
