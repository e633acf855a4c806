//! Runs the main executable once installation finishes.
//!
//! Scheduled after `InstallFinalize` and only on first install, never on
//! repair or uninstall. With a UI the launch is also gated on the
//! `LAUNCHAPPONEXIT` property so the finish dialog can turn it off.

use super::{Assembler, require_main_executable};
use crate::wix::context::GenerationContext;
use crate::wix::error::Result;
use crate::wix::ids::Identifier;
use crate::wix::model::{Layout, LaunchAction};
use crate::wix::settings::Configuration;

const INSTALL_ONLY: &str = "NOT Installed";
const UI_GATED: &str = "NOT Installed AND LAUNCHAPPONEXIT=1";

/// Post-install launch assembler.
pub struct LaunchAfterInstall;

impl Assembler for LaunchAfterInstall {
    fn name(&self) -> &'static str {
        "run after install"
    }

    fn assemble(
        &self,
        layout: &mut Layout,
        config: &Configuration,
        ctx: &mut GenerationContext,
    ) -> Result<()> {
        if !config.run_after_install() {
            return Ok(());
        }
        let Some(main) = require_main_executable(layout, self.name(), ctx) else {
            return Ok(());
        };

        let ui_property = config.ui_level().has_ui();
        layout.launch = Some(LaunchAction {
            id: Identifier::well_known("LaunchApplication"),
            target: main.file_id,
            condition: if ui_property { UI_GATED } else { INSTALL_ONLY }.to_string(),
            ui_property,
        });
        log::debug!("Launching {} after install", main.name);
        Ok(())
    }
}
