//! Product icon registration.
//!
//! A configured icon is registered once at package level; shortcuts and the
//! add/remove-programs entry reference it. Without one, shortcuts show the
//! main executable's embedded icon and nothing is registered.

use super::Assembler;
use crate::wix::context::GenerationContext;
use crate::wix::error::Result;
use crate::wix::ids::Identifier;
use crate::wix::model::{IconResource, Layout};
use crate::wix::resources;
use crate::wix::settings::Configuration;

/// Icon assembler.
pub struct ProductIcon;

impl Assembler for ProductIcon {
    fn name(&self) -> &'static str {
        "icon"
    }

    fn assemble(
        &self,
        layout: &mut Layout,
        config: &Configuration,
        ctx: &mut GenerationContext,
    ) -> Result<()> {
        let Some(path) = config.icon() else {
            return Ok(());
        };

        if let Some(source) = resources::resolve_or_warn(self.name(), path, ctx) {
            log::debug!("Product icon {}", source.display());
            layout.icon = Some(IconResource {
                id: Identifier::well_known("ProductIcon"),
                source,
            });
        }
        Ok(())
    }
}
