//! File-type associations.
//!
//! Every configured extension becomes a ProgId on the main executable's unit
//! whose open verb runs the executable with the document path.

use super::{Assembler, main_unit, require_main_executable};
use crate::wix::context::GenerationContext;
use crate::wix::error::Result;
use crate::wix::model::{Association, Layout};
use crate::wix::settings::Configuration;

/// Association assembler.
pub struct FileAssociations;

impl Assembler for FileAssociations {
    fn name(&self) -> &'static str {
        "file associations"
    }

    fn assemble(
        &self,
        layout: &mut Layout,
        config: &Configuration,
        ctx: &mut GenerationContext,
    ) -> Result<()> {
        if config.file_associations().is_empty() {
            return Ok(());
        }
        let Some(main) = require_main_executable(layout, self.name(), ctx) else {
            return Ok(());
        };

        let product = config.product_name();
        let mut added = Vec::new();
        for extension in config.file_associations() {
            let already = main_unit(layout, &main)?
                .associations
                .iter()
                .any(|a| a.extension.eq_ignore_ascii_case(extension));
            if already {
                continue;
            }

            let prog_id = ctx
                .registry
                .allocate(&format!("{product}.{extension}"))?;
            log::debug!(".{extension} -> {prog_id} -> {}", main.name);
            added.push(Association {
                prog_id,
                extension: extension.clone(),
                description: format!("{product} {} File", extension.to_ascii_uppercase()),
                target: main.file_id.clone(),
            });
        }

        main_unit(layout, &main)?.associations.extend(added);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::wix::Warning;

    #[test]
    fn test_one_association_per_extension() {
        let config = builder().file_associations(".abc,.xyz").build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["app.exe", "helper.dll"], &config);
        FileAssociations.assemble(&mut layout, &config, &mut ctx).unwrap();
        FileAssociations.assemble(&mut layout, &config, &mut ctx).unwrap();

        let main = layout.main_unit_mut().unwrap();
        assert_eq!(main.associations.len(), 2);
        let first = &main.associations[0];
        assert_eq!(first.extension, "abc");
        assert_eq!(first.prog_id.as_str(), "MyApp.abc");
        assert_eq!(first.description, "MyApp ABC File");
        assert!(main.associations.iter().all(|a| a.target.as_str() == "File_app.exe"));
    }

    #[test]
    fn test_no_executable_reports() {
        let config = builder().file_associations(".abc").build().unwrap();
        let (mut layout, mut ctx) = layout_for(&["lib.dll"], &config);
        FileAssociations.assemble(&mut layout, &config, &mut ctx).unwrap();

        assert!(layout.units().iter().all(|u| u.associations.is_empty()));
        assert!(matches!(
            ctx.warnings(),
            [Warning::MissingMainExecutable { feature: "file associations" }]
        ));
    }
}
