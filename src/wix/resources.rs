//! Resolution of user-supplied resource files.
//!
//! Icon, banner, dialog and license paths come straight from the user and are
//! often typed with the wrong case. A path that does not exist as written is
//! looked up case-insensitively in its directory before it is reported
//! missing. Missing resources are warnings, never errors.

use crate::wix::context::{GenerationContext, Warning};
use crate::wix::settings::{Configuration, LicenseMode};
use std::path::{Path, PathBuf};

/// Resource files referenced by the UI block.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UiResources {
    /// License RTF shown by the license dialog.
    pub license: Option<PathBuf>,
    /// Top banner bitmap.
    pub banner: Option<PathBuf>,
    /// Welcome/completion dialog bitmap.
    pub dialog: Option<PathBuf>,
}

/// File name of the generated license, relative to the output directory.
pub fn license_file_name(product_name: &str) -> String {
    format!("{product_name}_License.rtf")
}

/// Resolves `path`, falling back to a case-insensitive match of its file name.
///
/// Returns `None` when no file matches.
pub fn resolve(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    let wanted = path.file_name()?.to_str()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
        })
        .map(|entry| entry.path())
        .filter(|candidate| candidate.is_file())
        .collect();
    matches.sort();

    let found = matches.into_iter().next()?;
    log::debug!("Resolved {} as {}", path.display(), found.display());
    Some(found)
}

/// Resolves a configured resource, recording a warning when it is missing.
pub fn resolve_or_warn(
    kind: &'static str,
    path: &Path,
    ctx: &mut GenerationContext,
) -> Option<PathBuf> {
    let resolved = resolve(path);
    if resolved.is_none() {
        ctx.warn(Warning::MissingResource {
            kind,
            path: path.to_path_buf(),
        });
    }
    resolved
}

/// Resolves the license and bitmaps for the UI block.
///
/// Nothing is resolved when the configuration has no UI. A generated license
/// is referenced by name; it is written next to the descriptor later.
pub fn resolve_ui_resources(config: &Configuration, ctx: &mut GenerationContext) -> UiResources {
    if !config.ui_level().has_ui() {
        return UiResources::default();
    }

    let license = match config.license() {
        LicenseMode::Generate => Some(PathBuf::from(license_file_name(config.product_name()))),
        LicenseMode::File(path) => resolve_or_warn("license", path, ctx),
        LicenseMode::None => None,
    };

    UiResources {
        license,
        banner: config
            .banner_image()
            .and_then(|path| resolve_or_warn("banner", path, ctx)),
        dialog: config
            .dialog_image()
            .and_then(|path| resolve_or_warn("dialog", path, ctx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wix::ids::IdentifierRegistry;
    use crate::wix::settings::{ConfigurationBuilder, UiLevel};
    use std::fs;

    #[cfg(target_os = "linux")]
    #[test]
    fn test_resolve_exact_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("App.ICO");
        fs::write(&icon, b"").unwrap();

        assert_eq!(resolve(&icon), Some(icon.clone()));
        assert_eq!(resolve(&dir.path().join("app.ico")), Some(icon));
        assert_eq!(resolve(&dir.path().join("other.ico")), None);
        assert_eq!(resolve(&dir.path().join("missing/app.ico")), None);
    }

    #[test]
    fn test_ui_resources() {
        let dir = tempfile::tempdir().unwrap();
        let banner = dir.path().join("banner.bmp");
        fs::write(&banner, b"").unwrap();

        let config = ConfigurationBuilder::new()
            .product_name("MyApp")
            .version("1.0")
            .manufacturer("Acme")
            .banner_image(&banner)
            .dialog_image(dir.path().join("dialog.bmp"))
            .build()
            .unwrap();
        let mut ctx = GenerationContext::new(IdentifierRegistry::with_seed(1));
        let resources = resolve_ui_resources(&config, &mut ctx);

        assert_eq!(resources.license, Some(PathBuf::from("MyApp_License.rtf")));
        assert_eq!(resources.banner, Some(banner));
        assert_eq!(resources.dialog, None);
        assert!(matches!(
            ctx.warnings(),
            [Warning::MissingResource { kind: "dialog", .. }]
        ));
    }

    #[test]
    fn test_no_ui_skips_resources() {
        let config = ConfigurationBuilder::new()
            .product_name("MyApp")
            .version("1.0")
            .manufacturer("Acme")
            .ui_level(UiLevel::None)
            .banner_image("missing.bmp")
            .build()
            .unwrap();
        let mut ctx = GenerationContext::new(IdentifierRegistry::with_seed(1));
        assert_eq!(resolve_ui_resources(&config, &mut ctx), UiResources::default());
        assert!(ctx.warnings().is_empty());
    }
}
