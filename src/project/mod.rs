//! Sibling artifacts of the installer descriptor.
//!
//! Next to `<product>.wxs` the output directory receives an SDK-style
//! `<product>.wixproj`, a `README.md` with build instructions and, when the
//! UI shows a generated license, `<product>_License.rtf`. All of them are
//! rendered from embedded handlebars templates and written atomically.

use crate::error::Result;
use crate::utils::fs::write_atomic;
use crate::wix::resources::license_file_name;
use crate::wix::{Configuration, Generation, LicenseMode, Namespaces};
use chrono::NaiveDate;
use handlebars::Handlebars;
use serde_json::json;
use std::path::{Path, PathBuf};

const WIXPROJ_TEMPLATE: &str = include_str!("templates/wixproj.hbs");
const README_TEMPLATE: &str = include_str!("templates/readme.hbs");
const LICENSE_TEMPLATE: &str = include_str!("templates/license.rtf.hbs");

/// WiX SDK and extension package version referenced by the project file.
pub const TOOLSET_VERSION: &str = "6.0.0";

/// UI extension package.
pub const UI_EXTENSION: &str = "WixToolset.UI.wixext";

/// Util extension package.
pub const UTIL_EXTENSION: &str = "WixToolset.Util.wixext";

/// A rendered output file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    /// File name relative to the output directory.
    pub file_name: String,
    /// File contents.
    pub contents: String,
}

/// Descriptor file name for a product.
pub fn wxs_file_name(product_name: &str) -> String {
    format!("{product_name}.wxs")
}

/// Extension packages needed to build a descriptor using `namespaces`.
pub fn extensions(namespaces: &Namespaces) -> Vec<&'static str> {
    let mut out = Vec::new();
    if namespaces.ui {
        out.push(UI_EXTENSION);
    }
    if namespaces.util {
        out.push(UTIL_EXTENSION);
    }
    out
}

/// Renders project files from the embedded templates.
pub struct ProjectRenderer {
    templates: Handlebars<'static>,
}

impl ProjectRenderer {
    /// Registers the embedded templates.
    pub fn new() -> Result<Self> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(true);
        // Values are escaped per target format before rendering.
        templates.register_escape_fn(handlebars::no_escape);
        templates.register_template_string("wixproj", WIXPROJ_TEMPLATE)?;
        templates.register_template_string("readme", README_TEMPLATE)?;
        templates.register_template_string("license", LICENSE_TEMPLATE)?;
        Ok(Self { templates })
    }

    /// `<product>.wixproj`
    pub fn wixproj(&self, config: &Configuration, namespaces: &Namespaces) -> Result<Artifact> {
        let data = json!({
            "toolset_version": TOOLSET_VERSION,
            "output_name": xml_escape(config.product_name()),
            "wxs_file": xml_escape(&wxs_file_name(config.product_name())),
            "extensions": extensions(namespaces),
        });
        Ok(Artifact {
            file_name: format!("{}.wixproj", config.product_name()),
            contents: self.templates.render("wixproj", &data)?,
        })
    }

    /// `README.md`
    pub fn readme(&self, config: &Configuration, namespaces: &Namespaces) -> Result<Artifact> {
        let data = json!({
            "product_name": config.product_name(),
            "version": config.version(),
            "wxs_file": wxs_file_name(config.product_name()),
            "extensions": extensions(namespaces),
        });
        Ok(Artifact {
            file_name: "README.md".to_string(),
            contents: self.templates.render("readme", &data)?,
        })
    }

    /// Standard commercial license naming the manufacturer and product,
    /// effective on `date`.
    pub fn license(&self, config: &Configuration, date: NaiveDate) -> Result<Artifact> {
        let data = json!({
            "company": rtf_escape(config.manufacturer()),
            "product": rtf_escape(config.product_name()),
            "date": date.format("%B %d, %Y").to_string(),
        });
        Ok(Artifact {
            file_name: license_file_name(config.product_name()),
            contents: self.templates.render("license", &data)?,
        })
    }

    /// Every file of the project: descriptor, project file, readme and,
    /// when the UI shows a generated license, the license.
    pub fn render_all(
        &self,
        config: &Configuration,
        generation: &Generation,
        date: NaiveDate,
    ) -> Result<Vec<Artifact>> {
        let mut artifacts = vec![
            Artifact {
                file_name: wxs_file_name(config.product_name()),
                contents: generation.document.clone(),
            },
            self.wixproj(config, &generation.namespaces)?,
            self.readme(config, &generation.namespaces)?,
        ];
        if config.ui_level().has_ui() && *config.license() == LicenseMode::Generate {
            artifacts.push(self.license(config, date)?);
        }
        Ok(artifacts)
    }
}

/// Writes `artifacts` into `output_dir`, replacing existing files.
///
/// Returns the paths written, in order.
pub async fn write_artifacts(output_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = output_dir.join(&artifact.file_name);
        write_atomic(&path, &artifact.contents).await?;
        written.push(path);
    }
    Ok(written)
}

fn xml_escape(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}

/// Escapes RTF control characters; non-ASCII becomes `\uN?`.
fn rtf_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF takes signed 16-bit code units
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wix::{ConfigurationBuilder, UiLevel};

    fn config(ui: UiLevel) -> Configuration {
        ConfigurationBuilder::new()
            .product_name("MyApp")
            .version("1.2.3")
            .manufacturer("Acme & Sons")
            .ui_level(ui)
            .build()
            .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_wixproj_references_used_extensions_only() {
        let renderer = ProjectRenderer::new().unwrap();
        let ns = Namespaces {
            ui: false,
            util: true,
        };
        let project = renderer.wixproj(&config(UiLevel::None), &ns).unwrap();

        assert_eq!(project.file_name, "MyApp.wixproj");
        assert!(project.contents.starts_with("<Project Sdk=\"WixToolset.Sdk/6.0.0\">"));
        assert!(project.contents.contains("<OutputName>MyApp</OutputName>"));
        assert!(project.contents.contains("<OutputPath>bin\\</OutputPath>"));
        assert!(project.contents.contains("<Compile Include=\"MyApp.wxs\" />"));
        assert!(project
            .contents
            .contains("<WixExtension Include=\"WixToolset.Util.wixext\" />"));
        assert!(project.contents.contains(
            "<PackageReference Include=\"WixToolset.Util.wixext\" Version=\"6.0.0\" />"
        ));
        assert!(!project.contents.contains("WixToolset.UI.wixext"));
    }

    #[test]
    fn test_wixproj_without_extensions() {
        let renderer = ProjectRenderer::new().unwrap();
        let project = renderer
            .wixproj(&config(UiLevel::None), &Namespaces::default())
            .unwrap();
        assert!(!project.contents.contains("WixExtension"));
        assert!(project.contents.trim_end().ends_with("</Project>"));
    }

    #[test]
    fn test_readme_build_command() {
        let renderer = ProjectRenderer::new().unwrap();
        let ns = Namespaces {
            ui: true,
            util: true,
        };
        let readme = renderer.readme(&config(UiLevel::Full), &ns).unwrap();
        assert!(readme.contents.starts_with("# MyApp Installer Project"));
        assert!(readme.contents.contains(
            "wix build -ext WixToolset.UI.wixext -ext WixToolset.Util.wixext MyApp.wxs"
        ));
    }

    #[test]
    fn test_license_is_escaped_and_dated() {
        let renderer = ProjectRenderer::new().unwrap();
        let config = ConfigurationBuilder::new()
            .product_name("App{X}")
            .version("1.0")
            .manufacturer("Café")
            .build()
            .unwrap();
        let license = renderer.license(&config, date()).unwrap();

        assert_eq!(license.file_name, "App{X}_License.rtf");
        assert!(license.contents.starts_with("{\\rtf1\\ansi"));
        assert!(license.contents.contains("SOFTWARE LICENSE AGREEMENT"));
        assert!(license.contents.contains("product App\\{X\\} "));
        assert!(license.contents.contains("Caf\\u233?"));
        assert!(license.contents.contains("effective as of March 05, 2024."));
        assert!(license.contents.trim_end().ends_with('}'));
    }

    #[test]
    fn test_rtf_escape_surrogates() {
        assert_eq!(rtf_escape("a\\b"), "a\\\\b");
        assert_eq!(rtf_escape("😀"), "\\u-10179?\\u-8704?");
    }

    #[tokio::test]
    async fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![
            Artifact {
                file_name: "a.txt".into(),
                contents: "one".into(),
            },
            Artifact {
                file_name: "b.txt".into(),
                contents: "two".into(),
            },
        ];
        let written = write_artifacts(&dir.path().join("out"), &artifacts)
            .await
            .unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), "two");
    }
}
