//! Descriptor serialization.
//!
//! Turns a finished [`Layout`] plus package metadata into the `.wxs` text.
//! The document layout is fixed:
//!
//! ```text
//! Wix (base namespace, ui/util only when used)
//! └── Package
//!     ├── MajorUpgrade, MediaTemplate
//!     ├── Icon + ARPPRODUCTICON          (icon configured)
//!     ├── StandardDirectory ProgramFiles6432Folder
//!     │   └── ManufacturerFolder / INSTALLDIR / ...
//!     ├── StandardDirectory ...          (desktop, program menu)
//!     ├── Feature ProductFeature         (one ComponentRef per component)
//!     ├── UI block                       (ui level != none)
//!     └── launch custom action           (run after install)
//! ```
//!
//! Coverage is verified before anything is serialized.

mod coverage;
mod element;

pub use coverage::verify_coverage;
pub use element::Element;

use crate::wix::error::{Error, Result};
use crate::wix::ids::format_guid;
use crate::wix::model::{
    Association, DirectoryNode, EnvironmentEntry, InstallUnit, KeyPath, Layout, Shortcut,
};
use crate::wix::resources::UiResources;
use crate::wix::settings::{Configuration, UiLevel};
use uuid::Uuid;

/// Base schema namespace.
pub const WIX_NAMESPACE: &str = "http://wixtoolset.org/schemas/v4/wxs";
/// UI extension namespace.
pub const UI_NAMESPACE: &str = "http://wixtoolset.org/schemas/v4/wxs/ui";
/// Util extension namespace.
pub const UTIL_NAMESPACE: &str = "http://wixtoolset.org/schemas/v4/wxs/util";

/// Package-level values resolved by the generator.
#[derive(Clone, Debug)]
pub struct PackageMetadata {
    /// Product identity of this build.
    pub product_code: Uuid,
    /// Upgrade identity shared by all versions.
    pub upgrade_code: Uuid,
    /// UI resources, already resolved.
    pub ui: UiResources,
}

/// Extension schemas a document uses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Namespaces {
    /// `xmlns:ui` is declared.
    pub ui: bool,
    /// `xmlns:util` is declared.
    pub util: bool,
}

impl Namespaces {
    /// Namespaces required by `layout` under `config`.
    pub fn required(layout: &Layout, config: &Configuration) -> Self {
        let util = layout.launch.is_some()
            || layout
                .units()
                .iter()
                .any(|u| !u.environment.is_empty() || !u.associations.is_empty());
        Self {
            ui: config.ui_level().has_ui(),
            util,
        }
    }
}

/// Serializes `layout` into descriptor text.
///
/// # Errors
///
/// Returns [`Error::Coverage`] when a component would be left out of every
/// feature, [`Error::Layout`] when a unit breaks the keying rules, and
/// [`Error::Xml`] when serialization fails.
pub fn emit(layout: &Layout, config: &Configuration, package: &PackageMetadata) -> Result<String> {
    verify_coverage(layout)?;
    for unit in layout.units() {
        unit.validate().map_err(Error::Layout)?;
    }

    let text = document(layout, config, package).to_document()?;
    log::debug!("Serialized descriptor ({} bytes)", text.len());
    Ok(text)
}

/// Builds the element tree of the descriptor without serializing it.
pub fn document(layout: &Layout, config: &Configuration, package: &PackageMetadata) -> Element {
    let namespaces = Namespaces::required(layout, config);
    let icon = layout.icon.as_ref().map(|icon| icon.id.as_str());

    let mut root = Element::new("Wix").attr("xmlns", WIX_NAMESPACE);
    if namespaces.ui {
        root = root.attr("xmlns:ui", UI_NAMESPACE);
    }
    if namespaces.util {
        root = root.attr("xmlns:util", UTIL_NAMESPACE);
    }

    let mut pkg = Element::new("Package")
        .attr("Name", config.product_name())
        .attr("Manufacturer", config.manufacturer())
        .attr("Version", config.version())
        .attr("UpgradeCode", format_guid(&package.upgrade_code))
        .attr("ProductCode", format_guid(&package.product_code))
        .attr("Scope", config.install_scope().package_scope())
        .child(
            Element::new("MajorUpgrade").attr(
                "DowngradeErrorMessage",
                "A newer version of [ProductName] is already installed.",
            ),
        )
        .child(Element::new("MediaTemplate").attr("EmbedCab", "yes"));

    if let Some(registered) = &layout.icon {
        pkg.push(
            Element::new("Icon")
                .attr("Id", registered.id.as_str())
                .attr("SourceFile", registered.source.display().to_string()),
        );
        pkg.push(property("ARPPRODUCTICON", registered.id.as_str()));
    }

    pkg.push(
        Element::new("StandardDirectory")
            .attr("Id", "ProgramFiles6432Folder")
            .child(
                Element::new("Directory")
                    .attr("Id", "ManufacturerFolder")
                    .attr("Name", config.manufacturer())
                    .child(directory(&layout.install_dir, icon)),
            ),
    );
    for dir in &layout.standard_dirs {
        pkg.push(directory(dir, icon));
    }

    for feature in &layout.features {
        let mut element = Element::new("Feature")
            .attr("Id", feature.id.as_str())
            .attr("Title", feature.title.as_str())
            .attr("Level", feature.level.to_string());
        for component in &feature.components {
            element.push(Element::new("ComponentRef").attr("Id", component.as_str()));
        }
        pkg.push(element);
    }

    if namespaces.ui {
        ui_block(&mut pkg, config.ui_level(), &package.ui);
    }

    if let Some(launch) = &layout.launch {
        if launch.ui_property {
            pkg.push(property("LAUNCHAPPONEXIT", "1"));
        }
        pkg.push(property("WixShellExecTarget", launch.target.file_reference()));
        pkg.push(
            Element::new("CustomAction")
                .attr("Id", launch.id.as_str())
                .attr("BinaryRef", "Wix4UtilCA_X86")
                .attr("DllEntry", "WixShellExec")
                .attr("Impersonate", "yes"),
        );
        pkg.push(
            Element::new("InstallExecuteSequence").child(
                Element::new("Custom")
                    .attr("Action", launch.id.as_str())
                    .attr("After", "InstallFinalize")
                    .attr("Condition", launch.condition.as_str()),
            ),
        );
    }

    root.child(pkg)
}

fn property(id: &str, value: impl Into<String>) -> Element {
    Element::new("Property").attr("Id", id).attr("Value", value)
}

fn ui_block(pkg: &mut Element, level: UiLevel, resources: &UiResources) {
    match level {
        UiLevel::Full => {
            pkg.push(property("WIXUI_INSTALLDIR", "INSTALLDIR"));
            pkg.push(Element::new("ui:WixUI").attr("Id", "WixUI_InstallDir"));
        }
        UiLevel::Minimal => {
            pkg.push(Element::new("ui:WixUI").attr("Id", "WixUI_Minimal"));
        }
        UiLevel::None => return,
    }

    let variables = [
        ("WixUILicenseRtf", &resources.license),
        ("WixUIBannerBmp", &resources.banner),
        ("WixUIDialogBmp", &resources.dialog),
    ];
    for (id, path) in variables {
        if let Some(path) = path {
            pkg.push(
                Element::new("WixVariable")
                    .attr("Id", id)
                    .attr("Value", path.display().to_string()),
            );
        }
    }
}

fn directory(node: &DirectoryNode, icon: Option<&str>) -> Element {
    let mut element = match &node.name {
        Some(name) => Element::new("Directory")
            .attr("Id", node.id.as_str())
            .attr("Name", name.as_str()),
        None => Element::new("StandardDirectory").attr("Id", node.id.as_str()),
    };
    for unit in &node.units {
        element.push(component(unit, icon));
    }
    for child in &node.children {
        element.push(directory(child, icon));
    }
    element
}

fn component(unit: &InstallUnit, icon: Option<&str>) -> Element {
    let mut element = Element::new("Component")
        .attr("Id", unit.id.as_str())
        .attr("Guid", "*");

    for file in &unit.files {
        let keyed = matches!(&unit.keypath, KeyPath::File(id) if *id == file.id);
        element.push(
            Element::new("File")
                .attr("Id", file.id.as_str())
                .attr("Name", file.name.as_str())
                .attr("Source", file.source.display().to_string())
                .attr_opt("KeyPath", keyed.then_some("yes")),
        );
    }

    if let KeyPath::Registry(value) = &unit.keypath {
        element.push(
            Element::new("RegistryValue")
                .attr("Root", value.root)
                .attr("Key", value.key.as_str())
                .attr("Name", value.name.as_str())
                .attr("Type", "integer")
                .attr("Value", "1")
                .attr("KeyPath", "yes"),
        );
    }

    if unit.create_folder {
        element.push(Element::new("CreateFolder"));
    }
    for id in &unit.remove_folders {
        element.push(
            Element::new("RemoveFolder")
                .attr("Id", id.as_str())
                .attr("On", "uninstall"),
        );
    }
    for entry in &unit.shortcuts {
        element.push(shortcut(entry, icon));
    }
    for entry in &unit.environment {
        element.push(environment(entry));
    }
    for entry in &unit.associations {
        element.push(association(entry));
    }
    element
}

fn shortcut(entry: &Shortcut, icon: Option<&str>) -> Element {
    Element::new("Shortcut")
        .attr("Id", entry.id.as_str())
        .attr("Name", entry.name.as_str())
        .attr("Description", entry.description.as_str())
        .attr_opt("Directory", entry.directory.as_ref().map(|d| d.as_str()))
        .attr("Target", entry.target.file_reference())
        .attr("WorkingDirectory", entry.working_directory.as_str())
        .attr_opt("Icon", icon)
        .attr_opt("IconIndex", icon.map(|_| "0"))
}

fn environment(entry: &EnvironmentEntry) -> Element {
    Element::new("Environment")
        .attr("Id", entry.id.as_str())
        .attr("Name", entry.name.as_str())
        .attr("Value", entry.value.as_str())
        .attr("Part", "last")
        .attr("Action", "set")
        .attr("Permanent", "no")
        .attr("System", if entry.system { "yes" } else { "no" })
}

fn association(entry: &Association) -> Element {
    Element::new("ProgId")
        .attr("Id", entry.prog_id.as_str())
        .attr("Description", entry.description.as_str())
        .attr("Icon", entry.target.as_str())
        .attr("IconIndex", "0")
        .child(
            Element::new("Extension")
                .attr("Id", entry.extension.as_str())
                .attr("ContentType", "application/octet-stream")
                .child(
                    Element::new("Verb")
                        .attr("Id", "open")
                        .attr("Command", "Open")
                        .attr("TargetFile", entry.target.as_str())
                        .attr("Argument", "\"%1\""),
                ),
        )
}
