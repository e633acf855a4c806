//! Generation configuration.
//!
//! [`Configuration`] is the immutable input of one generation. It is only
//! obtainable through [`ConfigurationBuilder::build`], which performs all
//! validation up front so the rest of the pipeline can trust every field.
//!
//! # Examples
//!
//! ```no_run
//! use kodegen_bundler_wix::wix::{ConfigurationBuilder, UiLevel};
//!
//! # fn example() -> kodegen_bundler_wix::wix::Result<()> {
//! let config = ConfigurationBuilder::new()
//!     .product_name("MyApp")
//!     .version("1.2.0")
//!     .manufacturer("Example Inc.")
//!     .upgrade_code("{6A1B7F8E-5D0B-4C9B-9C1E-2E3A4B5C6D7E}")
//!     .ui_level(UiLevel::Minimal)
//!     .file_associations(".abc,.xyz")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::wix::error::ConfigurationError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// Installer UI dialog set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum UiLevel {
    /// Install-directory dialog sequence with license and folder selection.
    #[default]
    Full,
    /// Single license/confirm dialog.
    Minimal,
    /// No UI block at all.
    None,
}

impl UiLevel {
    /// Returns the lowercase name used in settings files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            UiLevel::Full => "full",
            UiLevel::Minimal => "minimal",
            UiLevel::None => "none",
        }
    }

    /// Whether a UI block is emitted for this level.
    pub fn has_ui(&self) -> bool {
        !matches!(self, UiLevel::None)
    }
}

impl fmt::Display for UiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(UiLevel::Full),
            "minimal" => Ok(UiLevel::Minimal),
            "none" => Ok(UiLevel::None),
            _ => Err(ConfigurationError::InvalidChoice {
                field: "ui_level",
                value: s.to_string(),
                expected: "full, minimal, none",
            }),
        }
    }
}

/// Where the license shown by the UI comes from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum LicenseMode {
    /// A license RTF is rendered next to the descriptor by the project writer.
    #[default]
    Generate,
    /// An existing RTF supplied by the user.
    File(PathBuf),
    /// No license dialog content.
    None,
}

/// Per-user vs per-machine installation target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InstallScope {
    /// Current user only; registry keypaths live in HKCU.
    PerUser,
    /// All users; requires elevation, registry keypaths live in HKLM.
    PerMachine,
}

impl InstallScope {
    /// Value of the package `Scope` attribute.
    pub fn package_scope(&self) -> &'static str {
        match self {
            InstallScope::PerUser => "perUser",
            InstallScope::PerMachine => "perMachine",
        }
    }

    /// Registry hive for keypath values.
    pub fn registry_root(&self) -> &'static str {
        match self {
            InstallScope::PerUser => "HKCU",
            InstallScope::PerMachine => "HKLM",
        }
    }

    /// Whether environment edits target the system environment.
    pub fn is_system(&self) -> bool {
        matches!(self, InstallScope::PerMachine)
    }
}

/// Validated, immutable generation input.
#[derive(Clone, Debug)]
pub struct Configuration {
    product_name: String,
    version: String,
    manufacturer: String,
    product_code: Option<Uuid>,
    upgrade_code: Option<Uuid>,
    install_dir_name: String,
    ui_level: UiLevel,
    license: LicenseMode,
    banner_image: Option<PathBuf>,
    dialog_image: Option<PathBuf>,
    icon: Option<PathBuf>,
    desktop_shortcut: bool,
    start_menu_shortcut: bool,
    start_menu_folder: Option<String>,
    all_users: bool,
    run_after_install: bool,
    add_to_path: bool,
    file_associations: Vec<String>,
    main_executable: Option<String>,
    exclude: Vec<glob::Pattern>,
}

impl Configuration {
    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Returns the product version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the manufacturer.
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// Product identity, if the caller pinned one.
    pub fn product_code(&self) -> Option<Uuid> {
        self.product_code
    }

    /// Upgrade identity, if the caller supplied one.
    pub fn upgrade_code(&self) -> Option<Uuid> {
        self.upgrade_code
    }

    /// Name of the install directory below the manufacturer folder.
    pub fn install_dir_name(&self) -> &str {
        &self.install_dir_name
    }

    /// Returns the UI level.
    pub fn ui_level(&self) -> UiLevel {
        self.ui_level
    }

    /// Returns the license mode.
    pub fn license(&self) -> &LicenseMode {
        &self.license
    }

    /// Returns the banner bitmap path.
    pub fn banner_image(&self) -> Option<&Path> {
        self.banner_image.as_deref()
    }

    /// Returns the dialog bitmap path.
    pub fn dialog_image(&self) -> Option<&Path> {
        self.dialog_image.as_deref()
    }

    /// Returns the product icon path.
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// Whether a desktop shortcut is requested.
    pub fn desktop_shortcut(&self) -> bool {
        self.desktop_shortcut
    }

    /// Whether a start-menu shortcut is requested.
    pub fn start_menu_shortcut(&self) -> bool {
        self.start_menu_shortcut
    }

    /// Optional start-menu folder holding the shortcut.
    pub fn start_menu_folder(&self) -> Option<&str> {
        self.start_menu_folder.as_deref()
    }

    /// Whether the installation targets all users.
    pub fn all_users(&self) -> bool {
        self.all_users
    }

    /// Install scope derived from the all-users flag.
    pub fn install_scope(&self) -> InstallScope {
        if self.all_users {
            InstallScope::PerMachine
        } else {
            InstallScope::PerUser
        }
    }

    /// Whether the main executable runs after installation.
    pub fn run_after_install(&self) -> bool {
        self.run_after_install
    }

    /// Whether the install directory is appended to PATH.
    pub fn add_to_path(&self) -> bool {
        self.add_to_path
    }

    /// Normalized association extensions (no leading dot).
    pub fn file_associations(&self) -> &[String] {
        &self.file_associations
    }

    /// Explicit main executable file name.
    pub fn main_executable(&self) -> Option<&str> {
        self.main_executable.as_deref()
    }

    /// Whether a root-relative path is excluded from the installer.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }

    /// Registry key under which keypath values are written.
    pub fn registry_key(&self) -> String {
        format!("Software\\{}\\{}", self.manufacturer, self.product_name)
    }
}

/// Builder for constructing a validated [`Configuration`].
///
/// Defaults mirror an interactive run that accepts every suggestion: full UI,
/// generated license, desktop and start-menu shortcuts, per-user scope.
#[derive(Clone, Debug)]
pub struct ConfigurationBuilder {
    product_name: String,
    version: String,
    manufacturer: String,
    product_code: Option<String>,
    upgrade_code: Option<String>,
    install_dir_name: Option<String>,
    ui_level: UiLevel,
    license: LicenseMode,
    banner_image: Option<PathBuf>,
    dialog_image: Option<PathBuf>,
    icon: Option<PathBuf>,
    desktop_shortcut: bool,
    start_menu_shortcut: bool,
    start_menu_folder: Option<String>,
    all_users: bool,
    run_after_install: bool,
    add_to_path: bool,
    file_associations: Vec<String>,
    main_executable: Option<String>,
    exclude: Vec<String>,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            version: String::new(),
            manufacturer: String::new(),
            product_code: None,
            upgrade_code: None,
            install_dir_name: None,
            ui_level: UiLevel::Full,
            license: LicenseMode::Generate,
            banner_image: None,
            dialog_image: None,
            icon: None,
            desktop_shortcut: true,
            start_menu_shortcut: true,
            start_menu_folder: None,
            all_users: false,
            run_after_install: false,
            add_to_path: false,
            file_associations: Vec::new(),
            main_executable: None,
            exclude: Vec::new(),
        }
    }
}

impl ConfigurationBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the product name. Required.
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    /// Sets the product version. Required.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the manufacturer. Required.
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Pins the product identity instead of generating a fresh one.
    pub fn product_code(mut self, code: impl Into<String>) -> Self {
        self.product_code = Some(code.into());
        self
    }

    /// Sets the upgrade identity. Must stay constant across versions.
    pub fn upgrade_code(mut self, code: impl Into<String>) -> Self {
        self.upgrade_code = Some(code.into());
        self
    }

    /// Sets the install directory name. Default: product name.
    pub fn install_dir_name(mut self, name: impl Into<String>) -> Self {
        self.install_dir_name = Some(name.into());
        self
    }

    /// Sets the UI level.
    pub fn ui_level(mut self, level: UiLevel) -> Self {
        self.ui_level = level;
        self
    }

    /// Sets the license mode.
    pub fn license(mut self, license: LicenseMode) -> Self {
        self.license = license;
        self
    }

    /// Sets the banner bitmap (493×58).
    pub fn banner_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.banner_image = Some(path.into());
        self
    }

    /// Sets the dialog bitmap (493×312).
    pub fn dialog_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.dialog_image = Some(path.into());
        self
    }

    /// Sets the product icon (.ico).
    pub fn icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon = Some(path.into());
        self
    }

    /// Enables or disables the desktop shortcut.
    pub fn desktop_shortcut(mut self, enabled: bool) -> Self {
        self.desktop_shortcut = enabled;
        self
    }

    /// Enables or disables the start-menu shortcut.
    pub fn start_menu_shortcut(mut self, enabled: bool) -> Self {
        self.start_menu_shortcut = enabled;
        self
    }

    /// Places the start-menu shortcut in a named folder.
    pub fn start_menu_folder(mut self, folder: impl Into<String>) -> Self {
        self.start_menu_folder = Some(folder.into());
        self
    }

    /// Installs for all users (per-machine) instead of the current user.
    pub fn all_users(mut self, all_users: bool) -> Self {
        self.all_users = all_users;
        self
    }

    /// Launches the main executable after installation.
    pub fn run_after_install(mut self, enabled: bool) -> Self {
        self.run_after_install = enabled;
        self
    }

    /// Appends the install directory to PATH.
    pub fn add_to_path(mut self, enabled: bool) -> Self {
        self.add_to_path = enabled;
        self
    }

    /// Sets associated extensions from a comma-separated list (`.txt,.doc`).
    pub fn file_associations(mut self, csv: &str) -> Self {
        self.file_associations = csv
            .split(',')
            .map(|ext| ext.trim().to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Names the main executable explicitly.
    pub fn main_executable(mut self, file_name: impl Into<String>) -> Self {
        self.main_executable = Some(file_name.into());
        self
    }

    /// Adds a root-relative glob pattern of files to leave out.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for the first invalid field.
    pub fn build(self) -> Result<Configuration, ConfigurationError> {
        let product_name = required("product_name", self.product_name)?;
        let manufacturer = required("manufacturer", self.manufacturer)?;
        let version = required("version", self.version)?;
        validate_version(&version)?;

        let install_dir_name = match self.install_dir_name {
            Some(name) => required("install_dir_name", name)?,
            None => product_name.clone(),
        };

        let product_code = self
            .product_code
            .map(|value| parse_guid("product_code", &value))
            .transpose()?;
        let upgrade_code = self
            .upgrade_code
            .map(|value| parse_guid("upgrade_code", &value))
            .transpose()?;

        let mut file_associations: Vec<String> = Vec::new();
        for raw in self.file_associations {
            let ext = normalize_extension(&raw)?;
            if !file_associations
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(&ext))
            {
                file_associations.push(ext);
            }
        }

        let exclude = self
            .exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let start_menu_folder = self
            .start_menu_folder
            .map(|folder| folder.trim().to_string())
            .filter(|folder| !folder.is_empty());

        let main_executable = self
            .main_executable
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Configuration {
            product_name,
            version,
            manufacturer,
            product_code,
            upgrade_code,
            install_dir_name,
            ui_level: self.ui_level,
            license: self.license,
            banner_image: self.banner_image,
            dialog_image: self.dialog_image,
            icon: self.icon,
            desktop_shortcut: self.desktop_shortcut,
            start_menu_shortcut: self.start_menu_shortcut,
            start_menu_folder,
            all_users: self.all_users,
            run_after_install: self.run_after_install,
            add_to_path: self.add_to_path,
            file_associations,
            main_executable,
            exclude,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ConfigurationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

/// Checks the Windows Installer ProductVersion format: `major.minor[.build[.revision]]`.
fn validate_version(version: &str) -> Result<(), ConfigurationError> {
    // major, minor, build, revision
    const LIMITS: [u32; 4] = [255, 255, 65535, 65535];

    let invalid = |reason: String| ConfigurationError::InvalidVersion {
        version: version.to_string(),
        reason,
    };

    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() > LIMITS.len() {
        return Err(invalid("at most four components are allowed".to_string()));
    }

    for (part, limit) in parts.iter().zip(LIMITS) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("component '{part}' is not a number")));
        }
        let value: u32 = part
            .parse()
            .map_err(|_| invalid(format!("component '{part}' is out of range")))?;
        if value > limit {
            return Err(invalid(format!("component {value} exceeds {limit}")));
        }
    }

    Ok(())
}

fn parse_guid(field: &'static str, value: &str) -> Result<Uuid, ConfigurationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ConfigurationError::InvalidGuid {
        field,
        value: value.to_string(),
    })
}

fn normalize_extension(raw: &str) -> Result<String, ConfigurationError> {
    let ext = raw.trim().trim_start_matches('.');
    if ext.is_empty()
        || !ext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigurationError::InvalidExtension(raw.to_string()));
    }
    Ok(ext.to_string())
}
