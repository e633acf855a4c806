//! Persisted project settings.
//!
//! Settings are stored as pretty-printed JSON named after the product
//! (`<product>.json`), with a copy in `last_project.json` so the next run can
//! resume without arguments. The generator itself never touches these files;
//! the CLI loads them, turns them into a [`ConfigurationBuilder`], and saves
//! them back after a successful generation with the upgrade code that was
//! actually used.

use crate::error::{Result, SettingsError};
use crate::utils::fs::write_atomic;
use crate::wix::ids::format_guid;
use crate::wix::{ConfigurationBuilder, ConfigurationError, Generation, LicenseMode, UiLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File holding a copy of the most recently saved project.
pub const LAST_PROJECT_FILE: &str = "last_project.json";

/// One project's saved answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Product name; also names the settings file.
    pub product_name: String,
    /// Product version.
    pub product_version: String,
    /// Manufacturer (company) name.
    pub manufacturer: String,
    /// Product identity; empty or `*` means a fresh one per build.
    pub product_id: Option<String>,
    /// Upgrade identity, written back after each generation.
    pub upgrade_code: Option<String>,
    /// Folder name under `Program Files\<Manufacturer>`.
    pub install_dir_name: Option<String>,
    /// `full`, `minimal` or `none`.
    pub ui_level: String,
    /// Render a standard license instead of using `license_file`.
    pub generate_license: bool,
    /// User-supplied RTF license.
    pub license_file: Option<PathBuf>,
    /// Banner bitmap shown at the top of UI dialogs.
    pub banner_image: Option<PathBuf>,
    /// Bitmap shown on the welcome and completion dialogs.
    pub dialog_image: Option<PathBuf>,
    /// Product icon.
    pub icon_file: Option<PathBuf>,
    /// Put a shortcut on the desktop.
    pub add_desktop_shortcut: bool,
    /// Put a shortcut in the start menu.
    pub add_start_menu_shortcut: bool,
    /// Start menu folder.
    pub shortcut_folder_name: Option<String>,
    /// Install for all users (per-machine scope).
    pub shortcut_all_users: bool,
    /// Launch the main executable when installation finishes.
    pub run_after_install: bool,
    /// Append the install directory to `PATH`.
    pub add_to_path: bool,
    /// Comma-separated extensions, e.g. `.abc,.xyz`.
    pub file_associations: String,
    /// Directory that was packaged.
    pub publish_dir: Option<PathBuf>,
    /// Main executable override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_executable: Option<String>,
    /// Exclusion globs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            product_version: "1.0.0".to_string(),
            manufacturer: String::new(),
            product_id: None,
            upgrade_code: None,
            install_dir_name: None,
            ui_level: UiLevel::Full.as_str().to_string(),
            generate_license: true,
            license_file: None,
            banner_image: None,
            dialog_image: None,
            icon_file: None,
            add_desktop_shortcut: true,
            add_start_menu_shortcut: true,
            shortcut_folder_name: None,
            shortcut_all_users: false,
            run_after_install: false,
            add_to_path: false,
            file_associations: String::new(),
            publish_dir: None,
            main_executable: None,
            exclude: Vec::new(),
        }
    }
}

impl ProjectSettings {
    /// Loads settings from `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SettingsError::NotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        let settings = serde_json::from_str(&text).map_err(|e| SettingsError::Corrupted {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Loads the most recently saved project from `dir`.
    pub async fn load_last(dir: &Path) -> Result<Self> {
        let path = dir.join(LAST_PROJECT_FILE);
        match Self::load(&path).await {
            Err(crate::error::CreatorError::Settings(SettingsError::NotFound { .. })) => {
                Err(SettingsError::NoPreviousProject { path }.into())
            }
            other => other,
        }
    }

    /// Saves `<product>.json` and `last_project.json` into `dir`.
    ///
    /// Returns the paths written.
    pub async fn save(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let text = self.to_json()?;
        let mut written = Vec::with_capacity(2);
        for name in [self.file_name(), LAST_PROJECT_FILE.to_string()] {
            let path = dir.join(name);
            write_atomic(&path, &text).await?;
            written.push(path);
        }
        log::info!("Saved settings for {}", self.product_name);
        Ok(written)
    }

    /// `<product>.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", self.product_name)
    }

    /// JSON text with four-space indentation.
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Publish directory these settings were saved for.
    pub fn publish_dir(&self) -> Result<&Path> {
        self.publish_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| SettingsError::NoPublishDir.into())
    }

    /// Remembers the identities a generation used so the next run upgrades
    /// the same product.
    pub fn record_generation(&mut self, generation: &Generation) {
        self.upgrade_code = Some(format_guid(&generation.upgrade_code));
    }

    /// Builder pre-populated from these settings.
    ///
    /// Empty strings count as unset, as older settings files store them for
    /// skipped answers.
    pub fn to_builder(&self) -> std::result::Result<ConfigurationBuilder, ConfigurationError> {
        let license = if self.generate_license {
            LicenseMode::Generate
        } else {
            match non_empty_path(&self.license_file) {
                Some(path) => LicenseMode::File(path),
                None => LicenseMode::None,
            }
        };

        let mut builder = ConfigurationBuilder::new()
            .product_name(&self.product_name)
            .version(&self.product_version)
            .manufacturer(&self.manufacturer)
            .ui_level(self.ui_level.parse()?)
            .license(license)
            .desktop_shortcut(self.add_desktop_shortcut)
            .start_menu_shortcut(self.add_start_menu_shortcut)
            .all_users(self.shortcut_all_users)
            .run_after_install(self.run_after_install)
            .add_to_path(self.add_to_path)
            .file_associations(&self.file_associations);

        if let Some(code) = non_empty(&self.product_id).filter(|code| code != "*") {
            builder = builder.product_code(code);
        }
        if let Some(code) = non_empty(&self.upgrade_code) {
            builder = builder.upgrade_code(code);
        }
        if let Some(name) = non_empty(&self.install_dir_name) {
            builder = builder.install_dir_name(name);
        }
        if let Some(folder) = non_empty(&self.shortcut_folder_name) {
            builder = builder.start_menu_folder(folder);
        }
        if let Some(path) = non_empty_path(&self.banner_image) {
            builder = builder.banner_image(path);
        }
        if let Some(path) = non_empty_path(&self.dialog_image) {
            builder = builder.dialog_image(path);
        }
        if let Some(path) = non_empty_path(&self.icon_file) {
            builder = builder.icon(path);
        }
        if let Some(name) = non_empty(&self.main_executable) {
            builder = builder.main_executable(name);
        }
        for pattern in &self.exclude {
            builder = builder.exclude(pattern);
        }
        Ok(builder)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_empty_path(value: &Option<PathBuf>) -> Option<PathBuf> {
    value.clone().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CreatorError;

    fn settings() -> ProjectSettings {
        ProjectSettings {
            product_name: "MyApp".into(),
            product_version: "1.2.3".into(),
            manufacturer: "Acme".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_reads_full_settings_file() {
        let json = r#"{
            "product_name": "MyApp",
            "product_version": "2.0.0",
            "manufacturer": "Acme",
            "product_id": "*",
            "upgrade_code": "",
            "install_dir_name": "MyApp",
            "ui_level": "minimal",
            "generate_license": false,
            "license_file": "",
            "banner_image": "",
            "dialog_image": "",
            "icon_file": "",
            "add_desktop_shortcut": true,
            "add_start_menu_shortcut": false,
            "shortcut_folder_name": "",
            "shortcut_all_users": true,
            "run_after_install": true,
            "add_to_path": true,
            "file_associations": ".abc,.xyz",
            "publish_dir": "C:\\build\\publish"
        }"#;
        let settings: ProjectSettings = serde_json::from_str(json).unwrap();
        let config = settings.to_builder().unwrap().build().unwrap();

        assert_eq!(config.version(), "2.0.0");
        assert_eq!(config.ui_level(), UiLevel::Minimal);
        assert_eq!(config.license(), &LicenseMode::None);
        assert!(config.product_code().is_none());
        assert!(config.upgrade_code().is_none());
        assert!(config.icon().is_none());
        assert!(config.all_users());
        assert!(!config.start_menu_shortcut());
        assert_eq!(config.file_associations().len(), 2);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings: ProjectSettings =
            serde_json::from_str(r#"{"product_name": "X", "manufacturer": "Y"}"#).unwrap();
        assert_eq!(settings.ui_level, "full");
        assert!(settings.generate_license);
        assert!(settings.add_desktop_shortcut);
        assert!(settings.to_builder().unwrap().build().is_ok());
    }

    #[test]
    fn test_invalid_ui_level() {
        let mut settings = settings();
        settings.ui_level = "fancy".into();
        assert!(matches!(
            settings.to_builder(),
            Err(ConfigurationError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_publish_dir_required() {
        let err = settings().publish_dir().unwrap_err();
        assert!(matches!(
            err,
            CreatorError::Settings(SettingsError::NoPublishDir)
        ));
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let json = settings().to_json().unwrap();
        assert!(json.contains("\n    \"product_name\": \"MyApp\""));
        assert!(!json.contains("main_executable"));
    }

    #[tokio::test]
    async fn test_save_and_load_last() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = settings();
        original.upgrade_code = Some("{6A1B7F8E-5D0B-4C9B-9C1E-2E3A4B5C6D7E}".into());

        let written = original.save(dir.path()).await.unwrap();
        assert_eq!(
            written,
            [dir.path().join("MyApp.json"), dir.path().join(LAST_PROJECT_FILE)]
        );

        let loaded = ProjectSettings::load_last(dir.path()).await.unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectSettings::load_last(dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            CreatorError::Settings(SettingsError::NoPreviousProject { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let err = ProjectSettings::load(&broken).await.unwrap_err();
        assert!(matches!(
            err,
            CreatorError::Settings(SettingsError::Corrupted { .. })
        ));
    }
}
