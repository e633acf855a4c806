//! Command line argument parsing and validation.
//!
//! Arguments overlay the persisted project settings: anything given on the
//! command line wins, anything omitted keeps its saved value.

use crate::settings_file::ProjectSettings;
use clap::Parser;
use std::path::PathBuf;

/// WiX v4+ installer project generator
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_wix",
    version,
    about = "Generate a WiX v4+ installer project from a published application directory",
    long_about = "Generate a WiX v4+ installer project (.wxs, .wixproj, README, license) \
from a published application directory.

If PUBLISH_DIR and --settings are both omitted, the settings saved by the
previous run (last_project.json) are used.

Usage:
  kodegen_bundler_wix ./bin/Release/net8.0/publish --product-name MyApp --manufacturer Acme
  kodegen_bundler_wix ./publish -o MyInstaller --ui minimal --add-to-path
  kodegen_bundler_wix --settings MyApp.json
  kodegen_bundler_wix"
)]
pub struct Args {
    /// Directory containing the files to install
    #[arg(index = 1, value_name = "PUBLISH_DIR")]
    pub publish_dir: Option<PathBuf>,

    /// Output directory for the installer project
    #[arg(short, long, value_name = "DIR", default_value = "Installer")]
    pub output_dir: PathBuf,

    /// Load project settings from a JSON file
    #[arg(short = 'c', long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Directory holding <product>.json and last_project.json
    #[arg(long, value_name = "DIR", default_value = ".", env = "KODEGEN_WIX_SETTINGS_DIR")]
    pub settings_dir: PathBuf,

    /// Product name
    #[arg(long)]
    pub product_name: Option<String>,

    /// Product version (major.minor[.build[.revision]])
    #[arg(long)]
    pub product_version: Option<String>,

    /// Manufacturer (company) name
    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Upgrade code GUID; keep it constant across versions
    #[arg(long, value_name = "GUID")]
    pub upgrade_code: Option<String>,

    /// Product code GUID; a fresh one is generated when omitted
    #[arg(long, value_name = "GUID")]
    pub product_code: Option<String>,

    /// Installation folder name under Program Files\<Manufacturer>
    #[arg(long, value_name = "NAME")]
    pub install_dir_name: Option<String>,

    /// Installer UI
    #[arg(long, value_name = "LEVEL", value_parser = ["full", "minimal", "none"])]
    pub ui: Option<String>,

    /// Use an existing RTF license instead of generating one
    #[arg(long, value_name = "FILE", conflicts_with = "no_license")]
    pub license: Option<PathBuf>,

    /// Show no license text
    #[arg(long)]
    pub no_license: bool,

    /// Banner bitmap for the UI (493x58)
    #[arg(long, value_name = "FILE")]
    pub banner: Option<PathBuf>,

    /// Dialog bitmap for the UI (493x312)
    #[arg(long, value_name = "FILE")]
    pub dialog: Option<PathBuf>,

    /// Product icon (.ico)
    #[arg(long, value_name = "FILE")]
    pub icon: Option<PathBuf>,

    /// Skip the desktop shortcut
    #[arg(long)]
    pub no_desktop_shortcut: bool,

    /// Skip the start menu shortcut
    #[arg(long)]
    pub no_start_menu_shortcut: bool,

    /// Start menu folder for the shortcut
    #[arg(long, value_name = "NAME")]
    pub start_menu_folder: Option<String>,

    /// Install for all users (per-machine)
    #[arg(long)]
    pub all_users: bool,

    /// Launch the application when the installer finishes
    #[arg(long)]
    pub run_after_install: bool,

    /// Append the install directory to PATH
    #[arg(long)]
    pub add_to_path: bool,

    /// File extensions to associate, comma separated (.abc,.xyz)
    #[arg(long, value_name = "EXTS")]
    pub associations: Option<String>,

    /// File name of the main executable in the publish root
    #[arg(long, value_name = "FILE")]
    pub main_exe: Option<String>,

    /// Glob of publish-relative paths to leave out (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Save the settings as <product>.json and last_project.json
    #[arg(long)]
    pub save_settings: bool,

    /// Print the descriptor to stdout instead of writing the project
    #[arg(long)]
    pub stdout: bool,

    /// Show extra detail
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(dir) = &self.publish_dir
            && dir.as_os_str().is_empty()
        {
            return Err("Publish directory must not be empty".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory must not be empty".to_string());
        }
        if let Some(pattern) = self.exclude.iter().find(|p| p.trim().is_empty()) {
            return Err(format!("Empty exclusion pattern {pattern:?}"));
        }
        Ok(())
    }

    /// Whether settings should come from the previous run.
    pub fn resumes_last_project(&self) -> bool {
        self.publish_dir.is_none() && self.settings.is_none()
    }

    /// Overlays the arguments that were given onto `settings`.
    pub fn apply_to(&self, settings: &mut ProjectSettings) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut settings.product_name, &self.product_name);
        set(&mut settings.product_version, &self.product_version);
        set(&mut settings.manufacturer, &self.manufacturer);
        set(&mut settings.ui_level, &self.ui);
        set(&mut settings.file_associations, &self.associations);
        set_opt(&mut settings.upgrade_code, &self.upgrade_code);
        set_opt(&mut settings.product_id, &self.product_code);
        set_opt(&mut settings.install_dir_name, &self.install_dir_name);
        set_opt(&mut settings.banner_image, &self.banner);
        set_opt(&mut settings.dialog_image, &self.dialog);
        set_opt(&mut settings.icon_file, &self.icon);
        set_opt(&mut settings.shortcut_folder_name, &self.start_menu_folder);
        set_opt(&mut settings.main_executable, &self.main_exe);
        set_opt(&mut settings.publish_dir, &self.publish_dir);

        if let Some(license) = &self.license {
            settings.generate_license = false;
            settings.license_file = Some(license.clone());
        }
        if self.no_license {
            settings.generate_license = false;
            settings.license_file = None;
        }
        if self.no_desktop_shortcut {
            settings.add_desktop_shortcut = false;
        }
        if self.no_start_menu_shortcut {
            settings.add_start_menu_shortcut = false;
        }
        settings.shortcut_all_users |= self.all_users;
        settings.run_after_install |= self.run_after_install;
        settings.add_to_path |= self.add_to_path;
        if !self.exclude.is_empty() {
            settings.exclude = self.exclude.clone();
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print progress message
    pub fn progress_println(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print info message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self {
            output: if args.stdout {
                output.into_stderr()
            } else {
                output
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("kodegen_bundler_wix").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["publish"]);
        assert_eq!(args.publish_dir, Some(PathBuf::from("publish")));
        assert_eq!(args.output_dir, PathBuf::from("Installer"));
        assert!(!args.resumes_last_project());
        assert!(args.validate().is_ok());
        assert!(parse(&[]).resumes_last_project());
    }

    #[test]
    fn test_rejects_unknown_ui() {
        let result = Args::try_parse_from(["kodegen_bundler_wix", "p", "--ui", "fancy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_license_conflicts() {
        let result = Args::try_parse_from([
            "kodegen_bundler_wix",
            "p",
            "--license",
            "l.rtf",
            "--no-license",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overlay_keeps_saved_values() {
        let mut settings = ProjectSettings {
            product_name: "Saved".into(),
            manufacturer: "Acme".into(),
            add_to_path: true,
            upgrade_code: Some("{6A1B7F8E-5D0B-4C9B-9C1E-2E3A4B5C6D7E}".into()),
            ..Default::default()
        };
        let args = parse(&[
            "publish",
            "--product-version",
            "2.0",
            "--ui",
            "none",
            "--no-desktop-shortcut",
            "--license",
            "EULA.rtf",
        ]);
        args.apply_to(&mut settings);

        assert_eq!(settings.product_name, "Saved");
        assert_eq!(settings.product_version, "2.0");
        assert_eq!(settings.ui_level, "none");
        assert!(settings.add_to_path);
        assert!(!settings.add_desktop_shortcut);
        assert!(!settings.generate_license);
        assert_eq!(settings.license_file, Some(PathBuf::from("EULA.rtf")));
        assert_eq!(settings.publish_dir, Some(PathBuf::from("publish")));
        assert!(settings.upgrade_code.is_some());
    }

    #[test]
    fn test_empty_exclusion_rejected() {
        let args = parse(&["publish", "--exclude", " "]);
        assert!(args.validate().is_err());
    }
}
