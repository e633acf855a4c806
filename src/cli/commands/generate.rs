//! Generate command implementation.
//!
//! Loads settings, overlays the command line, generates the descriptor and
//! writes the installer project.

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::project::{ProjectRenderer, write_artifacts};
use crate::settings_file::ProjectSettings;
use crate::utils::fs::absolute;
use crate::wix::Generator;
use std::io::Write;
use std::path::PathBuf;

/// Execute the generator
pub async fn execute_generate(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let mut settings = load_settings(args, config).await?;
    args.apply_to(&mut settings);

    let publish_dir = absolute(settings.publish_dir()?)?;
    settings.publish_dir = Some(publish_dir.clone());
    for path in [
        &mut settings.icon_file,
        &mut settings.banner_image,
        &mut settings.dialog_image,
        &mut settings.license_file,
    ] {
        if let Some(p) = path.as_mut().filter(|p| !p.as_os_str().is_empty()) {
            *p = absolute(p)?;
        }
    }

    let configuration = settings.to_builder()?.build()?;
    config.progress_println(&format!("Scanning {}", publish_dir.display()));

    let generation = Generator::new().generate(&configuration, &publish_dir)?;
    for warning in &generation.warnings {
        config.warning_println(&warning.to_string());
    }
    config.verbose_println(&generation.summary.to_string());

    if args.stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(generation.document.as_bytes())?;
        stdout.flush()?;
    } else {
        let output_dir = absolute(&args.output_dir)?;
        let renderer = ProjectRenderer::new()?;
        let today = chrono::Local::now().date_naive();
        let artifacts = renderer.render_all(&configuration, &generation, today)?;
        let written = write_artifacts(&output_dir, &artifacts).await?;

        config.section("Installer project");
        for path in &written {
            config.indent(&path.display().to_string());
        }
    }

    if args.save_settings {
        settings.record_generation(&generation);
        let saved = settings.save(&args.settings_dir).await?;
        let names: Vec<String> = saved.iter().map(|p| p.display().to_string()).collect();
        config.info_println(&format!("Settings saved to {}", names.join(", ")));
    }

    config.success_println(&format!(
        "Generated installer for {} {} ({})",
        configuration.product_name(),
        configuration.version(),
        generation.summary
    ));
    Ok(0)
}

/// Settings to start from: an explicit file, the previous project, the saved
/// project of the named product, or defaults.
async fn load_settings(args: &Args, config: &RuntimeConfig) -> Result<ProjectSettings> {
    if let Some(path) = &args.settings {
        return ProjectSettings::load(path).await;
    }

    if args.resumes_last_project() {
        let settings = ProjectSettings::load_last(&args.settings_dir).await?;
        config.info_println(&format!("Using last project '{}'", settings.product_name));
        return Ok(settings);
    }

    if let Some(name) = &args.product_name {
        let path: PathBuf = args.settings_dir.join(format!("{name}.json"));
        if path.is_file() {
            config.verbose_println(&format!("Loading saved settings {}", path.display()));
            return ProjectSettings::load(&path).await;
        }
    }

    Ok(ProjectSettings::default())
}
