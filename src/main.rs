//! Kodegen WiX Bundler - installer project generator for published applications.
//!
//! This binary turns a publish directory into a WiX v4+ project (.wxs,
//! .wixproj, README and license) ready for `wix build` or `dotnet build`.

use kodegen_bundler_wix::cli;
use kodegen_bundler_wix::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
