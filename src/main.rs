mod cli;

use cli::{Args, Command};
use fleet_patch::adapters::outbound::console::StderrProgressReporter;
use fleet_patch::config::{self, Settings};
use fleet_patch::ports::outbound::ProgressReporter;
use fleet_patch::replay::{load_scenario, run_replay};
use fleet_patch::shared::error::{ExitCode, PatchError};
use fleet_patch::shared::security::validate_not_symlink;
use fleet_patch::shared::Result;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    match run().await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(exit_code_for(&e).as_i32());
        }
    }
}

/// Logs go to stderr so stdout carries only the JSON summary.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<ExitCode> {
    let args = Args::parse_args();
    let cwd = std::env::current_dir()?;

    match args.command {
        Command::Replay {
            scenario,
            config,
            packages_root,
        } => {
            let mut settings = config::resolve_settings(config.as_deref(), &cwd)?;
            if let Some(root) = packages_root {
                settings.packages_root = root;
            }
            validate_packages_root(&settings.packages_root)?;
            replay(&scenario, &settings).await
        }
        Command::CheckConfig { config } => {
            let settings = config::resolve_settings(config.as_deref(), &cwd)?;
            print_settings(&settings);
            Ok(ExitCode::Success)
        }
    }
}

async fn replay(scenario_path: &Path, settings: &Settings) -> Result<ExitCode> {
    let reporter = StderrProgressReporter::new();
    let scenario = load_scenario(scenario_path)?;
    reporter.report(&format!(
        "📂 Replaying {} step(s) from {}",
        scenario.steps.len(),
        scenario_path.display()
    ));

    let summary = run_replay(scenario, settings, &reporter).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.has_skips() {
        reporter.report_error("Some inventory entries or agents were skipped; see the summary");
        Ok(ExitCode::CompletedWithSkips)
    } else {
        reporter.report_completion("Replay finished");
        Ok(ExitCode::Success)
    }
}

/// The packages root may not exist yet, but when it does it must be a real directory.
fn validate_packages_root(path: &Path) -> Result<()> {
    if std::fs::symlink_metadata(path).is_err() {
        return Ok(());
    }

    validate_not_symlink(path, "package download").map_err(|e| PatchError::ConfigError {
        path: path.to_path_buf(),
        reason: e.to_string(),
        hint: "Point packages_root at the real directory instead of a link to it.".to_string(),
    })?;

    if !path.is_dir() {
        return Err(PatchError::ConfigError {
            path: path.to_path_buf(),
            reason: "packages_root is not a directory".to_string(),
            hint: "Remove the file or choose another packages_root.".to_string(),
        }
        .into());
    }

    Ok(())
}

fn print_settings(settings: &Settings) {
    eprintln!("✅ Configuration is valid");
    eprintln!("   packages_root: {}", settings.packages_root.display());
    if let Some(dir) = &settings.dependencies_dir {
        eprintln!("   dependencies_dir: {}", dir.display());
    }
    eprintln!(
        "   download: {} worker(s), job timeout {}s, request timeout {}s, throttle {} KB/s",
        settings.max_concurrent_jobs,
        settings.job_timeout.as_secs(),
        settings.request_timeout.as_secs(),
        settings.default_throttle_kbs
    );
    eprintln!(
        "   agent queue: server TTL {}m, agent TTL {}m",
        settings.server_ttl_minutes, settings.agent_ttl_minutes
    );
    let mut views: Vec<&String> = settings.views.keys().collect();
    views.sort();
    for view in views {
        eprintln!("   view: {}", view);
    }
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<PatchError>() {
        Some(PatchError::ConfigError { .. }) => ExitCode::InvalidArguments,
        _ => ExitCode::ApplicationError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_packages_root_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_packages_root(&temp_dir.path().join("not-yet")).is_ok());
    }

    #[test]
    fn test_validate_packages_root_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_packages_root(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_validate_packages_root_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("pkgs");
        fs::write(&file_path, "not a directory").unwrap();

        let err = validate_packages_root(&file_path).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
        assert_eq!(exit_code_for(&err), ExitCode::InvalidArguments);
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_packages_root_symlink_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let err = validate_packages_root(&link).unwrap_err();
        assert!(err.to_string().contains("symbolic link"));
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(exit_code_for(&err), ExitCode::ApplicationError);
    }
}
