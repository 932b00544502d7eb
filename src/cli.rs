use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Patch catalog reconciliation and operation dispatch for agent fleets
#[derive(Parser, Debug)]
#[command(name = "fleet-patch")]
#[command(version)]
#[command(about = "Patch catalog reconciliation and operation dispatch for agent fleets", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a scenario file against in-memory stores and print the final state as JSON
    Replay {
        /// Path to the scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Path to the config file (defaults to ./fleet-patch.config.yml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the packages root from the config file
        #[arg(long, value_name = "DIR")]
        packages_root: Option<PathBuf>,
    },

    /// Validate a config file and print the resolved settings
    CheckConfig {
        /// Path to the config file (defaults to ./fleet-patch.config.yml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let args = Args::try_parse_from([
            "fleet-patch",
            "replay",
            "--scenario",
            "scenario.json",
            "--packages-root",
            "/tmp/pkgs",
        ])
        .unwrap();

        match args.command {
            Command::Replay {
                scenario,
                config,
                packages_root,
            } => {
                assert_eq!(scenario, PathBuf::from("scenario.json"));
                assert!(config.is_none());
                assert_eq!(packages_root, Some(PathBuf::from("/tmp/pkgs")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_check_config() {
        let args =
            Args::try_parse_from(["fleet-patch", "check-config", "-c", "custom.yml"]).unwrap();
        assert!(matches!(
            args.command,
            Command::CheckConfig { config: Some(ref path) } if path == &PathBuf::from("custom.yml")
        ));
    }

    #[test]
    fn test_replay_requires_scenario() {
        assert!(Args::try_parse_from(["fleet-patch", "replay"]).is_err());
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Args::try_parse_from(["fleet-patch"]).is_err());
    }
}
