use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fieldops", version, about = "Farm management TUI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test the farm API connection
    Check,
    /// Print the growth stage for a crop type at a given age
    Stage {
        /// Crop type, e.g. Maize or "Wild Onion"
        crop_type: String,
        /// Days since planting
        #[arg(allow_negative_numbers = true)]
        days: i64,
    },
    /// Print the action history of a crop
    History {
        crop_id: i64,
    },
    /// Validate a leaf image and record it for health detection
    Detect {
        crop_id: i64,
        image: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stage_with_negative_days() {
        let cli = Cli::parse_from(["fieldops", "stage", "Maize", "-3"]);
        match cli.command {
            Some(Commands::Stage { crop_type, days }) => {
                assert_eq!(crop_type, "Maize");
                assert_eq!(days, -3);
            }
            _ => panic!("expected stage command"),
        }
    }

    #[test]
    fn no_command_runs_tui() {
        let cli = Cli::parse_from(["fieldops", "-vv"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }
}
