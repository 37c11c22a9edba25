// slam_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// slam_sim: run the EKF-SLAM estimator against a simulated landmark world.
///
/// Values given here override the scenario file, which in turn overrides
/// the built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run. Built-in defaults are used when omitted.
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    /// Seed for the simulation's random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulated duration in seconds.
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Only print the final summary.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Print the fully resolved scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_overrides() {
        let cli = Cli::parse_from([
            "slam_sim",
            "--scenario",
            "assets/scenarios/default.toml",
            "--seed",
            "7",
            "-d",
            "12.5",
            "--quiet",
        ]);
        assert_eq!(cli.scenario, Some(PathBuf::from("assets/scenarios/default.toml")));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.duration, Some(12.5));
        assert!(cli.quiet);
        assert!(!cli.dump_config);
    }

    #[test]
    fn test_everything_is_optional() {
        let cli = Cli::parse_from(["slam_sim"]);
        assert!(cli.scenario.is_none());
        assert!(cli.seed.is_none());
        assert!(cli.duration.is_none());
    }
}
