//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Two-dimensional cardiac tissue simulator.
#[derive(Parser, Debug)]
#[command(name = "excite", author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a simulation.
    Run(RunArgs),
    /// Print the tabulated gate kinetics at a voltage.
    Lookup(LookupArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON run file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Whitespace-separated diffusion coefficient map (row-major)
    #[arg(long, conflicts_with = "uniform")]
    pub coefficients: Option<PathBuf>,

    /// Build a uniform sheet with this coefficient instead of reading a map
    #[arg(long)]
    pub uniform: Option<f64>,

    /// Grid rows
    #[arg(long, default_value_t = 400)]
    pub rows: u32,

    /// Grid columns
    #[arg(long, default_value_t = 400)]
    pub cols: u32,

    /// Step at which the run ends (counted from zero, including restored steps)
    #[arg(long)]
    pub steps: Option<u64>,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Resume from this checkpoint file
    #[arg(long)]
    pub restore: Option<PathBuf>,

    /// Write a checkpoint after this many steps
    #[arg(long)]
    pub checkpoint_at: Option<u64>,

    /// Stop once the checkpoint has been written
    #[arg(long, requires = "checkpoint_at")]
    pub stop_after_checkpoint: bool,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Membrane voltage (mV)
    #[arg(long, allow_hyphen_values = true)]
    pub voltage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::parse_from([
            "excite",
            "run",
            "--uniform",
            "0.2",
            "--rows",
            "20",
            "--cols",
            "30",
            "--steps",
            "100",
            "--checkpoint-at",
            "50",
            "--stop-after-checkpoint",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.uniform, Some(0.2));
                assert_eq!((args.rows, args.cols), (20, 30));
                assert_eq!(args.steps, Some(100));
                assert_eq!(args.checkpoint_at, Some(50));
                assert!(args.stop_after_checkpoint);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn negative_voltage_accepted() {
        let cli = Cli::parse_from(["excite", "lookup", "--voltage", "-85.2"]);
        match cli.command {
            Commands::Lookup(args) => assert_eq!(args.voltage, -85.2),
            other => panic!("expected lookup, got {other:?}"),
        }
    }

    #[test]
    fn map_and_uniform_conflict() {
        let res = Cli::try_parse_from([
            "excite",
            "run",
            "--coefficients",
            "map.txt",
            "--uniform",
            "0.2",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn stop_requires_checkpoint_step() {
        assert!(Cli::try_parse_from(["excite", "run", "--stop-after-checkpoint"]).is_err());
    }
}
