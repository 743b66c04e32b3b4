//! Talik CLI — coupled simulation, validation, and results inspection.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "talik")]
#[command(version, about = "Talik — sequential thermo-mechanical coupling engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a coupled simulation from a config file.
    Simulate {
        /// Path to the coupled config (TOML).
        #[arg(short, long, default_value = "coupled.toml")]
        config: String,

        /// Mirror telemetry events through `tracing`.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a coupled or model config file.
    Validate {
        /// Path to a coupled or model TOML file.
        path: String,
    },

    /// Inspect a results file.
    Inspect {
        /// Path to a results file written by a simulation.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate { config, verbose } => commands::simulate(&config, verbose),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Inspect { path } => commands::inspect(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
