use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grapher_kernels::Surface;

#[derive(Parser, Debug)]
#[command(name = "grapher")]
#[command(version, about = "Generate the animated 3D grapher content pack")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Pack and graph configuration (TOML); built-in defaults when missing
    #[arg(long, global = true, default_value = "grapher.toml")]
    pub config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write the full log to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the configuration and write the pack
    Build {
        /// Output folder; replaced on every build
        #[arg(long, default_value = "pack")]
        out: PathBuf,
    },

    /// Validate the configuration and report register headroom
    Check,

    /// Build, then rebuild whenever the configuration changes
    Watch {
        #[arg(long, default_value = "pack")]
        out: PathBuf,
    },

    /// Run the generated pack offline and print the marker heights
    Simulate {
        /// paraboloid, saddle, sine or ripple
        #[arg(long)]
        surface: Surface,

        #[arg(long, default_value_t = 100)]
        ticks: u32,
    },
}
