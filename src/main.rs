#![forbid(unsafe_code)]

mod cli;
mod logging;
mod watch;

use std::error::Error;
use std::path::Path;

use clap::Parser;
use grapher_kernels::Surface;
use grapher_pack::{Config, GrapherPack, PackError, build_pack, load_config_from_path, simulate};

use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Build { out } => {
            let n = build(&cli.config, &out)?;
            println!("wrote {n} files to {}", out.display());
        }
        Commands::Check => check(&assemble(&cli.config)?),
        Commands::Watch { out } => watch::run(&cli.config, &out)?,
        Commands::Simulate { surface, ticks } => {
            run_simulation(&assemble(&cli.config)?, surface, ticks)?
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<Config, PackError> {
    if !path.exists() {
        log::warn!("{} not found; using built-in defaults", path.display());
        return Ok(Config::default());
    }
    load_config_from_path(path)
}

fn assemble(config: &Path) -> Result<GrapherPack, PackError> {
    build_pack(&load(config)?)
}

/// Load, validate, assemble and write. Returns the number of files written.
pub fn build(config: &Path, out: &Path) -> Result<usize, PackError> {
    assemble(config)?.datapack.write_to(out)
}

fn check(pack: &GrapherPack) {
    let p = &pack.params;
    println!(
        "resolution {} ({} division), {} markers",
        p.resolution.get(),
        p.division.name(),
        p.markers.len()
    );
    let mut peaks = p.envelope.peaks.clone();
    peaks.sort_by(|a, b| b.1.cmp(&a.1));
    for (term, peak) in &peaks {
        println!("  {term:<28} {peak:>12}");
    }
    println!(
        "largest intermediate {} of {}, headroom {:.1}%",
        p.envelope.max_peak(),
        i32::MAX,
        p.envelope.headroom() * 100.0
    );
    match p.envelope.frame_ticks {
        // 20 ticks per second
        Some(t) => println!("frame overflows after {t} ticks (~{:.1} h)", t as f64 / 72_000.0),
        None => println!("frame is static"),
    }
    if p.truncates_negative_sine_inputs() {
        log::warn!(
            "sine inputs reach {} under truncating division; the game floors, \
             set division = \"floor\" to match it",
            p.envelope.min_sine_input
        );
    }
}

fn run_simulation(pack: &GrapherPack, surface: Surface, ticks: u32) -> Result<(), PackError> {
    let report = simulate(pack, surface, ticks)?;
    println!("{surface} after {ticks} ticks");
    println!(
        "pan ({}, {}) frame {} velocity ({}, {})",
        report.state.pan_x,
        report.state.pan_z,
        report.state.frame,
        report.state.velocity_x,
        report.state.velocity_z
    );
    for pos in &report.markers {
        println!("{:>7.2} {:>7.2} {:>10.4}", pos.x, pos.z, pos.y);
    }
    for (item, n) in &report.heads {
        println!("{n} markers wearing {item}");
    }
    println!(
        "{} commands, {} function calls, {} markers disagree with the native kernels",
        report.stats.commands, report.stats.function_calls, report.native_mismatches
    );
    Ok(())
}
