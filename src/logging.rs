use std::error::Error;
use std::fs::File;
use std::path::Path;

use env_logger::{Builder, Env};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};

/// Initializes the global logger.
///
/// Without a log file, `env_logger` prints info and above (debug when
/// `verbose`), and `RUST_LOG` overrides the filter. With a log file the
/// terminal keeps that level while the file records everything down to
/// debug.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let Some(path) = log_file else {
        let env = Env::default().default_filter_or(level.to_string());
        // Only fails if a logger is already installed
        let _ = Builder::from_env(env).format_timestamp(None).try_init();
        return Ok(());
    };

    let file =
        File::create(path).map_err(|e| format!("failed to create {}: {e}", path.display()))?;
    let config = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("notify")
        .build();
    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Debug, config, file),
    ])?;
    Ok(())
}
