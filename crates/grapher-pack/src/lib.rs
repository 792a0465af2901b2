//! Assembles the grapher content pack: lifecycle functions, the four surface
//! functions, animation, tags and metadata, plus an offline simulation that
//! runs the assembled pack on the command machine.
#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod datapack;
pub mod simulate;

use std::path::PathBuf;

use grapher_commands::{IdentError, VmError};
use grapher_fixed::FixedError;
use grapher_kernels::ConfigError;
use thiserror::Error;

pub use builder::{FunctionIds, GrapherPack, build_pack};
pub use config::{Config, FlickerConfig, PackConfig, SoundConfig, load_config_from_path};
pub use datapack::{Datapack, PackFile};
pub use simulate::{SimulationReport, simulate};

#[derive(Debug, Error)]
pub enum PackError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid graph configuration: {0}")]
    Graph(#[from] ConfigError),
    #[error(transparent)]
    Ident(#[from] IdentError),
    #[error(transparent)]
    Fixed(#[from] FixedError),
    #[error("flicker schedule overflows: step {step} ends past tick {}", u32::MAX)]
    FlickerOverflow { step: usize },
    #[error("{} is not empty and holds no pack.mcmeta; refusing to clear it", .0.display())]
    NotAPack(PathBuf),
    #[error("failed to encode {file}: {source}")]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("simulation failed: {0}")]
    Vm(#[from] VmError),
}
