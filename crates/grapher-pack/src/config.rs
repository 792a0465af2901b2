use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use grapher_kernels::{GraphConfig, Surface};
use serde::Deserialize;

use crate::PackError;

/// Whole `grapher.toml`: pack wiring plus the graph itself.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pack: PackConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config, PackError> {
    let s = fs::read_to_string(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml_str(&s).map_err(|source| PackError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Clone, Debug, Deserialize)]
pub struct PackConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Path prefix for helper functions nobody should call by hand.
    #[serde(default = "default_internal_dir")]
    pub internal_dir: String,
    #[serde(default = "default_objective")]
    pub objective: String,
    #[serde(default = "default_marker_tag")]
    pub marker_tag: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_pack_format")]
    pub pack_format: u32,
    /// Surface evaluated every tick after `animate`; none leaves the tick tag out.
    #[serde(default)]
    pub tick_surface: Option<Surface>,
    #[serde(default)]
    pub flicker: FlickerConfig,
}
fn default_namespace() -> String {
    "3d-grapher".into()
}
fn default_internal_dir() -> String {
    "zzz_internal".into()
}
fn default_objective() -> String {
    "3d_grapher".into()
}
fn default_marker_tag() -> String {
    "3dGrapher.marker".into()
}
fn default_description() -> String {
    "Animated 3D Grapher for Minecraft".into()
}
fn default_pack_format() -> u32 {
    7
}
impl Default for PackConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            internal_dir: default_internal_dir(),
            objective: default_objective(),
            marker_tag: default_marker_tag(),
            description: default_description(),
            pack_format: default_pack_format(),
            tick_surface: None,
            flicker: FlickerConfig::default(),
        }
    }
}

/// One blink: lit for `duration` ticks, then dark for `interval` ticks.
pub type FlickerStep = [NonZeroU32; 2];

#[derive(Clone, Debug, Deserialize)]
pub struct FlickerConfig {
    #[serde(default = "default_steps")]
    pub steps: Vec<FlickerStep>,
    #[serde(default = "default_on_item")]
    pub on_item: String,
    #[serde(default = "default_off_item")]
    pub off_item: String,
    /// Ticks between the final flicker-off and removing the markers.
    #[serde(default = "default_turn_off_delay")]
    pub turn_off_delay: NonZeroU32,
    #[serde(default)]
    pub sound: SoundConfig,
}
fn ticks(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}
fn default_steps() -> Vec<FlickerStep> {
    [(10, 1), (10, 1), (5, 1), (5, 1)]
        .into_iter()
        .map(|(d, i)| [ticks(d), ticks(i)])
        .collect()
}
fn default_on_item() -> String {
    "minecraft:cyan_concrete".into()
}
fn default_off_item() -> String {
    "minecraft:cyan_stained_glass".into()
}
fn default_turn_off_delay() -> NonZeroU32 {
    ticks(5)
}
impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            on_item: default_on_item(),
            off_item: default_off_item(),
            turn_off_delay: default_turn_off_delay(),
            sound: SoundConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_sound_id")]
    pub id: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
}
fn default_sound_id() -> String {
    "minecraft:block.beacon.activate".into()
}
fn default_volume() -> f32 {
    1.0
}
fn default_pitch() -> f32 {
    0.7
}
impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            id: default_sound_id(),
            volume: default_volume(),
            pitch: default_pitch(),
        }
    }
}
