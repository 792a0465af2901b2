use grapher_fixed::{IntDivision, round_half_up};
use serde::Deserialize;

use crate::params::MAX_MARKERS;

#[derive(Clone, Debug, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_resolution")]
    pub resolution: i32,
    #[serde(default)]
    pub division: IntDivision,
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub animation: Animation,
    #[serde(default)]
    pub surfaces: Surfaces,
}

fn default_resolution() -> i32 {
    300
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            division: IntDivision::default(),
            grid: Grid::default(),
            animation: Animation::default(),
            surfaces: Surfaces::default(),
        }
    }
}

impl GraphConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Grid {
    #[serde(default = "default_size")]
    pub x_size: u32,
    #[serde(default = "default_size")]
    pub z_size: u32,
    #[serde(default = "default_spacing")]
    pub x_spacing: f64,
    #[serde(default = "default_spacing")]
    pub z_spacing: f64,
    /// World x of the first marker; centred on the origin when absent.
    #[serde(default)]
    pub x_origin: Option<f64>,
    #[serde(default)]
    pub z_origin: Option<f64>,
    /// Summon height and the surfaces' additive constant.
    #[serde(default = "default_y_origin")]
    pub y_origin: f64,
}
fn default_size() -> u32 {
    9
}
fn default_spacing() -> f64 {
    0.5
}
fn default_y_origin() -> f64 {
    36.0
}
impl Default for Grid {
    fn default() -> Self {
        Self {
            x_size: default_size(),
            z_size: default_size(),
            x_spacing: default_spacing(),
            z_spacing: default_spacing(),
            x_origin: None,
            z_origin: None,
            y_origin: default_y_origin(),
        }
    }
}

/// Block-centred start so a grid of `size` cells straddles the origin.
pub fn centered_origin(size: u32, spacing: f64) -> f64 {
    0.5 + round_half_up(-(size as f64) / 2.0) * spacing
}

impl Grid {
    pub fn origin_x(&self) -> f64 {
        self.x_origin
            .unwrap_or_else(|| centered_origin(self.x_size, self.x_spacing))
    }

    pub fn origin_z(&self) -> f64 {
        self.z_origin
            .unwrap_or_else(|| centered_origin(self.z_size, self.z_spacing))
    }

    /// `x_size * z_size`, or `None` when the product overflows.
    pub fn marker_count(&self) -> Option<u32> {
        self.x_size.checked_mul(self.z_size)
    }

    /// World coordinate of the last marker along x.
    pub fn last_x(&self) -> f64 {
        self.origin_x() + self.x_size.saturating_sub(1) as f64 * self.x_spacing
    }

    pub fn last_z(&self) -> f64 {
        self.origin_z() + self.z_size.saturating_sub(1) as f64 * self.z_spacing
    }

    /// World (x, z) of every marker, x-major. Callers bound the count first.
    pub fn marker_positions(&self) -> Vec<(f64, f64)> {
        let (x0, z0) = (self.origin_x(), self.origin_z());
        let cap = self.marker_count().map_or(MAX_MARKERS, |n| n.min(MAX_MARKERS));
        let mut out = Vec::with_capacity(cap as usize);
        for x in 0..self.x_size {
            for z in 0..self.z_size {
                out.push((
                    x0 + x as f64 * self.x_spacing,
                    z0 + z as f64 * self.z_spacing,
                ));
            }
        }
        out
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Animation {
    #[serde(default = "default_pan_speed_x")]
    pub pan_speed_x: f64,
    #[serde(default = "default_pan_speed_z")]
    pub pan_speed_z: f64,
    #[serde(default = "default_frame_speed")]
    pub frame_speed: f64,
    #[serde(default = "default_lower_bound")]
    pub lower_bound_x: f64,
    #[serde(default = "default_lower_bound")]
    pub lower_bound_z: f64,
    #[serde(default = "default_upper_bound")]
    pub upper_bound_x: f64,
    #[serde(default = "default_upper_bound")]
    pub upper_bound_z: f64,
    #[serde(default = "default_reset_pan")]
    pub reset_pan_x: f64,
    #[serde(default = "default_reset_pan")]
    pub reset_pan_z: f64,
}
fn default_pan_speed_x() -> f64 {
    0.04
}
fn default_pan_speed_z() -> f64 {
    0.03
}
fn default_frame_speed() -> f64 {
    0.03
}
fn default_lower_bound() -> f64 {
    -1.5
}
fn default_upper_bound() -> f64 {
    1.0
}
fn default_reset_pan() -> f64 {
    -0.5
}
impl Default for Animation {
    fn default() -> Self {
        Self {
            pan_speed_x: default_pan_speed_x(),
            pan_speed_z: default_pan_speed_z(),
            frame_speed: default_frame_speed(),
            lower_bound_x: default_lower_bound(),
            lower_bound_z: default_lower_bound(),
            upper_bound_x: default_upper_bound(),
            upper_bound_z: default_upper_bound(),
            reset_pan_x: default_reset_pan(),
            reset_pan_z: default_reset_pan(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Surfaces {
    #[serde(default = "default_quadratic_divisor")]
    pub paraboloid_divisor: i32,
    #[serde(default = "default_quadratic_divisor")]
    pub saddle_divisor: i32,
    #[serde(default = "default_sine_divisor")]
    pub sine_divisor: f64,
    /// Added to each sine input before `frame`. `-0.5 / 3.0` re-centres the
    /// wave on the grid; zero leaves it anchored to world coordinates.
    #[serde(default)]
    pub sine_phase_offset: f64,
    #[serde(default = "default_ripple_divisor")]
    pub ripple_divisor: i32,
    #[serde(default)]
    pub ripple_center_x: f64,
    #[serde(default)]
    pub ripple_center_z: f64,
}
fn default_quadratic_divisor() -> i32 {
    5
}
fn default_sine_divisor() -> f64 {
    3.0
}
fn default_ripple_divisor() -> i32 {
    8
}
impl Default for Surfaces {
    fn default() -> Self {
        Self {
            paraboloid_divisor: default_quadratic_divisor(),
            saddle_divisor: default_quadratic_divisor(),
            sine_divisor: default_sine_divisor(),
            sine_phase_offset: 0.0,
            ripple_divisor: default_ripple_divisor(),
            ripple_center_x: 0.0,
            ripple_center_z: 0.0,
        }
    }
}
