//! Validated, pre-scaled snapshot of a [`GraphConfig`]. Every kernel reads
//! this instead of the raw config, so nothing is rescaled per invocation.

use grapher_fixed::{FixedError, IntDivision, Resolution, sample_axis};
use thiserror::Error;

use crate::config::GraphConfig;

const REGISTER_MAX: i64 = i32::MAX as i64;

/// Markers summoned by one `turn_on`.
pub const MAX_MARKERS: u32 = 1 << 16;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Fixed(#[from] FixedError),
    #[error("grid {axis} size must be at least 1")]
    EmptyGrid { axis: &'static str },
    #[error("grid of {x_size} x {z_size} markers exceeds the limit of {max}")]
    TooManyMarkers { x_size: u32, z_size: u32, max: u32 },
    #[error("grid {axis} {what} must be finite, got {value}")]
    NotFinite {
        axis: &'static str,
        what: &'static str,
        value: f64,
    },
    #[error("{surface} divisor must be positive, got {value}")]
    NonPositiveDivisor { surface: &'static str, value: f64 },
    #[error("{what} must not be negative, got {value}")]
    NegativeSpeed { what: &'static str, value: f64 },
    #[error("pan bounds on {axis} overlap: lower {lower} must be below upper {upper}")]
    PanBounds {
        axis: &'static str,
        lower: f64,
        upper: f64,
    },
    #[error("{kernel}: {term} can reach {bound}, beyond the 32-bit register range")]
    Overflow {
        kernel: &'static str,
        term: &'static str,
        bound: i64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationParams {
    pub speed_x: i32,
    pub speed_z: i32,
    pub frame_speed: i32,
    pub lower_x: i32,
    pub lower_z: i32,
    pub upper_x: i32,
    pub upper_z: i32,
    pub reset_x: i32,
    pub reset_z: i32,
}

/// `y = (u_x^2 ± u_z^2) / divisor + y0` evaluated at scale `R^2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticParams {
    pub divisor: i32,
    /// `y0 * R^2 * divisor`, so the coefficient can be applied once at write-back.
    pub constant: i32,
    pub write_scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SineParams {
    /// Axis sampling scale `R / divisor`.
    pub input_scale: f64,
    pub phase_offset: i32,
    pub constant: i32,
    pub write_scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleParams {
    /// `divisor * R`; dividing an `R^2` sum by it lands back at scale `R`.
    pub divisor_scaled: i32,
    pub center_x: i32,
    pub center_z: i32,
    pub constant: i32,
    pub write_scale: f64,
}

/// Peak magnitudes of each kernel's intermediates for the validated config.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub peaks: Vec<(&'static str, i64)>,
    /// Ticks until `frame` pushes a sine or ripple input past the register
    /// range; `None` when the frame speed is zero.
    pub frame_ticks: Option<u64>,
    /// Lowest sine input at `frame` 0. Ripple inputs are never negative.
    pub min_sine_input: i64,
}

impl Envelope {
    pub fn max_peak(&self) -> i64 {
        self.peaks.iter().map(|(_, v)| *v).max().unwrap_or(0)
    }

    /// Fraction of the register range left above the largest intermediate.
    pub fn headroom(&self) -> f64 {
        1.0 - self.max_peak() as f64 / REGISTER_MAX as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphParams {
    pub resolution: Resolution,
    pub division: IntDivision,
    pub markers: Vec<(f64, f64)>,
    pub y_origin: f64,
    pub animation: AnimationParams,
    pub paraboloid: QuadraticParams,
    pub saddle: QuadraticParams,
    pub sine: SineParams,
    pub ripple: RippleParams,
    pub envelope: Envelope,
}

fn finite(axis: &'static str, what: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { axis, what, value })
    }
}

fn speed(res: Resolution, what: &'static str, value: f64) -> Result<i32, ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::NegativeSpeed { what, value });
    }
    let scaled = res.scale(value)?;
    if scaled == 0 {
        log::warn!("{what} {value} rounds to zero at resolution {}", res.get());
    }
    Ok(scaled)
}

fn bounds(
    res: Resolution,
    axis: &'static str,
    lower: f64,
    upper: f64,
) -> Result<(i32, i32), ConfigError> {
    let (lo, hi) = (res.scale(lower)?, res.scale(upper)?);
    if lo >= hi {
        return Err(ConfigError::PanBounds { axis, lower, upper });
    }
    Ok((lo, hi))
}

/// Largest |sample| along one grid axis, bounded from the end markers.
fn extent(
    res: Resolution,
    axis: &'static str,
    term: &'static str,
    first: f64,
    last: f64,
) -> Result<i64, ConfigError> {
    let last = finite(axis, "extent", last)?;
    let peak = (first.abs().max(last.abs()) * res.as_f64()).ceil();
    // `as` saturates, so an absurd extent still lands past the register range
    fits("grid", term, peak as i64)
}

fn fits(kernel: &'static str, term: &'static str, bound: i64) -> Result<i64, ConfigError> {
    if bound > REGISTER_MAX {
        return Err(ConfigError::Overflow {
            kernel,
            term,
            bound,
        });
    }
    Ok(bound)
}

impl GraphParams {
    pub fn from_config(cfg: &GraphConfig) -> Result<Self, ConfigError> {
        let res = Resolution::new(cfg.resolution)?;
        let g = &cfg.grid;
        if g.x_size == 0 {
            return Err(ConfigError::EmptyGrid { axis: "x" });
        }
        if g.z_size == 0 {
            return Err(ConfigError::EmptyGrid { axis: "z" });
        }
        if !g.marker_count().is_some_and(|n| n <= MAX_MARKERS) {
            return Err(ConfigError::TooManyMarkers {
                x_size: g.x_size,
                z_size: g.z_size,
                max: MAX_MARKERS,
            });
        }
        finite("x", "spacing", g.x_spacing)?;
        finite("z", "spacing", g.z_spacing)?;
        let x0 = finite("x", "origin", g.origin_x())?;
        let z0 = finite("z", "origin", g.origin_z())?;
        extent(res, "x", "x extent * R", x0, g.last_x())?;
        extent(res, "z", "z extent * R", z0, g.last_z())?;
        let y_origin = finite("y", "origin", g.y_origin)?;

        let a = &cfg.animation;
        let (lower_x, upper_x) = bounds(res, "x", a.lower_bound_x, a.upper_bound_x)?;
        let (lower_z, upper_z) = bounds(res, "z", a.lower_bound_z, a.upper_bound_z)?;
        let animation = AnimationParams {
            speed_x: speed(res, "pan_speed_x", a.pan_speed_x)?,
            speed_z: speed(res, "pan_speed_z", a.pan_speed_z)?,
            frame_speed: speed(res, "frame_speed", a.frame_speed)?,
            lower_x,
            lower_z,
            upper_x,
            upper_z,
            reset_x: res.scale(a.reset_pan_x)?,
            reset_z: res.scale(a.reset_pan_z)?,
        };

        let s = &cfg.surfaces;
        let quadratic = |surface: &'static str, divisor: i32| -> Result<QuadraticParams, ConfigError> {
            if divisor <= 0 {
                return Err(ConfigError::NonPositiveDivisor {
                    surface,
                    value: divisor as f64,
                });
            }
            Ok(QuadraticParams {
                divisor,
                constant: res.scale_pow(y_origin * divisor as f64, 2)?,
                write_scale: 1.0 / (divisor as f64 * res.pow(2) as f64),
            })
        };
        let paraboloid = quadratic("paraboloid", s.paraboloid_divisor)?;
        let saddle = quadratic("saddle", s.saddle_divisor)?;

        if !(s.sine_divisor > 0.0 && s.sine_divisor.is_finite()) {
            return Err(ConfigError::NonPositiveDivisor {
                surface: "sine",
                value: s.sine_divisor,
            });
        }
        let sine = SineParams {
            input_scale: res.as_f64() / s.sine_divisor,
            phase_offset: res.scale(s.sine_phase_offset)?,
            constant: res.scale(y_origin)?,
            write_scale: 1.0 / res.as_f64(),
        };

        if s.ripple_divisor <= 0 {
            return Err(ConfigError::NonPositiveDivisor {
                surface: "ripple",
                value: s.ripple_divisor as f64,
            });
        }
        let ripple = RippleParams {
            divisor_scaled: res.literal(s.ripple_divisor as i64, 1)?.raw(),
            center_x: res.scale(s.ripple_center_x)?,
            center_z: res.scale(s.ripple_center_z)?,
            constant: res.scale(y_origin)?,
            write_scale: 1.0 / res.as_f64(),
        };

        let markers = g.marker_positions();
        let mut params = Self {
            resolution: res,
            division: cfg.division,
            markers,
            y_origin,
            animation,
            paraboloid,
            saddle,
            sine,
            ripple,
            envelope: Envelope {
                peaks: Vec::new(),
                frame_ticks: None,
                min_sine_input: 0,
            },
        };
        params.envelope = params.compute_envelope()?;
        log::debug!(
            "graph params: R={} markers={} peak={} frame_ticks={:?}",
            res.get(),
            params.markers.len(),
            params.envelope.max_peak(),
            params.envelope.frame_ticks
        );
        Ok(params)
    }

    /// Truncating `%` folds negative inputs into `(-R, 0)`, where the periodic
    /// kernel leaves its `[-16R/5, 16R/5]` range. The game itself floors.
    pub fn truncates_negative_sine_inputs(&self) -> bool {
        self.division == IntDivision::Truncate && self.envelope.min_sine_input < 0
    }

    /// Largest |sample| of the marker grid along each axis at `scale`.
    fn max_sample(&self, scale: f64) -> Result<(i64, i64), ConfigError> {
        let mut mx = 0i64;
        let mut mz = 0i64;
        let sample = |v: f64| {
            sample_axis(v, scale)
                .map(|s| (s as i64).abs())
                .map_err(|_| ConfigError::Overflow {
                    kernel: "grid",
                    term: "sampled coordinate",
                    bound: (v * scale).abs().ceil() as i64,
                })
        };
        for &(x, z) in &self.markers {
            mx = mx.max(sample(x)?);
            mz = mz.max(sample(z)?);
        }
        Ok((mx, mz))
    }

    fn compute_envelope(&self) -> Result<Envelope, ConfigError> {
        let r = self.resolution.get() as i64;
        let a = &self.animation;
        let mut peaks = Vec::new();

        // Pan can overshoot a bound by one velocity step before reversing.
        let pan_x = (a.lower_x as i64 - a.speed_x as i64)
            .abs()
            .max((a.upper_x as i64 + a.speed_x as i64).abs())
            .max((a.reset_x as i64).abs());
        let pan_z = (a.lower_z as i64 - a.speed_z as i64)
            .abs()
            .max((a.upper_z as i64 + a.speed_z as i64).abs())
            .max((a.reset_z as i64).abs());

        let (cx, cz) = self.max_sample(r as f64)?;
        for (kernel, q) in [("paraboloid", &self.paraboloid), ("saddle", &self.saddle)] {
            let ux = fits(kernel, "x + panX", cx + pan_x)?;
            let uz = fits(kernel, "z + panZ", cz + pan_z)?;
            let sq = fits(kernel, "squared offsets", ux * ux + uz * uz)?;
            peaks.push((
                kernel,
                fits(kernel, "sum with constant", sq + (q.constant as i64).abs())?,
            ));
        }

        // Periodic kernel: 16R * modX*(R - modX) over 5R^2 - modExp.
        let mod_exp = match self.division {
            IntDivision::Floor => (r / 2) * ((r + 1) / 2),
            // Negative inputs leave modX in (-R, 0), so (R - modX) * modX grows to ~2R^2.
            IntDivision::Truncate => (2 * r - 1) * (r - 1),
        };
        fits("calc_sine", "5R^2", 5 * r * r)?;
        let denom = fits("calc_sine", "denominator", 5 * r * r + mod_exp)?;
        let numer = fits("calc_sine", "16R * modExp", 16 * r * mod_exp)?;
        peaks.push(("calc_sine", numer.max(denom)));
        fits("calc_sine", "2R", 2 * r)?;
        let sine_out = 16 * r;

        let min_sine_input = self
            .markers
            .iter()
            .flat_map(|&(x, z)| [x, z])
            .filter_map(|v| sample_axis(v, self.sine.input_scale).ok())
            .min()
            .map_or(0, i64::from)
            + self.sine.phase_offset as i64;
        let (sx, sz) = self.max_sample(self.sine.input_scale)?;
        let sine_in = fits(
            "sine",
            "input",
            sx.max(sz) + (self.sine.phase_offset as i64).abs(),
        )?;
        peaks.push((
            "sine",
            fits("sine", "sum of waves", 2 * sine_out + (self.sine.constant as i64).abs())?
                .max(sine_in),
        ));

        let rx = fits("ripple", "x - center", cx + (self.ripple.center_x as i64).abs())?;
        let rz = fits("ripple", "z - center", cz + (self.ripple.center_z as i64).abs())?;
        let radius_sq = fits("ripple", "x^2 + z^2", rx * rx + rz * rz)?;
        let ripple_in = radius_sq / self.ripple.divisor_scaled as i64 + 1;
        fits("ripple", "output", sine_out + (self.ripple.constant as i64).abs())?;
        peaks.push(("ripple", radius_sq));

        let static_input = sine_in.max(ripple_in);
        let frame_ticks = match a.frame_speed {
            0 => None,
            speed => Some(((REGISTER_MAX - static_input) / speed as i64) as u64),
        };

        Ok(Envelope {
            peaks,
            frame_ticks,
            min_sine_input,
        })
    }
}
