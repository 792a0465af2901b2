//! Fixed-point register model: integers scaled by a resolution constant.
#![forbid(unsafe_code)]

mod division;
mod fx;

pub use division::IntDivision;
pub use fx::Fx;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FixedError {
    #[error("resolution must be positive, got {0}")]
    NonPositiveResolution(i32),
    #[error("value {0} is not finite")]
    NotFinite(f64),
    #[error("scaled value {0} does not fit in a 32-bit register")]
    OutOfRange(f64),
    #[error("{op} overflowed 32-bit register ({lhs}, {rhs})")]
    Overflow {
        op: &'static str,
        lhs: i64,
        rhs: i64,
    },
    #[error("division by zero ({lhs} / 0)")]
    DivisionByZero { lhs: i32 },
    #[error("operands scaled by R^{lhs} and R^{rhs} cannot be combined")]
    ScaleMismatch { lhs: u8, rhs: u8 },
}

/// Round to nearest, halves toward positive infinity.
#[inline]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Convert an already-scaled real number into a register value.
pub fn to_register(v: f64) -> Result<i32, FixedError> {
    if !v.is_finite() {
        return Err(FixedError::NotFinite(v));
    }
    let r = round_half_up(v);
    if r < i32::MIN as f64 || r > i32::MAX as f64 {
        return Err(FixedError::OutOfRange(v));
    }
    Ok(r as i32)
}

/// Read a world-space axis as an integer the way the runtime samples entity
/// data: `floor(value * scale)`.
pub fn sample_axis(value: f64, scale: f64) -> Result<i32, FixedError> {
    let v = value * scale;
    if !v.is_finite() {
        return Err(FixedError::NotFinite(v));
    }
    let f = v.floor();
    if f < i32::MIN as f64 || f > i32::MAX as f64 {
        return Err(FixedError::OutOfRange(v));
    }
    Ok(f as i32)
}

/// Global scale factor `R`. Every real quantity `v` is stored as `round(v * R)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution(i32);

impl Resolution {
    pub fn new(r: i32) -> Result<Self, FixedError> {
        if r <= 0 {
            return Err(FixedError::NonPositiveResolution(r));
        }
        Ok(Self(r))
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// `R^exp` in 64-bit so callers can bound products before narrowing.
    #[inline]
    pub fn pow(self, exp: u32) -> i64 {
        (self.0 as i64).pow(exp)
    }

    /// `round(v * R^exp)` as a register value.
    pub fn scale_pow(self, v: f64, exp: u8) -> Result<i32, FixedError> {
        to_register(v * (self.0 as f64).powi(exp as i32))
    }

    #[inline]
    pub fn scale(self, v: f64) -> Result<i32, FixedError> {
        self.scale_pow(v, 1)
    }

    /// `v` scaled by `R`, tagged with its scale.
    pub fn fx(self, v: f64) -> Result<Fx, FixedError> {
        Ok(Fx::new(self.scale(v)?, 1))
    }

    /// The literal `n * R^exp` as a tagged value (exact for integer `n`).
    pub fn literal(self, n: i64, exp: u8) -> Result<Fx, FixedError> {
        let v = n
            .checked_mul(self.pow(exp as u32))
            .ok_or(FixedError::Overflow {
                op: "literal",
                lhs: n,
                rhs: self.pow(exp as u32),
            })?;
        let raw = i32::try_from(v).map_err(|_| FixedError::OutOfRange(v as f64))?;
        Ok(Fx::new(raw, exp))
    }

    /// Interpret a raw register scaled by `R^exp` as a real number.
    #[inline]
    pub fn to_real(self, raw: i32, exp: u8) -> f64 {
        raw as f64 / (self.0 as f64).powi(exp as i32)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_resolution() {
        assert_eq!(Resolution::new(0), Err(FixedError::NonPositiveResolution(0)));
        assert!(Resolution::new(-3).is_err());
        assert_eq!(Resolution::new(100).map(Resolution::get), Ok(100));
    }

    #[test]
    fn scale_rounds_half_up() {
        let r = Resolution::new(300).unwrap();
        assert_eq!(r.scale(0.04), Ok(12));
        assert_eq!(r.scale(0.03), Ok(9));
        assert_eq!(r.scale(-0.5 / 3.0), Ok(-50));
        assert_eq!(round_half_up(-4.5), -4.0);
        assert_eq!(round_half_up(4.5), 5.0);
    }

    #[test]
    fn scale_pow_builds_quadratic_constants() {
        let r = Resolution::new(300).unwrap();
        // 36 * 300^2 * 5
        assert_eq!(r.scale_pow(36.0 * 5.0, 2), Ok(16_200_000));
        assert!(r.scale_pow(1.0e6, 2).is_err());
    }

    #[test]
    fn sample_axis_floors() {
        assert_eq!(sample_axis(-1.5, 300.0), Ok(-450));
        assert_eq!(sample_axis(0.25, 100.0 / 3.0), Ok(8));
        assert_eq!(sample_axis(-0.25, 100.0 / 3.0), Ok(-9));
        assert!(sample_axis(f64::NAN, 1.0).is_err());
        assert!(sample_axis(1.0e12, 1.0).is_err());
    }

    #[test]
    fn literal_is_exact() {
        let r = Resolution::new(300).unwrap();
        assert_eq!(r.literal(5, 2), Ok(Fx::new(450_000, 2)));
        assert_eq!(r.literal(-1, 0), Ok(Fx::new(-1, 0)));
        assert!(r.literal(1, 4).is_err());
    }
}
