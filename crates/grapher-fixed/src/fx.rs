use crate::{FixedError, IntDivision, Resolution};

/// A register value together with the power of `R` it is currently scaled by.
///
/// Addition and subtraction require both sides at the same scale. A product's
/// scale is the sum of the operand scales and a quotient's is the difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Fx {
    raw: i32,
    exp: u8,
}

impl Fx {
    #[inline]
    pub const fn new(raw: i32, exp: u8) -> Self {
        Self { raw, exp }
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.raw
    }

    #[inline]
    pub const fn exp(self) -> u8 {
        self.exp
    }

    #[inline]
    pub fn to_real(self, res: Resolution) -> f64 {
        res.to_real(self.raw, self.exp)
    }

    fn same_scale(self, rhs: Fx) -> Result<(), FixedError> {
        if self.exp != rhs.exp {
            return Err(FixedError::ScaleMismatch {
                lhs: self.exp,
                rhs: rhs.exp,
            });
        }
        Ok(())
    }

    pub fn checked_add(self, rhs: Fx) -> Result<Fx, FixedError> {
        self.same_scale(rhs)?;
        let raw = self.raw.checked_add(rhs.raw).ok_or(FixedError::Overflow {
            op: "add",
            lhs: self.raw as i64,
            rhs: rhs.raw as i64,
        })?;
        Ok(Fx::new(raw, self.exp))
    }

    pub fn checked_sub(self, rhs: Fx) -> Result<Fx, FixedError> {
        self.same_scale(rhs)?;
        let raw = self.raw.checked_sub(rhs.raw).ok_or(FixedError::Overflow {
            op: "sub",
            lhs: self.raw as i64,
            rhs: rhs.raw as i64,
        })?;
        Ok(Fx::new(raw, self.exp))
    }

    pub fn checked_mul(self, rhs: Fx) -> Result<Fx, FixedError> {
        let raw = self.raw.checked_mul(rhs.raw).ok_or(FixedError::Overflow {
            op: "mul",
            lhs: self.raw as i64,
            rhs: rhs.raw as i64,
        })?;
        Ok(Fx::new(raw, self.exp + rhs.exp))
    }

    pub fn checked_div(self, rhs: Fx, mode: IntDivision) -> Result<Fx, FixedError> {
        if rhs.exp > self.exp {
            return Err(FixedError::ScaleMismatch {
                lhs: self.exp,
                rhs: rhs.exp,
            });
        }
        Ok(Fx::new(mode.div(self.raw, rhs.raw)?, self.exp - rhs.exp))
    }

    /// Remainder keeps the dividend's scale; both sides must agree.
    pub fn checked_rem(self, rhs: Fx, mode: IntDivision) -> Result<Fx, FixedError> {
        self.same_scale(rhs)?;
        Ok(Fx::new(mode.rem(self.raw, rhs.raw)?, self.exp))
    }

    pub fn checked_neg(self) -> Result<Fx, FixedError> {
        let raw = self.raw.checked_neg().ok_or(FixedError::Overflow {
            op: "neg",
            lhs: self.raw as i64,
            rhs: -1,
        })?;
        Ok(Fx::new(raw, self.exp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn product_scale_adds_and_quotient_scale_subtracts() {
        let a = Fx::new(150, 1);
        let sq = a.checked_mul(a).unwrap();
        assert_eq!(sq, Fx::new(22_500, 2));
        let back = sq.checked_div(Fx::new(300, 1), IntDivision::Truncate).unwrap();
        assert_eq!(back, Fx::new(75, 1));
    }

    #[test]
    fn mixed_scale_addition_is_rejected() {
        let e = Fx::new(1, 1).checked_add(Fx::new(1, 2)).unwrap_err();
        assert_eq!(e, FixedError::ScaleMismatch { lhs: 1, rhs: 2 });
        assert!(Fx::new(1, 1).checked_div(Fx::new(1, 2), IntDivision::Floor).is_err());
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let big = Fx::new(i32::MAX, 1);
        assert!(big.checked_add(Fx::new(1, 1)).is_err());
        assert!(big.checked_mul(Fx::new(2, 0)).is_err());
        assert!(Fx::new(i32::MIN, 0).checked_neg().is_err());
    }

    proptest! {
        #[test]
        fn add_then_sub_restores(a in -1_000_000i32..=1_000_000, b in -1_000_000i32..=1_000_000, exp in 0u8..=3) {
            let x = Fx::new(a, exp);
            let y = Fx::new(b, exp);
            prop_assert_eq!(x.checked_add(y).unwrap().checked_sub(y).unwrap(), x);
        }

        #[test]
        fn to_real_inverts_scaling(v in -1000.0f64..1000.0) {
            let res = Resolution::new(300).unwrap();
            let fx = res.fx(v).unwrap();
            prop_assert!((fx.to_real(res) - v).abs() <= 0.5 / 300.0 + 1e-9);
        }

        #[test]
        fn arbitrary_neg_is_involutive(x in any::<Fx>()) {
            prop_assume!(x.raw() != i32::MIN);
            prop_assert_eq!(x.checked_neg().unwrap().checked_neg().unwrap(), x);
        }
    }
}
