use serde::Deserialize;

use crate::FixedError;

/// Integer division semantics used for `/` and `%` between registers.
///
/// `Truncate` rounds the quotient toward zero and gives the remainder the sign
/// of the dividend. `Floor` rounds toward negative infinity and gives the
/// remainder the sign of the divisor, which is what the game's scoreboard
/// operations do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum IntDivision {
    #[default]
    Truncate,
    Floor,
}

impl IntDivision {
    pub fn div(self, a: i32, b: i32) -> Result<i32, FixedError> {
        if b == 0 {
            return Err(FixedError::DivisionByZero { lhs: a });
        }
        let q = a.checked_div(b).ok_or(FixedError::Overflow {
            op: "div",
            lhs: a as i64,
            rhs: b as i64,
        })?;
        Ok(match self {
            IntDivision::Truncate => q,
            IntDivision::Floor => {
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    q - 1
                } else {
                    q
                }
            }
        })
    }

    pub fn rem(self, a: i32, b: i32) -> Result<i32, FixedError> {
        if b == 0 {
            return Err(FixedError::DivisionByZero { lhs: a });
        }
        let r = a.checked_rem(b).ok_or(FixedError::Overflow {
            op: "rem",
            lhs: a as i64,
            rhs: b as i64,
        })?;
        Ok(match self {
            IntDivision::Truncate => r,
            IntDivision::Floor => {
                if r != 0 && ((r < 0) != (b < 0)) {
                    r + b
                } else {
                    r
                }
            }
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            IntDivision::Truncate => "truncate",
            IntDivision::Floor => "floor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn truncate_and_floor_differ_on_negative_operands() {
        assert_eq!(IntDivision::Truncate.div(-7, 2), Ok(-3));
        assert_eq!(IntDivision::Floor.div(-7, 2), Ok(-4));
        assert_eq!(IntDivision::Truncate.rem(-7, 2), Ok(-1));
        assert_eq!(IntDivision::Floor.rem(-7, 2), Ok(1));
        assert_eq!(IntDivision::Floor.rem(7, -2), Ok(-1));
    }

    #[test]
    fn zero_divisor_is_an_error() {
        for mode in [IntDivision::Truncate, IntDivision::Floor] {
            assert_eq!(mode.div(5, 0), Err(FixedError::DivisionByZero { lhs: 5 }));
            assert_eq!(mode.rem(5, 0), Err(FixedError::DivisionByZero { lhs: 5 }));
        }
    }

    #[test]
    fn min_over_minus_one_overflows() {
        assert!(IntDivision::Truncate.div(i32::MIN, -1).is_err());
        assert!(IntDivision::Floor.div(i32::MIN, -1).is_err());
    }

    proptest! {
        // a == q*b + r for both modes
        #[test]
        fn quotient_and_remainder_recombine(
            mode in any::<IntDivision>(),
            a in -1_000_000i32..=1_000_000,
            b in prop_oneof![-1000i32..=-1, 1i32..=1000],
        ) {
            let q = mode.div(a, b).unwrap();
            let r = mode.rem(a, b).unwrap();
            prop_assert_eq!(q * b + r, a);
            prop_assert!(r.abs() < b.abs());
        }

        // Both modes agree whenever the operands are non-negative
        #[test]
        fn modes_agree_on_non_negative(a in 0i32..=i32::MAX, b in 1i32..=i32::MAX) {
            prop_assert_eq!(IntDivision::Truncate.div(a, b), IntDivision::Floor.div(a, b));
            prop_assert_eq!(IntDivision::Truncate.rem(a, b), IntDivision::Floor.rem(a, b));
        }

        #[test]
        fn floor_remainder_follows_divisor_sign(a in any::<i32>(), b in 1i32..=10_000) {
            let r = IntDivision::Floor.rem(a, b).unwrap();
            prop_assert!((0..b).contains(&r));
        }
    }
}
