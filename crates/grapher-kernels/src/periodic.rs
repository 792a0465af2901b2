//! Bhaskara-style periodic kernel over one fixed-point register.
//!
//! The input is an angle in half-periods scaled by `R` (a full period spans
//! `2R` counts); the output approximates a sine wave, also at scale `R`.

use grapher_commands::{Command, Score, ScoreAllocator, ScoreOp};
use grapher_fixed::{FixedError, Fx, IntDivision, Resolution};

use crate::registers::Registers;

/// Native evaluation of the periodic kernel.
pub fn calc_sine(input: Fx, res: Resolution, mode: IntDivision) -> Result<Fx, FixedError> {
    let one = res.literal(1, 1)?;
    let mod_x = input.checked_rem(one, mode)?;
    // R^2 from here on
    let mod_exp = one.checked_sub(mod_x)?.checked_mul(mod_x)?;
    let denom = res.literal(5, 2)?.checked_sub(mod_exp)?;
    let out = res
        .literal(16, 1)?
        .checked_mul(mod_exp)?
        .checked_div(denom, mode)?;
    let parity = input.checked_rem(res.literal(2, 1)?, mode)?;
    if parity.raw() > one.raw() {
        out.checked_neg()
    } else {
        Ok(out)
    }
}

/// Body of the shared `calc_sine` function.
///
/// Reads `sine_input` and leaves the result in `sine_output`. The input
/// register is folded modulo `2R` in place, so callers must rewrite it
/// before the next call; scratch registers are private to this body.
pub fn emit_calc_sine(
    res: Resolution,
    regs: &Registers,
    alloc: &mut ScoreAllocator,
) -> Result<Vec<Command>, FixedError> {
    let r = res.get();
    let one = alloc.constant(r);
    let two = alloc.constant(res.literal(2, 1)?.raw());
    let five_sq = alloc.constant(res.literal(5, 2)?.raw());
    let sixteen = alloc.constant(res.literal(16, 1)?.raw());
    let minus_one = alloc.constant(-1);
    let mod_x: Score = alloc.score();
    let mod_exp: Score = alloc.score();
    let input = &regs.sine_input;
    let output = &regs.sine_output;

    Ok(vec![
        mod_x.assign(input),
        mod_x.op(ScoreOp::Mod, &one),
        mod_exp.assign(&one),
        mod_exp.op(ScoreOp::Sub, &mod_x),
        mod_exp.op(ScoreOp::Mul, &mod_x),
        // mod_x now holds the denominator
        mod_x.assign(&five_sq),
        mod_x.op(ScoreOp::Sub, &mod_exp),
        output.assign(&sixteen),
        output.op(ScoreOp::Mul, &mod_exp),
        output.op(ScoreOp::Div, &mod_x),
        input.op(ScoreOp::Mod, &two),
        Command::run_if(
            input.greater_than(r),
            output.op(ScoreOp::Mul, &minus_one),
        ),
    ])
}
