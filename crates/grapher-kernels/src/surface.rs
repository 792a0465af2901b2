use std::fmt;
use std::str::FromStr;

use grapher_commands::{
    Axis, Command, FunctionId, NbtPath, NumericType, Score, ScoreAllocator, ScoreOp, Selector,
};
use grapher_fixed::{FixedError, Fx, sample_axis};
use serde::{Deserialize, Serialize};

use crate::animate::AnimationState;
use crate::params::{GraphParams, QuadraticParams};
use crate::periodic::calc_sine;
use crate::registers::Registers;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Paraboloid,
    Saddle,
    Sine,
    Ripple,
}

impl Surface {
    pub const ALL: [Surface; 4] = [
        Surface::Paraboloid,
        Surface::Saddle,
        Surface::Sine,
        Surface::Ripple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Surface::Paraboloid => "paraboloid",
            Surface::Saddle => "saddle",
            Surface::Sine => "sine",
            Surface::Ripple => "ripple",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Surface::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Surface::ALL.iter().map(|k| k.name()).collect();
                format!("unknown surface `{s}` (expected one of {})", names.join(", "))
            })
    }
}

/// A height register as it is written back: `raw * scale` world blocks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Height {
    pub raw: i32,
    pub scale: f64,
}

impl Height {
    #[inline]
    pub fn world_y(self) -> f64 {
        self.raw as f64 * self.scale
    }
}

impl Surface {
    /// Height of the marker standing at world `(x, z)` for the current
    /// animation state, computed exactly as the emitted body does.
    pub fn height(
        self,
        p: &GraphParams,
        state: &AnimationState,
        x: f64,
        z: f64,
    ) -> Result<Height, FixedError> {
        match self {
            Surface::Paraboloid => quadratic(p, &p.paraboloid, state, x, z, false),
            Surface::Saddle => quadratic(p, &p.saddle, state, x, z, true),
            Surface::Sine => sine(p, state, x, z),
            Surface::Ripple => ripple(p, state, x, z),
        }
    }

    /// Per-marker body, run with the marker as `@s`.
    pub fn emit(
        self,
        p: &GraphParams,
        regs: &Registers,
        alloc: &mut ScoreAllocator,
        calc_sine_fn: &FunctionId,
    ) -> Vec<Command> {
        match self {
            Surface::Paraboloid => emit_quadratic(p, &p.paraboloid, regs, alloc, ScoreOp::Add),
            Surface::Saddle => emit_quadratic(p, &p.saddle, regs, alloc, ScoreOp::Sub),
            Surface::Sine => emit_sine(p, regs, alloc, calc_sine_fn),
            Surface::Ripple => emit_ripple(p, regs, alloc, calc_sine_fn),
        }
    }
}

fn sample(v: f64, scale: f64) -> Result<Fx, FixedError> {
    Ok(Fx::new(sample_axis(v, scale)?, 1))
}

fn quadratic(
    p: &GraphParams,
    q: &QuadraticParams,
    state: &AnimationState,
    x: f64,
    z: f64,
    saddle: bool,
) -> Result<Height, FixedError> {
    let r = p.resolution.as_f64();
    let u = sample(x, r)?.checked_add(Fx::new(state.pan_x, 1))?;
    let w = sample(z, r)?.checked_add(Fx::new(state.pan_z, 1))?;
    let (u2, w2) = (u.checked_mul(u)?, w.checked_mul(w)?);
    let sum = if saddle {
        u2.checked_sub(w2)?
    } else {
        u2.checked_add(w2)?
    };
    let total = sum.checked_add(Fx::new(q.constant, 2))?;
    Ok(Height {
        raw: total.raw(),
        scale: q.write_scale,
    })
}

fn sine(p: &GraphParams, state: &AnimationState, x: f64, z: f64) -> Result<Height, FixedError> {
    let s = &p.sine;
    let frame = Fx::new(state.frame, 1);
    let offset = Fx::new(s.phase_offset, 1);
    let wave = |v: f64| -> Result<Fx, FixedError> {
        let input = sample(v, s.input_scale)?
            .checked_add(offset)?
            .checked_add(frame)?;
        calc_sine(input, p.resolution, p.division)
    };
    let total = wave(x)?
        .checked_add(wave(z)?)?
        .checked_add(Fx::new(s.constant, 1))?;
    Ok(Height {
        raw: total.raw(),
        scale: s.write_scale,
    })
}

fn ripple(p: &GraphParams, state: &AnimationState, x: f64, z: f64) -> Result<Height, FixedError> {
    let rp = &p.ripple;
    let r = p.resolution.as_f64();
    let u = sample(x, r)?.checked_sub(Fx::new(rp.center_x, 1))?;
    let w = sample(z, r)?.checked_sub(Fx::new(rp.center_z, 1))?;
    let input = u
        .checked_mul(u)?
        .checked_add(w.checked_mul(w)?)?
        .checked_div(Fx::new(rp.divisor_scaled, 1), p.division)?
        .checked_add(Fx::new(state.frame, 1))?;
    let total = calc_sine(input, p.resolution, p.division)?.checked_add(Fx::new(rp.constant, 1))?;
    Ok(Height {
        raw: total.raw(),
        scale: rp.write_scale,
    })
}

fn read_axis(target: &Score, axis: Axis, scale: f64) -> Command {
    Command::StoreEntityData {
        target: target.clone(),
        entity: Selector::executor(),
        path: NbtPath::Pos(axis),
        scale,
    }
}

fn write_height(source: &Score, scale: f64) -> Command {
    Command::StoreScoreToEntity {
        entity: Selector::executor(),
        path: NbtPath::Pos(Axis::Y),
        ty: NumericType::Double,
        scale,
        source: source.clone(),
    }
}

fn emit_quadratic(
    p: &GraphParams,
    q: &QuadraticParams,
    regs: &Registers,
    alloc: &mut ScoreAllocator,
    combine: ScoreOp,
) -> Vec<Command> {
    let r = p.resolution.as_f64();
    let u = alloc.score();
    let w = alloc.score();
    let constant = alloc.constant(q.constant);
    vec![
        read_axis(&u, Axis::X, r),
        u.op(ScoreOp::Add, &regs.pan_x),
        u.op(ScoreOp::Mul, &u),
        read_axis(&w, Axis::Z, r),
        w.op(ScoreOp::Add, &regs.pan_z),
        w.op(ScoreOp::Mul, &w),
        u.op(combine, &w),
        u.op(ScoreOp::Add, &constant),
        write_height(&u, q.write_scale),
    ]
}

fn emit_sine(
    p: &GraphParams,
    regs: &Registers,
    alloc: &mut ScoreAllocator,
    calc_sine_fn: &FunctionId,
) -> Vec<Command> {
    let s = &p.sine;
    let sum = alloc.score();
    let constant = alloc.constant(s.constant);

    let mut cmds = Vec::with_capacity(14);
    for (axis, capture) in [(Axis::X, ScoreOp::Assign), (Axis::Z, ScoreOp::Add)] {
        cmds.push(read_axis(&regs.sine_input, axis, s.input_scale));
        if s.phase_offset != 0 {
            cmds.push(regs.sine_input.add(s.phase_offset));
        }
        cmds.push(regs.sine_input.op(ScoreOp::Add, &regs.frame));
        cmds.push(Command::Function(calc_sine_fn.clone()));
        // The second call overwrites sine_output
        cmds.push(sum.op(capture, &regs.sine_output));
    }
    cmds.push(sum.op(ScoreOp::Add, &constant));
    cmds.push(write_height(&sum, s.write_scale));
    cmds
}

fn emit_ripple(
    p: &GraphParams,
    regs: &Registers,
    alloc: &mut ScoreAllocator,
    calc_sine_fn: &FunctionId,
) -> Vec<Command> {
    let rp = &p.ripple;
    let r = p.resolution.as_f64();
    let u = &regs.sine_input;
    let w = alloc.score();
    let divisor = alloc.constant(rp.divisor_scaled);
    let constant = alloc.constant(rp.constant);

    let mut cmds = vec![read_axis(u, Axis::X, r)];
    if rp.center_x != 0 {
        cmds.push(u.add(-rp.center_x));
    }
    cmds.push(u.op(ScoreOp::Mul, u));
    cmds.push(read_axis(&w, Axis::Z, r));
    if rp.center_z != 0 {
        cmds.push(w.add(-rp.center_z));
    }
    cmds.extend([
        w.op(ScoreOp::Mul, &w),
        u.op(ScoreOp::Add, &w),
        u.op(ScoreOp::Div, &divisor),
        u.op(ScoreOp::Add, &regs.frame),
        Command::Function(calc_sine_fn.clone()),
        regs.sine_output.op(ScoreOp::Add, &constant),
        write_height(&regs.sine_output, rp.write_scale),
    ]);
    cmds
}
