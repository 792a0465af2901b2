use grapher_commands::{Command, ScoreAllocator, ScoreOp};
use grapher_fixed::FixedError;

use crate::params::AnimationParams;
use crate::registers::Registers;

/// Pan offsets, frame counter and pan velocities, all at scale `R`.
///
/// Only [`AnimationState::step`] and [`AnimationState::reset`] mutate it;
/// surfaces receive it by shared reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationState {
    pub pan_x: i32,
    pub pan_z: i32,
    pub frame: i32,
    pub velocity_x: i32,
    pub velocity_z: i32,
}

impl AnimationState {
    /// State right after `init` and `reset_animation` have both run.
    pub fn new(p: &AnimationParams) -> Self {
        Self {
            pan_x: p.reset_x,
            pan_z: p.reset_z,
            frame: 0,
            velocity_x: p.speed_x,
            velocity_z: p.speed_z,
        }
    }

    /// Velocities are left alone, like the in-game reset.
    pub fn reset(&mut self, p: &AnimationParams) {
        self.pan_x = p.reset_x;
        self.pan_z = p.reset_z;
        self.frame = 0;
    }

    pub fn step(&mut self, p: &AnimationParams) -> Result<(), FixedError> {
        if self.pan_x < p.lower_x {
            self.velocity_x = p.speed_x;
        }
        if self.pan_z < p.lower_z {
            self.velocity_z = p.speed_z;
        }
        if self.pan_x > p.upper_x {
            self.velocity_x = -p.speed_x;
        }
        if self.pan_z > p.upper_z {
            self.velocity_z = -p.speed_z;
        }
        self.pan_x = add(self.pan_x, self.velocity_x)?;
        self.pan_z = add(self.pan_z, self.velocity_z)?;
        self.frame = add(self.frame, p.frame_speed)?;
        Ok(())
    }
}

fn add(lhs: i32, rhs: i32) -> Result<i32, FixedError> {
    lhs.checked_add(rhs).ok_or(FixedError::Overflow {
        op: "add",
        lhs: lhs as i64,
        rhs: rhs as i64,
    })
}

/// One animation step, in the same order as [`AnimationState::step`].
pub fn emit_animate(
    p: &AnimationParams,
    regs: &Registers,
    alloc: &mut ScoreAllocator,
) -> Vec<Command> {
    let frame_speed = alloc.constant(p.frame_speed);
    vec![
        Command::run_if(regs.pan_x.less_than(p.lower_x), regs.velocity_x.set(p.speed_x)),
        Command::run_if(regs.pan_z.less_than(p.lower_z), regs.velocity_z.set(p.speed_z)),
        Command::run_if(regs.pan_x.greater_than(p.upper_x), regs.velocity_x.set(-p.speed_x)),
        Command::run_if(regs.pan_z.greater_than(p.upper_z), regs.velocity_z.set(-p.speed_z)),
        regs.pan_x.op(ScoreOp::Add, &regs.velocity_x),
        regs.pan_z.op(ScoreOp::Add, &regs.velocity_z),
        regs.frame.op(ScoreOp::Add, &frame_speed),
    ]
}

pub fn emit_reset(p: &AnimationParams, regs: &Registers) -> Vec<Command> {
    vec![
        regs.pan_x.set(p.reset_x),
        regs.pan_z.set(p.reset_z),
        regs.frame.set(0),
    ]
}

pub fn emit_init_velocity(p: &AnimationParams, regs: &Registers) -> Vec<Command> {
    vec![regs.velocity_x.set(p.speed_x), regs.velocity_z.set(p.speed_z)]
}
