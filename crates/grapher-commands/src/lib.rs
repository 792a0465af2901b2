//! Typed game-command model, text rendering, and an in-process interpreter.
#![forbid(unsafe_code)]

pub mod command;
pub mod ident;
pub mod nbt;
pub mod score;
pub mod selector;
pub mod vm;

pub use command::{Command, ExecuteStep, Predicate, ScheduleMode};
pub use ident::{FunctionId, Holder, IdentError, Namespace, Objective, ResourceLocation, Tag};
pub use nbt::{Axis, NbtPath, NumericType, Position, Snbt};
pub use score::{Score, ScoreAllocator, ScoreOp};
pub use selector::{Selector, SelectorKind};
pub use vm::{Entity, Machine, MachineStats, VmError};

/// Render a command list as function-file text, one command per line.
pub fn render_lines(commands: &[Command]) -> String {
    let mut out = String::new();
    for cmd in commands {
        out.push_str(&cmd.to_string());
        out.push('\n');
    }
    out
}
