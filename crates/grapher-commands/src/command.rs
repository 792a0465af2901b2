use std::fmt;
use std::num::NonZeroU32;

use crate::ident::{FunctionId, Objective, ResourceLocation};
use crate::nbt::{NbtPath, NumericType, Position, Snbt};
use crate::score::{Score, ScoreOp};
use crate::selector::Selector;

/// Condition gating the rest of an `execute` chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    ScoreLess(Score, i32),
    ScoreGreater(Score, i32),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::ScoreLess(s, v) => write!(f, "score {s} matches ..{}", *v as i64 - 1),
            Predicate::ScoreGreater(s, v) => write!(f, "score {s} matches {}..", *v as i64 + 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExecuteStep {
    As(Selector),
    At(Selector),
    If(Predicate),
}

impl fmt::Display for ExecuteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteStep::As(s) => write!(f, "as {s}"),
            ExecuteStep::At(s) => write!(f, "at {s}"),
            ExecuteStep::If(p) => write!(f, "if {p}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduleMode {
    /// Keep every pending occurrence of the function.
    Append,
    /// Drop earlier pending occurrences before scheduling.
    Replace,
}

impl ScheduleMode {
    fn keyword(self) -> &'static str {
        match self {
            ScheduleMode::Append => "append",
            ScheduleMode::Replace => "replace",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ObjectiveAdd(Objective),
    ObjectiveRemove(Objective),
    ScoreSet {
        target: Score,
        value: i32,
    },
    ScoreAdd {
        target: Score,
        value: i32,
    },
    ScoreOperation {
        target: Score,
        op: ScoreOp,
        source: Score,
    },
    /// `target = floor(entity.path * scale)`
    StoreEntityData {
        target: Score,
        entity: Selector,
        path: NbtPath,
        scale: f64,
    },
    /// `entity.path = source * scale` as `ty`
    StoreScoreToEntity {
        entity: Selector,
        path: NbtPath,
        ty: NumericType,
        scale: f64,
        source: Score,
    },
    DataSet {
        entity: Selector,
        path: NbtPath,
        value: Snbt,
    },
    Summon {
        entity: ResourceLocation,
        pos: Position,
        nbt: Snbt,
    },
    Kill(Selector),
    Function(FunctionId),
    Schedule {
        function: FunctionId,
        ticks: NonZeroU32,
        mode: ScheduleMode,
    },
    PlaySound {
        sound: ResourceLocation,
        target: Selector,
        volume: f32,
        pitch: f32,
    },
    Execute {
        steps: Vec<ExecuteStep>,
        run: Box<Command>,
    },
}

impl Command {
    pub fn execute(steps: Vec<ExecuteStep>, run: Command) -> Command {
        Command::Execute {
            steps,
            run: Box::new(run),
        }
    }

    pub fn as_each(selector: Selector, run: Command) -> Command {
        Command::execute(vec![ExecuteStep::As(selector)], run)
    }

    pub fn run_if(pred: Predicate, run: Command) -> Command {
        Command::execute(vec![ExecuteStep::If(pred)], run)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ObjectiveAdd(o) => write!(f, "scoreboard objectives add {o} dummy"),
            Command::ObjectiveRemove(o) => write!(f, "scoreboard objectives remove {o}"),
            Command::ScoreSet { target, value } => {
                write!(f, "scoreboard players set {target} {value}")
            }
            Command::ScoreAdd { target, value } => {
                if *value < 0 {
                    write!(f, "scoreboard players remove {target} {}", -(*value as i64))
                } else {
                    write!(f, "scoreboard players add {target} {value}")
                }
            }
            Command::ScoreOperation { target, op, source } => {
                write!(f, "scoreboard players operation {target} {} {source}", op.symbol())
            }
            Command::StoreEntityData {
                target,
                entity,
                path,
                scale,
            } => write!(
                f,
                "execute store result score {target} run data get entity {entity} {path} {scale}"
            ),
            Command::StoreScoreToEntity {
                entity,
                path,
                ty,
                scale,
                source,
            } => write!(
                f,
                "execute store result entity {entity} {path} {} {scale} run scoreboard players get {source}",
                ty.keyword()
            ),
            Command::DataSet {
                entity,
                path,
                value,
            } => write!(f, "data modify entity {entity} {path} set value {value}"),
            Command::Summon { entity, pos, nbt } => write!(f, "summon {entity} {pos} {nbt}"),
            Command::Kill(s) => write!(f, "kill {s}"),
            Command::Function(id) => write!(f, "function {id}"),
            Command::Schedule {
                function,
                ticks,
                mode,
            } => write!(f, "schedule function {function} {ticks}t {}", mode.keyword()),
            Command::PlaySound {
                sound,
                target,
                volume,
                pitch,
            } => write!(f, "playsound {sound} block {target} ~ ~ ~ {volume} {pitch}"),
            Command::Execute { steps, run } => {
                f.write_str("execute")?;
                for step in steps {
                    write!(f, " {step}")?;
                }
                write!(f, " run {run}")
            }
        }
    }
}
