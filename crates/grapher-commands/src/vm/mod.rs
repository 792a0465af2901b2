//! In-process command interpreter: a scoreboard store, marker entities, and a
//! tick scheduler. Generated functions run here exactly as written, which is
//! how the kernels are checked without a game server.

mod schedule;

pub use schedule::{ScheduleQueue, Scheduled};

use std::rc::Rc;

use grapher_fixed::{FixedError, IntDivision, sample_axis};
use hashbrown::{HashMap, HashSet};
use thiserror::Error;

use crate::command::{Command, ExecuteStep, Predicate};
use crate::ident::{FunctionId, Objective, ResourceLocation, Tag};
use crate::nbt::{NbtPath, NumericType, Position, Snbt};
use crate::score::{Score, ScoreOp};
use crate::selector::{Selector, SelectorKind};

pub const MAX_CALL_DEPTH: usize = 64;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum VmError {
    #[error("objective {0} does not exist")]
    UnknownObjective(Objective),
    #[error("score {0} was read before it was set")]
    UnsetScore(Score),
    #[error("unknown function {0}")]
    UnknownFunction(FunctionId),
    #[error("`{command}` failed: {source}")]
    Arithmetic {
        command: String,
        #[source]
        source: FixedError,
    },
    #[error("`{0}` needs exactly one target entity")]
    NoTarget(String),
    #[error("path {path} is not supported by {op}")]
    UnsupportedPath { path: NbtPath, op: &'static str },
    #[error("function call depth exceeded {0}")]
    CallDepth(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub uid: u64,
    pub kind: ResourceLocation,
    pub pos: Position,
    pub tags: Vec<Tag>,
    pub head: Option<Snbt>,
}

impl Entity {
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineStats {
    pub commands: u64,
    pub function_calls: u64,
    pub sounds: u64,
    pub failed: u64,
}

#[derive(Clone, Copy, Debug)]
struct Ctx {
    executor: Option<u64>,
}

impl Ctx {
    const SERVER: Ctx = Ctx { executor: None };
}

pub struct Machine {
    division: IntDivision,
    functions: HashMap<FunctionId, Rc<[Command]>>,
    objectives: HashSet<Objective>,
    scores: HashMap<Score, i32>,
    entities: Vec<Entity>,
    next_uid: u64,
    queue: ScheduleQueue,
    stats: MachineStats,
}

impl Machine {
    pub fn new(division: IntDivision) -> Self {
        Self {
            division,
            functions: HashMap::new(),
            objectives: HashSet::new(),
            scores: HashMap::new(),
            entities: Vec::new(),
            next_uid: 1,
            queue: ScheduleQueue::new(),
            stats: MachineStats::default(),
        }
    }

    pub fn with_functions<I>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = (FunctionId, Vec<Command>)>,
    {
        for (id, body) in functions {
            self.define(id, body);
        }
        self
    }

    pub fn define(&mut self, id: FunctionId, body: Vec<Command>) {
        self.functions.insert(id, body.into());
    }

    pub fn division(&self) -> IntDivision {
        self.division
    }

    pub fn now(&self) -> u64 {
        self.queue.now
    }

    pub fn stats(&self) -> MachineStats {
        self.stats
    }

    pub fn has_objective(&self, objective: &Objective) -> bool {
        self.objectives.contains(objective)
    }

    pub fn score(&self, score: &Score) -> Option<i32> {
        self.scores.get(score).copied()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, uid: u64) -> Option<&Entity> {
        self.entities.iter().find(|e| e.uid == uid)
    }

    pub fn tagged<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter().filter(move |e| e.has_tag(tag))
    }

    pub fn spawn(&mut self, kind: ResourceLocation, pos: Position, tags: Vec<Tag>) -> u64 {
        let uid = self.next_uid;
        self.next_uid += 1;
        self.entities.push(Entity {
            uid,
            kind,
            pos,
            tags,
            head: None,
        });
        uid
    }

    pub fn pending(&self) -> impl Iterator<Item = &Scheduled> {
        self.queue.pending()
    }

    pub fn call(&mut self, id: &FunctionId) -> Result<(), VmError> {
        self.call_in(id, Ctx::SERVER, 0)
    }

    /// Run a function with `uid` as the executing entity (`@s`).
    pub fn call_as(&mut self, uid: u64, id: &FunctionId) -> Result<(), VmError> {
        self.call_in(id, Ctx { executor: Some(uid) }, 0)
    }

    pub fn run(&mut self, commands: &[Command]) -> Result<(), VmError> {
        for cmd in commands {
            self.exec(cmd, Ctx::SERVER, 0)?;
        }
        Ok(())
    }

    /// Advance one tick and run every scheduled call that became due.
    pub fn run_tick(&mut self) -> Result<usize, VmError> {
        self.queue.advance_tick();
        let mut ran = 0;
        while let Some(entry) = self.queue.pop_ready() {
            log::trace!(target: "vm", "[tick {}] scheduled {} (#{})", self.queue.now, entry.function, entry.id);
            self.call(&entry.function)?;
            ran += 1;
        }
        Ok(ran)
    }

    fn call_in(&mut self, id: &FunctionId, ctx: Ctx, depth: usize) -> Result<(), VmError> {
        if depth > MAX_CALL_DEPTH {
            return Err(VmError::CallDepth(MAX_CALL_DEPTH));
        }
        let body = self
            .functions
            .get(id)
            .cloned()
            .ok_or_else(|| VmError::UnknownFunction(id.clone()))?;
        self.stats.function_calls += 1;
        for cmd in body.iter() {
            self.exec(cmd, ctx, depth + 1)?;
        }
        Ok(())
    }

    fn read(&self, score: &Score) -> Result<i32, VmError> {
        if !self.objectives.contains(&score.objective) {
            return Err(VmError::UnknownObjective(score.objective.clone()));
        }
        self.scores
            .get(score)
            .copied()
            .ok_or_else(|| VmError::UnsetScore(score.clone()))
    }

    fn write(&mut self, score: &Score, value: i32) -> Result<(), VmError> {
        if !self.objectives.contains(&score.objective) {
            return Err(VmError::UnknownObjective(score.objective.clone()));
        }
        self.scores.insert(score.clone(), value);
        Ok(())
    }

    fn select(&self, selector: &Selector, ctx: Ctx) -> Vec<u64> {
        let matches = |e: &Entity| selector.tags.iter().all(|t| e.has_tag(t));
        match selector.kind {
            SelectorKind::AllEntities => self
                .entities
                .iter()
                .filter(|e| matches(e))
                .map(|e| e.uid)
                .collect(),
            SelectorKind::Executor => ctx
                .executor
                .and_then(|uid| self.entity(uid))
                .filter(|e| matches(e))
                .map(|e| vec![e.uid])
                .unwrap_or_default(),
            // No players exist in the machine
            SelectorKind::NearestPlayer => Vec::new(),
        }
    }

    fn single_target(&self, selector: &Selector, ctx: Ctx, cmd: &Command) -> Result<usize, VmError> {
        let uids = self.select(selector, ctx);
        match uids.as_slice() {
            [uid] => self
                .entities
                .iter()
                .position(|e| e.uid == *uid)
                .ok_or_else(|| VmError::NoTarget(cmd.to_string())),
            _ => Err(VmError::NoTarget(cmd.to_string())),
        }
    }

    fn test(&self, pred: &Predicate) -> bool {
        match pred {
            Predicate::ScoreLess(s, v) => self.scores.get(s).is_some_and(|x| x < v),
            Predicate::ScoreGreater(s, v) => self.scores.get(s).is_some_and(|x| x > v),
        }
    }

    fn operate(&self, cmd: &Command, op: ScoreOp, lhs: i32, rhs: i32) -> Result<i32, VmError> {
        let overflow = |name: &'static str| FixedError::Overflow {
            op: name,
            lhs: lhs as i64,
            rhs: rhs as i64,
        };
        let result = match op {
            ScoreOp::Assign => Ok(rhs),
            ScoreOp::Add => lhs.checked_add(rhs).ok_or_else(|| overflow("add")),
            ScoreOp::Sub => lhs.checked_sub(rhs).ok_or_else(|| overflow("sub")),
            ScoreOp::Mul => lhs.checked_mul(rhs).ok_or_else(|| overflow("mul")),
            ScoreOp::Div => self.division.div(lhs, rhs),
            ScoreOp::Mod => self.division.rem(lhs, rhs),
        };
        result.map_err(|source| VmError::Arithmetic {
            command: cmd.to_string(),
            source,
        })
    }

    fn exec(&mut self, cmd: &Command, ctx: Ctx, depth: usize) -> Result<(), VmError> {
        self.stats.commands += 1;
        match cmd {
            Command::ObjectiveAdd(o) => {
                if !self.objectives.insert(o.clone()) {
                    log::debug!(target: "vm", "objective {o} already exists");
                    self.stats.failed += 1;
                }
            }
            Command::ObjectiveRemove(o) => {
                if self.objectives.remove(o) {
                    self.scores.retain(|s, _| &s.objective != o);
                } else {
                    log::debug!(target: "vm", "objective {o} does not exist");
                    self.stats.failed += 1;
                }
            }
            Command::ScoreSet { target, value } => self.write(target, *value)?,
            Command::ScoreAdd { target, value } => {
                let cur = self.read(target)?;
                let next = self.operate(cmd, ScoreOp::Add, cur, *value)?;
                self.write(target, next)?;
            }
            Command::ScoreOperation { target, op, source } => {
                let rhs = self.read(source)?;
                let lhs = match op {
                    ScoreOp::Assign => 0,
                    _ => self.read(target)?,
                };
                let next = self.operate(cmd, *op, lhs, rhs)?;
                self.write(target, next)?;
            }
            Command::StoreEntityData {
                target,
                entity,
                path,
                scale,
            } => {
                let idx = self.single_target(entity, ctx, cmd)?;
                let NbtPath::Pos(axis) = path else {
                    return Err(VmError::UnsupportedPath {
                        path: *path,
                        op: "data get",
                    });
                };
                let value = sample_axis(self.entities[idx].pos.axis(*axis), *scale).map_err(
                    |source| VmError::Arithmetic {
                        command: cmd.to_string(),
                        source,
                    },
                )?;
                self.write(target, value)?;
            }
            Command::StoreScoreToEntity {
                entity,
                path,
                ty,
                scale,
                source,
            } => {
                let raw = self.read(source)?;
                let idx = self.single_target(entity, ctx, cmd)?;
                let NbtPath::Pos(axis) = path else {
                    return Err(VmError::UnsupportedPath {
                        path: *path,
                        op: "store result entity",
                    });
                };
                let v = raw as f64 * scale;
                let stored = match ty {
                    NumericType::Double => v,
                    NumericType::Float => v as f32 as f64,
                    _ => v.trunc(),
                };
                self.entities[idx].pos.set_axis(*axis, stored);
            }
            Command::DataSet {
                entity,
                path,
                value,
            } => {
                let idx = self.single_target(entity, ctx, cmd)?;
                if *path != NbtPath::HEAD_SLOT {
                    return Err(VmError::UnsupportedPath {
                        path: *path,
                        op: "data modify",
                    });
                }
                self.entities[idx].head = Some(value.clone());
            }
            Command::Summon { entity, pos, nbt } => {
                let tags = match nbt.get("Tags") {
                    Some(Snbt::List(items)) => items
                        .iter()
                        .filter_map(|t| match t {
                            Snbt::String(s) => Tag::new(s).ok(),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                self.spawn(entity.clone(), *pos, tags);
            }
            Command::Kill(selector) => {
                let doomed = self.select(selector, ctx);
                self.entities.retain(|e| !doomed.contains(&e.uid));
            }
            Command::Function(id) => self.call_in(id, ctx, depth)?,
            Command::Schedule {
                function,
                ticks,
                mode,
            } => {
                self.queue
                    .schedule_after(ticks.get() as u64, function.clone(), *mode);
            }
            Command::PlaySound { target, .. } => {
                self.stats.sounds += self.select(target, ctx).len() as u64;
            }
            Command::Execute { steps, run } => self.exec_chain(steps, run, ctx, depth)?,
        }
        Ok(())
    }

    fn exec_chain(
        &mut self,
        steps: &[ExecuteStep],
        run: &Command,
        ctx: Ctx,
        depth: usize,
    ) -> Result<(), VmError> {
        let Some((step, rest)) = steps.split_first() else {
            return self.exec(run, ctx, depth);
        };
        match step {
            ExecuteStep::As(selector) => {
                for uid in self.select(selector, ctx) {
                    self.exec_chain(rest, run, Ctx { executor: Some(uid) }, depth)?;
                }
            }
            // Positions are not modelled; `at` keeps the executor and fans out per match.
            ExecuteStep::At(selector) => {
                for _ in self.select(selector, ctx) {
                    self.exec_chain(rest, run, ctx, depth)?;
                }
            }
            ExecuteStep::If(pred) => {
                if self.test(pred) {
                    self.exec_chain(rest, run, ctx, depth)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
