use std::collections::BTreeMap;
use std::fmt;

use crate::command::{Command, Predicate};
use crate::ident::{Holder, IdentError, Objective};

/// One integer register: a holder on an objective.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Score {
    pub holder: Holder,
    pub objective: Objective,
}

impl Score {
    pub fn new(holder: Holder, objective: Objective) -> Self {
        Self { holder, objective }
    }

    pub fn set(&self, value: i32) -> Command {
        Command::ScoreSet {
            target: self.clone(),
            value,
        }
    }

    pub fn add(&self, value: i32) -> Command {
        Command::ScoreAdd {
            target: self.clone(),
            value,
        }
    }

    pub fn op(&self, op: ScoreOp, source: &Score) -> Command {
        Command::ScoreOperation {
            target: self.clone(),
            op,
            source: source.clone(),
        }
    }

    pub fn assign(&self, source: &Score) -> Command {
        self.op(ScoreOp::Assign, source)
    }

    pub fn less_than(&self, value: i32) -> Predicate {
        Predicate::ScoreLess(self.clone(), value)
    }

    pub fn greater_than(&self, value: i32) -> Predicate {
        Predicate::ScoreGreater(self.clone(), value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.holder, self.objective)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoreOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ScoreOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ScoreOp::Assign => "=",
            ScoreOp::Add => "+=",
            ScoreOp::Sub => "-=",
            ScoreOp::Mul => "*=",
            ScoreOp::Div => "/=",
            ScoreOp::Mod => "%=",
        }
    }
}

/// Hands out scratch registers and deduplicated constant registers on one
/// objective. Constants are only usable after `init_constants` has run.
#[derive(Clone, Debug)]
pub struct ScoreAllocator {
    objective: Objective,
    next: u32,
    constants: BTreeMap<i32, Score>,
}

impl ScoreAllocator {
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            next: 0,
            constants: BTreeMap::new(),
        }
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// A fresh scratch register, never handed out twice.
    pub fn score(&mut self) -> Score {
        let id = self.next;
        self.next += 1;
        // `$<n>` always validates
        Score::new(Holder(format!("${id}")), self.objective.clone())
    }

    /// A register that holds `value` once constants are initialised.
    pub fn constant(&mut self, value: i32) -> Score {
        let objective = &self.objective;
        self.constants
            .entry(value)
            .or_insert_with(|| Score::new(Holder(format!("#c{value}")), objective.clone()))
            .clone()
    }

    /// A named public register such as `frame`.
    pub fn public(&self, name: &str) -> Result<Score, IdentError> {
        Ok(Score::new(Holder::new(name)?, self.objective.clone()))
    }

    pub fn constants(&self) -> impl Iterator<Item = (i32, &Score)> {
        self.constants.iter().map(|(v, s)| (*v, s))
    }

    pub fn init_constants(&self) -> Vec<Command> {
        self.constants.iter().map(|(v, s)| s.set(*v)).collect()
    }

    pub fn allocated(&self) -> u32 {
        self.next
    }
}
