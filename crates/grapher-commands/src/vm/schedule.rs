use std::collections::{BTreeMap, VecDeque};

use crate::command::ScheduleMode;
use crate::ident::FunctionId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub id: u64,
    pub tick: u64,
    pub function: FunctionId,
}

/// Tick-indexed FIFO of delayed function calls.
#[derive(Debug)]
pub struct ScheduleQueue {
    by_tick: BTreeMap<u64, VecDeque<Scheduled>>,
    pub now: u64,
    next_id: u64,
}

impl Default for ScheduleQueue {
    fn default() -> Self {
        Self {
            by_tick: BTreeMap::new(),
            now: 0,
            next_id: 1,
        }
    }
}

impl ScheduleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn schedule_after(&mut self, delta: u64, function: FunctionId, mode: ScheduleMode) -> u64 {
        if mode == ScheduleMode::Replace {
            self.cancel(&function);
        }
        let id = self.alloc_id();
        let tick = self.now + delta;
        self.by_tick.entry(tick).or_default().push_back(Scheduled {
            id,
            tick,
            function,
        });
        id
    }

    /// Remove every pending occurrence of `function`; returns how many were dropped.
    pub fn cancel(&mut self, function: &FunctionId) -> usize {
        let mut dropped = 0;
        for q in self.by_tick.values_mut() {
            let before = q.len();
            q.retain(|s| &s.function != function);
            dropped += before - q.len();
        }
        self.by_tick.retain(|_, q| !q.is_empty());
        dropped
    }

    pub fn pop_ready(&mut self) -> Option<Scheduled> {
        let (tick, q) = self.by_tick.range_mut(..=self.now).next()?;
        let tick = *tick;
        let entry = q.pop_front();
        if q.is_empty() {
            self.by_tick.remove(&tick);
        }
        entry
    }

    pub fn advance_tick(&mut self) {
        self.now = self.now.wrapping_add(1);
    }

    pub fn pending(&self) -> impl Iterator<Item = &Scheduled> {
        self.by_tick.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tick.is_empty()
    }
}
