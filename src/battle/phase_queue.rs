use std::collections::VecDeque;

use crate::battle::phases::Phase;
use crate::battle::state::BattlerRef;

/// The live queue of resolution steps for the current turn.
///
/// The head is always the next phase to run. Phases prepended while a phase executes are
/// collected in a buffer and moved to the front, in the order they were added, once that
/// phase finishes. This keeps "A then B" ordering for effects that both need to resolve
/// before the rest of the turn.
#[derive(Debug, Default, Clone)]
pub struct PhaseQueue {
    phases: VecDeque<Phase>,
    prepended: Vec<Phase>,
}

impl PhaseQueue {
    /// Creates a new, empty PhaseQueue.
    pub fn new() -> Self {
        Self {
            phases: VecDeque::new(),
            prepended: Vec::new(),
        }
    }

    /// Adds a phase to the end of the queue.
    pub fn push_back(&mut self, phase: Phase) {
        self.phases.push_back(phase);
    }

    /// Schedules a phase to run before everything currently queued.
    pub fn unshift(&mut self, phase: Phase) {
        self.prepended.push(phase);
    }

    /// Moves the prepend buffer to the front of the queue, preserving its order.
    pub fn flush_prepended(&mut self) {
        for phase in self.prepended.drain(..).rev() {
            self.phases.push_front(phase);
        }
    }

    /// Removes and returns the next phase. Any unflushed prepends are flushed first.
    pub fn pop_front(&mut self) -> Option<Phase> {
        self.flush_prepended();
        self.phases.pop_front()
    }

    pub fn peek(&self) -> Option<&Phase> {
        self.prepended.first().or_else(|| self.phases.front())
    }

    /// Drops every queued phase matching `predicate`. Returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Phase) -> bool,
    {
        let before = self.len();
        self.phases.retain(|p| !predicate(p));
        self.prepended.retain(|p| !predicate(p));
        before - self.len()
    }

    /// Points every queued end-of-turn phase for `from` at `to` instead.
    pub fn retarget_residuals(&mut self, from: BattlerRef, to: BattlerRef) -> usize {
        let mut moved = 0;
        for phase in self.phases.iter_mut().chain(self.prepended.iter_mut()) {
            if phase.is_residual() && phase.subject() == Some(from) {
                phase.set_subject(to);
                moved += 1;
            }
        }
        moved
    }

    /// Iterates phases in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.prepended.iter().chain(self.phases.iter())
    }

    pub fn clear(&mut self) {
        self.phases.clear();
        self.prepended.clear();
    }

    pub fn len(&self) -> usize {
        self.phases.len() + self.prepended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
