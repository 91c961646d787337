//! Boundaries to the presentation layer and to persistence.

use std::cell::RefCell;
use std::rc::Rc;

use schema::{MoveId, StatusEffect, TerrainType, WeatherType};
use serde::{Deserialize, Serialize};

use crate::battle::state::{BattleOutcome, BattlerRef};

/// What the presentation layer is being asked to animate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationRef {
    Move { user: BattlerRef, move_id: MoveId },
    SendOut(BattlerRef),
    Status { target: BattlerRef, effect: StatusEffect },
    Weather(WeatherType),
    Terrain(TerrainType),
}

/// Handle the presentation layer hands back when an animation finishes later.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    /// The scheduler stops after the current phase until `Battle::resume` is called
    /// with this ticket.
    Pending(AnimationTicket),
}

pub trait PresentationSink {
    fn queue_message(&mut self, text: &str);
    fn play_animation(&mut self, animation: AnimationRef) -> Completion;
    fn show_faint_animation(&mut self, battler: BattlerRef) -> Completion;
}

pub trait PersistenceSink {
    fn record_outcome(&mut self, outcome: &BattleOutcome);
}

/// Accepts everything and never makes the battle wait.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessSink;

impl PresentationSink for HeadlessSink {
    fn queue_message(&mut self, _text: &str) {}

    fn play_animation(&mut self, _animation: AnimationRef) -> Completion {
        Completion::Done
    }

    fn show_faint_animation(&mut self, _battler: BattlerRef) -> Completion {
        Completion::Done
    }
}

impl PersistenceSink for HeadlessSink {
    fn record_outcome(&mut self, _outcome: &BattleOutcome) {}
}

/// Everything a `RecordingSink` has been asked to present.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PresentationLog {
    pub messages: Vec<String>,
    pub animations: Vec<AnimationRef>,
    pub faints: Vec<BattlerRef>,
    pub outcomes: Vec<BattleOutcome>,
    pub tickets_issued: Vec<AnimationTicket>,
}

/// Records every call into a shared log. Clones share the same log, so a test can keep
/// one handle and give the other to the battle.
///
/// When built with [`RecordingSink::deferring`] every animation completes later, which
/// exercises the scheduler's suspension path.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    log: Rc<RefCell<PresentationLog>>,
    defer_animations: bool,
    next_ticket: Rc<RefCell<u64>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferring() -> Self {
        Self {
            defer_animations: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> PresentationLog {
        self.log.borrow().clone()
    }

    fn complete(&mut self) -> Completion {
        if !self.defer_animations {
            return Completion::Done;
        }
        let mut next = self.next_ticket.borrow_mut();
        *next += 1;
        let ticket = AnimationTicket(*next);
        self.log.borrow_mut().tickets_issued.push(ticket);
        Completion::Pending(ticket)
    }
}

impl PresentationSink for RecordingSink {
    fn queue_message(&mut self, text: &str) {
        self.log.borrow_mut().messages.push(text.to_string());
    }

    fn play_animation(&mut self, animation: AnimationRef) -> Completion {
        self.log.borrow_mut().animations.push(animation);
        self.complete()
    }

    fn show_faint_animation(&mut self, battler: BattlerRef) -> Completion {
        self.log.borrow_mut().faints.push(battler);
        self.complete()
    }
}

impl PersistenceSink for RecordingSink {
    fn record_outcome(&mut self, outcome: &BattleOutcome) {
        self.log.borrow_mut().outcomes.push(*outcome);
    }
}
