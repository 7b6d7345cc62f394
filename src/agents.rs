//! Agents: the port through which the engine asks players for decisions.
//!
//! Whatever manages the humans at the table (a terminal prompt, a network
//! session, a test script) implements [`BidSource`]. The engine calls it
//! synchronously whenever a seat has to decide, so the engine itself performs
//! no I/O.

use crate::engine::{BidAction, RoundEngine, RuleViolation, SpecialChoice};
use std::collections::VecDeque;

/// Supplies decisions for whichever seat is due to act.
pub trait BidSource {
    /// Called when `seat` holds one die and may force a special round.
    fn special_choice(&mut self, _round: &RoundEngine<'_>, _seat: usize) -> SpecialChoice {
        SpecialChoice::Decline
    }

    /// Called when `seat` must bid. `None` means the seat cannot answer.
    fn next_action(&mut self, round: &RoundEngine<'_>, seat: usize) -> Option<BidAction>;

    /// Called when the last action supplied for `seat` was refused.
    fn rejected(&mut self, _seat: usize, _violation: &RuleViolation) {}
}

/// Replays queued decisions in order, regardless of seat.
///
/// ```
/// use dudo_rs::agents::ScriptedAgent;
/// use dudo_rs::engine::BidAction;
///
/// let agent = ScriptedAgent::new(vec![BidAction::Doubt]);
/// assert_eq!(agent.remaining(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    actions: VecDeque<BidAction>,
    choices: VecDeque<SpecialChoice>,
    rejections: Vec<(usize, RuleViolation)>,
}

impl ScriptedAgent {
    pub fn new(actions: impl IntoIterator<Item = BidAction>) -> Self {
        Self { actions: actions.into_iter().collect(), ..Self::default() }
    }

    /// Answers to forced-round offers, consumed in order. Once exhausted every
    /// further offer is declined.
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = SpecialChoice>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }

    pub fn push(&mut self, action: BidAction) {
        self.actions.push_back(action);
    }

    pub fn remaining(&self) -> usize {
        self.actions.len()
    }

    /// Refusals reported so far, as `(seat, reason)`.
    pub fn rejections(&self) -> &[(usize, RuleViolation)] {
        &self.rejections
    }
}

impl BidSource for ScriptedAgent {
    fn special_choice(&mut self, _round: &RoundEngine<'_>, _seat: usize) -> SpecialChoice {
        self.choices.pop_front().unwrap_or(SpecialChoice::Decline)
    }

    fn next_action(&mut self, _round: &RoundEngine<'_>, _seat: usize) -> Option<BidAction> {
        self.actions.pop_front()
    }

    fn rejected(&mut self, seat: usize, violation: &RuleViolation) {
        self.rejections.push((seat, violation.clone()));
    }
}
