//! One betting round: turn order, forced rounds, bid progression and the
//! resolution of a doubt or cover call.
//!
//! A [`RoundEngine`] borrows the live players and the match ledger for the
//! duration of a single round. UIs drive it either step by step
//! ([`RoundEngine::choose_special`], [`RoundEngine::act`]) or through a
//! [`BidSource`] with [`RoundEngine::play_round`].

use crate::agents::BidSource;
use crate::cup::{CupError, Roller, MAX_DICE};
use crate::dice::Face;
use crate::player::Player;
use crate::rules::{can_cover, can_open_with_aces, can_raise, cover_threshold, Bid};
use crate::tally::{is_pass_hand, tally, FaceTally, TallyError};
use std::collections::HashSet;
use tracing::{debug, info};

/// Direction in which the turn travels around the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Increasing seat index.
    Right,
    /// Decreasing seat index.
    Left,
}

impl Direction {
    /// Seat that follows `seat` at a table of `n` players.
    pub fn step(self, seat: usize, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        match self {
            Direction::Right => (seat + 1) % n,
            Direction::Left => (seat + n - 1) % n,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
        }
    }
}

/// What a player may do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidAction {
    Raise(Bid),
    Pass,
    Doubt,
    Cover,
}

impl BidAction {
    pub fn label(self) -> &'static str {
        match self {
            BidAction::Raise(_) => "Raise",
            BidAction::Pass => "Pass",
            BidAction::Doubt => "Doubt",
            BidAction::Cover => "Cover",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BidAction::Doubt | BidAction::Cover)
    }
}

/// A non-terminal entry in the bidding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Raise(Bid),
    Pass,
}

/// The two ways a round ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    Doubt,
    Cover,
}

/// Visibility regime of a forced round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMode {
    /// Only the invoker sees their own cup.
    Closed,
    /// Everyone sees every other cup but not their own.
    Open,
}

/// Answer of a single-die player offered a forced round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialChoice {
    Closed,
    Open,
    Decline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingSpecialChoice { seat: usize },
    AwaitingBid,
    Resolving(Challenge),
    Concluded,
}

/// How a resolution changed the affected player's die count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DieChange {
    Lost,
    Gained,
    /// Won a cover while already holding a full cup.
    Capped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seat: usize,
    pub action: BidAction,
}

/// Result of a concluded round.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RoundReport {
    pub action: Challenge,
    /// For a doubt: the disputed call was false. For a cover: the count was exact.
    pub outcome: bool,
    pub terminal: bool,
    /// Seat that called doubt or cover.
    pub caller: usize,
    /// Seat whose die count changed.
    pub seat: usize,
    pub player: String,
    pub change: DieChange,
    /// The standing raise that was challenged.
    pub bid: Bid,
    pub special: Option<SpecialMode>,
    pub tally: FaceTally,
    pub history: Vec<HistoryEntry>,
}

/// Match-wide record of one-shot privileges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchLedger {
    forced_round: HashSet<String>,
    aces_opening: HashSet<String>,
}

impl MatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_forced_round(&self, name: &str) -> bool {
        self.forced_round.contains(name)
    }

    pub fn has_opened_with_aces(&self, name: &str) -> bool {
        self.aces_opening.contains(name)
    }

    pub fn mark_forced_round(&mut self, name: &str) {
        self.forced_round.insert(name.to_string());
    }

    pub fn mark_aces_opening(&mut self, name: &str) {
        self.aces_opening.insert(name.to_string());
    }
}

/// Optional table rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct RoundRules {
    /// Doubting directly after a pass checks the passer's cup for a pass hand
    /// instead of the raise before it.
    pub doubt_checks_pass_hand: bool,
}

impl RoundRules {
    pub fn with_pass_hand_doubt(mut self, enabled: bool) -> Self {
        self.doubt_checks_pass_hand = enabled;
        self
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleViolation {
    #[error("bid quantity must be positive")]
    ZeroQuantity,
    #[error("there is no standing bid")]
    NoStandingBid,
    #[error("passing is only allowed right after a raise")]
    PassNotAllowed,
    #[error("only a player holding one die may open with Aces, once per match")]
    AcesOpeningNotAllowed,
    #[error("{proposed} does not raise {current}")]
    RaiseTooLow { current: Bid, proposed: Bid },
    #[error("the face is fixed to {fixed} this round; {proposed} cannot change it")]
    FixedFace { fixed: Face, proposed: Bid },
    #[error("cover needs {required} dice in play, only {in_play} remain")]
    CoverNotAllowed { in_play: usize, required: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error(transparent)]
    Cup(#[from] CupError),
    #[error(transparent)]
    Tally(#[from] TallyError),
    #[error("not allowed while the round is {0:?}")]
    WrongPhase(Phase),
    #[error("a round needs at least one player")]
    NoPlayers,
    #[error("no seat {0} at this table")]
    InvalidSeat(usize),
    #[error("seat {seat} supplied no action")]
    NoAction { seat: usize },
}

#[derive(Debug, Clone, Default)]
struct RoundState {
    current: Option<Call>,
    previous: Option<Call>,
    special: Option<SpecialMode>,
    invoker: Option<String>,
    fixed_face: Option<Face>,
    can_see_own: HashSet<String>,
    can_see_others: HashSet<String>,
    history: Vec<HistoryEntry>,
}

impl RoundState {
    fn standing(&self) -> Option<Bid> {
        match (self.current, self.previous) {
            (Some(Call::Raise(b)), _) => Some(b),
            (Some(Call::Pass), Some(Call::Raise(b))) => Some(b),
            _ => None,
        }
    }
}

/// First of `count` seats, walking from `from`, whose player holds one die and
/// has not yet forced a round this match.
fn next_offer(
    players: &[Player],
    ledger: &MatchLedger,
    from: usize,
    count: usize,
    direction: Direction,
) -> Option<usize> {
    let n = players.len();
    let mut seat = from;
    for _ in 0..count {
        let p = &players[seat];
        if p.dice() == 1 && !ledger.has_forced_round(p.name()) {
            return Some(seat);
        }
        seat = direction.step(seat, n);
    }
    None
}

#[derive(Debug)]
pub struct RoundEngine<'a> {
    players: &'a mut [Player],
    ledger: &'a mut MatchLedger,
    rules: RoundRules,
    direction: Direction,
    current: usize,
    phase: Phase,
    state: RoundState,
    report: Option<RoundReport>,
}

impl<'a> RoundEngine<'a> {
    /// Shake every cup and open the round at seat `start`.
    ///
    /// Single-die players who have not yet forced a round this match are
    /// offered one before bidding begins, one at a time from `start` in
    /// `direction`. A decline passes the offer to the next such player.
    ///
    /// ```
    /// use dudo_rs::cup::ScriptedRoller;
    /// use dudo_rs::dice::Face;
    /// use dudo_rs::engine::{BidAction, Direction, MatchLedger, RoundEngine, RoundRules};
    /// use dudo_rs::player::Player;
    /// use dudo_rs::rules::Bid;
    ///
    /// let mut players = vec![Player::new("Ana", 2), Player::new("Bo", 2)];
    /// let mut ledger = MatchLedger::new();
    /// let mut roller = ScriptedRoller::from_pips(&[3, 3, 1, 5]);
    /// let mut round = RoundEngine::start(
    ///     &mut players, &mut ledger, 0, Direction::Right, RoundRules::default(), &mut roller,
    /// ).unwrap();
    ///
    /// round.act(BidAction::Raise(Bid::new(3, Face::Train))).unwrap();
    /// let report = round.act(BidAction::Doubt).unwrap().unwrap();
    /// // two Trains plus one wild Ace: the bid held, so the doubter loses a die
    /// assert!(!report.outcome);
    /// assert_eq!(report.player, "Bo");
    /// ```
    pub fn start<R: Roller + ?Sized>(
        players: &'a mut [Player],
        ledger: &'a mut MatchLedger,
        start: usize,
        direction: Direction,
        rules: RoundRules,
        roller: &mut R,
    ) -> Result<Self, RoundError> {
        if players.is_empty() {
            return Err(RoundError::NoPlayers);
        }
        if start >= players.len() {
            return Err(RoundError::InvalidSeat(start));
        }
        for p in players.iter_mut() {
            p.shake(roller)?;
            p.cup_mut().hide();
        }
        let n = players.len();
        let phase = match next_offer(&*players, &*ledger, start, n, direction) {
            Some(seat) => Phase::AwaitingSpecialChoice { seat },
            None => Phase::AwaitingBid,
        };
        debug!(players = n, start, ?direction, ?phase, "round started");
        Ok(Self {
            players,
            ledger,
            rules,
            direction,
            current: start,
            phase,
            state: RoundState::default(),
            report: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &*self.players
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Seat whose turn it is.
    pub fn current_seat(&self) -> usize {
        self.current
    }

    pub fn current_call(&self) -> Option<Call> {
        self.state.current
    }

    pub fn previous_call(&self) -> Option<Call> {
        self.state.previous
    }

    /// The raise a doubt or cover would be judged against.
    pub fn standing_bid(&self) -> Option<Bid> {
        self.state.standing()
    }

    pub fn is_special(&self) -> bool {
        self.state.special.is_some()
    }

    pub fn special_mode(&self) -> Option<SpecialMode> {
        self.state.special
    }

    pub fn invoker(&self) -> Option<&str> {
        self.state.invoker.as_deref()
    }

    pub fn fixed_face(&self) -> Option<Face> {
        self.state.fixed_face
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn report(&self) -> Option<&RoundReport> {
        self.report.as_ref()
    }

    pub fn ledger(&self) -> &MatchLedger {
        &*self.ledger
    }

    pub fn dice_in_play(&self) -> usize {
        self.players.iter().map(Player::dice).sum()
    }

    /// Most dice the live table could hold.
    pub fn max_dice(&self) -> usize {
        MAX_DICE * self.players.len()
    }

    /// Faces of `target`'s cup as `observer` is allowed to see them.
    ///
    /// Outside forced rounds players see only their own cup. During a forced
    /// round the visibility sets decide. This never affects resolution.
    pub fn seen_by(&self, observer: &str, target: &str) -> Option<Vec<Face>> {
        let t = self.players.iter().find(|p| p.name() == target)?;
        if !self.players.iter().any(|p| p.name() == observer) {
            return None;
        }
        let allowed = match self.state.special {
            None => observer == target,
            Some(_) if observer == target => self.state.can_see_own.contains(observer),
            Some(_) => self.state.can_see_others.contains(observer),
        };
        allowed.then(|| t.faces())
    }

    /// Record the offered player's answer to a forced round.
    pub fn choose_special(&mut self, choice: SpecialChoice) -> Result<(), RoundError> {
        let Phase::AwaitingSpecialChoice { seat } = self.phase else {
            return Err(RoundError::WrongPhase(self.phase));
        };
        let mode = match choice {
            SpecialChoice::Decline => {
                debug!(seat, "forced round declined");
                // seats between the decliner and the opener have not been asked yet
                let n = self.players.len();
                let to_start = match self.direction {
                    Direction::Right => (self.current + n - seat) % n,
                    Direction::Left => (seat + n - self.current) % n,
                };
                let unasked = if to_start == 0 { n - 1 } else { to_start - 1 };
                let from = self.direction.step(seat, n);
                let next = next_offer(&*self.players, &*self.ledger, from, unasked, self.direction);
                self.phase = match next {
                    Some(seat) => Phase::AwaitingSpecialChoice { seat },
                    None => Phase::AwaitingBid,
                };
                return Ok(());
            }
            SpecialChoice::Closed => SpecialMode::Closed,
            SpecialChoice::Open => SpecialMode::Open,
        };
        let name = self.players[seat].name().to_string();
        self.ledger.mark_forced_round(&name);
        self.state.special = Some(mode);
        self.state.can_see_own.clear();
        self.state.can_see_others.clear();
        match mode {
            SpecialMode::Closed => {
                self.state.can_see_own.insert(name.clone());
            }
            SpecialMode::Open => {
                self.state.can_see_others.extend(self.players.iter().map(|p| p.name().to_string()));
            }
        }
        info!(seat, player = %name, ?mode, "forced round declared");
        self.state.invoker = Some(name);
        self.current = seat;
        self.phase = Phase::AwaitingBid;
        Ok(())
    }

    /// Apply the current seat's action. Returns the report once the round concludes.
    ///
    /// A rejected action leaves the round untouched so the caller can ask again.
    pub fn act(&mut self, action: BidAction) -> Result<Option<RoundReport>, RoundError> {
        if self.phase != Phase::AwaitingBid {
            return Err(RoundError::WrongPhase(self.phase));
        }
        let seat = self.current;
        match action {
            BidAction::Raise(bid) => {
                let opens_with_aces = self.check_raise(bid)?;
                if opens_with_aces {
                    let name = self.players[seat].name().to_string();
                    self.ledger.mark_aces_opening(&name);
                }
                if self.state.special.is_some() {
                    self.state.fixed_face = Some(bid.face);
                }
                self.state.previous = self.state.current.replace(Call::Raise(bid));
            }
            BidAction::Pass => {
                if !matches!(self.state.current, Some(Call::Raise(_))) {
                    return Err(RuleViolation::PassNotAllowed.into());
                }
                self.state.previous = self.state.current.replace(Call::Pass);
            }
            BidAction::Doubt => {
                self.state.standing().ok_or(RuleViolation::NoStandingBid)?;
                self.state.history.push(HistoryEntry { seat, action });
                self.phase = Phase::Resolving(Challenge::Doubt);
                return self.resolve().map(Some);
            }
            BidAction::Cover => {
                self.state.standing().ok_or(RuleViolation::NoStandingBid)?;
                let in_play = self.dice_in_play();
                let max = self.max_dice();
                if !can_cover(in_play, max, self.players[seat].dice()) {
                    return Err(RuleViolation::CoverNotAllowed {
                        in_play,
                        required: cover_threshold(max),
                    }
                    .into());
                }
                self.state.history.push(HistoryEntry { seat, action });
                self.phase = Phase::Resolving(Challenge::Cover);
                return self.resolve().map(Some);
            }
        }
        debug!(seat, player = self.players[seat].name(), ?action, "call accepted");
        self.state.history.push(HistoryEntry { seat, action });
        self.current = self.direction.step(seat, self.players.len());
        Ok(None)
    }

    /// Validate a raise for the current seat. Returns whether it is an Ace opening.
    fn check_raise(&self, bid: Bid) -> Result<bool, RuleViolation> {
        if bid.quantity == 0 {
            return Err(RuleViolation::ZeroQuantity);
        }
        let p = &self.players[self.current];
        let one_die = p.dice() == 1;
        let Some(standing) = self.state.standing() else {
            if !bid.face.is_ace() {
                return Ok(false);
            }
            if !can_open_with_aces(p.dice(), self.ledger.has_opened_with_aces(p.name())) {
                return Err(RuleViolation::AcesOpeningNotAllowed);
            }
            return Ok(true);
        };
        let special = self.state.special.is_some();
        if let (true, Some(fixed)) = (special, self.state.fixed_face) {
            let is_invoker = self.state.invoker.as_deref() == Some(p.name());
            let may_switch = one_die && !is_invoker && bid.quantity > standing.quantity;
            if bid.face != fixed && !may_switch {
                return Err(RuleViolation::FixedFace { fixed, proposed: bid });
            }
        }
        if !can_raise(standing, bid, special, one_die) {
            return Err(RuleViolation::RaiseTooLow { current: standing, proposed: bid });
        }
        Ok(false)
    }

    /// Reveal every cup and settle the pending doubt or cover.
    fn resolve(&mut self) -> Result<RoundReport, RoundError> {
        let Phase::Resolving(action) = self.phase else {
            return Err(RoundError::WrongPhase(self.phase));
        };
        let bid = self.state.standing().ok_or(RuleViolation::NoStandingBid)?;
        for p in self.players.iter_mut() {
            p.cup_mut().reveal();
        }
        let counts = tally(&*self.players)?;
        let n = self.players.len();
        let caller = self.current;
        let preceding = self.direction.reversed().step(caller, n);
        let special = self.state.special.is_some();

        let (outcome, seat, change) = match action {
            Challenge::Doubt => {
                let doubts_pass = self.rules.doubt_checks_pass_hand
                    && matches!(self.state.current, Some(Call::Pass));
                let bid_holds = if doubts_pass {
                    is_pass_hand(&self.players[preceding].faces())
                } else {
                    counts.effective_count(bid.face, special) >= bid.quantity
                };
                let loser = if bid_holds { caller } else { preceding };
                self.players[loser].lose_die();
                (!bid_holds, loser, DieChange::Lost)
            }
            Challenge::Cover => {
                let exact = counts.effective_count(bid.face, special) == bid.quantity;
                let change = if !exact {
                    self.players[caller].lose_die();
                    DieChange::Lost
                } else if self.players[caller].gain_die() {
                    DieChange::Gained
                } else {
                    DieChange::Capped
                };
                (exact, caller, change)
            }
        };

        let player = self.players[seat].name().to_string();
        info!(
            ?action,
            %bid,
            special,
            outcome,
            caller,
            player = %player,
            ?change,
            tally = %counts,
            "round resolved"
        );
        let report = RoundReport {
            action,
            outcome,
            terminal: true,
            caller,
            seat,
            player,
            change,
            bid,
            special: self.state.special,
            tally: counts,
            history: std::mem::take(&mut self.state.history),
        };
        self.state = RoundState::default();
        self.phase = Phase::Concluded;
        self.report = Some(report.clone());
        Ok(report)
    }

    /// Drive the round to its conclusion, asking `source` for every decision.
    ///
    /// Errors are returned as soon as they occur; the round keeps its state,
    /// so calling this again resumes at the same turn.
    pub fn play_round(&mut self, source: &mut dyn BidSource) -> Result<RoundReport, RoundError> {
        loop {
            match self.phase {
                Phase::AwaitingSpecialChoice { seat } => {
                    let choice = source.special_choice(self, seat);
                    self.choose_special(choice)?;
                }
                Phase::AwaitingBid => {
                    let seat = self.current;
                    let action =
                        source.next_action(self, seat).ok_or(RoundError::NoAction { seat })?;
                    if let Some(report) = self.act(action)? {
                        return Ok(report);
                    }
                }
                Phase::Resolving(_) => return self.resolve(),
                Phase::Concluded => {
                    return self.report.clone().ok_or(RoundError::WrongPhase(self.phase));
                }
            }
        }
    }
}
