use crate::agents::BidSource;
use crate::cup::{RandomRoller, Roller, MAX_DICE};
use crate::dice::Face;
use crate::engine::{Direction, MatchLedger, RoundEngine, RoundError, RoundReport, RoundRules};
use crate::player::Player;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameError {
    #[error("a match needs at least two players, got {0}")]
    TooFewPlayers(usize),
    #[error("player name '{0}' is taken")]
    DuplicateName(String),
    #[error("players must start with at least one die")]
    NoStartingDice,
    #[error("turn direction has not been chosen")]
    NoDirection,
    #[error("the match is already over")]
    GameOver,
    #[error("seat {seat} had {count} actions refused this round")]
    TooManyRejections { seat: usize, count: usize },
    #[error(transparent)]
    Round(#[from] RoundError),
}

/// Match settings.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GameConfig {
    /// Dice each player starts with (at most a full cup).
    pub starting_dice: usize,
    /// Refused actions tolerated within one round before giving up.
    pub max_rejected_actions: usize,
    pub rules: RoundRules,
    /// Seed for [`GameConfig::roller`]; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn with_starting_dice(mut self, dice: usize) -> Self {
        self.starting_dice = dice.min(MAX_DICE);
        self
    }

    pub fn with_max_rejected_actions(mut self, n: usize) -> Self {
        self.max_rejected_actions = n;
        self
    }

    pub fn with_rules(mut self, rules: RoundRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set a deterministic seed for reproducible dice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Roller matching this configuration's seed.
    pub fn roller(&self) -> RandomRoller {
        match self.seed {
            Some(seed) => RandomRoller::seeded(seed),
            None => RandomRoller::from_entropy(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { starting_dice: MAX_DICE, max_rejected_actions: 32, rules: RoundRules::default(), seed: None }
    }
}

/// A whole match: successive rounds until a single player keeps dice.
#[derive(Debug)]
#[non_exhaustive]
pub struct Game {
    pub(crate) players: Vec<Player>,
    pub(crate) ledger: MatchLedger,
    pub(crate) direction: Option<Direction>,
    pub(crate) current: usize,
    pub(crate) config: GameConfig,
    eliminated: Vec<String>,
    rounds_played: usize,
    last_report: Option<RoundReport>,
}

impl Game {
    /// Seat the named players in order.
    ///
    /// ```
    /// use dudo_rs::game::{Game, GameConfig};
    ///
    /// let game = Game::new(["Ana", "Bo", "Cy"], GameConfig::default()).unwrap();
    /// assert_eq!(game.dice_in_play(), 15);
    /// assert!(Game::new(["Ana"], GameConfig::default()).is_err());
    /// ```
    pub fn new<I, S>(names: I, config: GameConfig) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if config.starting_dice == 0 {
            return Err(GameError::NoStartingDice);
        }
        let mut seen = HashSet::new();
        let mut players = Vec::new();
        for name in names {
            let name: String = name.into();
            if !seen.insert(name.clone()) {
                return Err(GameError::DuplicateName(name));
            }
            players.push(Player::new(name, config.starting_dice));
        }
        if players.len() < 2 {
            return Err(GameError::TooFewPlayers(players.len()));
        }
        Ok(Self {
            players,
            ledger: MatchLedger::new(),
            direction: None,
            current: 0,
            config,
            eliminated: Vec::new(),
            rounds_played: 0,
            last_report: None,
        })
    }

    /// Returns the players still in the match, in seat order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns the seat that opens the next round
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ledger(&self) -> &MatchLedger {
        &self.ledger
    }

    /// Names of eliminated players, first out first
    pub fn eliminated(&self) -> &[String] {
        &self.eliminated
    }

    pub fn rounds_played(&self) -> usize {
        self.rounds_played
    }

    pub fn last_report(&self) -> Option<&RoundReport> {
        self.last_report.as_ref()
    }

    pub fn dice_in_play(&self) -> usize {
        self.players.iter().map(Player::dice).sum()
    }

    pub fn is_over(&self) -> bool {
        self.players.len() <= 1
    }

    pub fn winner(&self) -> Option<&Player> {
        match self.players.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Everyone rolls one die; the highest opens. Tied leaders roll again.
    pub fn decide_first_player<R: Roller + ?Sized>(&mut self, roller: &mut R) -> usize {
        let mut contenders: Vec<usize> = (0..self.players.len()).collect();
        while contenders.len() > 1 {
            let rolls: Vec<(usize, Face)> =
                contenders.iter().map(|&seat| (seat, roller.roll_face())).collect();
            let best = rolls.iter().map(|&(_, f)| f).max().unwrap_or(Face::Ace);
            contenders = rolls.into_iter().filter(|&(_, f)| f == best).map(|(s, _)| s).collect();
            debug!(?best, tied = contenders.len(), "first player roll");
        }
        self.current = contenders.first().copied().unwrap_or(0);
        self.current
    }

    /// Play one full round, re-asking `source` whenever it offers a refused action.
    pub fn play_round<R: Roller + ?Sized>(
        &mut self,
        source: &mut dyn BidSource,
        roller: &mut R,
    ) -> Result<RoundReport, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let direction = self.direction.ok_or(GameError::NoDirection)?;
        let max_rejected = self.config.max_rejected_actions;
        let report = {
            let mut round = RoundEngine::start(
                &mut self.players,
                &mut self.ledger,
                self.current,
                direction,
                self.config.rules.clone(),
                roller,
            )?;
            let mut rejected = 0;
            loop {
                match round.play_round(source) {
                    Ok(report) => break report,
                    Err(RoundError::Rule(violation)) => {
                        let seat = round.current_seat();
                        rejected += 1;
                        warn!(seat, %violation, rejected, "action refused");
                        source.rejected(seat, &violation);
                        if rejected > max_rejected {
                            return Err(GameError::TooManyRejections { seat, count: rejected });
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };
        self.finish_round(&report, direction);
        Ok(report)
    }

    /// Play rounds until one player is left and return the winner's name.
    pub fn play<R: Roller + ?Sized>(
        &mut self,
        source: &mut dyn BidSource,
        roller: &mut R,
    ) -> Result<String, GameError> {
        if self.direction.is_none() {
            return Err(GameError::NoDirection);
        }
        while !self.is_over() {
            self.play_round(source, roller)?;
        }
        let winner = self.winner().map(|p| p.name().to_string()).ok_or(GameError::GameOver)?;
        info!(%winner, rounds = self.rounds_played, "match won");
        Ok(winner)
    }

    /// Drop players without dice and pick who opens next: the player whose
    /// count changed, or the next live seat after them if they are out.
    fn finish_round(&mut self, report: &RoundReport, direction: Direction) {
        self.rounds_played += 1;
        let n = self.players.len();
        let mut next = report.seat;
        for _ in 0..n {
            if !self.players[next].is_eliminated() {
                break;
            }
            next = direction.step(next, n);
        }
        let opener = self.players[next].name().to_string();
        let (out, live): (Vec<Player>, Vec<Player>) =
            std::mem::take(&mut self.players).into_iter().partition(Player::is_eliminated);
        for p in out {
            info!(player = p.name(), "player eliminated");
            self.eliminated.push(p.name().to_string());
        }
        self.players = live;
        self.current = self.players.iter().position(|p| p.name() == opener).unwrap_or(0);
        self.last_report = Some(report.clone());
    }
}
