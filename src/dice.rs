use std::fmt;
use std::str::FromStr;

use crate::cup::{CupError, Roller};

/// The six faces of a Dudo die, ordered by pip value from Ace (1) to Sexto (6).
///
/// Ordering follows the pips, which is also the bid ranking at equal quantity.
/// The Ace's role as a wildcard is handled by the tally, not by this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Face {
    Ace = 1,
    Fool = 2,
    Train = 3,
    Square = 4,
    Quina = 5,
    Sexto = 6,
}

impl Face {
    pub const ALL: [Face; 6] =
        [Face::Ace, Face::Fool, Face::Train, Face::Square, Face::Quina, Face::Sexto];

    pub const fn pips(self) -> u8 {
        self as u8
    }

    /// Slot of this face in six-entry arrays.
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    pub const fn from_pips(pips: u8) -> Option<Face> {
        match pips {
            1 => Some(Face::Ace),
            2 => Some(Face::Fool),
            3 => Some(Face::Train),
            4 => Some(Face::Square),
            5 => Some(Face::Quina),
            6 => Some(Face::Sexto),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Face::Ace => "Ace",
            Face::Fool => "Fool",
            Face::Train => "Train",
            Face::Square => "Square",
            Face::Quina => "Quina",
            Face::Sexto => "Sexto",
        }
    }

    pub const fn is_ace(self) -> bool {
        matches!(self, Face::Ace)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FaceParseError {
    #[error("invalid face: '{0}'")]
    Invalid(String),
}

impl FromStr for Face {
    type Err = FaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Ok(pips) = t.parse::<u8>() {
            return Face::from_pips(pips).ok_or_else(|| FaceParseError::Invalid(s.to_string()));
        }
        let lower = t.to_ascii_lowercase();
        let face = match lower.as_str() {
            "ace" | "aces" => Face::Ace,
            "fool" | "fools" => Face::Fool,
            "train" | "trains" => Face::Train,
            "square" | "squares" => Face::Square,
            "quina" | "quinas" | "five-kind" => Face::Quina,
            "sexto" | "sextos" | "six-kind" => Face::Sexto,
            _ => return Err(FaceParseError::Invalid(s.to_string())),
        };
        Ok(face)
    }
}

impl TryFrom<u8> for Face {
    type Error = FaceParseError;
    fn try_from(pips: u8) -> Result<Self, Self::Error> {
        Face::from_pips(pips).ok_or_else(|| FaceParseError::Invalid(pips.to_string()))
    }
}

/// A single six-sided die. It has no face until first rolled.
///
/// ```
/// use dudo_rs::cup::ScriptedRoller;
/// use dudo_rs::dice::{Die, Face};
///
/// let mut die = Die::new();
/// assert!(die.face().is_err());
/// die.roll(&mut ScriptedRoller::new(vec![Face::Train]));
/// assert_eq!(die.face().unwrap(), Face::Train);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Die {
    face: Option<Face>,
}

impl Die {
    pub const fn new() -> Self {
        Self { face: None }
    }

    pub fn roll<R: Roller + ?Sized>(&mut self, roller: &mut R) {
        self.face = Some(roller.roll_face());
    }

    /// Current face; fails until the die has been rolled once.
    pub fn face(&self) -> Result<Face, CupError> {
        self.face.ok_or(CupError::Unrolled)
    }

    pub fn is_rolled(&self) -> bool {
        self.face.is_some()
    }
}
