use crate::dice::{Die, Face};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Physical capacity of a cup.
pub const MAX_DICE: usize = 5;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CupError {
    #[error("cannot shake a negative number of dice: {0}")]
    NegativeCount(i32),
    #[error("die has not been rolled yet")]
    Unrolled,
}

/// Source of die faces.
pub trait Roller {
    fn roll_face(&mut self) -> Face;
}

/// Uniform rolls drawn from a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomRoller<R = ChaCha8Rng> {
    rng: R,
}

impl RandomRoller<ChaCha8Rng> {
    /// Seeded roller for reproducible matches.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Roller seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::rng().random();
        Self::seeded(seed)
    }
}

impl<R: Rng> RandomRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Roller for RandomRoller<R> {
    fn roll_face(&mut self) -> Face {
        let pips: u8 = self.rng.random_range(1..=6);
        Face::from_pips(pips).unwrap_or(Face::Ace)
    }
}

/// Replays a fixed sequence of faces, starting over once exhausted.
///
/// Useful for replaying a recorded match or pinning dice in tests.
///
/// ```
/// use dudo_rs::cup::{Roller, ScriptedRoller};
/// use dudo_rs::dice::Face;
///
/// let mut r = ScriptedRoller::from_pips(&[1, 6]);
/// assert_eq!(r.roll_face(), Face::Ace);
/// assert_eq!(r.roll_face(), Face::Sexto);
/// assert_eq!(r.roll_face(), Face::Ace);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedRoller {
    faces: Vec<Face>,
    pos: usize,
}

impl ScriptedRoller {
    pub fn new(faces: Vec<Face>) -> Self {
        Self { faces, pos: 0 }
    }

    /// Build from pip values; values outside 1..=6 are skipped.
    pub fn from_pips(pips: &[u8]) -> Self {
        Self::new(pips.iter().filter_map(|&p| Face::from_pips(p)).collect())
    }

    /// Number of faces handed out so far.
    pub fn rolled(&self) -> usize {
        self.pos
    }
}

impl Roller for ScriptedRoller {
    fn roll_face(&mut self) -> Face {
        if self.faces.is_empty() {
            return Face::Ace;
        }
        let face = self.faces[self.pos % self.faces.len()];
        self.pos += 1;
        face
    }
}

/// What a cup shows to whoever looks at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CupView {
    Hidden,
    Empty,
    Faces(Vec<Face>),
}

impl CupView {
    pub fn faces(&self) -> Option<&[Face]> {
        match self {
            CupView::Faces(f) => Some(f),
            CupView::Empty => Some(&[]),
            CupView::Hidden => None,
        }
    }
}

/// A player's cup: five dice, of which the first `active` are in play.
#[derive(Debug, Clone, Default)]
pub struct DiceCup {
    dice: [Die; MAX_DICE],
    active: usize,
    hidden: bool,
}

impl DiceCup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll `count` dice (clamped to the cup's capacity) and return how many were rolled.
    pub fn shake<R: Roller + ?Sized>(&mut self, count: i32, roller: &mut R) -> Result<usize, CupError> {
        if count < 0 {
            return Err(CupError::NegativeCount(count));
        }
        let count = (count as usize).min(MAX_DICE);
        for die in &mut self.dice[..count] {
            die.roll(roller);
        }
        self.active = count;
        Ok(count)
    }

    pub fn view(&self) -> CupView {
        if self.hidden {
            return CupView::Hidden;
        }
        if self.active == 0 {
            return CupView::Empty;
        }
        CupView::Faces(self.faces())
    }

    /// Faces of the active dice, ignoring the hidden flag.
    pub fn faces(&self) -> Vec<Face> {
        self.dice[..self.active].iter().filter_map(|d| d.face().ok()).collect()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn reveal(&mut self) {
        self.hidden = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_shake_is_rejected() {
        let mut cup = DiceCup::new();
        let mut r = RandomRoller::seeded(1);
        assert_eq!(cup.shake(-1, &mut r), Err(CupError::NegativeCount(-1)));
        assert_eq!(cup.active(), 0);
    }

    #[test]
    fn shake_clamps_to_capacity() {
        let mut cup = DiceCup::new();
        let mut r = RandomRoller::seeded(2);
        assert_eq!(cup.shake(9, &mut r).unwrap(), 5);
        assert_eq!(cup.faces().len(), 5);
    }

    #[test]
    fn view_has_three_states() {
        let mut cup = DiceCup::new();
        assert_eq!(cup.view(), CupView::Empty);
        cup.shake(2, &mut ScriptedRoller::from_pips(&[3, 4])).unwrap();
        assert_eq!(cup.view(), CupView::Faces(vec![Face::Train, Face::Square]));
        cup.hide();
        assert_eq!(cup.view(), CupView::Hidden);
        assert_eq!(cup.faces(), vec![Face::Train, Face::Square]);
    }

    #[test]
    fn hide_then_reveal_keeps_results() {
        let mut cup = DiceCup::new();
        cup.shake(4, &mut RandomRoller::seeded(7)).unwrap();
        let before = cup.view();
        cup.hide();
        cup.reveal();
        assert_eq!(cup.view(), before);
    }

    #[test]
    fn shrinking_shake_only_reveals_active_dice() {
        let mut cup = DiceCup::new();
        cup.shake(5, &mut ScriptedRoller::from_pips(&[1, 2, 3, 4, 5])).unwrap();
        cup.shake(2, &mut ScriptedRoller::from_pips(&[6])).unwrap();
        assert_eq!(cup.faces(), vec![Face::Sexto, Face::Sexto]);
    }

    #[test]
    fn seeded_rollers_are_reproducible() {
        let mut a = RandomRoller::seeded(42);
        let mut b = RandomRoller::seeded(42);
        let xs: Vec<Face> = (0..20).map(|_| a.roll_face()).collect();
        let ys: Vec<Face> = (0..20).map(|_| b.roll_face()).collect();
        assert_eq!(xs, ys);
    }
}
