use crate::cup::{CupError, CupView, DiceCup, Roller, MAX_DICE};
use crate::dice::Face;

/// A seated player: a name, a die count and the cup they shake.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Player {
    pub(crate) name: String,
    pub(crate) dice: usize,
    pub(crate) cup: DiceCup,
}

impl Player {
    /// New player holding `dice` dice (at most a full cup).
    pub fn new(name: impl Into<String>, dice: usize) -> Self {
        Self { name: name.into(), dice: dice.min(MAX_DICE), cup: DiceCup::new() }
    }

    /// Returns the player's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how many dice the player currently owns
    pub fn dice(&self) -> usize {
        self.dice
    }

    pub fn cup(&self) -> &DiceCup {
        &self.cup
    }

    pub(crate) fn cup_mut(&mut self) -> &mut DiceCup {
        &mut self.cup
    }

    pub fn is_eliminated(&self) -> bool {
        self.dice == 0
    }

    /// Shake the cup with every die the player owns.
    pub fn shake<R: Roller + ?Sized>(&mut self, roller: &mut R) -> Result<usize, CupError> {
        let count = i32::try_from(self.dice).unwrap_or(i32::MAX);
        self.cup.shake(count, roller)
    }

    /// What the player sees when lifting their own cup.
    pub fn view_cup(&self) -> CupView {
        self.cup.view()
    }

    pub(crate) fn faces(&self) -> Vec<Face> {
        self.cup.faces()
    }

    pub fn lose_die(&mut self) {
        self.dice = self.dice.saturating_sub(1);
    }

    /// Gain a die unless the cup is already full; returns whether the count grew.
    pub fn gain_die(&mut self) -> bool {
        if self.dice >= MAX_DICE {
            return false;
        }
        self.dice += 1;
        true
    }
}
