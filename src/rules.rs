//! Bid legality. Everything here is a pure function of its arguments.

use crate::dice::{Face, FaceParseError};
use std::fmt;
use std::str::FromStr;

/// "At least `quantity` dice show `face`".
///
/// ```
/// use dudo_rs::dice::Face;
/// use dudo_rs::rules::Bid;
///
/// let bid: Bid = "3 train".parse().unwrap();
/// assert_eq!(bid, Bid::new(3, Face::Train));
/// assert_eq!(bid.to_string(), "3 Train");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bid {
    pub quantity: u32,
    pub face: Face,
}

impl Bid {
    pub const fn new(quantity: u32, face: Face) -> Self {
        Self { quantity, face }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.face)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BidParseError {
    #[error("expected '<quantity> <face>', got '{0}'")]
    Malformed(String),
    #[error("quantity must be a positive number: '{0}'")]
    Quantity(String),
    #[error(transparent)]
    Face(#[from] FaceParseError),
}

impl FromStr for Bid {
    type Err = BidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(q), Some(f), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BidParseError::Malformed(s.to_string()));
        };
        let quantity = q
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| BidParseError::Quantity(q.to_string()))?;
        let face = Face::from_str(f)?;
        Ok(Bid::new(quantity, face))
    }
}

/// A player down to one die may open a round with Aces, once per match.
pub fn can_open_with_aces(dice_in_hand: usize, already_used: bool) -> bool {
    dice_in_hand == 1 && !already_used
}

/// Whether `proposed` is a legal raise over `current`.
///
/// Moving into Aces halves the quantity (rounded up, plus one when even);
/// moving out of Aces needs more than double. In special rounds there is no
/// Ace conversion, equal quantities never pass, and only a player holding a
/// single die may change face while raising the quantity.
///
/// ```
/// use dudo_rs::dice::Face;
/// use dudo_rs::rules::{can_raise, Bid};
///
/// assert!(can_raise(Bid::new(7, Face::Train), Bid::new(4, Face::Ace), false, false));
/// assert!(!can_raise(Bid::new(7, Face::Quina), Bid::new(3, Face::Ace), false, false));
/// ```
pub fn can_raise(current: Bid, proposed: Bid, special: bool, proposer_has_one_die: bool) -> bool {
    if !special && !current.face.is_ace() && proposed.face.is_ace() {
        return proposed.quantity >= aces_from(current.quantity);
    }
    if !special && current.face.is_ace() && !proposed.face.is_ace() {
        return from_aces(current.quantity).is_some_and(|min| proposed.quantity >= min);
    }
    if proposed.quantity > current.quantity {
        return !special || proposer_has_one_die || proposed.face == current.face;
    }
    if proposed.quantity < current.quantity || special {
        return false;
    }
    proposed.face > current.face
}

/// Smallest Ace quantity that beats `quantity` of another face: half rounded
/// up when odd, half plus one when even. Both reduce to `quantity / 2 + 1`.
fn aces_from(quantity: u32) -> u32 {
    quantity / 2 + 1
}

/// Smallest quantity of another face that beats `quantity` Aces, or `None`
/// when no `u32` quantity is large enough.
fn from_aces(quantity: u32) -> Option<u32> {
    quantity.checked_mul(2)?.checked_add(1)
}

/// Smallest quantity of `face` that would be a legal raise over `current`.
///
/// `None` when no raise on `face` is legal, including when the required
/// quantity does not fit in a `u32`.
pub fn minimum_raise(current: Bid, face: Face, special: bool, proposer_has_one_die: bool) -> Option<u32> {
    let floor = match (special, current.face.is_ace(), face.is_ace()) {
        (false, false, true) => aces_from(current.quantity),
        (false, true, false) => from_aces(current.quantity)?,
        _ if face > current.face && !special => current.quantity,
        _ => current.quantity.checked_add(1)?,
    };
    (floor..=floor.saturating_add(1))
        .find(|&q| can_raise(current, Bid::new(q, face), special, proposer_has_one_die))
}

/// Calling "cover" needs at least half the match's maximum dice still in play,
/// unless the caller is down to a single die.
pub fn can_cover(dice_in_play: usize, max_dice: usize, caller_dice: usize) -> bool {
    caller_dice == 1 || dice_in_play >= cover_threshold(max_dice)
}

/// Dice that must remain in play for a cover call: half of `max_dice + 1`, rounded up.
pub fn cover_threshold(max_dice: usize) -> usize {
    (max_dice + 2) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Face::*;

    #[test]
    fn aces_opening() {
        assert!(can_open_with_aces(1, false));
        assert!(!can_open_with_aces(1, true));
        assert!(!can_open_with_aces(2, false));
        assert!(!can_open_with_aces(0, false));
    }

    #[test]
    fn raise_by_quantity_or_higher_face() {
        let base = Bid::new(2, Train);
        assert!(can_raise(base, Bid::new(3, Train), false, false));
        assert!(can_raise(base, Bid::new(2, Square), false, false));
        assert!(!can_raise(base, Bid::new(2, Fool), false, false));
        assert!(!can_raise(base, Bid::new(2, Train), false, false));
        assert!(!can_raise(base, Bid::new(1, Square), false, false));
    }

    #[test]
    fn switching_into_aces() {
        assert!(can_raise(Bid::new(7, Train), Bid::new(4, Ace), false, false));
        assert!(!can_raise(Bid::new(7, Train), Bid::new(3, Ace), false, false));
        assert!(can_raise(Bid::new(8, Train), Bid::new(5, Ace), false, false));
        assert!(!can_raise(Bid::new(8, Train), Bid::new(4, Ace), false, false));
        assert!(!can_raise(Bid::new(7, Quina), Bid::new(3, Ace), false, false));
    }

    #[test]
    fn switching_out_of_aces() {
        assert!(can_raise(Bid::new(2, Ace), Bid::new(5, Train), false, false));
        assert!(!can_raise(Bid::new(2, Ace), Bid::new(4, Train), false, false));
        assert!(can_raise(Bid::new(4, Ace), Bid::new(9, Sexto), false, false));
        assert!(!can_raise(Bid::new(4, Ace), Bid::new(8, Sexto), false, false));
    }

    #[test]
    fn aces_to_aces_is_plain_quantity() {
        assert!(can_raise(Bid::new(2, Ace), Bid::new(3, Ace), false, false));
        assert!(!can_raise(Bid::new(2, Ace), Bid::new(2, Ace), false, false));
    }

    #[test]
    fn special_round_keeps_face_unless_single_die() {
        let base = Bid::new(2, Train);
        assert!(can_raise(base, Bid::new(3, Train), true, false));
        assert!(!can_raise(base, Bid::new(3, Square), true, false));
        assert!(can_raise(base, Bid::new(3, Fool), true, true));
        assert!(!can_raise(base, Bid::new(2, Square), true, true));
        assert!(!can_raise(base, Bid::new(2, Train), true, false));
        // no Ace conversion in special rounds
        assert!(!can_raise(Bid::new(6, Train), Bid::new(4, Ace), true, false));
        assert!(can_raise(Bid::new(6, Train), Bid::new(7, Ace), true, true));
    }

    #[test]
    fn cover_threshold_table() {
        assert!(can_cover(12, 20, 3));
        assert!(!can_cover(10, 20, 5));
        assert!(can_cover(11, 20, 5));
        assert!(!can_cover(9, 20, 2));
        assert!(can_cover(9, 20, 1));
        assert_eq!(cover_threshold(20), 11);
        assert_eq!(cover_threshold(10), 6);
    }

    #[test]
    fn minimum_raise_matches_can_raise() {
        assert_eq!(minimum_raise(Bid::new(7, Train), Ace, false, false), Some(4));
        assert_eq!(minimum_raise(Bid::new(8, Train), Ace, false, false), Some(5));
        assert_eq!(minimum_raise(Bid::new(3, Ace), Quina, false, false), Some(7));
        assert_eq!(minimum_raise(Bid::new(3, Train), Square, false, false), Some(3));
        assert_eq!(minimum_raise(Bid::new(3, Train), Fool, false, false), Some(4));
        assert_eq!(minimum_raise(Bid::new(3, Train), Train, true, false), Some(4));
        assert_eq!(minimum_raise(Bid::new(3, Train), Square, true, false), None);
    }

    #[test]
    fn huge_quantities_do_not_overflow() {
        let max = u32::MAX;
        let half = 1u32 << 31;
        assert!(!can_raise(Bid::new(max, Train), Bid::new(1, Ace), false, false));
        assert!(can_raise(Bid::new(max, Train), Bid::new(max / 2 + 1, Ace), false, false));
        assert!(!can_raise(Bid::new(half, Ace), Bid::new(1, Train), false, false));
        assert!(!can_raise(Bid::new(half, Ace), Bid::new(max, Train), false, false));
        assert!(can_raise(Bid::new(half - 1, Ace), Bid::new(max, Train), false, false));
        assert_eq!(minimum_raise(Bid::new(max, Train), Train, false, false), None);
        assert_eq!(minimum_raise(Bid::new(max, Train), Square, false, false), Some(max));
        assert_eq!(minimum_raise(Bid::new(half, Ace), Train, false, false), None);
        assert_eq!(minimum_raise(Bid::new(max, Train), Ace, false, false), Some(half));
        assert_eq!("4294967295 train".parse::<Bid>().unwrap(), Bid::new(max, Train));
    }

    #[test]
    fn bid_parsing() {
        assert!("5 tren".parse::<Bid>().is_err());
        assert_eq!("5 train".parse::<Bid>().unwrap(), Bid::new(5, Train));
        assert_eq!("2 6".parse::<Bid>().unwrap(), Bid::new(2, Sexto));
        assert!(matches!("0 ace".parse::<Bid>(), Err(BidParseError::Quantity(_))));
        assert!(matches!("3".parse::<Bid>(), Err(BidParseError::Malformed(_))));
        assert!(matches!("3 ace extra".parse::<Bid>(), Err(BidParseError::Malformed(_))));
    }
}
