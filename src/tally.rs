use crate::cup::CupView;
use crate::dice::Face;
use crate::player::Player;
use std::fmt;
use std::ops::Index;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TallyError {
    #[error("cup of player '{player}' is hidden; dice cannot be counted")]
    HiddenCup { player: String },
}

/// Per-face count of dice, indexed by [`Face`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaceTally {
    counts: [u32; 6],
}

impl FaceTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally a single set of faces.
    pub fn from_faces(faces: &[Face]) -> Self {
        let mut t = Self::new();
        for &f in faces {
            t.add(f);
        }
        t
    }

    pub fn add(&mut self, face: Face) {
        self.counts[face.index()] += 1;
    }

    pub fn count(&self, face: Face) -> u32 {
        self.counts[face.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Dice that satisfy a bid on `face`.
    ///
    /// Outside special rounds Aces are wild and count toward every other face.
    pub fn effective_count(&self, face: Face, special: bool) -> u32 {
        if special || face.is_ace() {
            return self.count(face);
        }
        self.count(Face::Ace) + self.count(face)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Face, u32)> + '_ {
        Face::ALL.iter().map(move |&f| (f, self.count(f)))
    }
}

impl Index<Face> for FaceTally {
    type Output = u32;
    fn index(&self, face: Face) -> &u32 {
        &self.counts[face.index()]
    }
}

impl fmt::Display for FaceTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (face, n) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{n} {face}")?;
            first = false;
        }
        Ok(())
    }
}

/// Count every die across `players`. All cups must be revealed.
///
/// ```
/// use dudo_rs::cup::ScriptedRoller;
/// use dudo_rs::dice::Face;
/// use dudo_rs::player::Player;
/// use dudo_rs::tally::tally;
///
/// let mut roller = ScriptedRoller::from_pips(&[1, 3, 3]);
/// let mut players = vec![Player::new("A", 2), Player::new("B", 1)];
/// for p in &mut players {
///     p.shake(&mut roller).unwrap();
/// }
/// let t = tally(&players).unwrap();
/// assert_eq!(t[Face::Train], 2);
/// assert_eq!(t.effective_count(Face::Train, false), 3);
/// ```
pub fn tally(players: &[Player]) -> Result<FaceTally, TallyError> {
    let mut t = FaceTally::new();
    for p in players {
        match p.view_cup() {
            CupView::Hidden => {
                return Err(TallyError::HiddenCup { player: p.name().to_string() });
            }
            CupView::Empty => {}
            CupView::Faces(faces) => {
                for f in faces {
                    t.add(f);
                }
            }
        }
    }
    Ok(t)
}

/// Whether a cup qualifies as a pass hand: a full house, five of a kind, or
/// no face repeated.
pub fn is_pass_hand(faces: &[Face]) -> bool {
    let t = FaceTally::from_faces(faces);
    let mut pairs = 0;
    let mut triples = 0;
    let mut quints = 0;
    let mut repeated = false;
    for (_, n) in t.iter() {
        match n {
            0 | 1 => {}
            2 => {
                pairs += 1;
                repeated = true;
            }
            3 => {
                triples += 1;
                repeated = true;
            }
            5 => {
                quints += 1;
                repeated = true;
            }
            _ => repeated = true,
        }
    }
    (triples == 1 && pairs == 1) || quints == 1 || !repeated
}
