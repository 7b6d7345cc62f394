use dudo_rs::dice::Face;
use dudo_rs::rules::{can_cover, can_open_with_aces, can_raise, cover_threshold, minimum_raise, Bid};
use proptest::prelude::*;

fn any_face() -> impl Strategy<Value = Face> {
    (1u8..=6).prop_map(|p| Face::from_pips(p).unwrap_or(Face::Ace))
}

fn any_bid() -> impl Strategy<Value = Bid> {
    (1u32..40, any_face()).prop_map(|(q, f)| Bid::new(q, f))
}

#[test]
fn aces_conversion_table() {
    let cases = [
        (Bid::new(7, Face::Train), Bid::new(4, Face::Ace), true),
        (Bid::new(7, Face::Quina), Bid::new(3, Face::Ace), false),
        (Bid::new(8, Face::Fool), Bid::new(5, Face::Ace), true),
        (Bid::new(8, Face::Fool), Bid::new(4, Face::Ace), false),
        (Bid::new(2, Face::Ace), Bid::new(5, Face::Train), true),
        (Bid::new(2, Face::Ace), Bid::new(4, Face::Sexto), false),
        (Bid::new(3, Face::Ace), Bid::new(7, Face::Fool), true),
    ];
    for (current, proposed, legal) in cases {
        assert_eq!(can_raise(current, proposed, false, false), legal, "{current} -> {proposed}");
    }
}

#[test]
fn cover_needs_half_the_table() {
    assert_eq!(cover_threshold(20), 11);
    assert!(can_cover(12, 20, 3));
    assert!(can_cover(11, 20, 4));
    assert!(!can_cover(10, 20, 5));
    assert!(!can_cover(9, 20, 2));
    assert!(can_cover(2, 20, 1));
}

#[test]
fn aces_opening_is_single_die_only() {
    assert!(can_open_with_aces(1, false));
    assert!(!can_open_with_aces(1, true));
    assert!(!can_open_with_aces(3, false));
}

proptest! {
    #[test]
    fn more_of_the_same_face_always_raises(bid in any_bid()) {
        let next = Bid::new(bid.quantity + 1, bid.face);
        prop_assert!(can_raise(bid, next, false, false));
        prop_assert!(can_raise(bid, next, true, false));
    }

    #[test]
    fn a_bid_never_raises_itself(bid in any_bid(), special in any::<bool>(), one_die in any::<bool>()) {
        prop_assert!(!can_raise(bid, bid, special, one_die));
    }

    #[test]
    fn special_rounds_need_more_dice(current in any_bid(), proposed in any_bid(), one_die in any::<bool>()) {
        if proposed.quantity <= current.quantity {
            prop_assert!(!can_raise(current, proposed, true, one_die));
        }
    }

    #[test]
    fn special_rounds_keep_face_for_full_cups(current in any_bid(), proposed in any_bid()) {
        if proposed.face != current.face {
            prop_assert!(!can_raise(current, proposed, true, false));
        }
    }

    #[test]
    fn minimum_raise_is_tight(
        current in any_bid(),
        face in any_face(),
        special in any::<bool>(),
        one_die in any::<bool>(),
    ) {
        if let Some(m) = minimum_raise(current, face, special, one_die) {
            prop_assert!(can_raise(current, Bid::new(m, face), special, one_die));
            if m > 1 {
                prop_assert!(!can_raise(current, Bid::new(m - 1, face), special, one_die));
            }
        }
    }

    #[test]
    fn single_die_caller_can_always_cover(in_play in 0usize..60, max in 0usize..60) {
        prop_assert!(can_cover(in_play, max, 1));
    }
}
