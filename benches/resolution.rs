use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dudo_rs::cup::RandomRoller;
use dudo_rs::dice::Face;
use dudo_rs::player::Player;
use dudo_rs::rules::{can_raise, Bid};
use dudo_rs::tally::{is_pass_hand, FaceTally};

fn bench_can_raise(c: &mut Criterion) {
    let cases = [
        ("same_face", Bid::new(4, Face::Train), Bid::new(5, Face::Train)),
        ("into_aces", Bid::new(7, Face::Quina), Bid::new(4, Face::Ace)),
        ("out_of_aces", Bid::new(3, Face::Ace), Bid::new(7, Face::Sexto)),
    ];
    let mut g = c.benchmark_group("can_raise");
    for (name, current, proposed) in cases {
        g.bench_with_input(BenchmarkId::new("standard", name), &(current, proposed), |b, &(cur, prop)| {
            b.iter(|| can_raise(black_box(cur), black_box(prop), false, false))
        });
    }
    g.finish();
}

fn bench_tally(c: &mut Criterion) {
    let mut roller = RandomRoller::seeded(42);
    let mut players: Vec<Player> = (0..6).map(|i| Player::new(format!("P{i}"), 5)).collect();
    let mut faces = Vec::new();
    for p in &mut players {
        p.shake(&mut roller).unwrap();
        faces.extend(p.view_cup().faces().unwrap_or(&[]).iter().copied());
    }
    c.bench_function("tally_30_dice", |b| b.iter(|| dudo_rs::tally::tally(black_box(&players))));
    c.bench_function("face_tally_from_faces", |b| b.iter(|| FaceTally::from_faces(black_box(&faces))));
    c.bench_function("is_pass_hand", |b| b.iter(|| is_pass_hand(black_box(&faces[..5]))));
}

criterion_group!(benches, bench_can_raise, bench_tally);
criterion_main!(benches);
