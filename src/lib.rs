//! dudo-rs: rule engine for Dudo, the South American dice-bidding game
//!
//! Goals:
//! - Deterministic rounds when driven by a seeded or scripted roller
//! - UI-agnostic: decisions come in through [`agents::BidSource`], results go
//!   out as [`engine::RoundReport`]
//! - No panics for invalid input; every refused action is a `Result` error
//!
//! ## Quick start: play one round
//! ```
//! use dudo_rs::agents::ScriptedAgent;
//! use dudo_rs::cup::ScriptedRoller;
//! use dudo_rs::dice::Face;
//! use dudo_rs::engine::{BidAction, Direction};
//! use dudo_rs::game::{Game, GameConfig};
//! use dudo_rs::rules::Bid;
//!
//! let mut game = Game::new(["Ana", "Bo"], GameConfig::default()).unwrap();
//! game.set_direction(Direction::Right);
//!
//! // every die comes up Square
//! let mut roller = ScriptedRoller::from_pips(&[4]);
//! let mut agent = ScriptedAgent::new(vec![
//!     BidAction::Raise(Bid::new(6, Face::Square)),
//!     BidAction::Doubt,
//! ]);
//!
//! let report = game.play_round(&mut agent, &mut roller).unwrap();
//! assert_eq!(report.player, "Bo");
//! assert_eq!(game.players()[1].dice(), 4);
//! ```
//!
//! Enable `tracing` output by installing any subscriber in the host binary;
//! the library only emits events.

pub mod agents;
pub mod cup;
pub mod dice;
pub mod engine;
pub mod game;
pub mod player;
pub mod rules;
pub mod tally;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
