//! tarot-rs: French Tarot rules engine
//!
//! Goals:
//! - Card legality, bidding, dog and discard, handles, trick resolution and
//!   deal scoring for 3, 4 and 5 players
//! - An explicit deal state machine driven by setters and acknowledgements
//! - A JSON deal log that can be replayed to rebuild and re-score a deal
//! - No panics for invalid input; use `Result` for recoverable errors
//!
//! ## Quick start: play a deal with bots
//! ```
//! use tarot_rs::agents::AgentTable;
//! use tarot_rs::config::TableConfig;
//! use tarot_rs::engine::{Engine, Sequence};
//!
//! let mut engine = Engine::with_seed(42);
//! TableConfig::new(4).with_seed(42).setup(&mut engine).unwrap();
//! engine.advance().unwrap(); // new game
//! engine.advance().unwrap(); // deal the cards
//!
//! let mut bots = AgentTable::bots(4, 42);
//! if let Some(points) = bots.play_deal(&mut engine).unwrap() {
//!     assert_eq!(engine.sequence(), Sequence::WaitForEndOfDeal);
//!     let replayed = engine.deal_log().replay().unwrap().analyze_game();
//!     assert_eq!(replayed, points);
//! }
//! ```
//!
//! ## CLI
//! Play seeded deals between bots with:
//! ```sh
//! cargo run --bin tarot-rs -- --players 5 --seed 7 --output deal.json
//! ```

pub mod agents;
pub mod bid;
pub mod cards;
pub mod config;
pub mod context;
pub mod deal;
pub mod deal_log;
pub mod deck;
pub mod engine;
pub mod hand;
pub mod place;
pub mod rules;
pub mod score;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
