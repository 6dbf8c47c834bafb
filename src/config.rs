//! Table configuration.
//!
//! ```
//! use tarot_rs::config::{GameMode, TableConfig};
//!
//! let cfg = TableConfig::from_json_str(r#"{
//!     "number_of_players": 5,
//!     "distribution": { "type": "Numbered", "seed": 12 },
//!     "mode": { "type": "SimpleTournament", "deals": 3 }
//! }"#).unwrap();
//! assert_eq!(cfg.number_of_players, 5);
//! assert_eq!(cfg.mode.number_of_deals(), 3);
//! ```

use crate::deal::Distribution;
use crate::engine::{Engine, Transition};
use crate::place::Place;
use crate::rules::{self, PlayerCountError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    PlayerCount(#[from] PlayerCountError),
    #[error("dealer {dealer} is not seated at a {players}-player table")]
    Dealer { dealer: Place, players: u8 },
    #[error("a tournament needs at least one deal")]
    NoDeals,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How many deals a game lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameMode {
    /// A single deal.
    #[default]
    QuickDeal,
    SimpleTournament { deals: usize },
}

impl GameMode {
    pub fn number_of_deals(self) -> usize {
        match self {
            GameMode::QuickDeal => 1,
            GameMode::SimpleTournament { deals } => deals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub number_of_players: u8,
    pub distribution: Distribution,
    /// Dealer of the first deal; random when unset.
    pub dealer: Option<Place>,
    pub mode: GameMode,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            number_of_players: 4,
            distribution: Distribution::Random,
            dealer: None,
            mode: GameMode::QuickDeal,
        }
    }
}

impl TableConfig {
    pub fn new(number_of_players: u8) -> Self {
        Self { number_of_players, ..Self::default() }
    }

    /// Deal reproducibly from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.distribution = Distribution::Numbered { seed };
        self
    }

    pub fn with_dealer(mut self, dealer: Place) -> Self {
        self.dealer = Some(dealer);
        self
    }

    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = rules::check_player_count(self.number_of_players)?;
        if let Some(dealer) = self.dealer {
            if dealer.index() >= n as usize {
                return Err(ConfigError::Dealer { dealer, players: n });
            }
        }
        if self.mode.number_of_deals() == 0 {
            return Err(ConfigError::NoDeals);
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: TableConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Create the table on `engine` and hand it the distribution.
    pub fn setup(&self, engine: &mut Engine) -> Result<Transition, ConfigError> {
        self.validate()?;
        let transition = engine.create_table(self.number_of_players)?;
        if let Some(dealer) = self.dealer {
            engine.set_first_dealer(dealer);
        }
        engine.set_distribution(self.distribution.clone());
        Ok(transition)
    }
}
