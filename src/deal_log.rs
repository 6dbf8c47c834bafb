//! Audit record of a finished deal and its replay.
//!
//! ```
//! use tarot_rs::deal_log::{DealLog, DealLogError};
//!
//! let err = DealLog::from_json_str(r#"{"version":"0","deal_info":{},"tricks":[]}"#);
//! assert!(matches!(err, Err(DealLogError::Version { .. })));
//! ```

use crate::bid::{Bid, Contract};
use crate::context::{DealContext, TrickError};
use crate::deck::Deck;
use crate::place::{Place, Team};
use crate::rules::{self, PlayerCountError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::error;

pub const DEAL_LOG_VERSION: &str = "3";

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DealLogError {
    #[error("wrong deal log version: expected {expected}, found '{found}'")]
    Version { expected: &'static str, found: String },
    #[error(transparent)]
    PlayerCount(#[from] PlayerCountError),
    #[error("deal log holds {found} tricks, expected {expected}")]
    TrickCount { expected: usize, found: usize },
    #[error("trick {trick} holds {found} cards, expected {expected}")]
    TrickSize { trick: usize, expected: usize, found: usize },
    #[error("trick {0} repeats a card already played")]
    Duplicate(usize),
    #[error("{found} cards left for the discard, expected {expected}")]
    Discard { expected: usize, found: usize },
    #[error(transparent)]
    Trick(#[from] TrickError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bid, dog and handles of a logged deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealInfo {
    pub number_of_players: u8,
    #[serde(with = "optional_place")]
    pub taker: Option<Place>,
    pub contract: Contract,
    pub slam: bool,
    #[serde(with = "optional_place")]
    pub first_trick_lead: Option<Place>,
    pub dog: Deck,
    pub attack_handle: Deck,
    pub defense_handle: Deck,
    /// Called partner of a 5-player deal; absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_place")]
    pub partner: Option<Place>,
}

/// A finished deal: enough to rebuild its context and score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealLog {
    pub version: String,
    pub deal_info: DealInfo,
    pub tricks: Vec<Deck>,
}

impl DealLog {
    pub fn from_context(ctx: &DealContext) -> Self {
        let bid = ctx.bid();
        let partner = if bid.has_partner() { bid.partner } else { None };
        Self {
            version: DEAL_LOG_VERSION.to_string(),
            deal_info: DealInfo {
                number_of_players: ctx.nb_players(),
                taker: bid.taker,
                contract: bid.contract,
                slam: bid.slam,
                first_trick_lead: ctx.first_player(),
                dog: ctx.dog().clone(),
                attack_handle: ctx.attack_handle().clone(),
                defense_handle: ctx.defense_handle().clone(),
                partner,
            },
            // owners are not part of the record
            tricks: ctx.tricks().iter().map(|t| t.iter().copied().collect()).collect(),
        }
    }

    /// Decode a record, rejecting any other format version.
    pub fn from_json_str(s: &str) -> Result<Self, DealLogError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        let found = value.get("version").and_then(|v| v.as_str()).unwrap_or_default();
        if found != DEAL_LOG_VERSION {
            error!(found, "deal log version mismatch");
            return Err(DealLogError::Version {
                expected: DEAL_LOG_VERSION,
                found: found.to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_string(&self) -> Result<String, DealLogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DealLogError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DealLogError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Rebuild the deal context by replaying every trick.
    ///
    /// The cards never played form the discard, which belongs to the defense
    /// on a Guard against and to the attack otherwise. Nothing is returned
    /// unless the whole record is consistent.
    pub fn replay(&self) -> Result<DealContext, DealLogError> {
        let info = &self.deal_info;
        let n = rules::check_player_count(info.number_of_players)?;
        let expected = rules::cards_in_hand(n);
        if self.tricks.len() != expected {
            error!(found = self.tricks.len(), expected, "bad deal contents");
            return Err(DealLogError::TrickCount { expected, found: self.tricks.len() });
        }

        let mut ctx = DealContext::new(n);
        ctx.set_bid_record(Bid {
            taker: info.taker,
            partner: info.partner.or(info.taker),
            contract: info.contract,
            slam: info.slam,
        });
        ctx.set_dog(info.dog.clone());
        ctx.set_handles(info.attack_handle.clone(), info.defense_handle.clone());
        if let Some(lead) = info.first_trick_lead {
            ctx.set_first_player(lead);
        }

        let mut remaining = Deck::standard();
        for (i, trick) in self.tricks.iter().enumerate() {
            let number = i + 1;
            if trick.len() != n as usize {
                error!(trick = number, "bad trick size");
                return Err(DealLogError::TrickSize {
                    trick: number,
                    expected: n as usize,
                    found: trick.len(),
                });
            }
            if remaining.remove_duplicates(trick) != n as usize {
                error!(trick = number, "bad deal contents");
                return Err(DealLogError::Duplicate(number));
            }
            ctx.set_trick(trick.clone())?;
        }

        let dog_size = rules::dog_cards(n);
        if remaining.len() != dog_size {
            error!(size = remaining.len(), contents = %remaining, "bad discard size");
            return Err(DealLogError::Discard { expected: dog_size, found: remaining.len() });
        }
        let owner = match info.contract {
            Contract::GuardAgainst => Team::Defense,
            _ => Team::Attack,
        };
        ctx.set_discard(remaining, owner);
        Ok(ctx)
    }
}

/// Seats written as names, `"Nowhere"` standing for no seat.
mod optional_place {
    use crate::place::Place;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(place: &Option<Place>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Place::name_of(*place))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Place>, D::Error> {
        let s = String::deserialize(deserializer)?;
        Place::parse_optional(&s).map_err(serde::de::Error::custom)
    }
}
