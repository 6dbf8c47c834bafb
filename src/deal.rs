//! Card distribution: shuffled deals, seeded deals and custom deal files.

use crate::cards::CardParseError;
use crate::deck::Deck;
use crate::hand::{validate_distribution, HandError, Hands};
use crate::place::Place;
use crate::rules::{self, PlayerCountError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Format version of custom deal files.
pub const DEAL_FILE_VERSION: &str = "3";

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DealError {
    #[error(transparent)]
    PlayerCount(#[from] PlayerCountError),
    #[error("wrong deal file version: expected {expected}, found '{found}'")]
    Version { expected: &'static str, found: String },
    #[error("invalid first player: '{0}'")]
    FirstPlayer(String),
    #[error("deal file is for {found} players, table has {expected}")]
    PlayerMismatch { expected: u8, found: u8 },
    #[error(transparent)]
    Cards(#[from] CardParseError),
    #[error(transparent)]
    Hand(#[from] HandError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the cards of the next deal are distributed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Distribution {
    #[default]
    Random,
    /// Reproducible deal from a seed.
    Numbered { seed: u64 },
    /// Deal read from a custom deal file.
    Custom { file: PathBuf },
}

/// Hands and dog of one deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: Hands,
    pub dog: Deck,
    /// Forced first player, set by custom deal files only.
    pub first_player: Option<Place>,
    /// Seed that produced the deal, if it was numbered.
    pub seed: Option<u64>,
}

impl Deal {
    /// Split an already shuffled deck: `cards_in_hand` cards per seat in seat
    /// order, the remainder to the dog.
    pub fn from_deck(nb_players: u8, deck: &Deck) -> Result<Self, DealError> {
        let n = rules::check_player_count(nb_players)?;
        let per = rules::cards_in_hand(n);
        let cards = deck.as_slice();
        let mut hands = Hands::new(n);
        for (chunk, place) in cards.chunks(per).zip(Place::seats(n)) {
            hands.set(place, Deck::from_cards(chunk.to_vec()));
        }
        let dog = Deck::from_cards(cards.get(per * n as usize..).unwrap_or_default().to_vec());
        validate_distribution(&hands, &dog)?;
        Ok(Self { hands, dog, first_player: None, seed: None })
    }

    /// Whether a player holds the Little trump as their only trump, without
    /// the Fool ("petit sec"). Such deals are dealt again.
    pub fn has_petit_sec(&self) -> bool {
        self.hands.iter().any(|(_, d)| d.has_only_one_of_trump())
    }

    /// Deal from the given RNG, reshuffling until no hand is a petit sec.
    pub fn random<R: Rng + ?Sized>(nb_players: u8, rng: &mut R) -> Result<Self, DealError> {
        loop {
            let mut deck = Deck::standard();
            deck.shuffle_with(rng);
            let deal = Self::from_deck(nb_players, &deck)?;
            if !deal.has_petit_sec() {
                return Ok(deal);
            }
            info!("petit sec detected, dealing again");
        }
    }

    /// Reproducible deal. A seed producing a petit sec is replaced by the
    /// next seed; the seed actually used is stored in [`Deal::seed`].
    pub fn numbered(nb_players: u8, seed: u64) -> Result<Self, DealError> {
        let mut seed = seed;
        loop {
            let mut deck = Deck::standard();
            deck.shuffle_seeded(seed);
            let mut deal = Self::from_deck(nb_players, &deck)?;
            if !deal.has_petit_sec() {
                deal.seed = Some(seed);
                return Ok(deal);
            }
            info!(seed, "petit sec detected, trying next seed");
            seed = seed.wrapping_add(1);
        }
    }

    pub fn nb_players(&self) -> u8 {
        self.hands.nb_players()
    }

    /// Parse a custom deal file. The player count is the number of
    /// non-empty hands.
    pub fn from_json_str(s: &str) -> Result<Self, DealError> {
        let file: DealFile = serde_json::from_str(s)?;
        file.into_deal()
    }

    pub fn to_json_string(&self) -> Result<String, DealError> {
        Ok(serde_json::to_string_pretty(&DealFile::from_deal(self))?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DealError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading custom deal");
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DealError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

impl Distribution {
    /// Produce the cards for a table of `nb_players`.
    pub fn deal<R: Rng + ?Sized>(&self, nb_players: u8, rng: &mut R) -> Result<Deal, DealError> {
        match self {
            Distribution::Random => Deal::random(nb_players, rng),
            Distribution::Numbered { seed } => Deal::numbered(nb_players, *seed),
            Distribution::Custom { file } => {
                let deal = Deal::load(file)?;
                if deal.nb_players() != nb_players {
                    return Err(DealError::PlayerMismatch {
                        expected: nb_players,
                        found: deal.nb_players(),
                    });
                }
                Ok(deal)
            }
        }
    }
}

/// On-disk layout of a custom deal file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DealFile {
    #[serde(rename = "version")]
    version: String,
    first_player: String,
    dog: Deck,
    south: Deck,
    east: Deck,
    north: Deck,
    west: Deck,
    fifth: Deck,
}

impl DealFile {
    fn from_deal(deal: &Deal) -> Self {
        let hand = |p: Place| deal.hands.get(p).clone();
        Self {
            version: DEAL_FILE_VERSION.to_string(),
            first_player: Place::name_of(deal.first_player).to_string(),
            dog: deal.dog.clone(),
            south: hand(Place::South),
            east: hand(Place::East),
            north: hand(Place::North),
            west: hand(Place::West),
            fifth: hand(Place::Fifth),
        }
    }

    fn into_deal(self) -> Result<Deal, DealError> {
        if self.version != DEAL_FILE_VERSION {
            return Err(DealError::Version { expected: DEAL_FILE_VERSION, found: self.version });
        }
        let first_player = Place::parse_optional(&self.first_player)
            .ok()
            .flatten()
            .ok_or_else(|| DealError::FirstPlayer(self.first_player.clone()))?;

        let decks = [self.south, self.east, self.north, self.west, self.fifth];
        let nb_players = decks.iter().filter(|d| !d.is_empty()).count() as u8;
        let n = rules::check_player_count(nb_players)?;
        if first_player.index() >= n as usize {
            return Err(DealError::FirstPlayer(self.first_player));
        }

        let mut hands = Hands::new(n);
        for (place, deck) in Place::ALL.into_iter().zip(decks) {
            hands.set(place, deck);
        }
        validate_distribution(&hands, &self.dog)?;
        Ok(Deal { hands, dog: self.dog, first_player: Some(first_player), seed: None })
    }
}
