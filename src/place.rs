use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Seat around the table. Seats are cyclic modulo the active player count.
///
/// The "Nowhere" sentinel of the wire format is modelled as `Option<Place>`;
/// see [`Place::name_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Place {
    South,
    East,
    North,
    West,
    Fifth,
}

pub const NOWHERE: &str = "Nowhere";

impl Place {
    pub const ALL: [Place; 5] = [Place::South, Place::East, Place::North, Place::West, Place::Fifth];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Place> {
        Self::ALL.get(index).copied()
    }

    /// Seats in play for a table of `nb_players`.
    pub fn seats(nb_players: u8) -> impl Iterator<Item = Place> {
        Self::ALL.into_iter().take(nb_players as usize)
    }

    /// The next seat to play.
    pub fn next(self, nb_players: u8) -> Place {
        let n = (nb_players as usize).clamp(1, Self::ALL.len());
        Self::ALL[(self.index() + 1) % n]
    }

    pub fn previous(self, nb_players: u8) -> Place {
        let n = (nb_players as usize).clamp(1, Self::ALL.len());
        Self::ALL[(self.index() + n - 1) % n]
    }

    /// Seat reached after `steps` moves from `self`.
    pub fn advance(self, steps: usize, nb_players: u8) -> Place {
        let n = (nb_players as usize).clamp(1, Self::ALL.len());
        Self::ALL[(self.index() + steps) % n]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Place::South => "South",
            Place::East => "East",
            Place::North => "North",
            Place::West => "West",
            Place::Fifth => "Fifth",
        }
    }

    /// Name of an optional seat, `"Nowhere"` when unassigned.
    pub fn name_of(place: Option<Place>) -> &'static str {
        place.map(Place::name).unwrap_or(NOWHERE)
    }

    /// Parse a seat name; `"Nowhere"` maps to `Ok(None)`.
    pub fn parse_optional(s: &str) -> Result<Option<Place>, PlaceParseError> {
        if s == NOWHERE {
            return Ok(None);
        }
        Place::from_str(s).map(Some)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlaceParseError {
    #[error("invalid place: '{0}'")]
    Invalid(String),
}

impl FromStr for Place {
    type Err = PlaceParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| PlaceParseError::Invalid(s.to_string()))
    }
}

impl Serialize for Place {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Place {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Place::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Side of a deal: the taker (and partner) attack, everybody else defends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Attack,
    Defense,
}

impl Team {
    pub const fn opponent(self) -> Team {
        match self {
            Team::Attack => Team::Defense,
            Team::Defense => Team::Attack,
        }
    }
}
