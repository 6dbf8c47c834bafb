use crate::place::{Place, Team};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Contract levels, totally ordered from "no bid yet" to Guard against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Contract {
    /// Nobody has spoken yet.
    #[default]
    NoBid,
    Pass,
    Take,
    Guard,
    GuardWithout,
    GuardAgainst,
}

impl Contract {
    pub const ALL: [Contract; 6] = [
        Contract::NoBid,
        Contract::Pass,
        Contract::Take,
        Contract::Guard,
        Contract::GuardWithout,
        Contract::GuardAgainst,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Contract::NoBid => "",
            Contract::Pass => "Pass",
            Contract::Take => "Take",
            Contract::Guard => "Guard",
            Contract::GuardWithout => "Guard without",
            Contract::GuardAgainst => "Guard against",
        }
    }

    /// Whether `self` may supersede `best`: only a strictly higher contract does.
    pub fn outbids(self, best: Contract) -> bool {
        self > best
    }

    /// Score multiplier; zero for contracts nobody can win.
    pub const fn multiplier(self) -> i32 {
        match self {
            Contract::Take => 1,
            Contract::Guard => 2,
            Contract::GuardWithout => 4,
            Contract::GuardAgainst => 6,
            Contract::NoBid | Contract::Pass => 0,
        }
    }

    /// True for a contract someone actually took.
    pub const fn is_taken(self) -> bool {
        self.multiplier() > 0
    }

    /// Dog owner when the contract skips the discard step.
    pub const fn dog_owner_without_discard(self) -> Option<Team> {
        match self {
            Contract::GuardWithout => Some(Team::Attack),
            Contract::GuardAgainst => Some(Team::Defense),
            _ => None,
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContractParseError {
    #[error("invalid contract: '{0}'")]
    Invalid(String),
}

impl FromStr for Contract {
    type Err = ContractParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ContractParseError::Invalid(s.to_string()))
    }
}

impl Serialize for Contract {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Contract {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Contract::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Best bid of the auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bid {
    pub taker: Option<Place>,
    /// Partner called in the 5-player variant; equals the taker otherwise.
    pub partner: Option<Place>,
    pub contract: Contract,
    pub slam: bool,
}

impl Bid {
    pub fn has_partner(&self) -> bool {
        matches!((self.taker, self.partner), (Some(t), Some(p)) if t != p)
    }

    pub fn is_attacker(&self, place: Place) -> bool {
        self.taker == Some(place) || self.partner == Some(place)
    }

    pub fn team_of(&self, place: Place) -> Team {
        if self.is_attacker(place) {
            Team::Attack
        } else {
            Team::Defense
        }
    }
}

/// Declared handle, by number of trumps shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Handle {
    Simple,
    Double,
    Triple,
}

impl Handle {
    pub const fn from_size(size: usize) -> Option<Handle> {
        match size {
            10 => Some(Handle::Simple),
            13 => Some(Handle::Double),
            15 => Some(Handle::Triple),
            _ => None,
        }
    }

    pub const fn size(self) -> usize {
        match self {
            Handle::Simple => 10,
            Handle::Double => 13,
            Handle::Triple => 15,
        }
    }

    /// Bonus for the handle at this table size.
    pub const fn points(self, nb_players: u8) -> i32 {
        match (nb_players, self) {
            (3, Handle::Simple) => 13,
            (3, Handle::Double) => 15,
            (3, Handle::Triple) => 18,
            (5, Handle::Simple) => 8,
            (5, Handle::Double) => 10,
            (5, Handle::Triple) => 13,
            (_, Handle::Simple) => 20,
            (_, Handle::Double) => 30,
            (_, Handle::Triple) => 40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contracts_are_totally_ordered() {
        assert!(Contract::Take.outbids(Contract::Pass));
        assert!(Contract::GuardAgainst.outbids(Contract::GuardWithout));
        assert!(!Contract::Guard.outbids(Contract::Guard));
        assert!(!Contract::Take.outbids(Contract::Guard));
        assert!(Contract::Pass.outbids(Contract::NoBid));
    }

    #[test]
    fn contract_names_round_trip() {
        for c in Contract::ALL {
            assert_eq!(c.name().parse::<Contract>().unwrap(), c);
        }
        assert_eq!("Guard without".parse::<Contract>().unwrap(), Contract::GuardWithout);
        assert!("Guard with".parse::<Contract>().is_err());
    }

    #[test]
    fn handle_sizes_and_bonus() {
        assert_eq!(Handle::from_size(10), Some(Handle::Simple));
        assert_eq!(Handle::from_size(13), Some(Handle::Double));
        assert_eq!(Handle::from_size(15), Some(Handle::Triple));
        assert_eq!(Handle::from_size(11), None);
        assert_eq!(Handle::Double.points(4), 30);
        assert_eq!(Handle::Triple.points(3), 18);
        assert_eq!(Handle::Simple.points(5), 8);
    }

    #[test]
    fn partner_membership() {
        let bid = Bid {
            taker: Some(Place::North),
            partner: Some(Place::South),
            contract: Contract::Guard,
            slam: false,
        };
        assert!(bid.has_partner());
        assert_eq!(bid.team_of(Place::South), Team::Attack);
        assert_eq!(bid.team_of(Place::East), Team::Defense);
        let solo = Bid { partner: Some(Place::North), ..bid };
        assert!(!solo.has_partner());
    }
}
