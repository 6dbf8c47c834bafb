use std::fmt;
use std::str::FromStr;

/// Rank of the lowest card of an ordinary suit.
pub const ACE: u8 = 1;
pub const JACK: u8 = 11;
pub const KNIGHT: u8 = 12;
pub const QUEEN: u8 = 13;
/// Rank 14 is the high card of the four ordinary suits.
pub const KING: u8 = 14;

/// Highest trump rank ("the Big").
pub const BIG_TRUMP: u8 = 21;
/// Trump rank 1 ("the Little").
pub const LITTLE_TRUMP: u8 = 1;
/// Trump rank 0 is the Fool.
pub const FOOL: u8 = 0;

/// The four ordinary suits plus the trump suit.
///
/// The discriminant order is the one used by seat-independent encodings
/// (Spades first, Trumps last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
    Trumps,
}

impl Suit {
    pub const ALL: [Suit; 5] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Trumps];
    pub const ORDINARY: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub const fn to_char(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
            Suit::Trumps => 'T',
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_trump(self) -> bool {
        matches!(self, Suit::Trumps)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SuitParseError {
    #[error("invalid suit: '{0}'")]
    Invalid(String),
}

impl FromStr for Suit {
    type Err = SuitParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Suit::try_from(c),
            _ => Err(SuitParseError::Invalid(s.to_string())),
        }
    }
}

impl TryFrom<char> for Suit {
    type Error = SuitParseError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'S' => Ok(Suit::Spades),
            'H' => Ok(Suit::Hearts),
            'D' => Ok(Suit::Diamonds),
            'C' => Ok(Suit::Clubs),
            'T' => Ok(Suit::Trumps),
            _ => Err(SuitParseError::Invalid(c.to_string())),
        }
    }
}

/// A Tarot card: rank + suit.
///
/// Ordinary suits hold ranks 1 (ace) to 14 (king); trumps hold ranks 0 (the
/// Fool) to 21.
///
/// ```
/// use tarot_rs::cards::{Card, Suit};
///
/// let card = Card::new(14, Suit::Spades);
/// assert_eq!(card.to_string(), "14-S");
/// assert_eq!(Card::FOOL.to_string(), "00-T");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    suit: Suit,
    rank: u8,
}

impl Card {
    pub const FOOL: Card = Card::new(FOOL, Suit::Trumps);
    pub const LITTLE: Card = Card::new(LITTLE_TRUMP, Suit::Trumps);
    pub const BIG: Card = Card::new(BIG_TRUMP, Suit::Trumps);

    /// Build a card without range checking; use [`Card::try_new`] for untrusted input.
    pub const fn new(rank: u8, suit: Suit) -> Self {
        Self { suit, rank }
    }

    pub fn try_new(rank: u8, suit: Suit) -> Result<Self, CardParseError> {
        let card = Self::new(rank, suit);
        if card.is_valid() {
            Ok(card)
        } else {
            Err(CardParseError::Invalid(format!("{rank:02}-{suit}")))
        }
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    pub const fn suit(self) -> Suit {
        self.suit
    }

    pub const fn is_valid(self) -> bool {
        match self.suit {
            Suit::Trumps => self.rank <= BIG_TRUMP,
            _ => self.rank >= ACE && self.rank <= KING,
        }
    }

    pub const fn is_trump(self) -> bool {
        self.suit.is_trump()
    }

    pub const fn is_fool(self) -> bool {
        self.suit.is_trump() && self.rank == FOOL
    }

    /// Fool, Little and Big trumps.
    pub const fn is_oudler(self) -> bool {
        self.suit.is_trump() && (self.rank == FOOL || self.rank == LITTLE_TRUMP || self.rank == BIG_TRUMP)
    }

    /// Card value counted in half points (an oudler is worth 4.5 points, i.e. 9).
    pub const fn half_points(self) -> u32 {
        if self.is_oudler() {
            return 9;
        }
        if self.suit.is_trump() {
            return 1;
        }
        match self.rank {
            KING => 9,
            QUEEN => 7,
            KNIGHT => 5,
            JACK => 3,
            _ => 1,
        }
    }

    pub fn points(self) -> f32 {
        self.half_points() as f32 / 2.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.rank, self.suit)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardParseError {
    #[error("invalid card: '{0}'")]
    Invalid(String),
    #[error("invalid rank in card: '{0}'")]
    Rank(String),
    #[error(transparent)]
    Suit(#[from] SuitParseError),
}

impl FromStr for Card {
    type Err = CardParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let (rank_str, suit_str) =
            t.split_once('-').ok_or_else(|| CardParseError::Invalid(s.to_string()))?;
        if rank_str.len() != 2 || !rank_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CardParseError::Rank(s.to_string()));
        }
        let rank: u8 = rank_str.parse().map_err(|_| CardParseError::Rank(s.to_string()))?;
        let suit = Suit::from_str(suit_str)?;
        Card::try_new(rank, suit).map_err(|_| CardParseError::Invalid(s.to_string()))
    }
}

/// Parse a card list separated by `;`. An empty string is an empty list.
///
/// ```
/// use tarot_rs::cards::{parse_cards, Card, Suit};
///
/// let cards = parse_cards("14-S;00-T;21-T").unwrap();
/// assert_eq!(cards[0], Card::new(14, Suit::Spades));
/// assert_eq!(cards[1], Card::FOOL);
/// assert_eq!(cards[2], Card::BIG);
/// ```
pub fn parse_cards(input: &str) -> Result<Vec<Card>, CardParseError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input.split(';').map(Card::from_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suit_display_and_from_str() {
        assert_eq!(Suit::Trumps.to_string(), "T");
        assert_eq!(Suit::from_str("s").unwrap(), Suit::Spades);
        assert_eq!(Suit::from_str("C").unwrap(), Suit::Clubs);
        assert!(Suit::from_str("x").is_err());
        assert!(Suit::from_str("SH").is_err());
    }

    #[test]
    fn card_display_and_from_str() {
        let k = Card::new(KING, Suit::Hearts);
        assert_eq!(k.to_string(), "14-H");
        assert_eq!(Card::from_str("14-H").unwrap(), k);
        assert_eq!(Card::from_str("01-D").unwrap(), Card::new(ACE, Suit::Diamonds));
        assert_eq!(Card::from_str("00-T").unwrap(), Card::FOOL);
    }

    #[test]
    fn card_parse_rejects_out_of_range() {
        assert!(Card::from_str("00-S").is_err());
        assert!(Card::from_str("15-H").is_err());
        assert!(Card::from_str("22-T").is_err());
        assert!(Card::from_str("7-T").is_err());
        assert!(Card::from_str("07T").is_err());
        assert!(Card::from_str("07-X").is_err());
    }

    #[test]
    fn oudlers_and_points() {
        assert!(Card::FOOL.is_oudler());
        assert!(Card::LITTLE.is_oudler());
        assert!(Card::BIG.is_oudler());
        assert!(!Card::new(20, Suit::Trumps).is_oudler());
        assert_eq!(Card::BIG.points(), 4.5);
        assert_eq!(Card::new(KING, Suit::Clubs).points(), 4.5);
        assert_eq!(Card::new(QUEEN, Suit::Clubs).points(), 3.5);
        assert_eq!(Card::new(KNIGHT, Suit::Clubs).points(), 2.5);
        assert_eq!(Card::new(JACK, Suit::Clubs).points(), 1.5);
        assert_eq!(Card::new(10, Suit::Clubs).points(), 0.5);
        assert_eq!(Card::new(12, Suit::Trumps).points(), 0.5);
    }

    #[test]
    fn parse_card_lists() {
        assert!(parse_cards("").unwrap().is_empty());
        let xs = parse_cards("01-S;02-S").unwrap();
        assert_eq!(xs.len(), 2);
        assert!(parse_cards("01-S;;02-S").is_err());
    }
}
