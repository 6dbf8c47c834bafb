use crate::bid::Handle;
use crate::cards::{parse_cards, Card, CardParseError, Suit, JACK, KING, KNIGHT, QUEEN};
use crate::place::Team;
use crate::rules;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Default display order of suits: trumps, clubs, spades, diamonds, hearts.
pub const DEFAULT_SORT_ORDER: &str = "TCSDH";

/// Aggregated figures about a set of cards.
///
/// Trump analysis and suit analysis fill different fields and both
/// accumulate, so one `Statistics` can collect several decks (every trick won
/// by the attack, for example).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub nb_cards: usize,

    /// Total of trumps, including oudlers.
    pub trumps: u8,
    /// 0, 1, 2 or 3.
    pub oudlers: u8,
    /// Trumps of rank 15 and above.
    pub major_trumps: u8,

    pub kings: u8,
    pub queens: u8,
    pub knights: u8,
    pub jacks: u8,

    /// King and queen of the same suit.
    pub weddings: u8,
    /// Suits with five cards or more.
    pub long_suits: u8,
    /// Suits with no card.
    pub cuts: u8,
    pub singletons: u8,
    /// Runs of at least five consecutive ranks in a suit.
    pub sequences: u8,

    /// Number of cards per ordinary suit, indexed by [`Suit::index`].
    pub suits: [u8; 4],

    pub little_trump: bool,
    pub big_trump: bool,
    pub fool: bool,

    /// Card points, counted in half points to keep the arithmetic exact.
    pub half_points: u32,
}

impl Statistics {
    pub fn points(&self) -> f32 {
        self.half_points as f32 / 2.0
    }
}

/// An ordered collection of cards with an optional owner.
///
/// Used for hands, the dog, the discard, a handle and a trick.
///
/// ```
/// use tarot_rs::deck::Deck;
///
/// let deck = Deck::standard();
/// assert_eq!(deck.len(), 78);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
    owner: Option<Team>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards, owner: None }
    }

    /// The 78 cards: four suits of 14 cards followed by the 22 trumps.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(rules::DECK_SIZE);
        for suit in Suit::ORDINARY {
            for rank in 1..=KING {
                cards.push(Card::new(rank, suit));
            }
        }
        for rank in 0..=21 {
            cards.push(Card::new(rank, Suit::Trumps));
        }
        Self { cards, owner: None }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn last(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn owner(&self) -> Option<Team> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<Team>) {
        self.owner = owner;
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn append(&mut self, other: &Deck) {
        self.cards.extend_from_slice(&other.cards);
    }

    /// Remove every copy of `card`, returning how many were removed.
    pub fn remove(&mut self, card: Card) -> usize {
        let before = self.cards.len();
        self.cards.retain(|c| *c != card);
        before - self.cards.len()
    }

    /// Remove the cards shared with `other`, returning how many cards of
    /// `other` were found here.
    pub fn remove_duplicates(&mut self, other: &Deck) -> usize {
        other.iter().filter(|&&c| self.remove(c) > 0).count()
    }

    pub fn count(&self, card: Card) -> usize {
        self.cards.iter().filter(|&&c| c == card).count()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn position(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    pub fn has_fool(&self) -> bool {
        self.contains(Card::FOOL)
    }

    pub fn has_one_of_trump(&self) -> bool {
        self.contains(Card::LITTLE)
    }

    /// The Little trump is the only trump held, without the Fool to protect it.
    pub fn has_only_one_of_trump(&self) -> bool {
        self.highest_trump() == Some(Card::LITTLE) && !self.has_fool()
    }

    /// Highest trump, the Fool excluded even when it is the only trump.
    pub fn highest_trump(&self) -> Option<Card> {
        self.cards
            .iter()
            .copied()
            .filter(|c| c.is_trump() && !c.is_fool())
            .max_by_key(|c| c.rank())
    }

    /// Highest card of the suit led, i.e. the suit of the first ordinary card.
    pub fn highest_suit(&self) -> Option<Card> {
        let lead = self.cards.iter().find(|c| !c.is_trump())?.suit();
        self.cards.iter().copied().filter(|c| c.suit() == lead).max_by_key(|c| c.rank())
    }

    /// Suit the other players must follow, `None` while it is still open.
    ///
    /// A Fool leading the trick hands the lead to the second card.
    pub fn required_suit(&self) -> Option<Suit> {
        self.cards.iter().find(|c| !c.is_fool()).map(|c| c.suit())
    }

    /// Shuffle using a seeded RNG for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    /// Shuffle using the provided RNG implementing Rng.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Sort by suit then descending rank. `order` lists the five suit letters
    /// from first to last (e.g. `"THSDC"`); anything else uses
    /// [`DEFAULT_SORT_ORDER`].
    pub fn sort(&mut self, order: &str) {
        let weights = suit_weights(order)
            .or_else(|| suit_weights(DEFAULT_SORT_ORDER))
            .unwrap_or([0; 5]);
        self.cards
            .sort_by_key(|c| Reverse(weights[c.suit().index()] + u16::from(c.rank())));
    }

    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();
        self.analyze_trumps(&mut stats);
        self.analyze_suits(&mut stats);
        stats
    }

    /// Accumulate trump figures and card points into `stats`.
    pub fn analyze_trumps(&self, stats: &mut Statistics) {
        stats.nb_cards += self.len();
        for c in self.iter().filter(|c| c.is_trump()) {
            stats.trumps += 1;
            if c.rank() >= 15 {
                stats.major_trumps += 1;
            }
            match *c {
                Card::BIG => stats.big_trump = true,
                Card::LITTLE => stats.little_trump = true,
                Card::FOOL => stats.fool = true,
                _ => {}
            }
            if c.is_oudler() {
                stats.oudlers += 1;
            }
        }
        stats.half_points += self.iter().map(|c| c.half_points()).sum::<u32>();
    }

    /// Accumulate honours and distribution figures of the four ordinary suits.
    pub fn analyze_suits(&self, stats: &mut Statistics) {
        for suit in Suit::ORDINARY {
            let mut present = [false; KING as usize];
            let mut count = 0u8;
            for c in self.iter().filter(|c| c.suit() == suit) {
                count += 1;
                if let Some(slot) =
                    (c.rank() as usize).checked_sub(1).and_then(|i| present.get_mut(i))
                {
                    *slot = true;
                }
                match c.rank() {
                    JACK => stats.jacks += 1,
                    KNIGHT => stats.knights += 1,
                    QUEEN => stats.queens += 1,
                    KING => stats.kings += 1,
                    _ => {}
                }
            }
            stats.suits[suit.index()] = count;
            match count {
                0 => stats.cuts += 1,
                1 => stats.singletons += 1,
                5.. => stats.long_suits += 1,
                _ => {}
            }
            if present[KING as usize - 1] && present[QUEEN as usize - 1] {
                stats.weddings += 1;
            }
            let mut run = 0u8;
            for &held in &present {
                if held {
                    run += 1;
                    if run == 5 {
                        stats.sequences += 1;
                    }
                } else {
                    run = 0;
                }
            }
        }
    }

    /// Whether this hand may play `card` on the trick in progress.
    ///
    /// ```
    /// use tarot_rs::cards::{Card, Suit};
    /// use tarot_rs::deck::Deck;
    ///
    /// let hand: Deck = "05-T;10-T;03-H".parse().unwrap();
    /// let trick: Deck = "08-T".parse().unwrap();
    /// assert!(!hand.can_play_card(Card::new(5, Suit::Trumps), &trick));
    /// assert!(hand.can_play_card(Card::new(10, Suit::Trumps), &trick));
    /// ```
    pub fn can_play_card(&self, card: Card, trick: &Deck) -> bool {
        if !self.contains(card) {
            return false;
        }
        if card.is_fool() {
            return true;
        }
        let Some(required) = trick.required_suit() else {
            // empty trick, or only the Fool so far
            return true;
        };

        if required.is_trump() {
            return self.may_play_trump_rule(card, trick);
        }
        if card.suit() == required {
            return true;
        }
        if self.iter().any(|c| c.suit() == required) {
            return false;
        }
        self.may_play_trump_rule(card, trick)
    }

    /// Trump obligation once the player cannot (or need not) follow an
    /// ordinary suit: over-trump when possible, otherwise any trump, and any
    /// card at all only without trumps other than the Fool.
    fn may_play_trump_rule(&self, card: Card, trick: &Deck) -> bool {
        let highest_held = self.highest_trump().map(Card::rank);
        if !card.is_trump() {
            return highest_held.is_none();
        }
        match trick.highest_trump() {
            Some(best) if card.rank() < best.rank() => {
                highest_held.map_or(true, |held| held < best.rank())
            }
            _ => true,
        }
    }

    /// Whether `handle` is a valid handle declaration for this hand.
    pub fn test_handle(&self, handle: &Deck) -> bool {
        if Handle::from_size(handle.len()).is_none() {
            return false;
        }
        if !handle.iter().all(|c| c.is_trump() && self.contains(*c)) {
            return false;
        }
        if handle.iter().any(|&c| handle.count(c) != 1) {
            return false;
        }
        // Showing the Fool means no other trump is left in hand.
        let trumps_held = self.iter().filter(|c| c.is_trump()).count();
        !(handle.has_fool() && trumps_held > handle.len())
    }

    /// Whether `discard` is valid for the taker holding this hand before the
    /// dog is merged.
    pub fn test_discard(&self, discard: &Deck, dog: &Deck, nb_players: u8) -> bool {
        if discard.len() != rules::dog_cards(nb_players) {
            return false;
        }
        discard.iter().all(|&c| {
            (self.contains(c) || dog.contains(c))
                && !c.is_trump()
                && c.rank() != KING
                && discard.count(c) == 1
        })
    }

    /// Build a valid discard from this hand and the dog: the first ordinary
    /// cards that are not kings.
    pub fn auto_discard(&self, dog: &Deck, nb_players: u8) -> Deck {
        let wanted = rules::dog_cards(nb_players);
        let cards = self
            .iter()
            .chain(dog.iter())
            .copied()
            .filter(|c| !c.is_trump() && c.rank() != KING)
            .take(wanted)
            .collect();
        Deck::from_cards(cards)
    }
}

fn suit_weights(order: &str) -> Option<[u16; 5]> {
    let letters: Vec<Suit> = order.chars().map(Suit::try_from).collect::<Result<_, _>>().ok()?;
    if letters.len() != 5 || Suit::ALL.iter().any(|s| !letters.contains(s)) {
        return None;
    }
    let mut weights = [0u16; 5];
    for (i, suit) in letters.iter().rev().enumerate() {
        weights[suit.index()] = 100 * i as u16;
    }
    Some(weights)
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;
    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

impl FromIterator<Card> for Deck {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self::from_cards(iter.into_iter().collect())
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.cards.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for Deck {
    type Err = CardParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cards(s).map(Deck::from_cards)
    }
}

impl Serialize for Deck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Deck {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Deck::from_str(&s).map_err(serde::de::Error::custom)
    }
}
