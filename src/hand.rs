use crate::cards::Card;
use crate::deck::Deck;
use crate::place::Place;
use crate::rules;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandError {
    #[error("{place} holds {actual} cards, expected {expected}")]
    HandSize { place: Place, expected: usize, actual: usize },
    #[error("dog holds {actual} cards, expected {expected}")]
    DogSize { expected: usize, actual: usize },
    #[error("card {0} dealt more than once")]
    Duplicate(Card),
}

/// The hands of every seat at the table.
///
/// ```
/// use tarot_rs::cards::Card;
/// use tarot_rs::hand::Hands;
/// use tarot_rs::place::Place;
///
/// let mut hands = Hands::new(4);
/// hands.get_mut(Place::East).push(Card::FOOL);
/// assert_eq!(hands.locate(Card::FOOL), Some(Place::East));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hands {
    nb_players: u8,
    decks: [Deck; 5],
}

impl Hands {
    pub fn new(nb_players: u8) -> Self {
        Self { nb_players, decks: Default::default() }
    }

    pub fn nb_players(&self) -> u8 {
        self.nb_players
    }

    pub fn get(&self, place: Place) -> &Deck {
        &self.decks[place.index()]
    }

    pub fn get_mut(&mut self, place: Place) -> &mut Deck {
        &mut self.decks[place.index()]
    }

    pub fn set(&mut self, place: Place, deck: Deck) {
        self.decks[place.index()] = deck;
    }

    /// Seat holding `card`, if any.
    pub fn locate(&self, card: Card) -> Option<Place> {
        Place::seats(self.nb_players).find(|&p| self.get(p).contains(card))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Place, &Deck)> {
        Place::seats(self.nb_players).map(move |p| (p, self.get(p)))
    }

    pub fn clear(&mut self) {
        for d in &mut self.decks {
            d.clear();
        }
    }

    pub fn total_cards(&self) -> usize {
        self.iter().map(|(_, d)| d.len()).sum()
    }
}

/// Check that hands and dog form a complete distribution: the right sizes and
/// no card dealt twice.
pub fn validate_distribution(hands: &Hands, dog: &Deck) -> Result<(), HandError> {
    let n = hands.nb_players();
    let expected = rules::cards_in_hand(n);
    for (place, deck) in hands.iter() {
        if deck.len() != expected {
            return Err(HandError::HandSize { place, expected, actual: deck.len() });
        }
    }
    if dog.len() != rules::dog_cards(n) {
        return Err(HandError::DogSize { expected: rules::dog_cards(n), actual: dog.len() });
    }
    let mut seen = HashSet::with_capacity(rules::DECK_SIZE);
    for card in hands.iter().flat_map(|(_, d)| d.iter()).chain(dog.iter()) {
        if !seen.insert(*card) {
            return Err(HandError::Duplicate(*card));
        }
    }
    Ok(())
}
