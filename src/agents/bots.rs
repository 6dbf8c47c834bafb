use crate::bid::Contract;
use crate::cards::{Card, Suit, JACK, KING, KNIGHT, QUEEN};
use crate::context::DealContext;
use crate::deck::{Deck, Statistics};
use crate::engine::{Action, ActionError, Engine, Sequence};
use crate::place::Place;
use rand::seq::IndexedRandom;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::time::{Duration, Instant};

use super::{AgentKind, PlayerAgent};

/// How a bot picks among the legal cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum CardPolicy {
    /// Always the first legal card of the hand.
    #[default]
    FirstLegal,
    /// Any legal card, drawn from the bot's RNG.
    RandomLegal,
}

/// Configuration for a bot's pace and randomness.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BotProfile {
    pub card_policy: CardPolicy,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub rng_seed: Option<u64>,
}

impl BotProfile {
    pub fn new(card_policy: CardPolicy) -> Self {
        Self { card_policy, min_delay_ms: 0, max_delay_ms: 0, rng_seed: None }
    }

    /// Set a deterministic RNG seed for reproducible decisions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_delay_ms(mut self, min: u64, max: u64) -> Self {
        self.min_delay_ms = min;
        self.max_delay_ms = max;
        self
    }
}

impl Default for BotProfile {
    fn default() -> Self {
        Self::new(CardPolicy::FirstLegal)
    }
}

#[derive(Debug)]
struct BotState {
    rng: StdRng,
}

impl BotState {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(v) => StdRng::seed_from_u64(v),
            None => {
                let mut seed = [0u8; 32];
                rand::rng().fill_bytes(&mut seed);
                StdRng::from_seed(seed)
            }
        };
        Self { rng }
    }
}

/// Hand strength used to pick a contract.
///
/// Oudlers first (the Little counts more the better it is protected), then
/// trumps, honours and distribution.
pub fn bid_score(stats: &Statistics) -> i32 {
    let mut total = 0i32;
    if stats.big_trump {
        total += 9;
    }
    if stats.fool {
        total += 7;
    }
    if stats.little_trump {
        total += match stats.trumps {
            5 => 5,
            6 | 7 => 7,
            t if t > 7 => 8,
            _ => 0,
        };
    }
    total += i32::from(stats.trumps) * 2;
    total += i32::from(stats.major_trumps) * 2;
    total += i32::from(stats.kings) * 6;
    total += i32::from(stats.queens) * 3;
    total += i32::from(stats.knights) * 2;
    total += i32::from(stats.jacks);
    total += i32::from(stats.weddings);
    total += i32::from(stats.long_suits) * 5;
    total += i32::from(stats.cuts) * 5;
    total += i32::from(stats.singletons) * 3;
    total += i32::from(stats.sequences) * 4;
    total
}

pub fn contract_for_score(score: i32) -> Contract {
    match score {
        i32::MIN..=35 => Contract::Pass,
        36..=50 => Contract::Take,
        51..=65 => Contract::Guard,
        66..=75 => Contract::GuardWithout,
        _ => Contract::GuardAgainst,
    }
}

/// Contract the bot announces over `best`; a pass unless it outbids.
pub fn choose_bid(hand: &Deck, best: Contract) -> Contract {
    let wanted = contract_for_score(bid_score(&hand.statistics()));
    if wanted.outbids(best) {
        wanted
    } else {
        Contract::Pass
    }
}

/// First honour the taker may call and does not hold, kings before queens.
pub fn choose_king(hand: &Deck) -> Card {
    let stats = hand.statistics();
    for rank in [KING, QUEEN, KNIGHT, JACK] {
        for suit in Suit::ORDINARY {
            let card = Card::new(rank, suit);
            if !hand.contains(card) && DealContext::check_king_call(card, &stats) {
                return card;
            }
        }
    }
    Card::new(KING, Suit::Clubs)
}

pub fn legal_cards(hand: &Deck, trick: &Deck) -> Vec<Card> {
    hand.iter().copied().filter(|&c| hand.can_play_card(c, trick)).collect()
}

/// A valid decision for whoever must act, always accepted by the engine.
/// Used for bots and to replace an invalid answer from any agent.
pub fn fallback_action(engine: &Engine) -> Option<Action> {
    let place = engine.acting_player()?;
    let hand = engine.hand(place);
    match engine.sequence() {
        Sequence::WaitForBid => Some(Action::Bid {
            contract: choose_bid(hand, engine.bid().contract),
            slam: false,
        }),
        Sequence::WaitForKingCall => Some(Action::KingCall(choose_king(hand))),
        Sequence::WaitForDiscard => {
            Some(Action::Discard(hand.auto_discard(engine.dog(), engine.nb_players())))
        }
        Sequence::WaitForHandle => Some(Action::NoHandle),
        Sequence::WaitForPlayedCard => {
            legal_cards(hand, engine.current_trick()).first().copied().map(Action::Card)
        }
        _ => None,
    }
}

/// A rule-based bot: heuristic bid, automatic discard, no handle.
pub struct BotAgent {
    profile: BotProfile,
    state: BotState,
    next_action_at: Option<Instant>,
}

impl BotAgent {
    pub fn new(profile: BotProfile) -> Self {
        let state = BotState::new(profile.rng_seed);
        Self { profile, state, next_action_at: None }
    }

    fn decide(&mut self, engine: &Engine, seat: Place) -> Option<Action> {
        if engine.sequence() != Sequence::WaitForPlayedCard {
            return fallback_action(engine);
        }
        let legal = legal_cards(engine.hand(seat), engine.current_trick());
        let card = match self.profile.card_policy {
            CardPolicy::FirstLegal => legal.first().copied(),
            CardPolicy::RandomLegal => legal.choose(&mut self.state.rng).copied(),
        };
        card.map(Action::Card)
    }
}

impl PlayerAgent for BotAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }

    fn on_turn(&mut self, engine: &mut Engine, seat: Place) -> Result<bool, ActionError> {
        if engine.acting_player() != Some(seat) {
            return Ok(false);
        }
        let now = Instant::now();
        let delay = choose_delay_ms(&self.profile, &mut self.state);
        if delay > 0 {
            match self.next_action_at {
                None => {
                    self.next_action_at = Some(now + Duration::from_millis(delay));
                    return Ok(false);
                }
                Some(next) if now < next => {
                    return Ok(false);
                }
                Some(_) => {}
            }
        }
        self.next_action_at = None;

        match self.decide(engine, seat) {
            Some(action) => engine.apply(seat, action).map(|_| true),
            None => Ok(false),
        }
    }
}

fn choose_delay_ms(profile: &BotProfile, state: &mut BotState) -> u64 {
    let min = profile.min_delay_ms;
    let max = profile.max_delay_ms.max(min);
    if max == min {
        min
    } else {
        state.rng.random_range(min..=max)
    }
}
