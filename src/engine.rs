//! Deal state machine.
//!
//! The engine owns the hands and the [`DealContext`] of the table and moves
//! through an explicit [`Sequence`]. Player decisions enter through the
//! setters (or [`Engine::apply`]); "show" states wait for the caller to
//! broadcast them and are acknowledged with [`Engine::advance`]. Every call
//! returns the resulting [`Transition`].

use crate::bid::{Bid, Contract};
use crate::cards::Card;
use crate::context::{DealContext, TrickError};
use crate::deal::{Deal, DealError, Distribution};
use crate::deal_log::DealLog;
use crate::deck::Deck;
use crate::hand::Hands;
use crate::place::{Place, Team};
use crate::rules::{self, PlayerCountError};
use crate::score::Points;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Phases of a table, in the order a deal goes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Sequence {
    Stopped,
    WaitForPlayers,
    WaitForReady,
    WaitForCards,
    WaitForBid,
    WaitForShowBid,
    WaitForAllPassed,
    WaitForKingCall,
    WaitForShowKingCall,
    WaitForShowDog,
    WaitForDiscard,
    WaitForStartDeal,
    WaitForHandle,
    WaitForShowHandle,
    WaitForPlayedCard,
    WaitForShowCard,
    WaitForEndOfTrick,
    WaitForEndOfDeal,
}

impl Sequence {
    /// State reached once a bid is recorded. `round_over` is set when every
    /// seat has spoken.
    pub fn after_bid(bid: &Bid, round_over: bool, nb_players: u8) -> Sequence {
        if !round_over && !(bid.slam && bid.contract.is_taken()) {
            return Sequence::WaitForBid;
        }
        if !bid.contract.is_taken() {
            return Sequence::WaitForAllPassed;
        }
        if nb_players == 5 {
            return Sequence::WaitForKingCall;
        }
        Sequence::after_dog_decision(bid.contract)
    }

    /// Guard without and Guard against skip the dog display and the discard.
    pub fn after_dog_decision(contract: Contract) -> Sequence {
        if contract.dog_owner_without_discard().is_some() {
            Sequence::WaitForStartDeal
        } else {
            Sequence::WaitForShowDog
        }
    }

    /// State of the card play once the previous step is acknowledged.
    pub fn in_play(trick_complete: bool, first_trick: bool, handle_asked: bool) -> Sequence {
        if trick_complete {
            Sequence::WaitForEndOfTrick
        } else if first_trick && !handle_asked {
            Sequence::WaitForHandle
        } else {
            Sequence::WaitForPlayedCard
        }
    }

    /// Whether the engine waits for a player decision rather than an
    /// acknowledgement.
    pub fn awaits_action(self) -> bool {
        matches!(
            self,
            Sequence::WaitForBid
                | Sequence::WaitForKingCall
                | Sequence::WaitForDiscard
                | Sequence::WaitForHandle
                | Sequence::WaitForPlayedCard
        )
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A player decision.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    Bid { contract: Contract, slam: bool },
    KingCall(Card),
    Discard(Deck),
    Handle(Deck),
    NoHandle,
    Card(Card),
}

/// What a transition produced, for the caller to broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    Ready,
    NewDeal { dealer: Place },
    /// `place` must now decide.
    Turn { place: Place },
    /// Bid recorded for `place`; an under-bid shows up as `Pass`.
    Bid { place: Place, contract: Contract, slam: bool },
    AllPassed,
    KingCalled { card: Card },
    ShowDog(Deck),
    Discarded,
    StartDeal { first_player: Place },
    Handle { place: Place, handle: Deck },
    CardPlayed { place: Place, card: Card },
    TrickWon { winner: Place, trick: usize },
    EndOfDeal(Points),
    Stopped,
}

/// Sequence reached by an engine call and the event it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub sequence: Sequence,
    pub event: Event,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("action expected in {expected}, engine is in {actual}")]
    WrongSequence { expected: Sequence, actual: Sequence },
    #[error("{place} cannot act, waiting for {expected}")]
    WrongPlayer { expected: Place, place: Place },
    #[error("nothing to acknowledge in {0}")]
    NothingToAcknowledge(Sequence),
    #[error("card {0} cannot be played")]
    IllegalCard(Card),
    #[error("invalid discard: {0}")]
    InvalidDiscard(Deck),
    #[error("invalid handle: {0}")]
    InvalidHandle(Deck),
    #[error("{0} cannot be called")]
    InvalidKingCall(Card),
    #[error("no taker for this deal")]
    NoTaker,
    #[error("cannot deal: {0}")]
    Deal(String),
    #[error(transparent)]
    Trick(#[from] TrickError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HistoryVerb {
    Bid,
    KingCall,
    Discard,
    Handle,
    NoHandle,
    Card,
    TrickWon,
}

impl HistoryVerb {
    pub fn label(self) -> &'static str {
        match self {
            HistoryVerb::Bid => "Bid",
            HistoryVerb::KingCall => "King call",
            HistoryVerb::Discard => "Discard",
            HistoryVerb::Handle => "Handle",
            HistoryVerb::NoHandle => "No handle",
            HistoryVerb::Card => "Card",
            HistoryVerb::TrickWon => "Trick won",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct HistoryEntry {
    pub place: Place,
    pub verb: HistoryVerb,
    pub detail: String,
    pub sequence: Sequence,
}

/// One table: seats, hands and the deal in progress.
#[derive(Debug, Clone)]
pub struct Engine {
    nb_players: u8,
    sequence: Sequence,
    ctx: DealContext,
    hands: Hands,
    dealer: Place,
    current_player: Place,
    /// Seats that acted in the current bid round or trick.
    position: usize,
    /// Completed tricks.
    trick_counter: usize,
    current_trick: Deck,
    handle_asked: [bool; 5],
    king_called: Option<Card>,
    points: Option<Points>,
    distribution: Distribution,
    rng: ChaCha8Rng,
    history: Vec<HistoryEntry>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Engine whose random choices (dealer, random deals) derive from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let nb_players = 4;
        Self {
            nb_players,
            sequence: Sequence::Stopped,
            ctx: DealContext::new(nb_players),
            hands: Hands::new(nb_players),
            dealer: Place::South,
            current_player: Place::South,
            position: 0,
            trick_counter: 0,
            current_trick: Deck::new(),
            handle_asked: [false; 5],
            king_called: None,
            points: None,
            distribution: Distribution::Random,
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: Vec::new(),
        }
    }

    // ----- table lifecycle -----

    /// Set up a table for `nb_players` with a random dealer.
    pub fn create_table(&mut self, nb_players: u8) -> Result<Transition, PlayerCountError> {
        let n = rules::check_player_count(nb_players)?;
        self.nb_players = n;
        self.ctx = DealContext::new(n);
        self.hands = Hands::new(n);
        let index = self.rng.random_range(0..n as usize);
        self.dealer = Place::from_index(index).unwrap_or(Place::South);
        self.sequence = Sequence::WaitForPlayers;
        info!(players = n, "table created");
        Ok(self.transition(Event::Ready))
    }

    /// Choose the dealer of the next deal.
    pub fn set_first_dealer(&mut self, dealer: Place) {
        // new_deal rotates before dealing
        self.dealer = dealer.previous(self.nb_players);
    }

    /// Distribution used when the engine deals on its own (after
    /// acknowledging `WaitForReady`).
    pub fn set_distribution(&mut self, distribution: Distribution) {
        self.distribution = distribution;
    }

    pub fn new_game(&mut self) -> Transition {
        self.sequence = Sequence::WaitForReady;
        self.transition(Event::Ready)
    }

    pub fn stop(&mut self) -> Transition {
        self.sequence = Sequence::Stopped;
        self.transition(Event::Stopped)
    }

    /// Start a new deal: rotate the dealer and distribute the cards.
    ///
    /// A custom deal file that cannot be used falls back to a random deal.
    /// Returns the distribution actually used.
    pub fn new_deal(&mut self, distribution: Distribution) -> Result<Distribution, DealError> {
        let n = self.nb_players;
        self.ctx.reset();
        self.position = 0;
        self.trick_counter = 0;
        self.current_trick.clear();
        self.handle_asked = [false; 5];
        self.king_called = None;
        self.points = None;
        self.history.clear();

        self.dealer = self.dealer.next(n);
        self.current_player = self.dealer.next(n);

        let (deal, used) = match distribution.deal(n, &mut self.rng) {
            Ok(deal) => {
                let numbered = matches!(distribution, Distribution::Numbered { .. });
                let used = match deal.seed {
                    Some(seed) if numbered => Distribution::Numbered { seed },
                    _ => distribution,
                };
                (deal, used)
            }
            Err(e) => {
                error!(error = %e, "cannot use the requested deal, dealing at random");
                (Deal::random(n, &mut self.rng)?, Distribution::Random)
            }
        };
        if let Some(first) = deal.first_player {
            self.current_player = first;
            self.dealer = first.previous(n);
        }

        for (place, hand) in deal.hands.iter() {
            debug!(%place, hand = %hand, "dealt");
        }
        debug!(dog = %deal.dog, "dog");
        self.hands = deal.hands;
        self.ctx.set_dog(deal.dog);
        self.sequence = Sequence::WaitForCards;
        info!(dealer = %self.dealer, "new deal");
        Ok(used)
    }

    // ----- queries -----

    pub fn nb_players(&self) -> u8 {
        self.nb_players
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn dealer(&self) -> Place {
        self.dealer
    }

    pub fn current_player(&self) -> Place {
        self.current_player
    }

    /// Seat expected to decide in the current sequence, if any.
    pub fn acting_player(&self) -> Option<Place> {
        match self.sequence {
            Sequence::WaitForBid | Sequence::WaitForHandle | Sequence::WaitForPlayedCard => {
                Some(self.current_player)
            }
            Sequence::WaitForKingCall | Sequence::WaitForDiscard => self.ctx.bid().taker,
            _ => None,
        }
    }

    pub fn hand(&self, place: Place) -> &Deck {
        self.hands.get(place)
    }

    pub fn hands(&self) -> &Hands {
        &self.hands
    }

    pub fn dog(&self) -> &Deck {
        self.ctx.dog()
    }

    pub fn discard(&self) -> &Deck {
        self.ctx.discard()
    }

    pub fn bid(&self) -> &Bid {
        self.ctx.bid()
    }

    pub fn context(&self) -> &DealContext {
        &self.ctx
    }

    pub fn current_trick(&self) -> &Deck {
        &self.current_trick
    }

    pub fn trick_counter(&self) -> usize {
        self.trick_counter
    }

    pub fn king_called(&self) -> Option<Card> {
        self.king_called
    }

    /// Outcome of the deal, once it reached `WaitForEndOfDeal`.
    pub fn points(&self) -> Option<Points> {
        self.points
    }

    pub fn deal_log(&self) -> DealLog {
        DealLog::from_context(&self.ctx)
    }

    pub fn history_recent(&self, n: usize) -> Vec<HistoryEntry> {
        let start = self.history.len().saturating_sub(n);
        self.history[start..].to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ----- player decisions -----

    /// Dispatch a decision of `place`.
    pub fn apply(&mut self, place: Place, action: Action) -> Result<Transition, ActionError> {
        match action {
            Action::Bid { contract, slam } => {
                let accepted = self.set_bid(place, contract, slam)?;
                let slam = slam && accepted.is_taken();
                Ok(self.transition(Event::Bid { place, contract: accepted, slam }))
            }
            Action::KingCall(card) => {
                self.set_king_called(place, card)?;
                Ok(self.transition(Event::KingCalled { card }))
            }
            Action::Discard(discard) => {
                self.set_discard(place, discard)?;
                Ok(self.transition(Event::Discarded))
            }
            Action::Handle(handle) => {
                self.set_handle(place, handle.clone())?;
                Ok(self.transition(Event::Handle { place, handle }))
            }
            Action::NoHandle => self.decline_handle(place),
            Action::Card(card) => {
                self.set_card(place, card)?;
                Ok(self.transition(Event::CardPlayed { place, card }))
            }
        }
    }

    /// Record the bid of `place`. Returns the contract actually kept for
    /// that seat: anything not above the best bid becomes a pass.
    pub fn set_bid(
        &mut self,
        place: Place,
        contract: Contract,
        slam: bool,
    ) -> Result<Contract, ActionError> {
        self.expect(Sequence::WaitForBid)?;
        self.expect_player(self.current_player, place)?;
        let accepted = self.ctx.set_bid(contract, slam, place);
        info!(%place, asked = %contract, contract = %accepted, slam, "bid");
        self.record(place, HistoryVerb::Bid, accepted.to_string());
        self.position += 1;
        self.current_player = self.current_player.next(self.nb_players);
        self.sequence = Sequence::WaitForShowBid;
        Ok(accepted)
    }

    /// Call a card to designate the partner (5 players). Returns the partner,
    /// `None` when the taker plays alone.
    pub fn set_king_called(&mut self, place: Place, card: Card) -> Result<Option<Place>, ActionError> {
        self.expect(Sequence::WaitForKingCall)?;
        let taker = self.ctx.bid().taker.ok_or(ActionError::NoTaker)?;
        self.expect_player(taker, place)?;
        let stats = self.hands.get(taker).statistics();
        if !DealContext::check_king_call(card, &stats) {
            warn!(%place, %card, "invalid king call");
            return Err(ActionError::InvalidKingCall(card));
        }
        let partner = self.hands.locate(card).filter(|&p| p != taker);
        self.ctx.set_partner(partner);
        self.king_called = Some(card);
        info!(%card, "king called");
        self.record(place, HistoryVerb::KingCall, card.to_string());
        self.sequence = Sequence::WaitForShowKingCall;
        Ok(partner)
    }

    /// Discard of the taker after taking the dog.
    pub fn set_discard(&mut self, place: Place, discard: Deck) -> Result<(), ActionError> {
        self.expect(Sequence::WaitForDiscard)?;
        let taker = self.ctx.bid().taker.ok_or(ActionError::NoTaker)?;
        self.expect_player(taker, place)?;
        let hand = self.hands.get(taker);
        if !hand.test_discard(&discard, self.ctx.dog(), self.nb_players) {
            warn!(%place, discard = %discard, "invalid discard");
            return Err(ActionError::InvalidDiscard(discard));
        }
        let dog = self.ctx.dog().clone();
        let hand = self.hands.get_mut(taker);
        hand.append(&dog);
        hand.remove_duplicates(&discard);
        debug!(discard = %discard, hand = %hand, "discard received");
        self.record(place, HistoryVerb::Discard, discard.to_string());
        self.ctx.set_discard(discard, Team::Attack);
        self.enter_start_deal();
        Ok(())
    }

    /// Handle declared by `place` during the first trick.
    pub fn set_handle(&mut self, place: Place, handle: Deck) -> Result<(), ActionError> {
        self.expect(Sequence::WaitForHandle)?;
        self.expect_player(self.current_player, place)?;
        if !self.hands.get(place).test_handle(&handle) {
            warn!(%place, handle = %handle, "invalid handle");
            return Err(ActionError::InvalidHandle(handle));
        }
        info!(%place, size = handle.len(), "handle declared");
        self.record(place, HistoryVerb::Handle, handle.to_string());
        self.ctx.set_handle(handle, place);
        self.sequence = Sequence::WaitForShowHandle;
        Ok(())
    }

    /// `place` shows no handle; play continues.
    pub fn decline_handle(&mut self, place: Place) -> Result<Transition, ActionError> {
        self.expect(Sequence::WaitForHandle)?;
        self.expect_player(self.current_player, place)?;
        self.record(place, HistoryVerb::NoHandle, String::new());
        self.game_sequence()
    }

    /// Card played by `place` on the current trick.
    pub fn set_card(&mut self, place: Place, card: Card) -> Result<(), ActionError> {
        self.expect(Sequence::WaitForPlayedCard)?;
        self.expect_player(self.current_player, place)?;
        let hand = self.hands.get_mut(place);
        if !hand.can_play_card(card, &self.current_trick) {
            warn!(%place, %card, trick = %self.current_trick, "illegal card");
            return Err(ActionError::IllegalCard(card));
        }
        hand.remove(card);
        self.current_trick.push(card);
        debug!(turn = self.trick_counter + 1, %place, %card, trick = %self.current_trick, "card played");
        self.record(place, HistoryVerb::Card, card.to_string());
        self.position += 1;
        self.current_player = self.current_player.next(self.nb_players);
        self.sequence = Sequence::WaitForShowCard;
        Ok(())
    }

    // ----- acknowledgements -----

    /// Acknowledge the current state and move on.
    pub fn advance(&mut self) -> Result<Transition, ActionError> {
        match self.sequence {
            Sequence::WaitForPlayers => Ok(self.new_game()),
            Sequence::WaitForReady => {
                let used = self.new_deal(self.distribution.clone()).map_err(|e| {
                    error!(error = %e, "deal failed");
                    ActionError::Deal(e.to_string())
                })?;
                // next deal from a numbered distribution continues the series
                self.distribution = match used {
                    Distribution::Numbered { seed } => {
                        Distribution::Numbered { seed: seed.wrapping_add(1) }
                    }
                    other => other,
                };
                Ok(self.transition(Event::NewDeal { dealer: self.dealer }))
            }
            Sequence::WaitForAllPassed => {
                info!("all players passed");
                self.sequence = Sequence::WaitForReady;
                Ok(self.transition(Event::Ready))
            }
            Sequence::WaitForCards | Sequence::WaitForShowBid => Ok(self.bid_sequence()),
            Sequence::WaitForShowKingCall => Ok(self.manage_after_bid()),
            Sequence::WaitForShowDog => {
                self.sequence = Sequence::WaitForDiscard;
                Ok(self.turn_event())
            }
            Sequence::WaitForStartDeal
            | Sequence::WaitForShowHandle
            | Sequence::WaitForShowCard => self.game_sequence(),
            Sequence::WaitForHandle => {
                let place = self.current_player;
                self.decline_handle(place)
            }
            Sequence::WaitForEndOfTrick => {
                if rules::is_deal_finished(self.trick_counter, self.nb_players) {
                    Ok(self.end_of_deal())
                } else {
                    self.game_sequence()
                }
            }
            Sequence::WaitForEndOfDeal => {
                self.sequence = Sequence::WaitForReady;
                Ok(self.transition(Event::Ready))
            }
            other => Err(ActionError::NothingToAcknowledge(other)),
        }
    }

    /// Acknowledge every state until a player decision is needed, the deal
    /// is over, or everybody passed.
    pub fn advance_to_action(&mut self) -> Result<Transition, ActionError> {
        let mut last = self.turn_event();
        while !self.sequence.awaits_action()
            && !matches!(
                self.sequence,
                Sequence::WaitForEndOfDeal | Sequence::WaitForAllPassed | Sequence::Stopped
            )
        {
            last = self.advance()?;
        }
        Ok(last)
    }

    // ----- internal sequencing -----

    fn bid_sequence(&mut self) -> Transition {
        let round_over = self.position >= self.nb_players as usize;
        if round_over {
            self.position = 0;
        }
        let next = Sequence::after_bid(self.ctx.bid(), round_over, self.nb_players);
        match next {
            Sequence::WaitForKingCall => {
                self.ctx.set_partner(None);
                self.sequence = next;
                self.turn_event()
            }
            Sequence::WaitForShowDog | Sequence::WaitForStartDeal => self.manage_after_bid(),
            Sequence::WaitForAllPassed => {
                self.sequence = next;
                self.transition(Event::AllPassed)
            }
            _ => {
                self.sequence = next;
                self.turn_event()
            }
        }
    }

    fn manage_after_bid(&mut self) -> Transition {
        if self.ctx.manage_dog_after_bid() {
            self.sequence = Sequence::WaitForShowDog;
            let dog = self.ctx.dog().clone();
            self.transition(Event::ShowDog(dog))
        } else {
            self.enter_start_deal()
        }
    }

    fn enter_start_deal(&mut self) -> Transition {
        self.sequence = Sequence::WaitForStartDeal;
        let first_player = self.start_deal();
        self.transition(Event::StartDeal { first_player })
    }

    fn start_deal(&mut self) -> Place {
        self.trick_counter = 0;
        self.position = 0;
        self.handle_asked = [false; 5];
        let bid = *self.ctx.bid();
        self.current_player = match (bid.slam, bid.taker) {
            (true, Some(taker)) => taker,
            _ => self.dealer.next(self.nb_players),
        };
        self.ctx.set_first_player(self.current_player);
        info!(
            taker = Place::name_of(bid.taker),
            contract = %bid.contract,
            first = %self.current_player,
            "deal starts"
        );
        self.current_player
    }

    fn game_sequence(&mut self) -> Result<Transition, ActionError> {
        let trick_complete = self.position >= self.nb_players as usize;
        let asked = self.handle_asked[self.current_player.index()];
        self.sequence = Sequence::in_play(trick_complete, self.trick_counter == 0, asked);
        match self.sequence {
            Sequence::WaitForEndOfTrick => {
                self.position = 0;
                self.trick_counter += 1;
                let trick = std::mem::take(&mut self.current_trick);
                let winner = self.ctx.set_trick(trick)?;
                self.current_player = winner;
                info!(trick = self.trick_counter, %winner, "trick won");
                self.record(winner, HistoryVerb::TrickWon, self.trick_counter.to_string());
                Ok(self.transition(Event::TrickWon { winner, trick: self.trick_counter }))
            }
            Sequence::WaitForHandle => {
                self.handle_asked[self.current_player.index()] = true;
                Ok(self.turn_event())
            }
            _ => Ok(self.turn_event()),
        }
    }

    fn end_of_deal(&mut self) -> Transition {
        let points = self.ctx.analyze_game();
        self.points = Some(points);
        self.sequence = Sequence::WaitForEndOfDeal;
        info!(
            attack = points.points_attack,
            oudlers = points.oudlers,
            winner = ?points.winner(),
            "end of deal"
        );
        self.transition(Event::EndOfDeal(points))
    }

    fn expect(&self, expected: Sequence) -> Result<(), ActionError> {
        if self.sequence != expected {
            warn!(%expected, actual = %self.sequence, "action in wrong sequence");
            return Err(ActionError::WrongSequence { expected, actual: self.sequence });
        }
        Ok(())
    }

    fn expect_player(&self, expected: Place, place: Place) -> Result<(), ActionError> {
        if expected != place {
            warn!(%expected, %place, "action from wrong player");
            return Err(ActionError::WrongPlayer { expected, place });
        }
        Ok(())
    }

    fn record(&mut self, place: Place, verb: HistoryVerb, detail: String) {
        self.history.push(HistoryEntry { place, verb, detail, sequence: self.sequence });
    }

    fn turn_event(&self) -> Transition {
        match self.acting_player() {
            Some(place) => self.transition(Event::Turn { place }),
            None => self.transition(Event::Ready),
        }
    }

    fn transition(&self, event: Event) -> Transition {
        Transition { sequence: self.sequence, event }
    }
}
