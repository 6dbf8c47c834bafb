//! Mutable state of one deal: bid, dog, discard, handles and played tricks.

use crate::bid::{Bid, Contract, Handle};
use crate::cards::{Card, Suit, JACK, KING, KNIGHT, QUEEN};
use crate::deck::{Deck, Statistics};
use crate::place::{Place, Team};
use crate::rules;
use crate::score::Points;
use tracing::{debug, info};

/// Value and oudler moved between the sides when the Fool changes camp.
const FOOL_SWAP_HALF_POINTS: u32 = 8;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrickError {
    #[error("trick holds {actual} cards, expected {expected}")]
    Size { expected: usize, actual: usize },
    #[error("all {0} tricks of the deal are already played")]
    DealFinished(usize),
    #[error("no player is set to lead the first trick")]
    NoLeader,
}

/// Per-deal state, reset at the start of every deal.
#[derive(Debug, Clone)]
pub struct DealContext {
    nb_players: u8,
    bid: Bid,
    dog: Deck,
    discard: Deck,
    attack_handle: Deck,
    defense_handle: Deck,
    tricks: Vec<Deck>,
    winners: Vec<Place>,
    tricks_won: usize,
    stats_attack: Statistics,
    first_player: Option<Place>,
}

impl DealContext {
    pub fn new(nb_players: u8) -> Self {
        Self {
            nb_players,
            bid: Bid::default(),
            dog: Deck::new(),
            discard: Deck::new(),
            attack_handle: Deck::new(),
            defense_handle: Deck::new(),
            tricks: Vec::with_capacity(rules::cards_in_hand(nb_players)),
            winners: Vec::with_capacity(rules::cards_in_hand(nb_players)),
            tricks_won: 0,
            stats_attack: Statistics::default(),
            first_player: None,
        }
    }

    /// Clear everything but the player count.
    pub fn reset(&mut self) {
        *self = Self::new(self.nb_players);
    }

    pub fn nb_players(&self) -> u8 {
        self.nb_players
    }

    pub fn bid(&self) -> &Bid {
        &self.bid
    }

    /// Record a bid of `place`. Only a contract strictly above the current
    /// best is kept; anything else is turned into a pass. Returns the
    /// contract actually recorded for `place`. A slam is only announced
    /// together with a taken contract.
    pub fn set_bid(&mut self, contract: Contract, slam: bool, place: Place) -> Contract {
        if contract.outbids(self.bid.contract) {
            self.bid.contract = contract;
            self.bid.slam = slam && contract.is_taken();
            if contract.is_taken() {
                self.bid.taker = Some(place);
                self.bid.partner = Some(place);
            }
            contract
        } else {
            Contract::Pass
        }
    }

    pub fn set_partner(&mut self, partner: Option<Place>) {
        self.bid.partner = partner.or(self.bid.taker);
    }

    pub(crate) fn set_bid_record(&mut self, bid: Bid) {
        self.bid = bid;
    }

    pub fn dog(&self) -> &Deck {
        &self.dog
    }

    pub fn set_dog(&mut self, dog: Deck) {
        self.dog = dog;
    }

    pub fn discard(&self) -> &Deck {
        &self.discard
    }

    pub fn set_discard(&mut self, mut discard: Deck, owner: Team) {
        discard.set_owner(Some(owner));
        self.discard = discard;
    }

    /// Settle the dog once the auction is over. Returns `false` when the
    /// contract skips the dog display: the dog then becomes the discard of
    /// the side that owns it.
    pub fn manage_dog_after_bid(&mut self) -> bool {
        match self.bid.contract.dog_owner_without_discard() {
            Some(owner) => {
                self.set_discard(self.dog.clone(), owner);
                false
            }
            None => true,
        }
    }

    /// Store a handle for the side of `place`.
    pub fn set_handle(&mut self, handle: Deck, place: Place) {
        match self.bid.team_of(place) {
            Team::Attack => self.attack_handle = handle,
            Team::Defense => self.defense_handle = handle,
        }
    }

    pub fn attack_handle(&self) -> &Deck {
        &self.attack_handle
    }

    pub fn defense_handle(&self) -> &Deck {
        &self.defense_handle
    }

    pub(crate) fn set_handles(&mut self, attack: Deck, defense: Deck) {
        self.attack_handle = attack;
        self.defense_handle = defense;
    }

    /// Whether the taker, described by `stats`, may call `card`: a king
    /// unless all four kings are held, then a queen unless all four queens
    /// are held, and so on down to the jacks.
    pub fn check_king_call(card: Card, stats: &Statistics) -> bool {
        if card.suit() == Suit::Trumps {
            return false;
        }
        let honours = [
            (KING, stats.kings),
            (QUEEN, stats.queens),
            (KNIGHT, stats.knights),
            (JACK, stats.jacks),
        ];
        for (rank, held) in honours {
            if card.rank() == rank {
                return true;
            }
            if held < 4 {
                return false;
            }
        }
        false
    }

    pub fn first_player(&self) -> Option<Place> {
        self.first_player
    }

    pub fn set_first_player(&mut self, place: Place) {
        self.first_player = Some(place);
    }

    pub fn tricks(&self) -> &[Deck] {
        &self.tricks
    }

    pub fn winners(&self) -> &[Place] {
        &self.winners
    }

    pub fn tricks_won(&self) -> usize {
        self.tricks_won
    }

    pub fn stats_attack(&self) -> &Statistics {
        &self.stats_attack
    }

    /// Player who led trick `turn` (0-based).
    pub fn trick_leader(&self, turn: usize) -> Option<Place> {
        match turn {
            0 => self.first_player,
            t => self.winners.get(t - 1).copied(),
        }
    }

    /// Seat that played `card` in trick `turn`, walking from the leader.
    pub fn owner_of(&self, card: Card, turn: usize) -> Option<Place> {
        let leader = self.trick_leader(turn)?;
        let position = self.tricks.get(turn)?.position(card)?;
        Some(leader.advance(position, self.nb_players))
    }

    /// Store the next complete trick and resolve it.
    ///
    /// The winning card is the highest trump, otherwise the highest card of
    /// the suit led. The Fool stays with its side except at the last trick,
    /// where it always goes to the other side unless the taker holding it
    /// completes a slam; moving it transfers 4 points and one oudler between
    /// the sides instead of the card itself.
    pub fn set_trick(&mut self, trick: Deck) -> Result<Place, TrickError> {
        let n = self.nb_players;
        let nb_tricks = rules::cards_in_hand(n);
        if trick.len() != n as usize {
            return Err(TrickError::Size { expected: n as usize, actual: trick.len() });
        }
        if self.tricks.len() >= nb_tricks {
            return Err(TrickError::DealFinished(nb_tricks));
        }
        let turn = self.tricks.len();
        let leader = self.trick_leader(turn).ok_or(TrickError::NoLeader)?;
        let seat_of = |card: Card| {
            trick.position(card).map(|pos| leader.advance(pos, n)).unwrap_or(leader)
        };

        let leading_card = trick
            .highest_trump()
            .or_else(|| trick.highest_suit())
            .unwrap_or(Card::FOOL);
        let mut winner = seat_of(leading_card);

        let mut fool_swap = false;
        if trick.has_fool() {
            let fool_place = seat_of(Card::FOOL);
            let winner_team = self.bid.team_of(winner);
            let fool_team = self.bid.team_of(fool_place);
            let last_trick = rules::is_deal_finished(turn + 1, n);
            if last_trick {
                if self.tricks_won == nb_tricks - 1 && Some(fool_place) == self.bid.taker {
                    winner = fool_place;
                } else if winner_team == fool_team {
                    fool_swap = true;
                }
            } else if winner_team != fool_team {
                fool_swap = true;
            }
        }

        let mut trick = trick;
        if self.bid.is_attacker(winner) {
            trick.set_owner(Some(Team::Attack));
            trick.analyze_trumps(&mut self.stats_attack);
            self.tricks_won += 1;
            if fool_swap {
                self.stats_attack.half_points =
                    self.stats_attack.half_points.saturating_sub(FOOL_SWAP_HALF_POINTS);
                self.stats_attack.oudlers = self.stats_attack.oudlers.saturating_sub(1);
            }
        } else {
            trick.set_owner(Some(Team::Defense));
            if fool_swap {
                self.stats_attack.half_points += FOOL_SWAP_HALF_POINTS;
                self.stats_attack.oudlers += 1;
            }
        }

        debug!(turn = turn + 1, trick = %trick, winner = %winner, fool_swap, "trick resolved");
        self.tricks.push(trick);
        self.winners.push(winner);
        Ok(winner)
    }

    /// Compute the outcome of the finished deal. Does not modify the context
    /// and may be called again.
    pub fn analyze_game(&self) -> Points {
        let n = self.nb_players;
        let nb_tricks = rules::cards_in_hand(n);
        let mut points = Points::default();

        points.slam_done = self.tricks_won == nb_tricks || self.tricks_won == 0;
        if points.slam_done {
            points.slam_team =
                Some(if self.tricks_won == 0 { Team::Defense } else { Team::Attack });
        }

        let mut stats = self.stats_attack.clone();
        if self.discard.owner() == Some(Team::Attack) {
            self.discard.analyze_trumps(&mut stats);
        }

        if let Some(mut last) = self.tricks.len().checked_sub(1) {
            if points.slam_done && self.tricks[last].has_fool() && last > 0 {
                last -= 1;
            }
            let trick = &self.tricks[last];
            if trick.has_one_of_trump() {
                points.little_trump_owner = trick.owner();
            }
        }

        points.oudlers = stats.oudlers;
        points.card_half_points = stats.half_points;
        let half = stats.half_points as i32;
        let to_do = rules::points_to_do(stats.oudlers) * 2;
        points.points_attack = if half % 2 == 0 {
            half / 2
        } else if half >= to_do {
            (half + 1) / 2
        } else {
            (half - 1) / 2
        };

        let handle_bonus =
            |deck: &Deck| Handle::from_size(deck.len()).map_or(0, |h| h.points(n));
        points.attack_handle_points = handle_bonus(&self.attack_handle);
        points.defense_handle_points = handle_bonus(&self.defense_handle);
        points.handle_points = points.attack_handle_points + points.defense_handle_points;

        info!(
            attack = points.points_attack,
            oudlers = points.oudlers,
            winner = ?points.winner(),
            slam = points.slam_done,
            "deal analyzed"
        );
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(s: &str) -> Deck {
        s.parse().unwrap()
    }

    fn taken(ctx: &mut DealContext, taker: Place, contract: Contract) {
        assert_eq!(ctx.set_bid(contract, false, taker), contract);
    }

    #[test]
    fn bids_only_go_up() {
        let mut ctx = DealContext::new(4);
        assert_eq!(ctx.set_bid(Contract::Pass, false, Place::South), Contract::Pass);
        assert_eq!(ctx.set_bid(Contract::Guard, false, Place::East), Contract::Guard);
        assert_eq!(ctx.set_bid(Contract::Take, false, Place::North), Contract::Pass);
        assert_eq!(ctx.set_bid(Contract::Guard, false, Place::West), Contract::Pass);
        assert_eq!(ctx.bid().contract, Contract::Guard);
        assert_eq!(ctx.bid().taker, Some(Place::East));
        assert_eq!(ctx.bid().partner, Some(Place::East));
    }

    #[test]
    fn guard_without_and_against_skip_the_dog() {
        for (contract, owner, show) in [
            (Contract::Guard, None, true),
            (Contract::GuardWithout, Some(Team::Attack), false),
            (Contract::GuardAgainst, Some(Team::Defense), false),
        ] {
            let mut ctx = DealContext::new(4);
            ctx.set_dog(deck("01-S;02-S;03-S;04-S;05-S;06-S"));
            taken(&mut ctx, Place::South, contract);
            assert_eq!(ctx.manage_dog_after_bid(), show);
            assert_eq!(ctx.discard().owner(), owner);
        }
    }

    #[test]
    fn king_call_descends_only_with_four_honours() {
        let mut stats = Statistics::default();
        let queen = Card::new(QUEEN, Suit::Hearts);
        assert!(DealContext::check_king_call(Card::new(KING, Suit::Hearts), &stats));
        assert!(!DealContext::check_king_call(queen, &stats));
        stats.kings = 4;
        assert!(DealContext::check_king_call(queen, &stats));
        assert!(!DealContext::check_king_call(Card::new(KNIGHT, Suit::Hearts), &stats));
        assert!(!DealContext::check_king_call(Card::new(5, Suit::Hearts), &stats));
        assert!(!DealContext::check_king_call(Card::new(KING, Suit::Trumps), &stats));
    }

    #[test]
    fn trick_winner_walks_from_the_leader() {
        let mut ctx = DealContext::new(4);
        taken(&mut ctx, Place::South, Contract::Take);
        ctx.set_first_player(Place::North);
        // North, West, South, East
        let winner = ctx.set_trick(deck("05-H;14-H;02-T;10-H")).unwrap();
        assert_eq!(winner, Place::South);
        assert_eq!(ctx.tricks_won(), 1);
        assert_eq!(ctx.trick_leader(1), Some(Place::South));
        assert_eq!(ctx.owner_of(Card::new(14, Suit::Hearts), 0), Some(Place::West));
        // no trump: highest card of the suit led
        let winner = ctx.set_trick(deck("03-S;09-S;14-D;01-S")).unwrap();
        assert_eq!(winner, Place::East);
        assert_eq!(ctx.tricks()[1].owner(), Some(Team::Defense));
    }

    #[test]
    fn fool_lead_gives_lead_to_second_card() {
        let mut ctx = DealContext::new(4);
        taken(&mut ctx, Place::South, Contract::Take);
        ctx.set_first_player(Place::South);
        let winner = ctx.set_trick(deck("00-T;05-C;09-C;02-D")).unwrap();
        assert_eq!(winner, Place::North);
    }

    #[test]
    fn fool_stays_with_its_side_before_the_last_trick() {
        let mut ctx = DealContext::new(4);
        taken(&mut ctx, Place::South, Contract::Take);
        ctx.set_first_player(Place::South);
        // South (attack) wins, East (defense) plays the Fool
        ctx.set_trick(deck("14-H;00-T;05-H;06-H")).unwrap();
        let stats = ctx.stats_attack();
        // 4.5 + 4.5 + 0.5 + 0.5 raw, minus the Fool's 4
        assert_eq!(stats.half_points, 20 - 8);
        assert_eq!(stats.oudlers, 0);
    }

    #[test]
    fn wrong_trick_size_is_rejected() {
        let mut ctx = DealContext::new(4);
        ctx.set_first_player(Place::South);
        assert_eq!(
            ctx.set_trick(deck("01-S;02-S")),
            Err(TrickError::Size { expected: 4, actual: 2 })
        );
        let mut fresh = DealContext::new(4);
        fresh.reset();
        assert_eq!(fresh.set_trick(deck("01-S;02-S;03-S;04-S")), Err(TrickError::NoLeader));
    }

    #[test]
    fn half_point_goes_to_the_favoured_side() {
        let mut ctx = DealContext::new(3);
        taken(&mut ctx, Place::South, Contract::Take);
        ctx.stats_attack.half_points = 111;
        ctx.stats_attack.oudlers = 0;
        assert_eq!(ctx.analyze_game().points_attack, 55);
        ctx.stats_attack.half_points = 113;
        assert_eq!(ctx.analyze_game().points_attack, 57);
        ctx.stats_attack.half_points = 112;
        let points = ctx.analyze_game();
        assert_eq!(points.points_attack, 56);
        assert_eq!(points.winner(), Team::Attack);
    }

    #[test]
    fn discard_counts_for_its_owner() {
        let mut ctx = DealContext::new(4);
        taken(&mut ctx, Place::South, Contract::Guard);
        ctx.set_discard(deck("14-S;13-S;01-D;02-D;03-D;04-D"), Team::Attack);
        assert_eq!(ctx.analyze_game().card_half_points, 9 + 7 + 4);
        ctx.set_discard(deck("14-S;13-S;01-D;02-D;03-D;04-D"), Team::Defense);
        assert_eq!(ctx.analyze_game().card_half_points, 0);
    }

    #[test]
    fn handles_go_to_the_declaring_side() {
        let mut ctx = DealContext::new(4);
        taken(&mut ctx, Place::South, Contract::Take);
        let ten = deck("02-T;03-T;04-T;05-T;06-T;07-T;08-T;09-T;10-T;11-T");
        ctx.set_handle(ten.clone(), Place::East);
        assert_eq!(ctx.defense_handle(), &ten);
        assert!(ctx.attack_handle().is_empty());
        let points = ctx.analyze_game();
        assert_eq!(points.defense_handle_points, 20);
        assert_eq!(points.handle_points, 20);
    }
}
