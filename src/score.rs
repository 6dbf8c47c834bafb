//! Deal outcome and the running score of a game.

use crate::bid::Bid;
use crate::place::{Place, Team};
use crate::rules;
use serde::Serialize;

/// Slam bonus when announced and made.
pub const SLAM_ANNOUNCED: i32 = 400;
/// Slam bonus when made without being announced, also granted to a
/// defense that wins every trick.
pub const SLAM_UNANNOUNCED: i32 = 200;
/// Penalty for an announced slam that failed.
pub const SLAM_FAILED: i32 = -200;
/// Base of the little-trump-at-last-trick bonus, multiplied by the contract.
pub const LITTLE_TRUMP_BONUS: i32 = 10;
/// Fixed part of every contract result.
pub const CONTRACT_BASE: i32 = 25;

/// Outcome of one deal, computed at its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Points {
    /// Attack card points after the half point went to the favoured side.
    pub points_attack: i32,
    /// Raw attack card points, in half points.
    pub card_half_points: u32,
    pub oudlers: u8,
    /// Sum of every handle bonus of the deal.
    pub handle_points: i32,
    pub attack_handle_points: i32,
    pub defense_handle_points: i32,
    pub slam_done: bool,
    /// Side that won every trick, when `slam_done`.
    pub slam_team: Option<Team>,
    /// Side that won the little trump in the last trick.
    pub little_trump_owner: Option<Team>,
}

impl Points {
    /// Raw attack card points before rounding.
    pub fn cards_points_attack(&self) -> f32 {
        self.card_half_points as f32 / 2.0
    }

    pub fn points_to_do(&self) -> i32 {
        rules::points_to_do(self.oudlers)
    }

    /// Signed margin of the attack against its threshold.
    pub fn difference(&self) -> i32 {
        self.points_attack - self.points_to_do()
    }

    /// The attack wins on reaching the threshold exactly.
    pub fn winner(&self) -> Team {
        if self.difference() >= 0 {
            Team::Attack
        } else {
            Team::Defense
        }
    }

    /// Slam bonus seen from the attack. A defense slam costs the attack
    /// `SLAM_UNANNOUNCED`, plus the failed-announcement penalty when the
    /// taker had announced one.
    pub fn slam_points(&self, bid: &Bid) -> i32 {
        match (self.slam_team, bid.slam) {
            (Some(Team::Attack), true) => SLAM_ANNOUNCED,
            (Some(Team::Attack), false) => SLAM_UNANNOUNCED,
            (Some(Team::Defense), true) => SLAM_FAILED - SLAM_UNANNOUNCED,
            (Some(Team::Defense), false) => -SLAM_UNANNOUNCED,
            (None, true) => SLAM_FAILED,
            (None, false) => 0,
        }
    }

    /// Little-trump bonus seen from the attack.
    pub fn little_trump_points(&self, bid: &Bid) -> i32 {
        let bonus = LITTLE_TRUMP_BONUS * bid.contract.multiplier();
        match self.little_trump_owner {
            Some(Team::Attack) => bonus,
            Some(Team::Defense) => -bonus,
            None => 0,
        }
    }

    /// Score of one defender (negated: of the attack unit) for this deal.
    fn unit_points(&self, bid: &Bid) -> i32 {
        let mult = bid.contract.multiplier();
        let contract = (CONTRACT_BASE + self.difference().abs()) * mult;
        let signed = match self.winner() {
            Team::Attack => contract,
            Team::Defense => -contract,
        };
        signed
            + self.little_trump_points(bid)
            + self.attack_handle_points
            - self.defense_handle_points
            + self.slam_points(bid)
    }

    /// Total won by `team` over the deal. The attack total is the unit score
    /// times the number of defenders; the defense total is its opposite.
    ///
    /// ```
    /// use tarot_rs::bid::{Bid, Contract};
    /// use tarot_rs::place::{Place, Team};
    /// use tarot_rs::score::Points;
    ///
    /// let points = Points { points_attack: 46, oudlers: 2, ..Points::default() };
    /// let bid = Bid { taker: Some(Place::South), partner: Some(Place::South), contract: Contract::Guard, slam: false };
    /// // (25 + 5) x 2 against each of three defenders
    /// assert_eq!(points.get_points(Team::Attack, &bid, 4), 180);
    /// assert_eq!(points.get_points(Team::Defense, &bid, 4), -180);
    /// ```
    pub fn get_points(&self, team: Team, bid: &Bid, nb_players: u8) -> i32 {
        let defenders = if bid.has_partner() { 3 } else { i32::from(nb_players) - 1 };
        let attack = self.unit_points(bid) * defenders;
        match team {
            Team::Attack => attack,
            Team::Defense => -attack,
        }
    }

    /// Score of each seat for this deal; the values sum to zero.
    pub fn seat_points(&self, bid: &Bid, nb_players: u8) -> [i32; 5] {
        let unit = self.unit_points(bid);
        let mut seats = [0; 5];
        for place in Place::seats(nb_players) {
            seats[place.index()] = if bid.taker == Some(place) {
                if bid.has_partner() {
                    2 * unit
                } else {
                    (i32::from(nb_players) - 1) * unit
                }
            } else if bid.partner == Some(place) {
                unit
            } else {
                -unit
            };
        }
        seats
    }
}

/// Score of one finished deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub points: Points,
    pub bid: Bid,
    pub nb_players: u8,
    pub seats: [i32; 5],
}

/// Scores accumulated over the deals of a game.
#[derive(Debug, Clone, Default)]
pub struct Score {
    number_of_deals: usize,
    history: Vec<ScoreEntry>,
}

impl Score {
    pub fn new(number_of_deals: usize) -> Self {
        Self { number_of_deals, history: Vec::new() }
    }

    pub fn new_game(&mut self, number_of_deals: usize) {
        self.number_of_deals = number_of_deals;
        self.history.clear();
    }

    pub fn number_of_deals(&self) -> usize {
        self.number_of_deals
    }

    pub fn deal_counter(&self) -> usize {
        self.history.len()
    }

    /// Record a deal. Returns `true` once the planned number of deals is
    /// reached.
    pub fn add_points(&mut self, points: Points, bid: Bid, nb_players: u8) -> bool {
        let seats = points.seat_points(&bid, nb_players);
        self.history.push(ScoreEntry { points, bid, nb_players, seats });
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.history.len() >= self.number_of_deals
    }

    pub fn total_points(&self, place: Place) -> i32 {
        self.history.iter().map(|e| e.seats[place.index()]).sum()
    }

    /// Seats ordered from the best total to the worst.
    pub fn podium(&self) -> Vec<(Place, i32)> {
        let nb_players = self.history.last().map_or(0, |e| e.nb_players);
        let mut ranking: Vec<(Place, i32)> =
            Place::seats(nb_players).map(|p| (p, self.total_points(p))).collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        ranking
    }

    pub fn winner(&self) -> Option<Place> {
        self.podium().first().map(|(p, _)| *p)
    }

    pub fn history(&self) -> &[ScoreEntry] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bid::Contract;

    fn bid(contract: Contract) -> Bid {
        Bid {
            taker: Some(Place::South),
            partner: Some(Place::South),
            contract,
            slam: false,
        }
    }

    #[test]
    fn threshold_reached_exactly_is_a_win() {
        let p = Points { points_attack: 56, oudlers: 0, ..Points::default() };
        assert_eq!(p.winner(), Team::Attack);
        assert_eq!(p.difference(), 0);
        let p = Points { points_attack: 55, oudlers: 0, ..Points::default() };
        assert_eq!(p.winner(), Team::Defense);
    }

    #[test]
    fn lost_contract_is_negative() {
        let p = Points { points_attack: 30, oudlers: 1, ..Points::default() };
        // (25 + 21) x 1
        assert_eq!(p.get_points(Team::Attack, &bid(Contract::Take), 4), -46 * 3);
    }

    #[test]
    fn bonuses_add_up() {
        let p = Points {
            points_attack: 41,
            oudlers: 2,
            attack_handle_points: 20,
            handle_points: 20,
            little_trump_owner: Some(Team::Defense),
            ..Points::default()
        };
        // 25 x 4 - 10 x 4 + 20
        assert_eq!(p.get_points(Team::Attack, &bid(Contract::GuardWithout), 3), 80 * 2);
    }

    #[test]
    fn slam_bonuses() {
        let b = bid(Contract::Guard);
        let announced = Bid { slam: true, ..b };
        let made = Points { slam_done: true, slam_team: Some(Team::Attack), ..Points::default() };
        assert_eq!(made.slam_points(&b), 200);
        assert_eq!(made.slam_points(&announced), 400);
        assert_eq!(Points::default().slam_points(&announced), -200);
        let defense = Points { slam_done: true, slam_team: Some(Team::Defense), ..Points::default() };
        assert_eq!(defense.slam_points(&b), -200);
    }

    #[test]
    fn five_player_partner_split() {
        let p = Points { points_attack: 51, oudlers: 1, ..Points::default() };
        let b = Bid {
            taker: Some(Place::North),
            partner: Some(Place::Fifth),
            contract: Contract::Take,
            slam: false,
        };
        let seats = p.seat_points(&b, 5);
        assert_eq!(seats[Place::North.index()], 50);
        assert_eq!(seats[Place::Fifth.index()], 25);
        assert_eq!(seats[Place::South.index()], -25);
        assert_eq!(seats.iter().sum::<i32>(), 0);
    }

    #[test]
    fn score_accumulates_and_ranks() {
        let mut score = Score::new(2);
        let win = Points { points_attack: 60, oudlers: 1, ..Points::default() };
        assert!(!score.add_points(win, bid(Contract::Take), 4));
        let mut other = bid(Contract::Take);
        other.taker = Some(Place::East);
        other.partner = Some(Place::East);
        assert!(score.add_points(win, other, 4));
        // (25 + 9) per unit
        assert_eq!(score.total_points(Place::South), 34 * 3 - 34);
        assert_eq!(score.total_points(Place::North), -68);
        assert_eq!(score.podium().len(), 4);
        assert!(matches!(score.winner(), Some(Place::South) | Some(Place::East)));
        assert_eq!(score.history().len(), 2);
    }
}
