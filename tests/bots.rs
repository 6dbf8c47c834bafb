use tarot_rs::agents::{
    bid_score, choose_bid, contract_for_score, AgentKind, AgentTable, BotAgent, BotProfile,
    CardPolicy, HumanAgent, PlayerAgent,
};
use tarot_rs::bid::Contract;
use tarot_rs::deal::Distribution;
use tarot_rs::engine::{Action, Engine, Sequence};
use tarot_rs::place::Place;

fn table(n: u8, seed: u64) -> Engine {
    let mut e = Engine::with_seed(seed);
    e.create_table(n).unwrap();
    e.set_first_dealer(Place::South);
    e.set_distribution(Distribution::Numbered { seed });
    e.advance().unwrap();
    e.advance().unwrap();
    e.advance_to_action().unwrap();
    e
}

fn random_bots(n: u8, seed: u64) -> AgentTable {
    let mut table = AgentTable::for_seats(n as usize);
    for p in Place::seats(n) {
        let profile = BotProfile::new(CardPolicy::RandomLegal).with_seed(seed + p.index() as u64);
        table.set_agent(p, Some(Box::new(BotAgent::new(profile))));
    }
    table
}

#[test]
fn bot_bids_follow_the_hand_strength() {
    let mut e = table(4, 12);
    let mut bot = BotAgent::new(BotProfile::default());
    let seat = e.current_player();
    let score = bid_score(&e.hand(seat).statistics());
    let expected = choose_bid(e.hand(seat), Contract::NoBid);
    if score <= 35 {
        assert_eq!(expected, Contract::Pass);
    } else {
        assert_eq!(expected, contract_for_score(score));
    }
    assert!(bot.on_turn(&mut e, seat).unwrap());
    assert_eq!(e.bid().contract, expected);
}

#[test]
fn random_policy_only_plays_legal_cards() {
    for seed in 0..6u64 {
        let mut e = table(4, seed);
        let taker = e.current_player();
        e.set_bid(taker, Contract::GuardAgainst, false).unwrap();
        let mut bots: Vec<BotAgent> = (0..4)
            .map(|i| BotAgent::new(BotProfile::new(CardPolicy::RandomLegal).with_seed(seed * 10 + i)))
            .collect();
        while e.sequence() != Sequence::WaitForEndOfDeal {
            e.advance_to_action().unwrap();
            if let Some(seat) = e.acting_player() {
                // every decision must be accepted as is
                assert!(bots[seat.index()].on_turn(&mut e, seat).unwrap());
            }
        }
        assert_eq!(e.trick_counter(), 18);
    }
}

#[test]
fn seeded_bots_replay_identically() {
    let run = |seed: u64| {
        let mut e = table(5, seed);
        let mut bots = random_bots(5, seed);
        bots.play_deal(&mut e).unwrap().map(|_| e.deal_log().to_json_string().unwrap())
    };
    for seed in [3u64, 4, 5] {
        assert_eq!(run(seed), run(seed));
    }
}

#[test]
fn human_seat_waits_for_its_decision() {
    let mut e = table(4, 12);
    let mut seats = AgentTable::for_seats(4);
    seats.set_agent(Place::East, Some(Box::new(HumanAgent::new())));
    assert_eq!(seats.agent_kind(Place::East), Some(AgentKind::Human));
    assert!(!seats.has_agent(Place::North));
    assert!(!seats.any_bots());

    assert!(!seats.on_turn(&mut e).unwrap());
    assert_eq!(e.sequence(), Sequence::WaitForBid);
    assert!(seats.receive(Place::East, Action::Bid { contract: Contract::Take, slam: false }));
    assert!(seats.on_turn(&mut e).unwrap());
    assert_eq!(e.bid().taker, Some(Place::East));

    seats.clear();
    assert!(!seats.has_agent(Place::East));
}

#[test]
fn table_throttles_bots() {
    let mut e = table(4, 12);
    let mut bots = AgentTable::bots(4, 12);
    bots.set_min_action_delay_ms(10_000);
    assert!(bots.on_turn(&mut e).unwrap());
    e.advance().unwrap();
    assert!(!bots.on_turn(&mut e).unwrap());
    assert_eq!(e.sequence(), Sequence::WaitForBid);
}
