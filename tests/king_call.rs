use tarot_rs::agents::{choose_king, AgentTable};
use tarot_rs::bid::Contract;
use tarot_rs::cards::{Card, Suit, KING, QUEEN};
use tarot_rs::deal::Distribution;
use tarot_rs::engine::{ActionError, Engine, Event, Sequence};
use tarot_rs::place::Place;

fn table(seed: u64) -> Engine {
    let mut e = Engine::with_seed(seed);
    e.create_table(5).unwrap();
    e.set_first_dealer(Place::South);
    e.set_distribution(Distribution::Numbered { seed });
    e.advance().unwrap();
    e.advance().unwrap();
    e.advance_to_action().unwrap();
    e
}

/// East takes, everybody else passes.
fn auction(e: &mut Engine, contract: Contract) {
    e.set_bid(Place::East, contract, false).unwrap();
    for p in [Place::North, Place::West, Place::Fifth, Place::South] {
        e.advance().unwrap();
        e.set_bid(p, Contract::Pass, false).unwrap();
    }
    e.advance().unwrap();
}

#[test]
fn five_players_call_a_king_after_the_auction() {
    let mut e = table(3);
    assert_eq!(e.hand(Place::Fifth).len(), 15);
    assert_eq!(e.dog().len(), 3);
    auction(&mut e, Contract::Guard);
    assert_eq!(e.sequence(), Sequence::WaitForKingCall);
    assert_eq!(e.acting_player(), Some(Place::East));
}

#[test]
fn invalid_calls_are_rejected() {
    let mut e = table(3);
    auction(&mut e, Contract::Take);
    assert_eq!(
        e.set_king_called(Place::East, Card::BIG),
        Err(ActionError::InvalidKingCall(Card::BIG))
    );
    let king = Card::new(KING, Suit::Hearts);
    assert!(matches!(e.set_king_called(Place::North, king), Err(ActionError::WrongPlayer { .. })));
    if e.hand(Place::East).statistics().kings < 4 {
        let queen = Card::new(QUEEN, Suit::Hearts);
        assert_eq!(
            e.set_king_called(Place::East, queen),
            Err(ActionError::InvalidKingCall(queen))
        );
    }
    assert_eq!(e.sequence(), Sequence::WaitForKingCall);
    assert_eq!(e.king_called(), None);
}

#[test]
fn called_card_designates_the_partner() {
    let mut e = table(3);
    auction(&mut e, Contract::Guard);
    let card = choose_king(e.hand(Place::East));
    let holder = e.hands().locate(card);
    let partner = e.set_king_called(Place::East, card).unwrap();
    assert_eq!(partner, holder);
    assert_eq!(e.king_called(), Some(card));
    assert_eq!(e.sequence(), Sequence::WaitForShowKingCall);
    assert_eq!(e.bid().partner, partner.or(Some(Place::East)));

    let t = e.advance().unwrap();
    assert_eq!(t.sequence, Sequence::WaitForShowDog);
    assert!(matches!(t.event, Event::ShowDog(ref dog) if dog.len() == 3));
    e.advance().unwrap();
    assert_eq!(e.sequence(), Sequence::WaitForDiscard);
    let discard = e.hand(Place::East).auto_discard(e.dog(), 5);
    e.set_discard(Place::East, discard).unwrap();
    assert_eq!(e.hand(Place::East).len(), 15);
    assert_eq!(e.discard().len(), 3);
}

#[test]
fn calling_an_own_king_means_playing_alone() {
    let found = (0..50u64).find_map(|seed| {
        let e = table(seed);
        let hand = e.hand(Place::East);
        let king = hand.iter().copied().find(|c| c.rank() == KING && !c.is_trump());
        king.filter(|_| hand.statistics().kings < 4).map(|k| (seed, k))
    });
    let (seed, king) = found.expect("a seed where East holds a king");
    let mut e = table(seed);
    auction(&mut e, Contract::Take);
    assert_eq!(e.set_king_called(Place::East, king).unwrap(), None);
    assert_eq!(e.bid().partner, Some(Place::East));
    assert!(!e.bid().has_partner());
}

#[test]
fn a_called_card_in_the_dog_also_means_playing_alone() {
    let found = (0..200u64).find_map(|seed| {
        let e = table(seed);
        let king = e.dog().iter().copied().find(|c| c.rank() == KING && !c.is_trump())?;
        (!e.hand(Place::East).contains(king) && e.hand(Place::East).statistics().kings < 4)
            .then_some((seed, king))
    });
    let (seed, king) = found.expect("a seed with a king in the dog");
    let mut e = table(seed);
    auction(&mut e, Contract::Guard);
    assert_eq!(e.set_king_called(Place::East, king).unwrap(), None);
    assert!(!e.bid().has_partner());
}

#[test]
fn five_player_deal_runs_to_the_end() {
    let mut e = table(8);
    auction(&mut e, Contract::Guard);
    let mut bots = AgentTable::bots(5, 8);
    let points = bots.play_deal(&mut e).unwrap().expect("East took");
    assert_eq!(e.trick_counter(), 15);
    let seats = points.seat_points(e.bid(), 5);
    assert_eq!(seats.iter().sum::<i32>(), 0);
    if e.bid().has_partner() {
        let partner = e.bid().partner.unwrap();
        assert_eq!(seats[partner.index()] * 2, seats[Place::East.index()]);
    }
}
