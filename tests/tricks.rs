use tarot_rs::bid::Contract;
use tarot_rs::context::{DealContext, TrickError};
use tarot_rs::deck::Deck;
use tarot_rs::place::{Place, Team};

fn deck(s: &str) -> Deck {
    s.parse().unwrap()
}

fn context(n: u8, taker: Place) -> DealContext {
    let mut ctx = DealContext::new(n);
    assert_eq!(ctx.set_bid(Contract::Take, false, taker), Contract::Take);
    ctx.set_first_player(taker);
    ctx
}

/// South leads and wins every trick until one is left.
fn play_all_but_last(ctx: &mut DealContext) {
    for _ in 0..17 {
        assert_eq!(ctx.set_trick(deck("05-S;02-S;03-S;04-S")).unwrap(), Place::South);
    }
}

#[test]
fn highest_card_of_the_suit_led_wins() {
    let mut ctx = context(4, Place::South);
    // South, East, North, West
    assert_eq!(ctx.set_trick(deck("05-H;10-H;14-H;02-S")).unwrap(), Place::North);
    // North leads the next trick: North, West, South, East
    assert_eq!(ctx.trick_leader(1), Some(Place::North));
    assert_eq!(ctx.set_trick(deck("03-S;07-T;21-T;14-S")).unwrap(), Place::South);
    assert_eq!(ctx.winners(), &[Place::North, Place::South]);
    assert_eq!(ctx.tricks()[0].owner(), Some(Team::Defense));
    assert_eq!(ctx.tricks()[1].owner(), Some(Team::Attack));
    assert_eq!(ctx.tricks_won(), 1);
    assert_eq!(ctx.owner_of("21-T".parse().unwrap(), 1), Some(Place::South));
}

#[test]
fn defense_fool_stays_with_the_defense() {
    let mut ctx = context(4, Place::South);
    assert_eq!(ctx.set_trick(deck("21-T;00-T;02-H;03-H")).unwrap(), Place::South);
    let stats = ctx.stats_attack();
    // 9 + 9 + 1 + 1 half points, minus the Fool exchanged for a low card
    assert_eq!(stats.half_points, 12);
    assert_eq!(stats.oudlers, 1);
}

#[test]
fn attack_fool_stays_with_the_attack() {
    let mut ctx = context(4, Place::South);
    assert_eq!(ctx.set_trick(deck("00-T;05-T;21-T;02-T")).unwrap(), Place::North);
    let stats = ctx.stats_attack();
    assert_eq!(stats.half_points, 8);
    assert_eq!(stats.oudlers, 1);
    assert_eq!(ctx.tricks_won(), 0);
}

#[test]
fn partner_fool_is_not_exchanged_with_the_taker() {
    let mut ctx = context(5, Place::South);
    ctx.set_partner(Some(Place::North));
    // South, East, North (Fool), West, Fifth
    assert_eq!(ctx.set_trick(deck("21-T;02-H;00-T;03-H;04-H")).unwrap(), Place::South);
    let stats = ctx.stats_attack();
    assert_eq!(stats.half_points, 21);
    assert_eq!(stats.oudlers, 2);
}

#[test]
fn fool_led_at_the_last_trick_completes_a_slam() {
    let mut ctx = context(4, Place::South);
    play_all_but_last(&mut ctx);
    // the clubs would win, but the Fool takes the trick for the slam
    assert_eq!(ctx.set_trick(deck("00-T;02-C;03-C;04-C")).unwrap(), Place::South);
    assert_eq!(ctx.tricks_won(), 18);
    let points = ctx.analyze_game();
    assert!(points.slam_done);
    assert_eq!(points.slam_team, Some(Team::Attack));
}

#[test]
fn fool_of_the_losing_side_at_the_last_trick_changes_hands() {
    let mut ctx = context(4, Place::South);
    play_all_but_last(&mut ctx);
    assert_eq!(ctx.stats_attack().half_points, 68);
    // East plays the Fool, North wins for the defense
    assert_eq!(ctx.set_trick(deck("02-C;00-T;14-C;03-C")).unwrap(), Place::North);
    let stats = ctx.stats_attack();
    assert_eq!(stats.half_points, 76);
    assert_eq!(stats.oudlers, 1);
}

#[test]
fn defense_fool_won_by_the_attack_at_the_last_trick_is_kept() {
    let mut ctx = context(4, Place::South);
    for _ in 0..16 {
        assert_eq!(ctx.set_trick(deck("05-S;02-S;03-S;04-S")).unwrap(), Place::South);
    }
    // South, East, North, West: East takes the trick and leads the last one
    assert_eq!(ctx.set_trick(deck("02-H;14-H;03-H;04-H")).unwrap(), Place::East);
    let before = ctx.stats_attack().clone();
    assert_eq!(before.half_points, 64);
    assert_eq!(before.oudlers, 0);

    // East (Fool), North, West, South: the Big trump wins for the attack
    assert_eq!(ctx.set_trick(deck("00-T;02-C;03-C;21-T")).unwrap(), Place::South);
    let stats = ctx.stats_attack();
    // 9 + 1 + 1 + 9 half points, the Fool included
    assert_eq!(stats.half_points - before.half_points, 20);
    assert_eq!(stats.oudlers - before.oudlers, 2);
    assert_eq!(ctx.tricks_won(), 17);
    assert!(!ctx.analyze_game().slam_done);
}

#[test]
fn malformed_tricks_are_rejected() {
    let mut ctx = DealContext::new(4);
    assert_eq!(ctx.set_trick(deck("05-S;02-S;03-S;04-S")), Err(TrickError::NoLeader));

    let mut ctx = context(4, Place::South);
    assert_eq!(
        ctx.set_trick(deck("05-S;02-S;03-S")),
        Err(TrickError::Size { expected: 4, actual: 3 })
    );
    play_all_but_last(&mut ctx);
    ctx.set_trick(deck("05-S;02-S;03-S;04-S")).unwrap();
    assert_eq!(ctx.set_trick(deck("05-S;02-S;03-S;04-S")), Err(TrickError::DealFinished(18)));
}

#[test]
fn analysis_does_not_consume_the_context() {
    let mut ctx = context(4, Place::South);
    play_all_but_last(&mut ctx);
    ctx.set_trick(deck("01-T;02-C;03-C;04-C")).unwrap();
    let first = ctx.analyze_game();
    assert_eq!(first, ctx.analyze_game());
    assert_eq!(first.little_trump_owner, Some(Team::Attack));
}
