//! Player-count dependent tables of the game.

/// Number of cards in a full Tarot deck.
pub const DECK_SIZE: usize = 78;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerCountError {
    #[error("unsupported number of players: {0} (expected 3, 4 or 5)")]
    Unsupported(u8),
}

pub fn check_player_count(nb_players: u8) -> Result<u8, PlayerCountError> {
    match nb_players {
        3..=5 => Ok(nb_players),
        n => Err(PlayerCountError::Unsupported(n)),
    }
}

/// Cards dealt to each player, which is also the number of tricks of a deal.
pub const fn cards_in_hand(nb_players: u8) -> usize {
    match nb_players {
        3 => 24,
        5 => 15,
        _ => 18,
    }
}

pub const fn dog_cards(nb_players: u8) -> usize {
    DECK_SIZE - cards_in_hand(nb_players) * nb_players as usize
}

/// `trick_counter` counts completed tricks.
pub const fn is_deal_finished(trick_counter: usize, nb_players: u8) -> bool {
    trick_counter >= cards_in_hand(nb_players)
}

/// Points the attack must reach for a given number of oudlers.
pub const fn points_to_do(oudlers: u8) -> i32 {
    match oudlers {
        0 => 56,
        1 => 51,
        2 => 41,
        _ => 36,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_covers_the_deck() {
        for n in 3u8..=5 {
            assert_eq!(cards_in_hand(n) * n as usize + dog_cards(n), DECK_SIZE);
        }
        assert_eq!(dog_cards(3), 6);
        assert_eq!(dog_cards(4), 6);
        assert_eq!(dog_cards(5), 3);
    }

    #[test]
    fn thresholds() {
        assert_eq!(points_to_do(0), 56);
        assert_eq!(points_to_do(1), 51);
        assert_eq!(points_to_do(2), 41);
        assert_eq!(points_to_do(3), 36);
    }

    #[test]
    fn player_count_validation() {
        assert!(check_player_count(2).is_err());
        assert_eq!(check_player_count(4), Ok(4));
        assert!(check_player_count(6).is_err());
        assert!(is_deal_finished(18, 4));
        assert!(!is_deal_finished(17, 4));
    }
}
