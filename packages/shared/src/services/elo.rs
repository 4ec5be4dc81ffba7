//! Rating updates. Standard logistic expected-score model, K = 32,
//! results rounded half-away-from-zero.

const K_FACTOR: f64 = 32.0;

/// Computes both sides' new ratings from one finished game. Argument order
/// carries meaning: the first rating is the winner's (either side's on a
/// draw, where the roles are symmetric).
pub fn update(winner_elo: i32, loser_elo: i32, draw: bool) -> (i32, i32) {
    let expected_winner = 1.0 / (1.0 + 10f64.powf((loser_elo - winner_elo) as f64 / 400.0));
    let expected_loser = 1.0 - expected_winner;

    let (scored_winner, scored_loser) = if draw { (0.5, 0.5) } else { (1.0, 0.0) };

    let new_winner = winner_elo as f64 + K_FACTOR * (scored_winner - expected_winner);
    let new_loser = loser_elo as f64 + K_FACTOR * (scored_loser - expected_loser);

    (new_winner.round() as i32, new_loser.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ratings_decisive_moves_exactly_sixteen() {
        let (winner, loser) = update(1200, 1200, false);
        assert_eq!(winner, 1216);
        assert_eq!(loser, 1184);
    }

    #[test]
    fn test_equal_ratings_draw_is_unchanged() {
        let (a, b) = update(1200, 1200, true);
        assert_eq!(a, 1200);
        assert_eq!(b, 1200);
    }

    #[test]
    fn test_winner_always_gains_loser_always_loses() {
        for (w, l) in [(1200, 1400), (1400, 1200), (800, 2200), (2200, 800)] {
            let (new_w, new_l) = update(w, l, false);
            assert!(new_w > w, "winner at {} vs {} did not gain", w, l);
            assert!(new_l < l, "loser at {} vs {} did not lose", l, w);
        }
    }

    #[test]
    fn test_upset_pays_more_than_expected_win() {
        // Underdog beating a stronger player moves further than the
        // favorite beating a weaker one.
        let (underdog, _) = update(1200, 1400, false);
        let (favorite, _) = update(1400, 1200, false);
        assert!(underdog - 1200 > favorite - 1400);
    }

    #[test]
    fn test_draw_moves_toward_each_other() {
        let (lower, higher) = update(1200, 1400, true);
        assert!(lower > 1200);
        assert!(higher < 1400);
        // Symmetric: the same pair in the other argument order mirrors.
        let (higher2, lower2) = update(1400, 1200, true);
        assert_eq!(lower, lower2);
        assert_eq!(higher, higher2);
    }

    #[test]
    fn test_pure_and_deterministic() {
        assert_eq!(update(1337, 1205, false), update(1337, 1205, false));
        assert_eq!(update(1337, 1205, true), update(1337, 1205, true));
    }

    #[test]
    fn test_role_order_matters() {
        // Winner/loser roles are positional, not inferred from values.
        let (a_wins_a, a_wins_b) = update(1100, 1500, false);
        let (b_wins_b, b_wins_a) = update(1500, 1100, false);
        assert!(a_wins_a > 1100 && a_wins_b < 1500);
        assert!(b_wins_b > 1500 && b_wins_a < 1100);
        assert_ne!((a_wins_a, a_wins_b), (b_wins_a, b_wins_b));
    }
}
