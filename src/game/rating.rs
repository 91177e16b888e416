use chess::Color;
use serde::Serialize;

/// Rating every side starts from when the process starts.
pub const BASELINE_RATING: f64 = 1200.0;

/// Elo K-factor.
pub const K_FACTOR: f64 = 32.0;

/// Elo ratings of the two sides, carried from one game to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingState {
    pub white: f64,
    pub black: f64,
}

impl Default for RatingState {
    fn default() -> Self {
        Self {
            white: BASELINE_RATING,
            black: BASELINE_RATING,
        }
    }
}

/// Expected score of a player rated `rating` against `opponent`.
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10_f64.powf((opponent - rating) / 400.0))
}

/// Ratings after a game. Draws (`None`) leave both ratings untouched.
pub fn update(ratings: RatingState, winner: Option<Color>) -> RatingState {
    let Some(winner) = winner else {
        return ratings;
    };

    let (white_score, black_score) = match winner {
        Color::White => (1.0, 0.0),
        Color::Black => (0.0, 1.0),
    };
    let expected_white = expected_score(ratings.white, ratings.black);
    let expected_black = expected_score(ratings.black, ratings.white);

    RatingState {
        white: ratings.white + K_FACTOR * (white_score - expected_white),
        black: ratings.black + K_FACTOR * (black_score - expected_black),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_game_moves_sixteen_points() {
        let ratings = update(RatingState::default(), Some(Color::White));
        assert_eq!(ratings.white, 1216.0);
        assert_eq!(ratings.black, 1184.0);

        let ratings = update(RatingState::default(), Some(Color::Black));
        assert_eq!(ratings.white, 1184.0);
        assert_eq!(ratings.black, 1216.0);
    }

    #[test]
    fn draw_changes_nothing() {
        let ratings = RatingState {
            white: 1350.0,
            black: 1100.0,
        };
        assert_eq!(update(ratings, None), ratings);
    }

    #[test]
    fn upset_is_worth_more() {
        let ratings = RatingState {
            white: 1000.0,
            black: 1400.0,
        };
        let after = update(ratings, Some(Color::White));
        let gain = after.white - ratings.white;
        assert!(gain > 16.0 && gain < 32.0);
        assert!((after.black - ratings.black + gain).abs() < 1e-9);
    }

    #[test]
    fn ratings_are_unbounded() {
        let mut ratings = RatingState {
            white: 5.0,
            black: 3000.0,
        };
        for _ in 0..10 {
            ratings = update(ratings, Some(Color::Black));
        }
        assert!(ratings.white < 5.0);
    }
}
