use std::sync::{Mutex, PoisonError};

use crate::game::rating::RatingState;
use crate::settings::Settings;

/// Application state shared between connections
pub struct AppState {
    pub settings: Settings,
    /// Ratings live for the whole process and carry over from game to game.
    ratings: Mutex<RatingState>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ratings: Mutex::new(RatingState::default()),
        }
    }

    pub fn ratings(&self) -> RatingState {
        *self.ratings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a transition that may update the ratings.
    pub fn with_ratings<T>(&self, f: impl FnOnce(&mut RatingState) -> T) -> T {
        let mut ratings = self.ratings.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rating;
    use chess::Color;

    #[test]
    fn ratings_start_at_baseline_and_persist() {
        let state = AppState::new(Settings::default());
        assert_eq!(state.ratings(), RatingState::default());

        state.with_ratings(|ratings| *ratings = rating::update(*ratings, Some(Color::White)));
        state.with_ratings(|ratings| *ratings = rating::update(*ratings, None));
        assert_eq!(state.ratings().white, 1216.0);
        assert_eq!(state.ratings().black, 1184.0);
    }
}
