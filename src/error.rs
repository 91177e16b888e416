use chess::Color;
use thiserror::Error;

/// Failures of a match transition. None of them is fatal: the session is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Illegal move!")]
    IllegalMove,

    #[error("It is {expected:?}'s turn")]
    NotYourTurn { expected: Color },

    #[error("No game in progress")]
    GameNotActive,

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Engine reply for a game that has since been replaced.
    #[error("stale engine response for session {got} (current {current})")]
    StaleResponse { got: u64, current: u64 },

    #[error("engine response carries no usable move")]
    UnparseableEngineResponse,

    #[error("clock already expired")]
    ClockAlreadyExpired,
}

impl MatchError {
    /// Whether the error should be shown to the player as a notice.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            MatchError::IllegalMove
                | MatchError::NotYourTurn { .. }
                | MatchError::GameNotActive
                | MatchError::InvalidConfig { .. }
        )
    }
}

/// Failures talking to the external engine process.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to spawn engine `{path}`: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error("engine process is gone")]
    Disconnected,

    #[error("no engine available")]
    Unavailable,
}

/// Failures reading the startup settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{key} must be a positive number of milliseconds, got `{value}`")]
    InvalidMillis { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_player_facing_errors_are_visible() {
        assert!(MatchError::IllegalMove.is_user_visible());
        assert!(MatchError::NotYourTurn { expected: Color::Black }.is_user_visible());
        assert!(!MatchError::StaleResponse { got: 1, current: 2 }.is_user_visible());
        assert!(!MatchError::UnparseableEngineResponse.is_user_visible());
        assert!(!MatchError::ClockAlreadyExpired.is_user_visible());
    }

    #[test]
    fn not_your_turn_names_the_side() {
        let err = MatchError::NotYourTurn { expected: Color::White };
        assert_eq!(err.to_string(), "It is White's turn");
    }
}
