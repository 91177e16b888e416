use serde::{Deserialize, Serialize};

use crate::game::clock::ClockState;
use crate::game::rating::RatingState;
use crate::game::session::{HumanColor, MatchConfig, MatchStatus, Mode, SessionSnapshot};
use crate::game::utils::color_to_string;

/// Message sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ClientMessage {
    pub message_type: String,
    pub mode: Option<Mode>,
    pub difficulty: Option<u8>,
    pub minutes: Option<u32>,
    pub human_color: Option<HumanColor>,
    pub move_from: Option<String>,
    pub move_to: Option<String>,
    pub promote_to: Option<String>,
    pub square: Option<String>,
}

impl ClientMessage {
    /// Settings named in a `configure` message, the rest taken from `current`.
    pub fn config_over(&self, current: &MatchConfig) -> MatchConfig {
        MatchConfig {
            mode: self.mode.unwrap_or(current.mode),
            engine_difficulty: self.difficulty.unwrap_or(current.engine_difficulty),
            initial_minutes_per_side: self.minutes.unwrap_or(current.initial_minutes_per_side),
            human_color: self.human_color.unwrap_or(current.human_color),
        }
    }
}

/// One entry of the move list
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub notation: String,
    pub color: String,
}

/// Message sent from server to client
#[derive(Serialize, Debug, Clone)]
pub struct ServerMessage {
    pub message_type: String,
    pub session_id: Option<u64>,
    pub fen: Option<String>,
    pub turn: Option<String>,
    pub white_time: Option<u32>,
    pub black_time: Option<u32>,
    pub history: Option<Vec<HistoryEntry>>,
    pub status: Option<MatchStatus>,
    pub message: Option<String>,
    pub mode: Option<Mode>,
    pub human_color: Option<String>,
    pub ratings: Option<RatingState>,
    pub available_moves: Option<Vec<String>>,
    pub error: Option<String>,
}

impl ServerMessage {
    fn empty(message_type: &str) -> Self {
        Self {
            message_type: message_type.to_string(),
            session_id: None,
            fen: None,
            turn: None,
            white_time: None,
            black_time: None,
            history: None,
            status: None,
            message: None,
            mode: None,
            human_color: None,
            ratings: None,
            available_moves: None,
            error: None,
        }
    }

    /// Full state of the match, pushed after every transition.
    pub fn state(snapshot: &SessionSnapshot, ratings: RatingState) -> Self {
        let ClockState { white, black } = snapshot.clock;
        Self {
            session_id: Some(snapshot.session_id),
            fen: Some(snapshot.fen.clone()),
            turn: Some(color_to_string(snapshot.turn)),
            white_time: Some(white),
            black_time: Some(black),
            history: Some(
                snapshot
                    .history
                    .iter()
                    .map(|record| HistoryEntry {
                        notation: record.notation.clone(),
                        color: color_to_string(record.color_moved),
                    })
                    .collect(),
            ),
            status: Some(snapshot.status),
            message: Some(snapshot.message.clone()),
            mode: Some(snapshot.mode),
            human_color: snapshot.human_color.map(color_to_string),
            ratings: Some(ratings),
            ..Self::empty("state")
        }
    }

    pub fn available_moves(session_id: u64, moves: Vec<String>) -> Self {
        Self {
            session_id: Some(session_id),
            available_moves: Some(moves),
            ..Self::empty("available_moves")
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty("error")
        }
    }
}
