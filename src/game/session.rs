//! The match state machine.
//!
//! A [`MatchSession`] owns the position, the clocks and the move history of
//! one game at a time. It never schedules anything itself: every operation
//! returns a [`Transition`] telling the driver whether the engine has to be
//! asked for a move or whether the game just ended.

use chess::{Color, Square};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::protocol::{parse_best_move, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::error::MatchError;
use crate::game::clock::{ClockState, TickOutcome};
use crate::game::rating::{self, RatingState};
use crate::game::rules::{self, Classification, DrawReason, MoveIntent, Position};

/// Generation counter distinguishing successive games.
pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Pvp,
    Pve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumanColor {
    White,
    Black,
    Random,
}

/// Settings for the next game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub mode: Mode,
    pub engine_difficulty: u8,
    pub initial_minutes_per_side: u32,
    pub human_color: HumanColor,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Pvp,
            engine_difficulty: 1,
            initial_minutes_per_side: 5,
            human_color: HumanColor::Random,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.engine_difficulty) {
            return Err(MatchError::InvalidConfig {
                reason: format!(
                    "difficulty must be between {} and {}, got {}",
                    MIN_DIFFICULTY, MAX_DIFFICULTY, self.engine_difficulty
                ),
            });
        }
        if self.initial_minutes_per_side.checked_mul(60).is_none() {
            return Err(MatchError::InvalidConfig {
                reason: format!("{} minutes is too long", self.initial_minutes_per_side),
            });
        }
        Ok(())
    }

    fn seconds_per_side(&self) -> u32 {
        self.initial_minutes_per_side.saturating_mul(60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Idle,
    InProgress,
    Checkmate,
    Draw,
    Timeout,
}

/// Who submitted a move intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Human,
    Engine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub notation: String,
    pub color_moved: Color,
}

/// What the driver has to do after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue { engine_to_move: bool },
    /// The game ended; `winner` is `None` for draws.
    Finished {
        status: MatchStatus,
        winner: Option<Color>,
    },
}

impl Transition {
    pub fn engine_to_move(&self) -> bool {
        matches!(self, Transition::Continue { engine_to_move: true })
    }
}

/// Read-only view of a session for the control surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub fen: String,
    pub turn: Color,
    pub clock: ClockState,
    pub history: Vec<MoveRecord>,
    pub status: MatchStatus,
    pub message: String,
    pub mode: Mode,
    pub human_color: Option<Color>,
}

pub struct MatchSession {
    session_id: SessionId,
    pending_config: MatchConfig,
    active_config: MatchConfig,
    position: Position,
    turn: Color,
    history: Vec<MoveRecord>,
    status: MatchStatus,
    clock: ClockState,
    human_color: Color,
    message: String,
}

impl Default for MatchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchSession {
    pub fn new() -> Self {
        let config = MatchConfig::default();
        Self {
            session_id: 0,
            pending_config: config,
            active_config: config,
            position: Position::new(),
            turn: Color::White,
            history: Vec::new(),
            status: MatchStatus::Idle,
            clock: ClockState::new(config.seconds_per_side()),
            human_color: Color::White,
            message: String::new(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn active_config(&self) -> &MatchConfig {
        &self.active_config
    }

    pub fn pending_config(&self) -> &MatchConfig {
        &self.pending_config
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == MatchStatus::InProgress
    }

    /// The engine's color in a game against the engine.
    pub fn engine_color(&self) -> Option<Color> {
        match self.active_config.mode {
            Mode::Pve => Some(!self.human_color),
            Mode::Pvp => None,
        }
    }

    pub fn is_engine_turn(&self) -> bool {
        self.is_in_progress() && self.engine_color() == Some(self.turn)
    }

    /// Store the settings for the next `start`; a running game is unaffected.
    pub fn configure(&mut self, config: MatchConfig) -> Result<(), MatchError> {
        config.validate()?;
        self.pending_config = config;
        Ok(())
    }

    /// Start a fresh game from any state.
    pub fn start(&mut self) -> Transition {
        self.start_with_rng(&mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng>(&mut self, rng: &mut R) -> Transition {
        let config = self.pending_config;
        self.session_id += 1;
        self.active_config = config;
        self.position = Position::new();
        self.turn = Color::White;
        self.history.clear();
        self.clock = ClockState::new(config.seconds_per_side());
        self.status = MatchStatus::InProgress;
        self.message.clear();
        self.human_color = match config.human_color {
            HumanColor::White => Color::White,
            HumanColor::Black => Color::Black,
            HumanColor::Random if rng.gen_bool(0.5) => Color::White,
            HumanColor::Random => Color::Black,
        };

        info!(
            "Session {} started: {:?}, {} minutes, human plays {:?}",
            self.session_id, config.mode, config.initial_minutes_per_side, self.human_color
        );

        Transition::Continue {
            engine_to_move: self.is_engine_turn(),
        }
    }

    /// Validate and apply a move intent.
    ///
    /// A side already out of time ends the game as a timeout before the move
    /// is looked at; the returned transition is then `Finished` and the move
    /// is not applied.
    pub fn submit_move(
        &mut self,
        intent: MoveIntent,
        source: MoveSource,
        ratings: &mut RatingState,
    ) -> Result<Transition, MatchError> {
        if !self.is_in_progress() {
            return Err(self.refuse(MatchError::GameNotActive, source));
        }

        let expected_source = if self.is_engine_turn() {
            MoveSource::Engine
        } else {
            MoveSource::Human
        };
        if source != expected_source {
            let err = MatchError::NotYourTurn {
                expected: self.turn,
            };
            return Err(self.refuse(err, source));
        }

        if let Some(loser) = self.clock.expired_side() {
            return Ok(self.time_out(loser, ratings));
        }

        let result = match rules::apply_move(&self.position, intent.from, intent.to, intent.promotion)
        {
            Ok(result) => result,
            Err(rejected) => return Err(self.refuse(MatchError::from(rejected), source)),
        };

        let mover = self.turn;
        self.position = result.position;
        self.history.push(MoveRecord {
            notation: result.notation,
            color_moved: mover,
        });
        self.turn = !mover;
        debug!(
            "Session {}: {:?} played {}",
            self.session_id,
            mover,
            self.history.last().map(|m| m.notation.as_str()).unwrap_or_default()
        );

        let transition = match rules::classify(&self.position) {
            Classification::Checkmate => self.finish(
                MatchStatus::Checkmate,
                Some(mover),
                "Checkmate! The game is over.",
                ratings,
            ),
            Classification::Stalemate => self.finish(
                MatchStatus::Draw,
                None,
                "Stalemate! The game ended in a draw.",
                ratings,
            ),
            Classification::Draw(reason) => {
                let message = match reason {
                    DrawReason::ThreefoldRepetition => "Draw by threefold repetition!",
                    DrawReason::FiftyMoveRule => "Draw by the fifty-move rule!",
                    DrawReason::InsufficientMaterial => "Draw by insufficient material!",
                };
                self.finish(MatchStatus::Draw, None, message, ratings)
            }
            Classification::Check => {
                self.message = "Check!".to_string();
                Transition::Continue {
                    engine_to_move: self.is_engine_turn(),
                }
            }
            Classification::Normal => {
                self.message.clear();
                Transition::Continue {
                    engine_to_move: self.is_engine_turn(),
                }
            }
        };
        Ok(transition)
    }

    /// One second of the side to move's clock.
    pub fn tick(&mut self, ratings: &mut RatingState) -> Result<Transition, MatchError> {
        match self.status {
            MatchStatus::InProgress => {}
            MatchStatus::Timeout => return Err(MatchError::ClockAlreadyExpired),
            _ => return Err(MatchError::GameNotActive),
        }

        match self.clock.tick(self.turn) {
            TickOutcome::Running => Ok(Transition::Continue {
                engine_to_move: false,
            }),
            TickOutcome::Expired(loser) => Ok(self.time_out(loser, ratings)),
        }
    }

    /// Handle a raw `bestmove` line from the engine for game `session_id`.
    pub fn on_engine_response(
        &mut self,
        raw: &str,
        session_id: SessionId,
        ratings: &mut RatingState,
    ) -> Result<Transition, MatchError> {
        if session_id != self.session_id {
            return Err(MatchError::StaleResponse {
                got: session_id,
                current: self.session_id,
            });
        }
        let intent = parse_best_move(raw).ok_or(MatchError::UnparseableEngineResponse)?;
        self.submit_move(intent, MoveSource::Engine, ratings)
    }

    /// Legal targets for the piece on `square`, empty outside a running game.
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        if !self.is_in_progress() {
            return Vec::new();
        }
        rules::legal_destinations(&self.position, square)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            fen: self.position.fen(),
            turn: self.turn,
            clock: self.clock,
            history: self.history.clone(),
            status: self.status,
            message: self.message.clone(),
            mode: self.active_config.mode,
            human_color: match self.status {
                MatchStatus::Idle => None,
                _ => Some(self.human_color),
            },
        }
    }

    /// Show a refused player move as the notice. A finished game keeps the
    /// notice saying how it ended.
    fn refuse(&mut self, err: MatchError, source: MoveSource) -> MatchError {
        let finished = !matches!(self.status, MatchStatus::Idle | MatchStatus::InProgress);
        if source == MoveSource::Human && !finished {
            self.message = err.to_string();
        }
        err
    }

    fn time_out(&mut self, loser: Color, ratings: &mut RatingState) -> Transition {
        self.finish(
            MatchStatus::Timeout,
            Some(!loser),
            "Time's up! The game is over.",
            ratings,
        )
    }

    fn finish(
        &mut self,
        status: MatchStatus,
        winner: Option<Color>,
        message: &str,
        ratings: &mut RatingState,
    ) -> Transition {
        self.status = status;
        self.message = message.to_string();
        *ratings = rating::update(*ratings, winner);
        info!(
            "Session {} finished: {:?}, winner {:?}, ratings {:.1}/{:.1}",
            self.session_id, status, winner, ratings.white, ratings.black
        );
        Transition::Finished { status, winner }
    }
}
