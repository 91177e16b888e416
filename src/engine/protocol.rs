//! The slice of UCI spoken to the external engine.

use std::fmt;

use crate::game::rules::{parse_promotion, parse_square, MoveIntent};

/// Lowest and highest selectable difficulty.
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 8;

/// Token the engine answers with when it has no legal move.
const NO_MOVE: &str = "(none)";

/// Commands written to the engine's stdin, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    NewGame,
    Position { fen: String },
    GoDepth(u8),
    Quit,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Uci => write!(f, "uci"),
            EngineCommand::NewGame => write!(f, "ucinewgame"),
            EngineCommand::Position { fen } => write!(f, "position fen {}", fen),
            EngineCommand::GoDepth(depth) => write!(f, "go depth {}", depth),
            EngineCommand::Quit => write!(f, "quit"),
        }
    }
}

/// Search depth for a difficulty level: two plies per level.
pub fn depth_for_difficulty(difficulty: u8) -> u8 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY) * 2
}

/// Whether an output line is the engine's final answer to a search.
pub fn is_best_move_line(line: &str) -> bool {
    line.contains("bestmove")
}

/// Extract the suggested move from a `bestmove` line.
///
/// Returns `None` for lines without `bestmove`, for `(none)` and for tokens
/// that are not a 4 or 5 character coordinate move. A missing promotion
/// letter on a promoting move is left to the rules adapter, which picks a queen.
pub fn parse_best_move(line: &str) -> Option<MoveIntent> {
    let mut words = line.split_whitespace();
    words.find(|word| *word == "bestmove")?;
    let token = words.next()?;

    if token == NO_MOVE || !token.is_ascii() || !(4..=5).contains(&token.len()) {
        return None;
    }

    let from = parse_square(&token[0..2]).ok()?;
    let to = parse_square(&token[2..4]).ok()?;
    let promotion = match token.get(4..5) {
        Some(letter) => Some(parse_promotion(letter).ok()?),
        None => None,
    };
    Some(MoveIntent { from, to, promotion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Piece;

    #[test]
    fn depth_is_twice_the_difficulty() {
        assert_eq!(depth_for_difficulty(1), 2);
        assert_eq!(depth_for_difficulty(8), 16);
        assert_eq!(depth_for_difficulty(0), 2);
        assert_eq!(depth_for_difficulty(12), 16);
    }

    #[test]
    fn commands_render_as_uci() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string();
        assert_eq!(
            EngineCommand::Position { fen: fen.clone() }.to_string(),
            format!("position fen {}", fen)
        );
        assert_eq!(EngineCommand::GoDepth(6).to_string(), "go depth 6");
        assert_eq!(EngineCommand::NewGame.to_string(), "ucinewgame");
    }

    #[test]
    fn parses_plain_best_move() {
        let intent = parse_best_move("bestmove e2e4 ponder e7e5").unwrap();
        assert_eq!(intent, MoveIntent::parse("e2", "e4", None).unwrap());
    }

    #[test]
    fn parses_promotion_suffix() {
        let intent = parse_best_move("bestmove a7a8n").unwrap();
        assert_eq!(intent.promotion, Some(Piece::Knight));
    }

    #[test]
    fn ignores_unusable_answers() {
        assert_eq!(parse_best_move("bestmove (none)"), None);
        assert_eq!(parse_best_move("bestmove"), None);
        assert_eq!(parse_best_move("info depth 3 score cp 20 pv e2e4"), None);
        assert_eq!(parse_best_move("bestmove e2"), None);
        assert_eq!(parse_best_move("bestmove e2e4qq"), None);
        assert_eq!(parse_best_move("bestmove z9e4"), None);
        assert_eq!(parse_best_move("bestmove e7e8k"), None);
    }

    #[test]
    fn recognises_best_move_lines() {
        assert!(is_best_move_line("bestmove e2e4"));
        assert!(!is_best_move_line("readyok"));
    }
}
