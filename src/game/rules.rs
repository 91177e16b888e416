//! Adapter over the `chess` crate.
//!
//! The rest of the match only ever sees [`Position`], [`MoveResult`] and
//! [`Classification`]; board representation and legality live here.

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Rank, Square};
use std::str::FromStr;
use thiserror::Error;

use crate::error::MatchError;
use crate::game::utils::has_insufficient_material;

/// Half-moves without a capture or pawn move after which the game is drawn.
const FIFTY_MOVE_PLIES: u32 = 100;

/// The rules engine did not accept the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("move rejected by the rules engine")]
pub struct Rejected;

impl From<Rejected> for MatchError {
    fn from(_: Rejected) -> Self {
        MatchError::IllegalMove
    }
}

/// Why a position is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    ThreefoldRepetition,
    FiftyMoveRule,
    InsufficientMaterial,
}

/// Game-end relevant classification of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Normal,
    Check,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

/// A board together with the bookkeeping FEN and draw rules need.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// Hashes of every position since the last irreversible move, current one included.
    reversible_hashes: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::from_board(Board::default())
    }
}

impl Position {
    /// The standard starting layout.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            reversible_hashes: vec![board.get_hash()],
            board,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Build a position from a full FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, Rejected> {
        let board = Board::from_str(fen).map_err(|_| Rejected)?;
        let mut fields = fen.split_whitespace().skip(4);
        let halfmove_clock = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
        let fullmove_number = fields.next().and_then(|f| f.parse().ok()).unwrap_or(1);
        Ok(Self {
            halfmove_clock,
            fullmove_number,
            ..Self::from_board(board)
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// FEN with the real half-move clock and full-move number.
    pub fn fen(&self) -> String {
        let board_fen = self.board.to_string();
        let placement: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.reversible_hashes
            .iter()
            .filter(|&&hash| hash == current)
            .count()
    }
}

/// An accepted move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    pub position: Position,
    /// Standard algebraic notation, e.g. `Nxe5+`.
    pub notation: String,
}

/// Parse a square name such as `e4`.
pub fn parse_square(name: &str) -> Result<Square, Rejected> {
    Square::from_str(name.trim()).map_err(|_| Rejected)
}

/// Parse a promotion letter (`q`, `r`, `b`, `n`, either case).
pub fn parse_promotion(letter: &str) -> Result<Piece, Rejected> {
    match letter.trim().to_ascii_lowercase().as_str() {
        "q" => Ok(Piece::Queen),
        "r" => Ok(Piece::Rook),
        "b" => Ok(Piece::Bishop),
        "n" => Ok(Piece::Knight),
        _ => Err(Rejected),
    }
}

/// A request to move a piece, from a player or from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl MoveIntent {
    pub fn parse(from: &str, to: &str, promotion: Option<&str>) -> Result<Self, Rejected> {
        Ok(Self {
            from: parse_square(from)?,
            to: parse_square(to)?,
            promotion: promotion
                .filter(|letter| !letter.trim().is_empty())
                .map(parse_promotion)
                .transpose()?,
        })
    }
}

/// Apply a move, promoting to a queen unless the hint says otherwise.
pub fn apply_move(
    position: &Position,
    from: Square,
    to: Square,
    promotion_hint: Option<Piece>,
) -> Result<MoveResult, Rejected> {
    let board = &position.board;
    let piece = board.piece_on(from).ok_or(Rejected)?;

    let promotion = if piece == Piece::Pawn && to.get_rank() == last_rank(board.side_to_move()) {
        Some(promotion_hint.unwrap_or(Piece::Queen))
    } else {
        None
    };

    let chess_move = ChessMove::new(from, to, promotion);
    if !board.legal(chess_move) {
        return Err(Rejected);
    }

    let next_board = board.make_move_new(chess_move);
    let notation = san(board, chess_move, &next_board);

    let irreversible = piece == Piece::Pawn || is_capture(board, chess_move);
    let halfmove_clock = if irreversible {
        0
    } else {
        position.halfmove_clock + 1
    };
    let fullmove_number = match board.side_to_move() {
        Color::Black => position.fullmove_number + 1,
        Color::White => position.fullmove_number,
    };
    let mut reversible_hashes = if irreversible {
        Vec::new()
    } else {
        position.reversible_hashes.clone()
    };
    reversible_hashes.push(next_board.get_hash());

    Ok(MoveResult {
        position: Position {
            board: next_board,
            halfmove_clock,
            fullmove_number,
            reversible_hashes,
        },
        notation,
    })
}

/// Classify a position after a move.
pub fn classify(position: &Position) -> Classification {
    let board = &position.board;
    match board.status() {
        BoardStatus::Checkmate => return Classification::Checkmate,
        BoardStatus::Stalemate => return Classification::Stalemate,
        BoardStatus::Ongoing => {}
    }

    if position.repetitions() >= 3 {
        Classification::Draw(DrawReason::ThreefoldRepetition)
    } else if position.halfmove_clock >= FIFTY_MOVE_PLIES {
        Classification::Draw(DrawReason::FiftyMoveRule)
    } else if has_insufficient_material(board) {
        Classification::Draw(DrawReason::InsufficientMaterial)
    } else if board.checkers().popcnt() > 0 {
        Classification::Check
    } else {
        Classification::Normal
    }
}

/// Legal destination squares for the piece standing on `from`.
pub fn legal_destinations(position: &Position, from: Square) -> Vec<Square> {
    let mut destinations: Vec<Square> = MoveGen::new_legal(&position.board)
        .filter(|m| m.get_source() == from)
        .map(|m| m.get_dest())
        .collect();
    // Promotions yield one move per piece
    destinations.dedup();
    destinations
}

fn last_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    }
}

fn is_capture(board: &Board, chess_move: ChessMove) -> bool {
    let from = chess_move.get_source();
    let to = chess_move.get_dest();
    board.piece_on(to).is_some()
        || (board.piece_on(from) == Some(Piece::Pawn) && from.get_file() != to.get_file())
}

fn piece_letter(piece: Piece) -> &'static str {
    match piece {
        Piece::King => "K",
        Piece::Queen => "Q",
        Piece::Rook => "R",
        Piece::Bishop => "B",
        Piece::Knight => "N",
        Piece::Pawn => "",
    }
}

fn file_char(square: Square) -> char {
    (b'a' + square.get_file().to_index() as u8) as char
}

fn rank_char(square: Square) -> char {
    (b'1' + square.get_rank().to_index() as u8) as char
}

fn san(before: &Board, chess_move: ChessMove, after: &Board) -> String {
    let from = chess_move.get_source();
    let to = chess_move.get_dest();
    let piece = before.piece_on(from).unwrap_or(Piece::Pawn);

    let mut notation = String::new();
    let file_delta = to.get_file().to_index() as i32 - from.get_file().to_index() as i32;

    if piece == Piece::King && file_delta.abs() == 2 {
        notation.push_str(if file_delta > 0 { "O-O" } else { "O-O-O" });
    } else {
        let capture = is_capture(before, chess_move);
        if piece == Piece::Pawn {
            if capture {
                notation.push(file_char(from));
            }
        } else {
            notation.push_str(piece_letter(piece));
            notation.push_str(&disambiguation(before, piece, from, to));
        }
        if capture {
            notation.push('x');
        }
        notation.push_str(&to.to_string());
        if let Some(promoted) = chess_move.get_promotion() {
            notation.push('=');
            notation.push_str(piece_letter(promoted));
        }
    }

    if after.status() == BoardStatus::Checkmate {
        notation.push('#');
    } else if after.checkers().popcnt() > 0 {
        notation.push('+');
    }
    notation
}

fn disambiguation(board: &Board, piece: Piece, from: Square, to: Square) -> String {
    let rivals: Vec<Square> = MoveGen::new_legal(board)
        .filter(|m| m.get_dest() == to && m.get_source() != from)
        .map(|m| m.get_source())
        .filter(|&source| board.piece_on(source) == Some(piece))
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|r| r.get_file() != from.get_file()) {
        file_char(from).to_string()
    } else if rivals.iter().all(|r| r.get_rank() != from.get_rank()) {
        rank_char(from).to_string()
    } else {
        format!("{}{}", file_char(from), rank_char(from))
    }
}
