use chess::{Board, Color, Piece, Square};

/// Convert a chess color to a string
pub fn color_to_string(color: Color) -> String {
    match color {
        Color::White => "white".to_string(),
        Color::Black => "black".to_string(),
    }
}

/// Check if the board has insufficient material for checkmate
pub fn has_insufficient_material(board: &Board) -> bool {
    #[derive(Default)]
    struct Side {
        minors: u32,
        bishops_on_light: u32,
        bishops_on_dark: u32,
        heavy_or_pawn: u32,
    }

    let mut white = Side::default();
    let mut black = Side::default();

    for square in *board.combined() {
        let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) else {
            continue;
        };
        let side = match color {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        match piece {
            Piece::King => {}
            Piece::Knight => side.minors += 1,
            Piece::Bishop => {
                side.minors += 1;
                if is_light_square(square) {
                    side.bishops_on_light += 1;
                } else {
                    side.bishops_on_dark += 1;
                }
            }
            Piece::Pawn | Piece::Rook | Piece::Queen => side.heavy_or_pawn += 1,
        }
    }

    if white.heavy_or_pawn > 0 || black.heavy_or_pawn > 0 {
        return false;
    }

    match (white.minors, black.minors) {
        // King vs King, King and minor vs King
        (0, 0) | (1, 0) | (0, 1) => true,
        // King and Bishop vs King and Bishop, bishops on the same color
        (1, 1) => {
            let white_bishop = white.bishops_on_light + white.bishops_on_dark == 1;
            let black_bishop = black.bishops_on_light + black.bishops_on_dark == 1;
            white_bishop
                && black_bishop
                && white.bishops_on_light == black.bishops_on_light
        }
        _ => false,
    }
}

fn is_light_square(square: Square) -> bool {
    (square.get_rank().to_index() + square.get_file().to_index()) % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn board(fen: &str) -> Board {
        Board::from_str(fen).expect("valid fen")
    }

    #[test]
    fn bare_kings_are_insufficient() {
        assert!(has_insufficient_material(&board("8/8/4k3/8/8/3K4/8/8 w - - 0 1")));
    }

    #[test]
    fn single_minor_is_insufficient() {
        assert!(has_insufficient_material(&board("8/8/4k3/8/8/3K4/5N2/8 w - - 0 1")));
        assert!(has_insufficient_material(&board("8/8/4k3/8/8/3K4/5B2/8 w - - 0 1")));
    }

    #[test]
    fn same_colored_bishops_are_insufficient() {
        // c1 and f8 are both dark squares
        assert!(has_insufficient_material(&board("5b2/8/4k3/8/8/3K4/8/2B5 w - - 0 1")));
        // c1 dark, c8 light
        assert!(!has_insufficient_material(&board("2b5/8/4k3/8/8/3K4/8/2B5 w - - 0 1")));
    }

    #[test]
    fn rook_or_pawn_is_sufficient() {
        assert!(!has_insufficient_material(&board("8/8/4k3/8/8/3K4/5R2/8 w - - 0 1")));
        assert!(!has_insufficient_material(&board("8/8/4k3/8/8/3K4/5P2/8 w - - 0 1")));
        assert!(!has_insufficient_material(&Board::default()));
    }
}
