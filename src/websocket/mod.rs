mod game_handlers;
pub mod handler;
pub mod timers;

pub use handler::{ws_index, ChessWebSocket};
