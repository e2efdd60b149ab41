//! Board and turn state machine, free of any I/O.

pub mod board;
pub mod state;

pub use board::{Board, Symbol, CELL_COUNT, WIN_LINES};
pub use state::{GameState, Peer, Phase, Role, Turn};
