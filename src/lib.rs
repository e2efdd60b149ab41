//! Two-player tic-tac-toe over a single TCP connection.
//!
//! Each process runs one [`session::GameSession`] actor that owns its copy of
//! the game and keeps it in step with the opponent through the line protocol
//! in [`protocol`]. A browser UI served by [`routes`] observes the session
//! and forwards clicks to it.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod protocol;
pub mod routes;
pub mod session;
pub mod transport;
pub mod websocket;
