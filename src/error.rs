use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// A frame or inbound move that cannot be applied. Never fatal to the session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("{0} frame is missing its payload")]
    MissingPayload(&'static str),

    #[error("invalid cell index: {0:?}")]
    InvalidCell(String),

    #[error("cell {0} is already occupied")]
    CellOccupied(usize),

    #[error("move received while it is not the opponent's turn")]
    OutOfTurn,

    #[error("move received after the game ended")]
    GameOver,

    #[error("frame longer than {0} bytes discarded")]
    FrameTooLong(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Why a local move request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejected {
    #[error("it is not your turn")]
    NotYourTurn,

    #[error("cell {0} is already occupied")]
    Occupied(usize),

    #[error("cell {0} is off the board")]
    OutOfRange(usize),

    #[error("the game is over")]
    GameOver,
}

/// Failures while bringing the connection up.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to listen on {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("failed to accept a peer: {0}")]
    Accept(io::Error),

    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: SocketAddr, source: io::Error },
}

impl From<SessionError> for io::Error {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Bind { source, .. } | SessionError::Connect { source, .. } => source,
            SessionError::Accept(source) => source,
        }
    }
}
