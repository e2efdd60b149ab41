use clap::ValueEnum;
use serde::Serialize;

use crate::error::{MoveRejected, ProtocolError};
use crate::game::board::{Board, Symbol};

/// Which end of the connection this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Listens, accepts once, and plays first.
    Host,
    /// Connects once and plays second.
    Guest,
}

impl Role {
    pub fn symbol(self) -> Symbol {
        match self {
            Role::Host => Symbol::A,
            Role::Guest => Symbol::B,
        }
    }

    pub fn opening_turn(self) -> Turn {
        match self {
            Role::Host => Turn::Mine,
            Role::Guest => Turn::Theirs,
        }
    }

    /// Label used for this side before a name is known.
    pub fn label(self) -> &'static str {
        match self {
            Role::Host => "Server",
            Role::Guest => "Client",
        }
    }

    pub fn opponent(self) -> Role {
        match self {
            Role::Host => Role::Guest,
            Role::Guest => Role::Host,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Mine,
    Theirs,
}

impl Turn {
    pub fn flip(self) -> Turn {
        match self {
            Turn::Mine => Turn::Theirs,
            Turn::Theirs => Turn::Mine,
        }
    }
}

/// One side of the game, relative to this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Peer {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    InProgress,
    Won { winner: Peer },
    Draw,
    TimedOut { loser: Peer },
    Aborted,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::InProgress)
    }
}

/// Board, turn flag and phase for one game. Replaced wholesale on reset.
#[derive(Debug, Clone)]
pub struct GameState {
    role: Role,
    board: Board,
    turn: Turn,
    phase: Phase,
}

impl GameState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            board: Board::new(),
            turn: role.opening_turn(),
            phase: Phase::InProgress,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase == Phase::InProgress && self.turn == Turn::Mine
    }

    pub fn reset(&mut self) {
        *self = GameState::new(self.role);
    }

    /// Places our mark. Returns the terminal phase if this move ended the game.
    pub fn apply_local_move(&mut self, cell: usize) -> Result<Option<Phase>, MoveRejected> {
        if self.phase.is_terminal() {
            return Err(MoveRejected::GameOver);
        }
        if self.turn != Turn::Mine {
            return Err(MoveRejected::NotYourTurn);
        }
        self.board.place(cell, self.role.symbol())?;
        self.turn = Turn::Theirs;
        Ok(self.evaluate_terminal(Peer::Local))
    }

    /// Places the opponent's mark from an inbound MOVE.
    pub fn apply_remote_move(&mut self, cell: usize) -> Result<Option<Phase>, ProtocolError> {
        if self.phase.is_terminal() {
            return Err(ProtocolError::GameOver);
        }
        if self.turn != Turn::Theirs {
            return Err(ProtocolError::OutOfTurn);
        }
        self.board
            .place(cell, self.role.opponent().symbol())
            .map_err(|err| match err {
                MoveRejected::Occupied(cell) => ProtocolError::CellOccupied(cell),
                _ => ProtocolError::InvalidCell(cell.to_string()),
            })?;
        self.turn = Turn::Mine;
        Ok(self.evaluate_terminal(Peer::Remote))
    }

    /// Enters a terminal phase unless one was already reached. The first
    /// terminal phase of a game wins.
    pub fn conclude(&mut self, phase: Phase) -> bool {
        if self.phase.is_terminal() || !phase.is_terminal() {
            return false;
        }
        self.phase = phase;
        true
    }

    fn evaluate_terminal(&mut self, mover: Peer) -> Option<Phase> {
        let symbol = match mover {
            Peer::Local => self.role.symbol(),
            Peer::Remote => self.role.opponent().symbol(),
        };
        // A line on a full board is still a win.
        let phase = if self.board.has_line(symbol) {
            Phase::Won { winner: mover }
        } else if self.board.is_full() {
            Phase::Draw
        } else {
            return None;
        };
        self.phase = phase;
        Some(phase)
    }
}
