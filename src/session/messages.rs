use actix::{Message, Recipient};
use serde::Serialize;
use uuid::Uuid;

use crate::game::{Board, Phase, Role, Turn};
use crate::session::chat::ChatEntry;

/// The local player clicked a cell.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct CellClicked(pub usize);

/// The local player submitted a chat line.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct ChatSubmitted(pub String);

/// The local player asked for a new game.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct ResetClicked;

/// Register a presentation endpoint for [`UiEvent`]s.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe {
    pub id: Uuid,
    pub recipient: Recipient<UiEvent>,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Unsubscribe(pub Uuid);

#[derive(Message, Debug)]
#[rtype(result = "SessionSnapshot")]
pub struct GetSnapshot;

/// The outbound half of the connection failed.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct TransportLost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Alert,
    Success,
    Neutral,
    Warning,
}

/// Everything the presentation needs to redraw from scratch.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub role: Role,
    pub local_name: String,
    pub remote_name: String,
    pub board: Board,
    pub turn: Turn,
    pub phase: Phase,
    pub status: String,
    pub severity: Severity,
    pub chat: Vec<ChatEntry>,
    /// Seconds left on our turn, if the countdown is running.
    pub turn_remaining: Option<u32>,
    pub match_elapsed: u64,
    pub connected: bool,
}

/// State changes pushed to the presentation.
#[derive(Message, Debug, Clone, Serialize)]
#[rtype(result = "()")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    BoardChanged { board: Board },
    StatusChanged { text: String, severity: Severity },
    TimerTick { remaining: u32 },
    MatchTimeTick { elapsed: u64 },
    ChatAppended { entry: ChatEntry },
    ChatCleared,
    Snapshot(SessionSnapshot),
}
