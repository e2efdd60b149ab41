//! The session controller: one actor per process that owns the game.
//!
//! Inbound frames, timer ticks, local intents and transport failures all
//! arrive as messages on the [`GameSession`] mailbox, so every change to the
//! board, turn, phase and timers happens on one context, one at a time.
//! Outbound frames are queued on the [`Outbox`] right after the mutation
//! they announce, which keeps the local board ahead of anything the
//! opponent can reply to.

pub mod chat;
pub mod identity;
pub mod messages;
pub mod timers;

use std::collections::HashMap;

use actix::prelude::*;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::ProtocolError;
use crate::game::{GameState, Peer, Phase, Turn};
use crate::protocol::{Frame, FrameCodec, MAX_FRAME_BYTES};
use crate::transport::{self, Outbox};

pub use chat::{ChatEntry, ChatLog, FileChatLog, LOCAL_SPEAKER};
pub use identity::PeerIdentity;
pub use messages::*;
pub use timers::{MatchTimer, TurnTick, TurnTimer};

pub struct GameSession {
    config: SessionConfig,
    identity: PeerIdentity,
    game: GameState,
    turn_timer: TurnTimer,
    turn_handle: Option<SpawnHandle>,
    match_timer: MatchTimer,
    match_handle: Option<SpawnHandle>,
    chat: Vec<ChatEntry>,
    chat_log: Box<dyn ChatLog>,
    /// `None` once the connection is gone.
    outbox: Option<Outbox>,
    subscribers: HashMap<Uuid, Recipient<UiEvent>>,
}

impl GameSession {
    /// Starts the session on the current arbiter, reading frames from
    /// `reader` and writing them to `writer`.
    pub fn start<R, W>(
        config: SessionConfig,
        reader: R,
        writer: W,
        chat_log: Box<dyn ChatLog>,
    ) -> Addr<GameSession>
    where
        R: AsyncRead + Unpin + 'static,
        W: AsyncWrite + Unpin + 'static,
    {
        GameSession::create(move |ctx| {
            ctx.add_stream(FramedRead::new(reader, FrameCodec::new()));
            let outbox = transport::spawn_writer(writer, ctx.address());
            GameSession::new(config, outbox, chat_log)
        })
    }

    fn new(config: SessionConfig, outbox: Outbox, chat_log: Box<dyn ChatLog>) -> Self {
        GameSession {
            identity: PeerIdentity::new(config.role, config.local_name.clone()),
            game: GameState::new(config.role),
            turn_timer: TurnTimer::default(),
            turn_handle: None,
            match_timer: MatchTimer::new(),
            match_handle: None,
            chat: Vec::new(),
            chat_log,
            outbox: Some(outbox),
            subscribers: HashMap::new(),
            config,
        }
    }

    fn is_connected(&self) -> bool {
        self.outbox.is_some()
    }

    fn send(&mut self, frame: Frame) {
        let Some(outbox) = &self.outbox else {
            debug!("Transport closed; dropping {} frame", frame.kind());
            return;
        };
        if outbox.send(frame).is_err() {
            warn!("Writer task is gone; frame not sent");
        }
    }

    fn publish(&mut self, event: UiEvent) {
        self.subscribers.retain(|_, recipient| recipient.connected());
        for recipient in self.subscribers.values() {
            recipient.do_send(event.clone());
        }
    }

    fn publish_board(&mut self) {
        let board = self.game.board().clone();
        self.publish(UiEvent::BoardChanged { board });
    }

    fn publish_status(&mut self) {
        let (text, severity) = self.status_line();
        self.publish(UiEvent::StatusChanged { text, severity });
    }

    fn status_line(&self) -> (String, Severity) {
        if !self.is_connected() {
            return ("Connection lost".to_string(), Severity::Alert);
        }
        match self.game.phase() {
            Phase::InProgress => match self.game.turn() {
                Turn::Mine => ("Your turn".to_string(), Severity::Info),
                Turn::Theirs => ("Waiting for opponent move".to_string(), Severity::Alert),
            },
            Phase::Won { winner } => (
                format!("{} wins!", self.identity.name_of(winner)),
                Severity::Success,
            ),
            Phase::Draw => ("Draw!".to_string(), Severity::Neutral),
            Phase::TimedOut { loser: Peer::Local } => {
                ("Time up! You lose.".to_string(), Severity::Alert)
            }
            Phase::TimedOut { loser: Peer::Remote } => (
                format!(
                    "{} wins! ({} timed out)",
                    self.identity.local_name, self.identity.remote_name
                ),
                Severity::Warning,
            ),
            Phase::Aborted => ("Connection lost".to_string(), Severity::Alert),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let (status, severity) = self.status_line();
        SessionSnapshot {
            role: self.config.role,
            local_name: self.identity.local_name.clone(),
            remote_name: self.identity.remote_name.clone(),
            board: self.game.board().clone(),
            turn: self.game.turn(),
            phase: self.game.phase(),
            status,
            severity,
            chat: self.chat.clone(),
            turn_remaining: self
                .turn_timer
                .is_armed()
                .then(|| self.turn_timer.remaining()),
            match_elapsed: self.match_timer.elapsed().as_secs(),
            connected: self.is_connected(),
        }
    }

    // Timers

    /// Starts a fresh countdown, cancelling any countdown still running.
    fn arm_turn_timer(&mut self, ctx: &mut Context<Self>) {
        self.disarm_turn_timer(ctx);
        self.turn_timer.arm(self.config.turn_seconds);
        self.turn_handle = Some(ctx.run_interval(self.config.tick, |act, ctx| act.on_turn_tick(ctx)));
        self.publish(UiEvent::TimerTick {
            remaining: self.config.turn_seconds,
        });
    }

    fn disarm_turn_timer(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.turn_handle.take() {
            ctx.cancel_future(handle);
        }
        self.turn_timer.disarm();
    }

    fn on_turn_tick(&mut self, ctx: &mut Context<Self>) {
        match self.turn_timer.tick() {
            TurnTick::Idle => self.disarm_turn_timer(ctx),
            TurnTick::Remaining(remaining) => self.publish(UiEvent::TimerTick { remaining }),
            TurnTick::Expired => {
                self.publish(UiEvent::TimerTick { remaining: 0 });
                self.disarm_turn_timer(ctx);
                self.on_turn_expired(ctx);
            }
        }
    }

    fn on_turn_expired(&mut self, ctx: &mut Context<Self>) {
        if !self.game.conclude(Phase::TimedOut { loser: Peer::Local }) {
            return;
        }
        warn!("{} ran out of time", self.identity.local_name);
        let name = self.identity.local_name.clone();
        self.send(Frame::Timeout(name));
        self.finish_game(ctx);
    }

    fn restart_match_timer(&mut self, ctx: &mut Context<Self>) {
        self.stop_match_timer(ctx);
        self.match_timer.restart();
        self.match_handle = Some(ctx.run_interval(self.config.tick, |act, ctx| act.on_match_tick(ctx)));
        self.publish(UiEvent::MatchTimeTick { elapsed: 0 });
    }

    fn stop_match_timer(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.match_handle.take() {
            ctx.cancel_future(handle);
        }
        self.match_timer.stop();
    }

    fn on_match_tick(&mut self, ctx: &mut Context<Self>) {
        if self.game.phase().is_terminal() {
            self.stop_match_timer(ctx);
            return;
        }
        let elapsed = self.match_timer.elapsed().as_secs();
        self.publish(UiEvent::MatchTimeTick { elapsed });
    }

    // Game lifecycle

    /// Puts a fresh game on the board. The caller has already flushed chat.
    fn begin_game(&mut self, ctx: &mut Context<Self>) {
        self.game.reset();
        self.restart_match_timer(ctx);
        if self.game.is_my_turn() {
            self.arm_turn_timer(ctx);
        } else {
            self.disarm_turn_timer(ctx);
        }
        self.publish(UiEvent::ChatCleared);
        self.publish_board();
        self.publish_status();
        info!(
            "New game: {} plays {}",
            self.identity.local_name,
            self.config.role.symbol().as_char()
        );
    }

    /// Common tail of every terminal transition.
    fn finish_game(&mut self, ctx: &mut Context<Self>) {
        self.disarm_turn_timer(ctx);
        self.stop_match_timer(ctx);
        self.flush_chat();
        self.publish_status();
        info!(
            "Game over ({:?}) after {}s\n{}",
            self.game.phase(),
            self.match_timer.elapsed().as_secs(),
            self.game.board()
        );
    }

    fn flush_chat(&mut self) {
        if let Err(e) = self.chat_log.flush(&self.chat) {
            warn!("Failed to save chat log: {}", e);
        }
        self.chat.clear();
    }

    fn append_chat(&mut self, entry: ChatEntry) {
        self.chat.push(entry.clone());
        self.publish(UiEvent::ChatAppended { entry });
    }

    /// Ends the session after the connection failed or closed.
    fn abort(&mut self, ctx: &mut Context<Self>) {
        if self.outbox.take().is_none() {
            return;
        }
        warn!("Connection to {} lost", self.identity.remote_name);
        if self.game.conclude(Phase::Aborted) {
            self.finish_game(ctx);
        } else {
            self.flush_chat();
            self.publish_status();
        }
    }

    // Local intents

    fn announce_name(&mut self) {
        let name = self.identity.local_name.clone();
        self.send(Frame::Name(name));
    }

    fn request_move(&mut self, cell: usize, ctx: &mut Context<Self>) {
        if !self.is_connected() {
            debug!("Ignoring move to cell {}: session has ended", cell);
            return;
        }
        let result = match self.game.apply_local_move(cell) {
            Ok(result) => result,
            Err(reason) => {
                debug!("Ignoring move to cell {}: {}", cell, reason);
                return;
            }
        };
        self.send(Frame::Move(cell));
        self.disarm_turn_timer(ctx);
        self.publish_board();
        match result {
            Some(phase) => {
                if let Some(frame) = self.result_frame(phase) {
                    self.send(frame);
                }
                self.finish_game(ctx);
            }
            None => self.publish_status(),
        }
    }

    /// The frame announcing a win or draw this side evaluated. Both peers
    /// send one; the copy that arrives second is dropped by `conclude`.
    fn result_frame(&self, phase: Phase) -> Option<Frame> {
        match phase {
            Phase::Won { winner } => Some(Frame::Winner(self.identity.name_of(winner).to_string())),
            Phase::Draw => Some(Frame::Draw),
            _ => None,
        }
    }

    fn send_chat(&mut self, text: String) {
        let text = text.replace(['\r', '\n'], " ");
        if text.is_empty() {
            return;
        }
        if !self.is_connected() {
            debug!("Ignoring chat: session has ended");
            return;
        }
        let frame = Frame::Chat(text.clone());
        if frame.to_string().len() > MAX_FRAME_BYTES {
            warn!("Chat message too long to send ({} bytes)", text.len());
            return;
        }
        self.append_chat(ChatEntry::new(LOCAL_SPEAKER, text));
        self.send(frame);
    }

    /// Starts a new game on both sides. RESET carries no game number, so a
    /// MOVE the opponent sent before seeing it lands on the fresh board. The
    /// host drops it as out of turn; a guest that resets may apply it.
    fn send_reset(&mut self, ctx: &mut Context<Self>) {
        if !self.is_connected() {
            debug!("Ignoring reset: session has ended");
            return;
        }
        info!("{} started a new game", self.identity.local_name);
        self.flush_chat();
        self.begin_game(ctx);
        self.send(Frame::Reset);
    }

    // Inbound frames

    fn dispatch(&mut self, frame: Frame, ctx: &mut Context<Self>) {
        debug!("Received frame: {}", frame);
        match frame {
            Frame::Name(name) => {
                info!("Opponent is {}", name);
                self.identity.remote_name = name;
                self.publish_status();
            }
            Frame::Move(cell) => self.on_remote_move(cell, ctx),
            Frame::Chat(text) => {
                let speaker = self.identity.remote_name.clone();
                self.append_chat(ChatEntry::new(speaker, text));
            }
            Frame::Reset => {
                info!("{} started a new game", self.identity.remote_name);
                self.flush_chat();
                self.begin_game(ctx);
            }
            Frame::Winner(name) => {
                let winner = self.identity.resolve(&name);
                self.on_remote_result(Phase::Won { winner }, ctx);
            }
            Frame::Draw => self.on_remote_result(Phase::Draw, ctx),
            Frame::Timeout(name) => {
                let loser = self.identity.resolve(&name);
                self.on_remote_result(Phase::TimedOut { loser }, ctx);
            }
        }
    }

    fn on_remote_move(&mut self, cell: usize, ctx: &mut Context<Self>) {
        let result = match self.game.apply_remote_move(cell) {
            Ok(result) => result,
            Err(e) => {
                warn!("Rejected MOVE {} from {}: {}", cell, self.identity.remote_name, e);
                return;
            }
        };
        self.publish_board();
        match result {
            Some(phase) => {
                if let Some(frame) = self.result_frame(phase) {
                    self.send(frame);
                }
                self.finish_game(ctx);
            }
            None => {
                self.arm_turn_timer(ctx);
                self.publish_status();
            }
        }
    }

    fn on_remote_result(&mut self, phase: Phase, ctx: &mut Context<Self>) {
        if self.game.conclude(phase) {
            self.finish_game(ctx);
        } else {
            debug!(
                "Ignoring result {:?}; game already ended as {:?}",
                phase,
                self.game.phase()
            );
        }
    }
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            "Session started as {:?} ({})",
            self.config.role, self.identity.local_name
        );
        self.announce_name();
        self.begin_game(ctx);
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        info!("Session for {} stopped", self.identity.local_name);
    }
}

impl StreamHandler<Result<Frame, ProtocolError>> for GameSession {
    fn handle(&mut self, item: Result<Frame, ProtocolError>, ctx: &mut Self::Context) {
        match item {
            Ok(frame) if self.is_connected() => self.dispatch(frame, ctx),
            Ok(frame) => debug!("Session has ended; ignoring {} frame", frame.kind()),
            Err(e) => {
                warn!("Read from {} failed: {}", self.identity.remote_name, e);
                self.abort(ctx);
            }
        }
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        info!("{} closed the connection", self.identity.remote_name);
        self.abort(ctx);
    }
}

impl Handler<CellClicked> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: CellClicked, ctx: &mut Self::Context) {
        self.request_move(msg.0, ctx);
    }
}

impl Handler<ChatSubmitted> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: ChatSubmitted, _: &mut Self::Context) {
        self.send_chat(msg.0);
    }
}

impl Handler<ResetClicked> for GameSession {
    type Result = ();

    fn handle(&mut self, _: ResetClicked, ctx: &mut Self::Context) {
        self.send_reset(ctx);
    }
}

impl Handler<Subscribe> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _: &mut Self::Context) {
        debug!("Presentation {} subscribed", msg.id);
        msg.recipient.do_send(UiEvent::Snapshot(self.snapshot()));
        self.subscribers.insert(msg.id, msg.recipient);
    }
}

impl Handler<Unsubscribe> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, _: &mut Self::Context) {
        if self.subscribers.remove(&msg.0).is_some() {
            debug!("Presentation {} unsubscribed", msg.0);
        }
    }
}

impl Handler<GetSnapshot> for GameSession {
    type Result = MessageResult<GetSnapshot>;

    fn handle(&mut self, _: GetSnapshot, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.snapshot())
    }
}

impl Handler<TransportLost> for GameSession {
    type Result = ();

    fn handle(&mut self, _: TransportLost, ctx: &mut Self::Context) {
        self.abort(ctx);
    }
}
