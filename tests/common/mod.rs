#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix::{Actor, Addr, Context, Handler};
use futures::StreamExt;
use tokio::io::{duplex, split, DuplexStream};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use uuid::Uuid;

use tictactoe_peer::config::SessionConfig;
use tictactoe_peer::game::Role;
use tictactoe_peer::protocol::{Frame, FrameCodec};
use tictactoe_peer::session::{
    ChatEntry, ChatLog, GameSession, GetSnapshot, SessionSnapshot, Subscribe, UiEvent,
};

pub const WAIT: Duration = Duration::from_secs(2);

/// Keeps every flushed chat in memory.
#[derive(Clone, Default)]
pub struct MemoryChatLog {
    pub flushed: Arc<Mutex<Vec<Vec<ChatEntry>>>>,
}

impl ChatLog for MemoryChatLog {
    fn flush(&mut self, entries: &[ChatEntry]) -> std::io::Result<()> {
        if !entries.is_empty() {
            self.flushed.lock().unwrap().push(entries.to_vec());
        }
        Ok(())
    }
}

impl MemoryChatLog {
    pub fn blocks(&self) -> Vec<Vec<ChatEntry>> {
        self.flushed.lock().unwrap().clone()
    }
}

pub fn test_config(role: Role, name: &str) -> SessionConfig {
    SessionConfig::new(role).with_name(name)
}

/// Config with a fast tick so countdowns finish quickly.
pub fn fast_config(role: Role, name: &str, turn_seconds: u32) -> SessionConfig {
    let mut config = test_config(role, name);
    config.tick = Duration::from_millis(20);
    config.turn_seconds = turn_seconds;
    config
}

/// The far end of a session's connection, driven by the test.
pub type ScriptedPeer = Framed<DuplexStream, FrameCodec>;

pub fn start_with_peer(config: SessionConfig) -> (Addr<GameSession>, ScriptedPeer, MemoryChatLog) {
    let (ours, theirs) = duplex(8 * 1024);
    let (reader, writer) = split(ours);
    let log = MemoryChatLog::default();
    let addr = GameSession::start(config, reader, writer, Box::new(log.clone()));
    (addr, Framed::new(theirs, FrameCodec::new()), log)
}

/// Two sessions talking to each other over an in-memory pipe.
pub fn start_pair(host: SessionConfig, guest: SessionConfig) -> (Addr<GameSession>, Addr<GameSession>) {
    let (a, b) = duplex(8 * 1024);
    let (host_reader, host_writer) = split(a);
    let (guest_reader, guest_writer) = split(b);
    let host = GameSession::start(host, host_reader, host_writer, Box::new(MemoryChatLog::default()));
    let guest = GameSession::start(guest, guest_reader, guest_writer, Box::new(MemoryChatLog::default()));
    (host, guest)
}

pub async fn next_frame(peer: &mut ScriptedPeer) -> Frame {
    tokio::time::timeout(WAIT, peer.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("connection closed")
        .expect("bad frame")
}

/// Asserts that nothing arrives for `quiet`.
pub async fn expect_silence(peer: &mut ScriptedPeer, quiet: Duration) {
    if let Ok(Some(frame)) = tokio::time::timeout(quiet, peer.next()).await {
        panic!("unexpected frame: {:?}", frame);
    }
}

pub async fn snapshot(addr: &Addr<GameSession>) -> SessionSnapshot {
    addr.send(GetSnapshot).await.expect("session is gone")
}

/// Polls the session until `check` holds.
pub async fn wait_until<F>(addr: &Addr<GameSession>, check: F) -> SessionSnapshot
where
    F: Fn(&SessionSnapshot) -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        let snap = snapshot(addr).await;
        if check(&snap) {
            return snap;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("condition not reached; last snapshot: {:?}", snap);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Stands in for a browser tab and forwards every UI event to the test.
struct UiRecorder {
    events: mpsc::UnboundedSender<UiEvent>,
}

impl Actor for UiRecorder {
    type Context = Context<Self>;
}

impl Handler<UiEvent> for UiRecorder {
    type Result = ();

    fn handle(&mut self, event: UiEvent, _: &mut Self::Context) {
        let _ = self.events.send(event);
    }
}

pub type UiEvents = mpsc::UnboundedReceiver<UiEvent>;

/// Subscribes a recorder; returns once the session has registered it.
pub async fn subscribe(addr: &Addr<GameSession>) -> UiEvents {
    let (tx, rx) = mpsc::unbounded_channel();
    let recorder = UiRecorder { events: tx }.start();
    addr.send(Subscribe {
        id: Uuid::new_v4(),
        recipient: recorder.recipient(),
    })
    .await
    .expect("session is gone");
    rx
}

pub async fn next_event(events: &mut UiEvents) -> UiEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for a UI event")
        .expect("recorder stopped")
}

/// Collects events until one matches `stop`, which is included.
pub async fn events_until<F>(events: &mut UiEvents, stop: F) -> Vec<UiEvent>
where
    F: Fn(&UiEvent) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let event = next_event(events).await;
        let done = stop(&event);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

/// Everything that arrives within `window`.
pub async fn events_within(events: &mut UiEvents, window: Duration) -> Vec<UiEvent> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(event)) = tokio::time::timeout_at(deadline, events.recv()).await {
        seen.push(event);
    }
    seen
}
