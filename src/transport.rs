//! The single TCP connection between the two peers.
//!
//! The host binds, accepts exactly one connection and stops listening; the
//! guest dials once. There is no retry and no reconnect. Once connected the
//! stream is split: the read half feeds the session actor as a stream of
//! frames, and the write half is owned by a writer task fed through an
//! [`Outbox`].

use std::net::SocketAddr;

use actix::Addr;
use futures::SinkExt;
use log::{debug, info, warn};
use tokio::io::AsyncWrite;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::game::Role;
use crate::protocol::{Frame, FrameCodec};
use crate::session::messages::TransportLost;
use crate::session::GameSession;

/// Queue of frames waiting to be written, in send order.
pub type Outbox = mpsc::UnboundedSender<Frame>;

/// Opens the connection for the configured role.
pub async fn establish(config: &SessionConfig) -> Result<TcpStream, SessionError> {
    match config.role {
        Role::Host => {
            let listener = listen(config.peer_addr).await?;
            accept_one(listener).await
        }
        Role::Guest => connect(config.peer_addr).await,
    }
}

pub async fn listen(addr: SocketAddr) -> Result<TcpListener, SessionError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| SessionError::Bind { addr, source })?;
    info!(
        "Waiting for an opponent on {}",
        listener.local_addr().unwrap_or(addr)
    );
    Ok(listener)
}

/// Accepts one peer and drops the listener.
pub async fn accept_one(listener: TcpListener) -> Result<TcpStream, SessionError> {
    let (stream, peer) = listener.accept().await.map_err(SessionError::Accept)?;
    info!("Opponent connected from {}", peer);
    configure(&stream);
    Ok(stream)
}

pub async fn connect(addr: SocketAddr) -> Result<TcpStream, SessionError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| SessionError::Connect { addr, source })?;
    info!("Connected to host at {}", addr);
    configure(&stream);
    Ok(stream)
}

fn configure(stream: &TcpStream) {
    // Frames are tiny and latency matters more than batching.
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Could not disable Nagle's algorithm: {}", e);
    }
}

/// Spawns the task that owns the write half. Frames are written in the order
/// they were queued. A write failure is reported to the session, and
/// dropping every [`Outbox`] handle closes the write half.
pub fn spawn_writer<W>(writer: W, session: Addr<GameSession>) -> Outbox
where
    W: AsyncWrite + Unpin + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();
    actix_rt::spawn(async move {
        let mut sink = FramedWrite::new(writer, FrameCodec::new());
        while let Some(frame) = rx.recv().await {
            debug!("Sending frame: {}", frame);
            if let Err(e) = sink.send(frame).await {
                warn!("Write to opponent failed: {}", e);
                session.do_send(TransportLost);
                return;
            }
        }
        if let Err(e) = sink.close().await {
            debug!("Closing write half failed: {}", e);
        }
    });
    tx
}
