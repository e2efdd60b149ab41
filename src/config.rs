use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::game::Role;

pub const DEFAULT_PEER_PORT: u16 = 5000;
pub const DEFAULT_TURN_SECONDS: u32 = 60;
pub const DEFAULT_CHAT_LOG: &str = "chatlog.txt";

/// Settings for one peer process.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub role: Role,
    pub local_name: String,
    pub peer_addr: SocketAddr,
    pub ui_addr: SocketAddr,
    pub turn_seconds: u32,
    /// Length of one timer tick. Turn and match timers both advance once per tick.
    pub tick: Duration,
    pub chat_log_path: PathBuf,
}

impl SessionConfig {
    pub fn new(role: Role) -> Self {
        let ui_port = match role {
            Role::Host => 8080,
            Role::Guest => 8081,
        };
        Self {
            role,
            local_name: role.label().to_string(),
            peer_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PEER_PORT)),
            ui_addr: SocketAddr::from(([127, 0, 0, 1], ui_port)),
            turn_seconds: DEFAULT_TURN_SECONDS,
            tick: Duration::from_secs(1),
            chat_log_path: PathBuf::from(DEFAULT_CHAT_LOG),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.local_name = name.into();
        self
    }
}

/// Command-line arguments. Anything left out keeps the role's default.
#[derive(Debug, Parser)]
#[command(name = "tictactoe_peer", version, about = "Two-player tic-tac-toe over one TCP connection", long_about = None)]
pub struct Cli {
    /// Which side to play: the host listens and moves first
    #[arg(value_enum)]
    pub role: Role,

    /// Display name (default: Server / Client)
    #[arg(long, value_parser = single_line)]
    pub name: Option<String>,

    /// Address the host listens on and the guest dials (default: 127.0.0.1:5000)
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// Browser UI address (default: 127.0.0.1:8080 host, 127.0.0.1:8081 guest)
    #[arg(long)]
    pub ui_addr: Option<SocketAddr>,

    /// Seconds per turn before a timeout (default: 60)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub turn_seconds: Option<u32>,

    /// File finished chats are appended to (default: chatlog.txt)
    #[arg(long)]
    pub chat_log: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> SessionConfig {
        let mut config = SessionConfig::new(self.role);
        if let Some(name) = self.name {
            config.local_name = name;
        }
        if let Some(addr) = self.addr {
            config.peer_addr = addr;
        }
        if let Some(addr) = self.ui_addr {
            config.ui_addr = addr;
        }
        if let Some(seconds) = self.turn_seconds {
            config.turn_seconds = seconds;
        }
        if let Some(path) = self.chat_log {
            config.chat_log_path = path;
        }
        config
    }
}

// Names travel as a frame payload, so they must fit on one line.
fn single_line(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() || raw.contains(['\r', '\n']) {
        return Err("must be a non-empty single line".to_string());
    }
    Ok(raw.to_string())
}
