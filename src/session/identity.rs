use serde::Serialize;

use crate::game::{Peer, Role};

/// Display names of both players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerIdentity {
    pub local_name: String,
    /// The opponent's role label until their NAME frame arrives.
    pub remote_name: String,
}

impl PeerIdentity {
    pub fn new(role: Role, local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            remote_name: role.opponent().label().to_string(),
        }
    }

    pub fn name_of(&self, peer: Peer) -> &str {
        match peer {
            Peer::Local => &self.local_name,
            Peer::Remote => &self.remote_name,
        }
    }

    /// Maps a name carried by an inbound frame back to a side. Inbound frames
    /// are written by the opponent, so a name both players share resolves to
    /// the remote side.
    pub fn resolve(&self, name: &str) -> Peer {
        if name == self.remote_name || name != self.local_name {
            Peer::Remote
        } else {
            Peer::Local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_until_named() {
        let host = PeerIdentity::new(Role::Host, "Alice");
        assert_eq!(host.remote_name, "Client");
        let guest = PeerIdentity::new(Role::Guest, "Bob");
        assert_eq!(guest.remote_name, "Server");
    }

    #[test]
    fn resolves_names_to_sides() {
        let mut ids = PeerIdentity::new(Role::Guest, "Bob");
        ids.remote_name = "Alice".into();
        assert_eq!(ids.resolve("Bob"), Peer::Local);
        assert_eq!(ids.resolve("Alice"), Peer::Remote);
        assert_eq!(ids.name_of(Peer::Local), "Bob");

        ids.remote_name = "Bob".into();
        assert_eq!(ids.resolve("Bob"), Peer::Remote);
    }
}
