/// Outbound side of one connected player
use crate::protocol::ServerMessage;
use crate::types::PlayerId;

/// A connected player as seen by its room: an identity plus a message sink.
///
/// The transport drains the receiving half of `sender` and writes each
/// message to the socket.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub id: PlayerId,
    sender: flume::Sender<ServerMessage>,
}

impl PlayerSession {
    pub fn new(id: PlayerId, sender: flume::Sender<ServerMessage>) -> Self {
        Self { id, sender }
    }

    /// Queue a message for this player.
    ///
    /// A session whose transport is gone just drops the message; the room
    /// learns about the departure through its own Leave command.
    pub fn send(&self, message: ServerMessage) {
        if self.sender.send(message).is_err() {
            tracing::debug!("Player '{}' is gone, dropping outbound message", self.id);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_disconnected()
    }
}
