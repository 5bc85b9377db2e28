/// Room assignment and message routing for all connections
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use futures::{Stream, StreamExt};

use crate::config::{ArenaConfig, ROOM_CAPACITY};
use crate::error::{ArenaError, Result};
use crate::protocol::{ClientAction, ServerMessage};
use crate::room_handle::{spawn_room, RoomCommand, RoomHandle};
use crate::session::PlayerSession;
use crate::types::{PlayerId, RoomId, RoomPhase};

struct RoomEntry {
    handle: RoomHandle,
    occupants: usize,
    /// Set when the second player arrives or anyone leaves; never cleared.
    /// Only decides where new players go; the room task owns the real phase.
    closed: bool,
}

/// Where a joined connection lives
#[derive(Debug, Clone)]
pub struct Assignment {
    pub room: RoomHandle,
    pub player_id: PlayerId,
}

/// Registry of live rooms.
///
/// Joins and leaves from any number of connections go through one lock, so
/// two concurrent joins can never both land in the last free seat.
pub struct Directory {
    config: ArenaConfig,
    rooms: Mutex<HashMap<RoomId, RoomEntry>>,
    rooms_created: AtomicU64,
}

impl Directory {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            rooms: Mutex::new(HashMap::new()),
            rooms_created: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RoomId, RoomEntry>> {
        // Entries are plain counters, so a poisoned map is still consistent
        self.rooms.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn open_room(&self, room_id: RoomId) -> RoomEntry {
        let ordinal = self.rooms_created.fetch_add(1, Ordering::Relaxed);
        let handle = spawn_room(
            room_id,
            self.config.tick_interval(),
            self.config.room_seed(ordinal),
        );
        tracing::info!("Directory: created room '{}'", handle.id());
        RoomEntry {
            handle,
            occupants: 0,
            closed: false,
        }
    }

    /// Seat a new player in the first room with a free seat, creating one if needed.
    ///
    /// The room itself sends Init once it has accepted the session, so a
    /// player only ever learns ids of a room that took it.
    pub fn join(&self, sender: flume::Sender<ServerMessage>) -> Result<Assignment> {
        let player_id = PlayerId::generate();
        let mut rooms = self.lock();

        let open = rooms
            .iter()
            .find(|(_, entry)| {
                !entry.closed && entry.occupants < ROOM_CAPACITY && !entry.handle.is_closed()
            })
            .map(|(room_id, _)| room_id.clone());
        let room_id = open.unwrap_or_else(RoomId::generate);
        let entry = rooms
            .entry(room_id.clone())
            .or_insert_with(|| self.open_room(room_id));

        let session = PlayerSession::new(player_id.clone(), sender);
        entry.handle.send(RoomCommand::Join(session))?;
        entry.occupants += 1;
        if entry.occupants == ROOM_CAPACITY {
            entry.closed = true;
        }

        tracing::info!(
            "Directory: player '{}' assigned to room '{}'",
            player_id,
            entry.handle.id()
        );
        Ok(Assignment {
            room: entry.handle.clone(),
            player_id,
        })
    }

    /// Detach a player from its room and forget the room once it is empty
    pub fn leave(&self, assignment: &Assignment) {
        let room_id = assignment.room.id();
        {
            let mut rooms = self.lock();
            if let Some(entry) = rooms.get_mut(room_id) {
                entry.occupants = entry.occupants.saturating_sub(1);
                entry.closed = true;
                if entry.occupants == 0 {
                    rooms.remove(room_id);
                    tracing::info!("Directory: removed empty room '{}'", room_id);
                }
            }
        }
        if let Err(e) = assignment
            .room
            .send(RoomCommand::Leave(assignment.player_id.clone()))
        {
            tracing::debug!("Directory: {}", e);
        }
    }

    /// Forward an action to the player's room
    pub fn dispatch(&self, assignment: &Assignment, action: ClientAction) -> Result<()> {
        assignment
            .room
            .send(RoomCommand::Action(assignment.player_id.clone(), action))
    }

    /// Drive one connection from its first inbound message to its end.
    ///
    /// The first message must be a Join; anything else ends the connection
    /// with [`ArenaError::JoinExpected`] before a room is involved. After
    /// that each message is parsed and forwarded, and unparseable ones are
    /// logged and dropped. When `inbound` ends the player leaves its room.
    pub async fn serve_connection<S>(
        &self,
        mut inbound: S,
        outbound: flume::Sender<ServerMessage>,
    ) -> Result<()>
    where
        S: Stream<Item = String> + Unpin,
    {
        let Some(first) = inbound.next().await else {
            return Ok(());
        };
        match ClientAction::parse(&first) {
            Ok(ClientAction::Join) => {}
            Ok(other) => return Err(ArenaError::JoinExpected(format!("{:?}", other.action_type()))),
            Err(e) => return Err(ArenaError::JoinExpected(e.to_string())),
        }

        let assignment = self.join(outbound)?;

        while let Some(text) = inbound.next().await {
            match ClientAction::parse(&text) {
                Ok(action) => {
                    if let Err(e) = self.dispatch(&assignment, action) {
                        tracing::warn!("Player '{}': {}", assignment.player_id, e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Player '{}' sent an unreadable message: {}", assignment.player_id, e);
                }
            }
        }

        tracing::info!("Player '{}' disconnected", assignment.player_id);
        self.leave(&assignment);
        Ok(())
    }

    /// Number of rooms currently tracked
    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    /// Phase last published by a tracked room, None once it has been reclaimed
    pub fn room_phase(&self, room_id: &RoomId) -> Option<RoomPhase> {
        self.lock().get(room_id).map(|entry| entry.handle.phase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn directory() -> Directory {
        Directory::new(ArenaConfig::new().with_rng_seed(Some(1)))
    }

    // Let room tasks drain their queues without reaching the first tick
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_joins_share_a_room() {
        let directory = directory();
        let (tx_a, rx_a) = flume::unbounded();
        let (tx_b, _rx_b) = flume::unbounded();

        let a = directory.join(tx_a).unwrap();
        settle().await;
        assert_eq!(directory.room_phase(a.room.id()), Some(RoomPhase::Waiting));
        let b = directory.join(tx_b).unwrap();
        settle().await;

        assert_eq!(a.room.id(), b.room.id());
        assert_ne!(a.player_id, b.player_id);
        assert_eq!(directory.room_count(), 1);
        assert_eq!(directory.room_phase(a.room.id()), Some(RoomPhase::Active));
        assert_eq!(
            rx_a.try_recv().unwrap(),
            ServerMessage::Init {
                room_id: a.room.id().clone(),
                player_id: a.player_id.clone()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_join_opens_new_room() {
        let directory = directory();
        let joined: Vec<_> = (0..3)
            .map(|_| directory.join(flume::unbounded().0).unwrap())
            .collect();
        assert_ne!(joined[0].room.id(), joined[2].room.id());
        assert_eq!(directory.room_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_closes_then_reclaims_room() {
        let directory = directory();
        let a = directory.join(flume::unbounded().0).unwrap();
        let b = directory.join(flume::unbounded().0).unwrap();

        directory.leave(&a);
        settle().await;
        assert_eq!(directory.room_phase(b.room.id()), Some(RoomPhase::Ended));

        // A half-empty ended room is not offered to newcomers
        let c = directory.join(flume::unbounded().0).unwrap();
        assert_ne!(c.room.id(), b.room.id());

        directory.leave(&b);
        assert_eq!(directory.room_phase(b.room.id()), None);
        assert_eq!(directory.room_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_action_reports_ended() {
        let directory = directory();
        let (tx_a, _rx_a) = flume::unbounded();
        let (tx_b, _rx_b) = flume::unbounded();
        let a = directory.join(tx_a).unwrap();
        directory.join(tx_b).unwrap();
        settle().await;

        directory.dispatch(&a, ClientAction::Stop).unwrap();
        settle().await;

        assert_eq!(directory.room_phase(a.room.id()), Some(RoomPhase::Ended));
        assert_eq!(directory.room_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_reports_ended() {
        let directory = directory();
        let (tx_a, _rx_a) = flume::unbounded();
        let (tx_b, rx_b) = flume::unbounded();
        let a = directory.join(tx_a).unwrap();
        let b = directory.join(tx_b).unwrap();
        settle().await;

        // Every piece spawns inside columns 3..=6, so stacking them there tops
        // out within 20 drops and never completes a row
        for _ in 0..30 {
            directory.dispatch(&a, ClientAction::Drop).unwrap();
        }
        settle().await;
        assert_eq!(directory.room_phase(a.room.id()), Some(RoomPhase::Active));

        // The next tick notices the topped-out player
        tokio::time::sleep(directory.config().tick_interval() * 2).await;
        assert_eq!(directory.room_phase(a.room.id()), Some(RoomPhase::Ended));
        assert!(rx_b.try_iter().any(|message| {
            message
                == ServerMessage::GameOver {
                    winner_id: Some(b.player_id.clone()),
                }
        }));
    }
}
