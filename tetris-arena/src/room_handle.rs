/// Task that owns a room and serializes everything that touches it
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{ArenaError, Result};
use crate::protocol::ClientAction;
use crate::room::Room;
use crate::session::PlayerSession;
use crate::types::{PlayerId, RoomId, RoomPhase};

/// Commands accepted by a room task
#[derive(Debug)]
pub enum RoomCommand {
    /// Attach a new session
    Join(PlayerSession),
    /// Detach a session; the task exits once the room is empty
    Leave(PlayerId),
    /// Apply a player action
    Action(PlayerId, ClientAction),
}

/// Cloneable address of a running room task
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: RoomId,
    command_tx: flume::Sender<RoomCommand>,
    phase_rx: watch::Receiver<RoomPhase>,
}

impl RoomHandle {
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn send(&self, command: RoomCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| ArenaError::ChannelClosed(format!("room '{}'", self.id)))
    }

    /// Phase as last published by the room task
    pub fn phase(&self) -> RoomPhase {
        *self.phase_rx.borrow()
    }

    /// True once the room task has exited
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_disconnected()
    }
}

/// Create a room and spawn the task that drives it
pub fn spawn_room(id: RoomId, tick_interval: Duration, seed: Option<u64>) -> RoomHandle {
    let (command_tx, command_rx) = flume::unbounded();
    let (phase_tx, phase_rx) = watch::channel(RoomPhase::Waiting);
    let room = Room::new(id.clone(), tick_interval, seed, Instant::now());
    tokio::spawn(run_room(room, tick_interval, command_rx, phase_tx));
    RoomHandle {
        id,
        command_tx,
        phase_rx,
    }
}

/// Serial loop of one room: commands and ticks are handled one at a time
async fn run_room(
    mut room: Room,
    tick_interval: Duration,
    command_rx: flume::Receiver<RoomCommand>,
    phase_tx: watch::Sender<RoomPhase>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!("Room '{}' task started", room.id());

    loop {
        let was_active = room.is_active();

        tokio::select! {
            command = command_rx.recv_async() => {
                let Ok(command) = command else {
                    tracing::debug!("Room '{}' command channel closed", room.id());
                    break;
                };
                match command {
                    RoomCommand::Join(session) => {
                        let player_id = session.id.clone();
                        if let Err(e) = room.add_session(session, Instant::now()) {
                            tracing::warn!("Room '{}' rejected player '{}': {}", room.id(), player_id, e);
                        }
                    }
                    RoomCommand::Leave(player_id) => {
                        room.remove_session(&player_id);
                        if room.is_empty() {
                            break;
                        }
                    }
                    RoomCommand::Action(player_id, action) => {
                        room.handle_action(&player_id, action, Instant::now());
                    }
                }
                // First tick comes one full period after the match starts
                if !was_active && room.is_active() {
                    ticker.reset();
                }
            }
            tick = ticker.tick(), if was_active => {
                room.tick(tick);
            }
        }

        let phase = room.phase();
        phase_tx.send_if_modified(|published| {
            if *published == phase {
                return false;
            }
            tracing::debug!("Room '{}' is now: {}", room.id(), phase);
            *published = phase;
            true
        });
    }

    tracing::info!("Room '{}' closed", room.id());
}
