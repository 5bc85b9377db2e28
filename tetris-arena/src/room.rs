/// Match coordination for one room
///
/// A `Room` is the synchronous core of a match. It is owned by exactly one
/// task (see `room_handle`), so every tick and every player action is applied
/// in the order that task receives them and nothing here needs a lock.
use std::time::Duration;

use tetris_engine::{receive_garbage, Direction, Engine, PlayerState};
use tokio::time::Instant;

use crate::config::ROOM_CAPACITY;
use crate::error::{ArenaError, Result};
use crate::protocol::{ClientAction, GameStateView, PlayerView, PlayersView, ServerMessage};
use crate::session::PlayerSession;
use crate::types::{PlayerId, RoomId, RoomPhase};

/// Shared simulation state of a match
#[derive(Debug)]
pub struct MatchState {
    /// One entry per attached session, in join order
    pub players: Vec<PlayerState<PlayerId>>,
    pub is_active: bool,
    /// When the last Update went out
    pub last_broadcast: Instant,
}

impl MatchState {
    fn new(now: Instant) -> Self {
        Self {
            players: Vec::with_capacity(ROOM_CAPACITY),
            is_active: false,
            last_broadcast: now,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState<PlayerId>> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState<PlayerId>> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    fn opponent_of(&self, id: &PlayerId) -> Option<&PlayerState<PlayerId>> {
        self.players.iter().find(|p| &p.id != id)
    }
}

pub struct Room {
    id: RoomId,
    sessions: Vec<PlayerSession>,
    state: MatchState,
    /// Set once on the first start and never cleared
    started: bool,
    tick_interval: Duration,
    engine: Engine,
}

impl Room {
    pub fn new(id: RoomId, tick_interval: Duration, seed: Option<u64>, now: Instant) -> Self {
        let engine = match seed {
            Some(seed) => Engine::seeded(seed),
            None => Engine::new(),
        };
        Self {
            id,
            sessions: Vec::with_capacity(ROOM_CAPACITY),
            state: MatchState::new(now),
            started: false,
            tick_interval,
            engine,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn phase(&self) -> RoomPhase {
        match (self.started, self.state.is_active) {
            (false, _) => RoomPhase::Waiting,
            (true, true) => RoomPhase::Active,
            (true, false) => RoomPhase::Ended,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Attach a session and give it a fresh player state.
    ///
    /// An accepted session is sent Init before anything else. The match
    /// starts as soon as the room is full.
    pub fn add_session(&mut self, session: PlayerSession, now: Instant) -> Result<()> {
        if self.sessions.len() >= ROOM_CAPACITY {
            return Err(ArenaError::RoomFull);
        }
        if self.started {
            return Err(ArenaError::RoomClosed(self.id.clone()));
        }

        let player = self.engine.initialize_player(session.id.clone());
        tracing::info!("Room '{}': player '{}' joined", self.id, session.id);
        session.send(ServerMessage::Init {
            room_id: self.id.clone(),
            player_id: session.id.clone(),
        });
        self.state.players.push(player);
        self.sessions.push(session);

        if self.sessions.len() == ROOM_CAPACITY {
            self.start(now);
        }
        Ok(())
    }

    /// Start the match. Only the first call has any effect.
    pub fn start(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;
        self.state.is_active = true;
        tracing::info!("Room '{}': match started", self.id);

        for session in &self.sessions {
            session.send(ServerMessage::GameStart);
        }
        self.broadcast(now);
    }

    pub fn stop(&mut self) {
        if self.state.is_active {
            tracing::info!("Room '{}': match stopped", self.id);
        }
        self.state.is_active = false;
    }

    /// Detach a session and its player state. Returns false for an unknown id.
    pub fn remove_session(&mut self, player_id: &PlayerId) -> bool {
        let Some(index) = self.sessions.iter().position(|s| &s.id == player_id) else {
            return false;
        };
        self.sessions.remove(index);
        self.state.players.retain(|p| &p.id != player_id);
        tracing::info!("Room '{}': player '{}' left", self.id, player_id);

        self.stop();
        for session in &self.sessions {
            session.send(ServerMessage::PlayerDisconnected {
                player_id: player_id.clone(),
            });
        }
        true
    }

    /// One gravity, garbage transfer and broadcast cycle
    pub fn tick(&mut self, now: Instant) {
        if !self.state.is_active {
            return;
        }

        if self.state.players.iter().any(|p| p.is_game_over()) {
            self.finish();
            return;
        }

        let mut changed = false;

        for player in self.state.players.iter_mut() {
            if player.is_game_over() {
                continue;
            }
            if self.engine.move_piece(player, Direction::Down) {
                changed = true;
            }
        }

        for index in 0..self.state.players.len() {
            let lines = self.state.players[index].take_pending_lines();
            if lines.is_empty() {
                continue;
            }
            let sender = self.state.players[index].id.clone();
            let Some(opponent) = self.state.players.iter_mut().find(|p| p.id != sender) else {
                continue;
            };
            if opponent.is_game_over() {
                continue;
            }
            tracing::debug!(
                "Room '{}': {} line(s) from '{}' to '{}'",
                self.id,
                lines.len(),
                sender,
                opponent.id
            );
            receive_garbage(opponent, &lines);
            changed = true;
        }

        if changed || now.duration_since(self.state.last_broadcast) >= self.tick_interval {
            self.broadcast(now);
        }
    }

    /// Apply one player action
    pub fn handle_action(&mut self, player_id: &PlayerId, action: ClientAction, now: Instant) {
        if !self.state.is_active {
            return;
        }
        let Some(player) = self.state.player_mut(player_id) else {
            return;
        };
        if player.is_game_over() {
            return;
        }

        let changed = match action {
            ClientAction::Move(Some(direction)) => self.engine.move_piece(player, direction),
            ClientAction::Move(None) => false,
            ClientAction::Rotate => self.engine.rotate(player),
            ClientAction::Drop => self.engine.hard_drop(player),
            ClientAction::Start => {
                // Only reachable while active, where start has nothing left to do
                self.start(now);
                false
            }
            ClientAction::Stop => {
                self.stop();
                true
            }
            ClientAction::Join | ClientAction::Init => {
                tracing::warn!(
                    "Room '{}': player '{}' sent {:?} mid-session",
                    self.id,
                    player_id,
                    action.action_type()
                );
                if let Some(session) = self.sessions.iter().find(|s| &s.id == player_id) {
                    session.send(ServerMessage::Error {
                        message: "Invalid action type".to_string(),
                    });
                }
                false
            }
        };

        if changed {
            tracing::debug!("Room '{}': player '{}' applied {:?}", self.id, player_id, action);
            self.broadcast(now);
        }
    }

    /// Send every session its own Update
    pub fn broadcast(&mut self, now: Instant) {
        self.state.last_broadcast = now;
        for session in &self.sessions {
            if let Some(message) = self.update_for(&session.id) {
                session.send(message);
            }
        }
    }

    /// Update message as seen by `player_id`
    pub fn update_for(&self, player_id: &PlayerId) -> Option<ServerMessage> {
        let own = self.state.player(player_id)?;
        Some(ServerMessage::Update {
            game_state: GameStateView {
                players: PlayersView {
                    own: PlayerView::own(own),
                    opponent: self.state.opponent_of(player_id).map(PlayerView::opponent),
                },
                is_game_active: self.state.is_active,
            },
        })
    }

    // End the match. The winner is the only player still standing, if there is one.
    fn finish(&mut self) {
        let mut standing = self.state.players.iter().filter(|p| !p.is_game_over());
        let winner_id = match (standing.next(), standing.next()) {
            (Some(winner), None) => Some(winner.id.clone()),
            _ => None,
        };
        match &winner_id {
            Some(winner) => tracing::info!("Room '{}': game over, '{}' wins", self.id, winner),
            None => tracing::info!("Room '{}': game over, draw", self.id),
        }

        self.stop();
        for session in &self.sessions {
            session.send(ServerMessage::GameOver {
                winner_id: winner_id.clone(),
            });
        }
    }
}
