//! # tetris-arena
//!
//! Room and session coordination for two-player competitive tetris.
//!
//! ## Overview
//!
//! A [`Directory`] seats incoming connections two at a time in rooms. Each
//! room runs as its own task: player actions and gravity ticks are delivered
//! to that task and applied one after another, so a room's match state is
//! only ever touched from one place. Rooms run independently of each other.
//!
//! The crate is transport-agnostic. A connection is a stream of text frames
//! in and a channel of [`ServerMessage`]s out; the server binary wires both
//! to a WebSocket.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tetris_arena::{ArenaConfig, Directory};
//!
//! #[tokio::main]
//! async fn main() {
//!     let directory = Arc::new(Directory::new(ArenaConfig::default()));
//!
//!     let (outbound_tx, outbound_rx) = flume::unbounded();
//!     let inbound = futures::stream::iter(vec![r#"{"ActionType":"Join"}"#.to_string()]);
//!
//!     directory.serve_connection(inbound, outbound_tx).await.ok();
//!     while let Ok(message) = outbound_rx.try_recv() {
//!         println!("{}", message.to_json().unwrap_or_default());
//!     }
//! }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod protocol;
pub mod room;
pub mod room_handle;
pub mod session;
pub mod types;

pub use config::{ArenaConfig, ROOM_CAPACITY};
pub use directory::{Assignment, Directory};
pub use error::{ArenaError, Result};
pub use protocol::{ActionType, ClientAction, GameStateView, PlayerView, PlayersView, ServerMessage};
pub use room::{MatchState, Room};
pub use room_handle::{spawn_room, RoomCommand, RoomHandle};
pub use session::PlayerSession;
pub use types::{PlayerId, RoomId, RoomPhase};
