//! # tetris-engine
//!
//! Deterministic block-stacking simulation for one player's well: the
//! static shape catalog, piece movement and rotation, placement, line
//! clearing, scoring and incoming garbage lines.
//!
//! The crate does no I/O. A coordinator owns one [`PlayerState`] per
//! participant and calls into [`Engine`] to mutate it.
//!
//! ```rust
//! use tetris_engine::{Direction, Engine};
//!
//! let mut engine = Engine::seeded(7);
//! let mut player = engine.initialize_player("alice");
//! assert!(engine.move_piece(&mut player, Direction::Left));
//! assert!(engine.hard_drop(&mut player));
//! assert!(!player.grid.is_empty());
//! ```

pub mod engine;
pub mod grid;
pub mod piece;
pub mod player;
pub mod shapes;

pub use engine::{clear_lines, is_valid_placement, receive_garbage, score_for, Direction, Engine};
pub use grid::{Grid, Line, COLS, ROWS};
pub use piece::{Piece, Position, SPAWN_X, SPAWN_Y};
pub use player::PlayerState;
pub use shapes::{PieceType, Rotation, ShapeMatrix};
