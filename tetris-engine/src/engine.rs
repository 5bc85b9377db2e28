//! Piece movement, placement and line handling
//!
//! [`Engine`] only owns the piece generator. Every operation takes the
//! player state it mutates, and every legality decision goes through
//! [`is_valid_placement`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Line, ROWS};
use crate::piece::{shape_cells, Piece, Position};
use crate::player::PlayerState;
use crate::shapes::{PieceType, Rotation};

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// Parse the wire spelling. Anything else is not a direction.
    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "LEFT" => Some(Direction::Left),
            "RIGHT" => Some(Direction::Right),
            "DOWN" => Some(Direction::Down),
            _ => None,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

/// Points awarded for the rows cleared by one placement
pub fn score_for(rows: usize) -> u32 {
    match rows {
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 800,
        _ => 0,
    }
}

/// True iff every filled cell of the shape lies inside the well and on an empty cell
pub fn is_valid_placement(
    grid: &Grid,
    kind: PieceType,
    rotation: Rotation,
    position: Position,
) -> bool {
    shape_cells(kind, rotation, position).all(|(x, y)| !grid.is_blocked(x, y))
}

fn fits(grid: &Grid, piece: &Piece) -> bool {
    is_valid_placement(grid, piece.kind, piece.rotation, piece.position)
}

/// Remove every full row, capturing it into the player's pending lines.
/// Rows are scanned top to bottom. Returns how many were removed.
pub fn clear_lines<I>(state: &mut PlayerState<I>) -> usize {
    let mut cleared = 0;
    for y in 0..ROWS {
        if state.grid.is_row_full(y) {
            state.pending_lines.push(*state.grid.row(y));
            state.grid.remove_row(y);
            cleared += 1;
        }
    }
    cleared
}

/// Push incoming lines under the player's grid, in order.
///
/// After each line the active piece is checked; if it now overlaps, it is
/// nudged up exactly one row. If that still does not fit the player is out
/// and the remaining lines are dropped.
pub fn receive_garbage<I>(state: &mut PlayerState<I>, lines: &[Line]) {
    if state.is_game_over() {
        return;
    }
    for line in lines {
        state.grid.push_bottom(line);
        if fits(&state.grid, &state.current) {
            continue;
        }
        let nudged = state.current.shifted(0, -1);
        if fits(&state.grid, &nudged) {
            state.current = nudged;
        } else {
            state.mark_game_over();
            break;
        }
    }
}

/// Piece generator plus the operations that may need a fresh piece
pub struct Engine<R = StdRng> {
    rng: R,
}

impl Engine<StdRng> {
    pub fn new() -> Self {
        Engine {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic piece sequence
    pub fn seeded(seed: u64) -> Self {
        Engine {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Engine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(rng: R) -> Self {
        Engine { rng }
    }

    /// Uniformly random piece at the spawn position
    pub fn spawn_piece(&mut self) -> Piece {
        Piece::spawn(PieceType::random(&mut self.rng))
    }

    /// Fresh player: empty grid, two pieces drawn, nothing scored
    pub fn initialize_player<I>(&mut self, id: I) -> PlayerState<I> {
        let current = self.spawn_piece();
        let next = self.spawn_piece();
        PlayerState::new(id, current, next)
    }

    /// Move the active piece one step.
    ///
    /// A DOWN move that lands the piece, or that cannot be made at all,
    /// places the piece. Returns whether anything changed.
    pub fn move_piece<I>(&mut self, state: &mut PlayerState<I>, direction: Direction) -> bool {
        if state.is_game_over() {
            return false;
        }
        let (dx, dy) = direction.delta();
        let candidate = state.current.shifted(dx, dy);
        if fits(&state.grid, &candidate) {
            state.current = candidate;
            if direction == Direction::Down && !fits(&state.grid, &candidate.shifted(0, 1)) {
                self.commit(state);
            }
            return true;
        }
        if direction == Direction::Down {
            self.commit(state);
            return true;
        }
        false
    }

    /// Rotate clockwise in place. No kicks: a blocked rotation is rejected.
    pub fn rotate<I>(&mut self, state: &mut PlayerState<I>) -> bool {
        if state.is_game_over() {
            return false;
        }
        let candidate = state.current.rotated_right();
        if !fits(&state.grid, &candidate) {
            return false;
        }
        state.current = candidate;
        true
    }

    /// Drop the active piece to its lowest legal row and place it
    pub fn hard_drop<I>(&mut self, state: &mut PlayerState<I>) -> bool {
        if state.is_game_over() {
            return false;
        }
        while fits(&state.grid, &state.current.shifted(0, 1)) {
            state.current = state.current.shifted(0, 1);
        }
        self.commit(state);
        true
    }

    // Write the active piece into the grid, clear lines, score, and bring in the next piece
    fn commit<I>(&mut self, state: &mut PlayerState<I>) -> usize {
        state.grid.stamp(&state.current);
        state.pieces_placed += 1;
        let cleared = clear_lines(state);
        state.lines_cleared += cleared as u32;
        state.score += score_for(cleared);

        state.current = state.next;
        state.next = self.spawn_piece();
        if !fits(&state.grid, &state.current) {
            state.mark_game_over();
        }
        cleared
    }
}
