use crate::grid::{Grid, Line};
use crate::piece::Piece;

/// Per-player simulation state. Only the engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState<I> {
    pub id: I,
    pub grid: Grid,
    pub current: Piece,
    pub next: Piece,
    pub score: u32,
    pub lines_cleared: u32,
    /// Pieces written into the grid so far
    pub pieces_placed: u32,
    // Once set it is never cleared
    game_over: bool,
    /// Rows cleared since the last transfer, oldest first
    pub pending_lines: Vec<Line>,
}

impl<I> PlayerState<I> {
    pub fn new(id: I, current: Piece, next: Piece) -> Self {
        PlayerState {
            id,
            grid: Grid::new(),
            current,
            next,
            score: 0,
            lines_cleared: 0,
            pieces_placed: 0,
            game_over: false,
            pending_lines: Vec::new(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Flag the player as out. There is no way back.
    pub fn mark_game_over(&mut self) {
        self.game_over = true;
    }

    /// Hand over the captured rows, leaving the buffer empty
    pub fn take_pending_lines(&mut self) -> Vec<Line> {
        std::mem::take(&mut self.pending_lines)
    }

    /// Resting grid with the active piece drawn on a copy
    pub fn rendered_grid(&self) -> Grid {
        self.grid.with_piece(&self.current)
    }
}
