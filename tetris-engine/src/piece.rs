use serde::{Deserialize, Serialize};

use crate::shapes::{PieceType, Rotation};

/// Column of the bounding box's left edge for freshly spawned pieces
pub const SPAWN_X: i32 = 3;
/// Row of the bounding box's top edge for freshly spawned pieces
pub const SPAWN_Y: i32 = 0;

/// Top-left corner of a piece's bounding box in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Position::new(self.x + dx, self.y + dy)
    }
}

/// Falling tetromino. Plain value: copies never alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceType,
    pub rotation: Rotation,
    pub position: Position,
}

impl Piece {
    pub fn new(kind: PieceType, rotation: Rotation, position: Position) -> Self {
        Piece {
            kind,
            rotation,
            position,
        }
    }

    /// Piece of the given type at the standard spawn position
    pub fn spawn(kind: PieceType) -> Self {
        Piece::new(kind, Rotation::R0, Position::new(SPAWN_X, SPAWN_Y))
    }

    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        Piece {
            position: self.position.offset(dx, dy),
            ..self
        }
    }

    pub fn rotated_right(self) -> Self {
        Piece {
            rotation: self.rotation.rotate_right(),
            ..self
        }
    }

    /// Absolute grid coordinates (x, y) of every filled cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        shape_cells(self.kind, self.rotation, self.position)
    }
}

/// Absolute grid coordinates of a shape's filled cells at the given position
pub fn shape_cells(
    kind: PieceType,
    rotation: Rotation,
    position: Position,
) -> impl Iterator<Item = (i32, i32)> {
    let size = kind.size();
    let shape = kind.shape(rotation);
    (0..size).flat_map(move |y| {
        (0..size).filter_map(move |x| {
            shape[y][x].then(|| (position.x + x as i32, position.y + y as i32))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(PieceType::T);
        assert_eq!(piece.rotation, Rotation::R0);
        assert_eq!(piece.position, Position::new(3, 0));
        let cells: Vec<_> = piece.cells().collect();
        assert_eq!(cells, vec![(4, 0), (3, 1), (4, 1), (5, 1)]);
    }

    #[test]
    fn test_copies_do_not_alias() {
        let original = Piece::spawn(PieceType::L);
        let mut copy = original;
        copy.position.x -= 2;
        assert_eq!(original.position.x, 3);
        assert_eq!(copy.shifted(1, 1).position, Position::new(2, 1));
    }

    #[test]
    fn test_wire_format() {
        let piece = Piece::new(PieceType::J, Rotation::R180, Position::new(-1, 5));
        let json = serde_json::to_value(piece).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "J", "rotation": 2, "position": {"x": -1, "y": 5}})
        );
    }
}
