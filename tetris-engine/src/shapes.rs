//! Static tetromino shape catalog
//!
//! Every piece type has a square bounding box (`size`) and four rotation
//! states. Rotation states are derived at compile time from the spawn
//! orientation by turning the bounding box clockwise, so the table below is
//! immutable and never touched at runtime.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed 4x4 cell matrix; only the top-left `size`x`size` block is meaningful
pub type ShapeMatrix = [[bool; 4]; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceType {
    pub const ALL: [PieceType; 7] = [
        PieceType::I,
        PieceType::O,
        PieceType::T,
        PieceType::S,
        PieceType::Z,
        PieceType::J,
        PieceType::L,
    ];

    /// Uniformly random piece type
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    fn index(self) -> usize {
        match self {
            PieceType::I => 0,
            PieceType::O => 1,
            PieceType::T => 2,
            PieceType::S => 3,
            PieceType::Z => 4,
            PieceType::J => 5,
            PieceType::L => 6,
        }
    }

    /// Side of the square bounding box
    pub fn size(self) -> usize {
        match self {
            PieceType::I => 4,
            PieceType::O => 2,
            _ => 3,
        }
    }

    /// Value written into the grid for cells of this type. 0 is reserved for empty.
    pub fn cell_value(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Shape matrix for this type at the given rotation
    pub fn shape(self, rotation: Rotation) -> &'static ShapeMatrix {
        &SHAPES[self.index()][rotation.index()]
    }

    /// Shape matrix as grid values, trimmed to the bounding box
    pub fn preview(self, rotation: Rotation) -> Vec<Vec<u8>> {
        let size = self.size();
        let value = self.cell_value();
        self.shape(rotation)[..size]
            .iter()
            .map(|row| {
                row[..size]
                    .iter()
                    .map(|&filled| if filled { value } else { 0 })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    // Next rotation state clockwise, wrapping after R270
    pub fn rotate_right(&self) -> Rotation {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> u8 {
        rotation.index() as u8
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rotation::R0),
            1 => Ok(Rotation::R90),
            2 => Ok(Rotation::R180),
            3 => Ok(Rotation::R270),
            other => Err(format!("rotation out of range: {}", other)),
        }
    }
}

// Spawn orientations, one bounding box each
const I_R0: ShapeMatrix = [
    [false, false, false, false],
    [true, true, true, true],
    [false, false, false, false],
    [false, false, false, false],
];

const O_R0: ShapeMatrix = [
    [true, true, false, false],
    [true, true, false, false],
    [false, false, false, false],
    [false, false, false, false],
];

const T_R0: ShapeMatrix = [
    [false, true, false, false],
    [true, true, true, false],
    [false, false, false, false],
    [false, false, false, false],
];

const S_R0: ShapeMatrix = [
    [false, true, true, false],
    [true, true, false, false],
    [false, false, false, false],
    [false, false, false, false],
];

const Z_R0: ShapeMatrix = [
    [true, true, false, false],
    [false, true, true, false],
    [false, false, false, false],
    [false, false, false, false],
];

const J_R0: ShapeMatrix = [
    [true, false, false, false],
    [true, true, true, false],
    [false, false, false, false],
    [false, false, false, false],
];

const L_R0: ShapeMatrix = [
    [false, false, true, false],
    [true, true, true, false],
    [false, false, false, false],
    [false, false, false, false],
];

// Turn the size x size bounding box clockwise
const fn rotate_cw(matrix: &ShapeMatrix, size: usize) -> ShapeMatrix {
    let mut out = [[false; 4]; 4];
    let mut y = 0;
    while y < size {
        let mut x = 0;
        while x < size {
            out[y][x] = matrix[size - 1 - x][y];
            x += 1;
        }
        y += 1;
    }
    out
}

const fn rotations(base: ShapeMatrix, size: usize) -> [ShapeMatrix; 4] {
    let r90 = rotate_cw(&base, size);
    let r180 = rotate_cw(&r90, size);
    let r270 = rotate_cw(&r180, size);
    [base, r90, r180, r270]
}

// Indexed by PieceType::index, then Rotation::index
static SHAPES: [[ShapeMatrix; 4]; 7] = [
    rotations(I_R0, 4),
    rotations(O_R0, 2),
    rotations(T_R0, 3),
    rotations(S_R0, 3),
    rotations(Z_R0, 3),
    rotations(J_R0, 3),
    rotations(L_R0, 3),
];
