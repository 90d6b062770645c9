use nalgebra::{Matrix3, Vector3};
use std::fmt;

/// Direction cosines of an image grid in LPS patient space.
///
/// Column `c` is the physical unit vector of voxel axis `c`. Two matrices are
/// only ever compared with exact element-wise equality.
pub type DirectionMatrix = Matrix3<f64>;

// set up enums and structs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    X,
    Y,
    Z,
}

impl Direction {
    /// Patient axes in the order the orientation checks visit them.
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    pub fn to_usize(&self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }
}

/// Offset (X, Y, Z) in millimetres read from one row of the transforms table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl TranslationVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl fmt::Display for TranslationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
