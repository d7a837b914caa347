//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with the fixed
//! geometry attached to each of them: the direction of the neighboring cell,
//! the outward normal and the rotation that orients the shared unit quad.
//!
//! The unit quad used by the renderer lies in the plane `z = -0.5` of a block
//! centered on its origin, so an unrotated quad is the FRONT (-Z) face.

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};

/// Represents the six possible faces of a voxel block.
///
/// The discriminants match the order of the per-face texture tables in the
/// block registry: [FRONT, BACK, LEFT, RIGHT, TOP, BOTTOM]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing negative Z)
    FRONT = 0,

    /// The back face (facing positive Z)
    BACK = 1,

    /// The left face (facing negative X)
    LEFT = 2,

    /// The right face (facing positive X)
    RIGHT = 3,

    /// The top face (facing positive Y)
    TOP = 4,

    /// The bottom face (facing negative Y)
    BOTTOM = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
        ]
    }

    /// Offset from a cell to the neighboring cell this face looks at.
    pub fn neighbor_offset(self) -> (i32, i32, i32) {
        match self {
            BlockSide::FRONT => (0, 0, -1),
            BlockSide::BACK => (0, 0, 1),
            BlockSide::LEFT => (-1, 0, 0),
            BlockSide::RIGHT => (1, 0, 0),
            BlockSide::TOP => (0, 1, 0),
            BlockSide::BOTTOM => (0, -1, 0),
        }
    }

    /// Outward unit normal of the face.
    pub fn normal(self) -> Vector3<f32> {
        let (x, y, z) = self.neighbor_offset();
        Vector3::new(x as f32, y as f32, z as f32)
    }

    /// Rotation that turns the FRONT-facing unit quad into this face.
    ///
    /// FRONT is the identity, BACK a half turn about Y, LEFT/RIGHT a quarter
    /// turn about Y and TOP/BOTTOM a quarter turn about X.
    pub fn rotation(self) -> Matrix4<f32> {
        match self {
            BlockSide::FRONT => Matrix4::identity(),
            BlockSide::BACK => Matrix4::from_angle_y(Deg(180.0)),
            BlockSide::LEFT => Matrix4::from_angle_y(Deg(90.0)),
            BlockSide::RIGHT => Matrix4::from_angle_y(Deg(-90.0)),
            BlockSide::TOP => Matrix4::from_angle_x(Deg(90.0)),
            BlockSide::BOTTOM => Matrix4::from_angle_x(Deg(-90.0)),
        }
    }

    /// Whether the face is one of the four vertical walls of the block.
    pub fn is_horizontal(self) -> bool {
        !matches!(self, BlockSide::TOP | BlockSide::BOTTOM)
    }
}
