//! # Block Side Module
//!
//! The six axis-aligned faces of a voxel, with the neighbour offset used for culling and
//! the unit-cube basis used to emit the face quad.

use cgmath::Vector3;

/// One of the six faces of a voxel block.
///
/// The order is: [Front, Back, Bottom, Top, Left, Right]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    Front = 0,
    /// The back face (facing negative Z)
    Back = 1,
    /// The bottom face (facing negative Y)
    Bottom = 2,
    /// The top face (facing positive Y)
    Top = 3,
    /// The left face (facing negative X)
    Left = 4,
    /// The right face (facing positive X)
    Right = 5,
}

/// Corner and edge vectors of a face on the unit cube at the origin.
///
/// Corners are `origin`, `origin + right`, `origin + up` and `origin + up + right`.
/// `up × right` points out of the block, which makes the `(BL, UL, UR)`, `(BL, UR, BR)`
/// index order counter-clockwise when viewed from outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBasis {
    /// Bottom-left corner
    pub origin: Vector3<f32>,
    /// Edge from bottom-left to upper-left
    pub up: Vector3<f32>,
    /// Edge from bottom-left to bottom-right
    pub right: Vector3<f32>,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Bottom,
            BlockSide::Top,
            BlockSide::Left,
            BlockSide::Right,
        ]
    }

    /// Offset from a block to the neighbour this face touches.
    pub fn neighbour_offset(self) -> Vector3<i32> {
        match self {
            BlockSide::Front => Vector3::new(0, 0, 1),
            BlockSide::Back => Vector3::new(0, 0, -1),
            BlockSide::Bottom => Vector3::new(0, -1, 0),
            BlockSide::Top => Vector3::new(0, 1, 0),
            BlockSide::Left => Vector3::new(-1, 0, 0),
            BlockSide::Right => Vector3::new(1, 0, 0),
        }
    }

    /// Whether this face runs vertically, so its up edge follows the block height.
    pub fn is_vertical(self) -> bool {
        !matches!(self, BlockSide::Top | BlockSide::Bottom)
    }

    /// Face basis on a unit cube whose height has been scaled by `height`.
    ///
    /// The bottom face ignores `height`; the top face is lowered to it and the vertical faces
    /// are shortened to it.
    pub fn basis(self, height: f32) -> FaceBasis {
        let up_y = Vector3::new(0.0, height, 0.0);
        match self {
            BlockSide::Front => FaceBasis {
                origin: Vector3::new(1.0, 0.0, 1.0),
                up: up_y,
                right: Vector3::new(-1.0, 0.0, 0.0),
            },
            BlockSide::Back => FaceBasis {
                origin: Vector3::new(0.0, 0.0, 0.0),
                up: up_y,
                right: Vector3::new(1.0, 0.0, 0.0),
            },
            BlockSide::Bottom => FaceBasis {
                origin: Vector3::new(0.0, 0.0, 1.0),
                up: Vector3::new(0.0, 0.0, -1.0),
                right: Vector3::new(1.0, 0.0, 0.0),
            },
            BlockSide::Top => FaceBasis {
                origin: Vector3::new(0.0, height, 0.0),
                up: Vector3::new(0.0, 0.0, 1.0),
                right: Vector3::new(1.0, 0.0, 0.0),
            },
            BlockSide::Left => FaceBasis {
                origin: Vector3::new(0.0, 0.0, 1.0),
                up: up_y,
                right: Vector3::new(0.0, 0.0, -1.0),
            },
            BlockSide::Right => FaceBasis {
                origin: Vector3::new(1.0, 0.0, 0.0),
                up: up_y,
                right: Vector3::new(0.0, 0.0, 1.0),
            },
        }
    }
}
