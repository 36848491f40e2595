//! # Block Type Module
//!
//! The closed set of block identifiers stored in chunks.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Identifies the type of a voxel.
///
/// The discriminant doubles as the index into the block registry, so adding a variant means
/// adding a row to [`super::BLOCK_DATA`] at the same position.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize,
)]
pub enum BlockId {
    /// Nothing. Never meshed, walked through and ignored by raycasts.
    #[default]
    Empty = 0,
    /// Bottom terrain layer.
    Stone = 1,
    /// Middle terrain layer.
    Dirt = 2,
    /// Surface block above the water table.
    Grass = 3,
    /// Translucent liquid filling low columns.
    Water = 4,
    /// Tree trunk, also used for generated pockets.
    Log = 5,
    /// Wooden planks.
    Planks = 6,
    /// Sand.
    Sand = 7,
}

impl BlockId {
    /// Number of block types.
    pub const COUNT: usize = 8;

    /// Every block type in discriminant order.
    pub const ALL: [BlockId; Self::COUNT] = [
        BlockId::Empty,
        BlockId::Stone,
        BlockId::Dirt,
        BlockId::Grass,
        BlockId::Water,
        BlockId::Log,
        BlockId::Planks,
        BlockId::Sand,
    ];

    /// Converts a raw integer into a block id, returning `None` for unknown values.
    pub fn from_raw(raw: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(raw)
    }

    /// Returns `true` for [`BlockId::Empty`].
    pub fn is_empty(self) -> bool {
        self == BlockId::Empty
    }
}
