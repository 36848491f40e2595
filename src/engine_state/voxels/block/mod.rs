//! # Block Module
//!
//! Static per-type block attributes: atlas tiles for each face, the render pass the block
//! is drawn in, and its physics/interaction flags.
//!
//! The table is built at compile time and indexed by [`BlockId`] discriminant, so lookups
//! are total and never fail at runtime.

pub use block_flags::BlockFlags;
use block_side::BlockSide;
use block_type::BlockId;

pub mod block_flags;
pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Render pass a block's geometry is bucketed into.
///
/// Passes are drawn in declaration order: every opaque chunk mesh first, then every
/// transparent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderPass {
    /// Drawn with blending disabled and depth writes on.
    Opaque = 0,
    /// Alpha-blended, depth-tested without depth writes.
    Transparent = 1,
}

impl ShaderPass {
    /// Number of render passes.
    pub const COUNT: usize = 2;
    /// All passes in draw order.
    pub const ALL: [ShaderPass; Self::COUNT] = [ShaderPass::Opaque, ShaderPass::Transparent];

    /// Index into per-pass arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Immutable rendering and physics attributes of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockData {
    /// Atlas tile for the top face
    pub tex_top: u32,
    /// Atlas tile for the four vertical faces
    pub tex_side: u32,
    /// Atlas tile for the bottom face
    pub tex_bottom: u32,
    /// Pass the geometry is drawn in
    pub pass: ShaderPass,
    /// Capabilities
    pub flags: BlockFlags,
}

impl BlockData {
    const fn new(
        tex_top: u32,
        tex_side: u32,
        tex_bottom: u32,
        pass: ShaderPass,
        flags: BlockFlags,
    ) -> Self {
        Self {
            tex_top,
            tex_side,
            tex_bottom,
            pass,
            flags,
        }
    }

    const fn solid(tex_top: u32, tex_side: u32, tex_bottom: u32) -> Self {
        Self::new(
            tex_top,
            tex_side,
            tex_bottom,
            ShaderPass::Opaque,
            BlockFlags::empty(),
        )
    }

    /// Looks up the attributes of `id`.
    pub fn get(id: BlockId) -> &'static BlockData {
        &BLOCK_DATA[id as usize]
    }

    /// Atlas tile used for the given face.
    pub fn texture_for(&self, side: BlockSide) -> u32 {
        match side {
            BlockSide::Top => self.tex_top,
            BlockSide::Bottom => self.tex_bottom,
            _ => self.tex_side,
        }
    }

    /// Whether the player collides with this block.
    pub fn is_solid(&self) -> bool {
        !self.flags.contains(BlockFlags::NO_PHYSICS)
    }
}

/// Block attributes indexed by [`BlockId`] discriminant.
pub static BLOCK_DATA: [BlockData; BlockId::COUNT] = [
    // Empty
    BlockData::new(
        0,
        0,
        0,
        ShaderPass::Opaque,
        BlockFlags::NO_PHYSICS.union(BlockFlags::NO_RAYCAST),
    ),
    // Stone
    BlockData::solid(1, 1, 1),
    // Dirt
    BlockData::solid(2, 2, 2),
    // Grass
    BlockData::solid(0, 3, 2),
    // Water
    BlockData::new(
        205,
        205,
        205,
        ShaderPass::Transparent,
        BlockFlags::NO_PHYSICS
            .union(BlockFlags::NO_RAYCAST)
            .union(BlockFlags::GRAVITY_WATER),
    ),
    // Log
    BlockData::solid(21, 20, 21),
    // Planks
    BlockData::solid(4, 4, 4),
    // Sand
    BlockData::solid(18, 18, 18),
];
