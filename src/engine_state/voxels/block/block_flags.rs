use bitflags::bitflags;

bitflags! {
    /// Physics and interaction capabilities of a block type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u8 {
        /// The player passes through the block.
        const NO_PHYSICS = 1 << 0;
        /// Raycasts skip the block, so it cannot be broken.
        const NO_RAYCAST = 1 << 1;
        /// Standing in the block damps vertical velocity and allows swimming.
        const GRAVITY_WATER = 1 << 2;
    }
}
