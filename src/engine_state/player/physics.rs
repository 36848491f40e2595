//! Grid sample points used by player physics.
//!
//! The player is not a volume. It samples individual points against the block grid and
//! reacts per point: one sample below the feet for ground and liquid, and a fixed ring of
//! eight samples at hip and head height for walls.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::{
    block::{BlockData, BlockFlags},
    world::World,
};

/// Offsets sampled for wall collisions, relative to the player's feet.
///
/// Each offset points along exactly one horizontal axis. A hit cancels the velocity along
/// that axis. They are checked in this order.
pub const COLLISION_SAMPLES: [Vector3<f32>; 8] = [
    Vector3::new(-0.3, 0.5, 0.0),
    Vector3::new(0.0, 0.5, -0.3),
    Vector3::new(0.3, 0.5, 0.0),
    Vector3::new(0.0, 0.5, 0.3),
    Vector3::new(-0.3, 1.5, 0.0),
    Vector3::new(0.0, 1.5, -0.3),
    Vector3::new(0.3, 1.5, 0.0),
    Vector3::new(0.0, 1.5, 0.3),
];

/// Horizontal axis a wall hit cancels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionAxis {
    /// Cancel `velocity.x`
    X,
    /// Cancel `velocity.z`
    Z,
}

impl CollisionAxis {
    /// Axis a sample offset points along.
    pub fn of_sample(offset: Vector3<f32>) -> Self {
        if offset.z == 0.0 {
            CollisionAxis::X
        } else {
            CollisionAxis::Z
        }
    }
}

/// Grid cell containing a continuous position.
pub fn cell_of(point: Point3<f32>) -> Point3<i32> {
    Point3::new(
        point.x.floor() as i32,
        point.y.floor() as i32,
        point.z.floor() as i32,
    )
}

/// Flags of the block containing `point`, or `None` outside the world.
pub fn flags_at(world: &World, point: Point3<f32>) -> Option<BlockFlags> {
    world
        .get_block_at(cell_of(point))
        .map(|id| BlockData::get(id).flags)
}

/// Whether the block containing `point` stops the player. Cells outside the world never do.
pub fn is_solid_at(world: &World, point: Point3<f32>) -> bool {
    flags_at(world, point).is_some_and(|flags| !flags.contains(BlockFlags::NO_PHYSICS))
}

/// Cancels velocity components that would carry a collision sample into a solid block.
///
/// Samples are resolved one after another, so a component cancelled by an earlier sample
/// stays cancelled for the later ones.
pub fn resolve_collisions(
    world: &World,
    position: Point3<f32>,
    velocity: &mut Vector3<f32>,
    dt: f32,
) {
    for offset in COLLISION_SAMPLES {
        let sample = position + *velocity * dt + offset;
        if !is_solid_at(world, sample) {
            continue;
        }

        match CollisionAxis::of_sample(offset) {
            CollisionAxis::X => velocity.x = 0.0,
            CollisionAxis::Z => velocity.z = 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockId;

    #[test]
    fn every_sample_points_along_one_horizontal_axis() {
        for offset in COLLISION_SAMPLES {
            assert!(
                (offset.x == 0.0) != (offset.z == 0.0),
                "{offset:?} must have exactly one horizontal component"
            );
        }
        assert_eq!(
            COLLISION_SAMPLES
                .iter()
                .filter(|offset| CollisionAxis::of_sample(**offset) == CollisionAxis::X)
                .count(),
            4
        );
    }

    #[test]
    fn negative_positions_floor_downwards() {
        assert_eq!(cell_of(Point3::new(-0.2, 0.0, 1.9)), Point3::new(-1, 0, 1));
    }

    #[test]
    fn water_and_air_are_not_solid() {
        let mut world = World::new(1);
        world.set_block(1, 1, 1, BlockId::Water);
        world.set_block(2, 1, 1, BlockId::Stone);

        assert!(!is_solid_at(&world, Point3::new(1.5, 1.5, 1.5)));
        assert!(!is_solid_at(&world, Point3::new(3.5, 1.5, 1.5)));
        assert!(is_solid_at(&world, Point3::new(2.5, 1.5, 1.5)));
        assert!(!is_solid_at(&world, Point3::new(-4.0, 1.5, 1.5)));
        assert!(flags_at(&world, Point3::new(1.5, 1.5, 1.5))
            .is_some_and(|flags| flags.contains(BlockFlags::GRAVITY_WATER)));
    }

    #[test]
    fn wall_hit_cancels_only_the_blocked_axis() {
        let mut world = World::new(1);
        world.set_block(6, 1, 4, BlockId::Stone);
        let mut velocity = Vector3::new(10.0, 0.0, 3.0);

        resolve_collisions(&world, Point3::new(5.3, 1.0, 4.5), &mut velocity, 0.05);

        assert_eq!(velocity.x, 0.0);
        assert_eq!(velocity.z, 3.0);
    }
}
