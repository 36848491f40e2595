//! # Voxel Raycast
//!
//! Walks a ray through the block grid and lists every cell it enters, nearest first.
//!
//! Each axis is traversed on its own: the ray crosses the integer planes `x = k` (and
//! likewise for y and z) at evenly spaced parameters, and every crossing enters exactly one
//! new cell. The candidates of the three axes are then merged by their distance from the
//! origin. Two crossings at the same distance (the ray passing exactly through a lattice edge
//! or corner) collapse into one entry, and the later axis in x, y, z order wins.

use std::cmp::Ordering;

use cgmath::{Point3, Vector3};

/// A cell entered by the ray, keyed by the distance of the crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Crossing {
    distance: f64,
    cell: Point3<i32>,
}

/// Returns the cells crossed by the ray from `origin` along `direction`, in ascending
/// distance, up to `max_distance`.
///
/// `direction` need not be normalized; distances are measured in world units along the ray.
/// The cell containing `origin` is not part of the result unless the origin lies exactly on
/// one of its lower planes in the direction of travel.
///
/// Returns an empty sequence for a zero direction, any non-finite input, or a negative
/// `max_distance`.
pub fn raycast(
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Vec<Point3<i32>> {
    let origin = [f64::from(origin.x), f64::from(origin.y), f64::from(origin.z)];
    let direction = [
        f64::from(direction.x),
        f64::from(direction.y),
        f64::from(direction.z),
    ];
    let max_distance = f64::from(max_distance);

    let finite = origin.iter().chain(&direction).all(|v| v.is_finite());
    if !finite || !max_distance.is_finite() || max_distance < 0.0 {
        return Vec::new();
    }

    let length = direction.iter().map(|v| v * v).sum::<f64>().sqrt();
    if length == 0.0 {
        return Vec::new();
    }

    let mut crossings = Vec::new();
    for axis in 0..3 {
        axis_crossings(axis, origin, direction, length, max_distance, &mut crossings);
    }

    // Stable, so crossings at equal distances stay in axis order.
    crossings.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut merged: Vec<Crossing> = Vec::with_capacity(crossings.len());
    for crossing in crossings {
        match merged.last_mut() {
            Some(last) if last.distance.total_cmp(&crossing.distance) == Ordering::Equal => {
                *last = crossing;
            }
            _ => merged.push(crossing),
        }
    }

    merged.into_iter().map(|crossing| crossing.cell).collect()
}

fn axis_crossings(
    axis: usize,
    origin: [f64; 3],
    direction: [f64; 3],
    length: f64,
    max_distance: f64,
    out: &mut Vec<Crossing>,
) {
    let d = direction[axis];
    if d == 0.0 {
        return;
    }

    let step: i64 = if d > 0.0 { 1 } else { -1 };
    let mut plane = if d > 0.0 {
        origin[axis].ceil() as i64
    } else {
        origin[axis].floor() as i64
    };

    loop {
        let t = (plane as f64 - origin[axis]) / d;
        let distance = t * length;
        if distance > max_distance {
            break;
        }

        let mut cell = [0i32; 3];
        for (other, coordinate) in cell.iter_mut().enumerate() {
            *coordinate = if other == axis {
                (if step > 0 { plane } else { plane - 1 }) as i32
            } else {
                entered_cell(origin[other] + direction[other] * t, direction[other])
            };
        }

        out.push(Crossing {
            distance,
            cell: Point3::new(cell[0], cell[1], cell[2]),
        });
        plane += step;
    }
}

/// Cell index along one axis for a coordinate the ray is moving through.
///
/// On an exact integer a ray travelling towards negative values is entering the lower cell.
fn entered_cell(coordinate: f64, direction: f64) -> i32 {
    if direction < 0.0 {
        (coordinate.ceil() - 1.0) as i32
    } else {
        coordinate.floor() as i32
    }
}
