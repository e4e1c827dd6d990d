//! # Collision Resolution
//!
//! Swept movement of a box through a static obstacle set.
//!
//! ## Algorithm
//!
//! The displacement is resolved one axis at a time in the fixed order Y, X, Z. For each
//! axis the requested component is folded through every obstacle's clip function, which
//! can only shrink it, and the box is translated by whatever survives before the next
//! axis is resolved. Vertical first keeps a falling body from catching on the side of
//! the block it lands on.

use cgmath::Vector3;

use super::aabb::Aabb;

/// Anything that can report the static collision boxes near a region.
///
/// Implemented by the voxel world. Bodies only see the world through this trait.
pub trait CollisionSource {
    /// Returns every static box that could intersect `region`.
    fn collision_boxes(&self, region: &Aabb) -> Vec<Aabb>;
}

impl CollisionSource for [Aabb] {
    fn collision_boxes(&self, region: &Aabb) -> Vec<Aabb> {
        self.iter()
            .filter(|aabb| aabb.intersects(region))
            .copied()
            .collect()
    }
}

/// Outcome of resolving one movement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The moving box after the permitted displacement has been applied
    pub aabb: Aabb,
    /// The displacement that was actually permitted, per axis
    pub permitted: Vector3<f64>,
}

impl Resolution {
    /// Per-axis flags telling whether the requested component was cut short.
    pub fn clipped(&self, requested: Vector3<f64>) -> Vector3<bool> {
        Vector3::new(
            requested.x != self.permitted.x,
            requested.y != self.permitted.y,
            requested.z != self.permitted.z,
        )
    }
}

/// Moves `moving` by `requested` through `obstacles`, resolving Y, then X, then Z.
pub fn resolve(moving: Aabb, obstacles: &[Aabb], requested: Vector3<f64>) -> Resolution {
    let mut aabb = moving;

    let dy = obstacles
        .iter()
        .fold(requested.y, |dy, obstacle| obstacle.clip_y_collide(&aabb, dy));
    aabb = aabb.translate(0.0, dy, 0.0);

    let dx = obstacles
        .iter()
        .fold(requested.x, |dx, obstacle| obstacle.clip_x_collide(&aabb, dx));
    aabb = aabb.translate(dx, 0.0, 0.0);

    let dz = obstacles
        .iter()
        .fold(requested.z, |dz, obstacle| obstacle.clip_z_collide(&aabb, dz));
    aabb = aabb.translate(0.0, 0.0, dz);

    Resolution {
        aabb,
        permitted: Vector3::new(dx, dy, dz),
    }
}

/// Gathers obstacles from `source` along the sweep of `moving` and resolves the movement.
pub fn sweep<S: CollisionSource + ?Sized>(
    source: &S,
    moving: Aabb,
    requested: Vector3<f64>,
) -> Resolution {
    let region = moving.expand(requested.x, requested.y, requested.z);
    let obstacles = source.collision_boxes(&region);
    resolve(moving, &obstacles, requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Aabb {
        Aabb::of_pos(-10.0, 0.0, -10.0, 10.0, 1.0, 10.0)
    }

    #[test]
    fn falling_box_stops_on_floor() {
        let body = Aabb::of_size(0.0, 5.0, 0.0, 1.0, 1.0, 1.0);
        let resolution = resolve(body, &[floor()], Vector3::new(0.0, -10.0, 0.0));
        assert_eq!(resolution.permitted.y, -4.0);
        assert_eq!(resolution.aabb.min_y(), 1.0);
    }

    #[test]
    fn no_overshoot_when_moving_one_past_the_gap() {
        let ceiling = Aabb::of_pos(0.0, 10.0, 0.0, 1.0, 11.0, 1.0);
        let body = Aabb::of_size(0.0, 6.5, 0.0, 1.0, 1.0, 1.0);
        let distance = 10.0 - body.max_y();
        let resolution = resolve(body, &[ceiling], Vector3::new(0.0, distance + 1.0, 0.0));
        assert_eq!(resolution.permitted.y, distance);
        assert_eq!(resolution.aabb.max_y(), 10.0);
    }

    #[test]
    fn most_restrictive_obstacle_wins() {
        let near = Aabb::of_pos(3.0, 0.0, 0.0, 4.0, 1.0, 1.0);
        let far = Aabb::of_pos(6.0, 0.0, 0.0, 7.0, 1.0, 1.0);
        let body = Aabb::UNIT;
        let resolution = resolve(body, &[far, near], Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(resolution.permitted.x, 2.0);
    }

    #[test]
    fn vertical_is_resolved_before_horizontal() {
        // Moving down and right onto the corner of a block. Y lands the body on top of
        // the block, after which X no longer overlaps it vertically and stays free.
        let block = Aabb::of_pos(1.0, 0.0, 0.0, 2.0, 1.0, 1.0);
        let body = Aabb::of_size(0.5, 1.5, 0.0, 1.0, 1.0, 1.0);
        let requested = Vector3::new(0.5, -1.0, 0.0);
        let resolution = resolve(body, &[block], requested);
        assert_eq!(resolution.permitted.y, -0.5);
        assert_eq!(resolution.permitted.x, 0.5);
        assert_eq!(resolution.clipped(requested), Vector3::new(false, true, false));
    }

    #[test]
    fn wall_only_clips_its_axis() {
        let wall = Aabb::of_pos(2.0, -10.0, -10.0, 3.0, 10.0, 10.0);
        let body = Aabb::UNIT;
        let requested = Vector3::new(5.0, 0.0, 3.0);
        let resolution = resolve(body, &[wall], requested);
        assert_eq!(resolution.permitted, Vector3::new(1.0, 0.0, 3.0));
        assert_eq!(resolution.clipped(requested), Vector3::new(true, false, false));
    }

    #[test]
    fn sweep_uses_source_query() {
        let obstacles = [floor(), Aabb::of_pos(50.0, 0.0, 50.0, 51.0, 100.0, 51.0)];
        let body = Aabb::of_size(0.0, 3.0, 0.0, 1.0, 1.0, 1.0);
        let resolution = sweep(&obstacles[..], body, Vector3::new(0.0, -5.0, 0.0));
        assert_eq!(resolution.aabb.min_y(), 1.0);
    }
}
