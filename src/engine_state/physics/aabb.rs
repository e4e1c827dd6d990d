//! # Axis-Aligned Bounding Box
//!
//! The `Aabb` is the only collision primitive used by the engine. Every block shape,
//! world border and entity hull is expressed as one.
//!
//! ## Invariants
//!
//! * `min <= max` on every axis. All constructors route through [`Aabb::of_pos`], which
//!   normalizes reversed pairs, so an inverted box can never exist.
//! * Boxes are immutable values. Every operation returns a new box.

/// An axis-aligned bounding box in world space, stored in double precision.
///
/// # Examples
///
/// ```
/// use voxel_client::engine_state::physics::Aabb;
///
/// let block = Aabb::of_pos(1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
/// assert_eq!(block.min_x(), 0.0);
/// assert_eq!(block.max_x(), 1.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    min_x: f64,
    min_y: f64,
    min_z: f64,
    max_x: f64,
    max_y: f64,
    max_z: f64,
}

impl Aabb {
    /// The unit cube `[0,1]³`, the collision and outline shape of every solid block.
    pub const UNIT: Aabb = Aabb {
        min_x: 0.0,
        min_y: 0.0,
        min_z: 0.0,
        max_x: 1.0,
        max_y: 1.0,
        max_z: 1.0,
    };

    /// Creates a box from two corners, swapping any reversed pair.
    pub fn of_pos(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            min_z: min_z.min(max_z),
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
            max_z: max_z.max(min_z),
        }
    }

    /// Creates a box from a corner and a size along each axis.
    pub fn of_size(x: f64, y: f64, z: f64, size_x: f64, size_y: f64, size_z: f64) -> Self {
        Self::of_pos(x, y, z, x + size_x, y + size_y, z + size_z)
    }

    /// Creates a box from a centre and half extents.
    pub fn of_extents(x: f64, y: f64, z: f64, extent_x: f64, extent_y: f64, extent_z: f64) -> Self {
        Self::of_pos(
            x - extent_x,
            y - extent_y,
            z - extent_z,
            x + extent_x,
            y + extent_y,
            z + extent_z,
        )
    }

    /// Grows every face outwards by the given amounts. Negative amounts shrink the box.
    pub fn grow(&self, x: f64, y: f64, z: f64) -> Self {
        Self::of_pos(
            self.min_x - x,
            self.min_y - y,
            self.min_z - z,
            self.max_x + x,
            self.max_y + y,
            self.max_z + z,
        )
    }

    /// Extends only the faces lying in the direction of a pending movement.
    ///
    /// A positive component grows the max face of that axis, a negative one the min
    /// face. The result is the sweep volume of the box over the movement.
    pub fn expand(&self, x: f64, y: f64, z: f64) -> Self {
        let (mut min_x, mut min_y, mut min_z) = (self.min_x, self.min_y, self.min_z);
        let (mut max_x, mut max_y, mut max_z) = (self.max_x, self.max_y, self.max_z);

        if x < 0.0 {
            min_x += x;
        } else if x > 0.0 {
            max_x += x;
        }
        if y < 0.0 {
            min_y += y;
        } else if y > 0.0 {
            max_y += y;
        }
        if z < 0.0 {
            min_z += z;
        } else if z > 0.0 {
            max_z += z;
        }

        Self::of_pos(min_x, min_y, min_z, max_x, max_y, max_z)
    }

    /// Translates the box.
    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        Self::of_pos(
            self.min_x + x,
            self.min_y + y,
            self.min_z + z,
            self.max_x + x,
            self.max_y + y,
            self.max_z + z,
        )
    }

    /// Returns `true` when the box has zero extent on at least one axis.
    ///
    /// Degenerate boxes never clip a movement.
    pub fn is_degenerate(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y || self.min_z >= self.max_z
    }

    /// Strict overlap test on all three axes. Touching faces do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
            && self.min_z < other.max_z
            && self.max_z > other.min_z
    }

    /// Clips the x movement of `moving` against this obstacle.
    ///
    /// The result never changes sign and never grows in magnitude.
    pub fn clip_x_collide(&self, moving: &Aabb, movement: f64) -> f64 {
        if self.is_degenerate() {
            return movement;
        }
        // broad phase on the two other axes
        if !(self.min_y < moving.max_y
            && self.max_y > moving.min_y
            && self.min_z < moving.max_z
            && self.max_z > moving.min_z)
        {
            return movement;
        }
        if movement > 0.0 && self.min_x >= moving.max_x {
            return movement.min(self.min_x - moving.max_x);
        }
        if movement < 0.0 && self.max_x <= moving.min_x {
            return movement.max(self.max_x - moving.min_x);
        }
        movement
    }

    /// Clips the y movement of `moving` against this obstacle.
    ///
    /// See [`Aabb::clip_x_collide`].
    pub fn clip_y_collide(&self, moving: &Aabb, movement: f64) -> f64 {
        if self.is_degenerate() {
            return movement;
        }
        if !(self.min_x < moving.max_x
            && self.max_x > moving.min_x
            && self.min_z < moving.max_z
            && self.max_z > moving.min_z)
        {
            return movement;
        }
        if movement > 0.0 && self.min_y >= moving.max_y {
            return movement.min(self.min_y - moving.max_y);
        }
        if movement < 0.0 && self.max_y <= moving.min_y {
            return movement.max(self.max_y - moving.min_y);
        }
        movement
    }

    /// Clips the z movement of `moving` against this obstacle.
    ///
    /// See [`Aabb::clip_x_collide`].
    pub fn clip_z_collide(&self, moving: &Aabb, movement: f64) -> f64 {
        if self.is_degenerate() {
            return movement;
        }
        if !(self.min_x < moving.max_x
            && self.max_x > moving.min_x
            && self.min_y < moving.max_y
            && self.max_y > moving.min_y)
        {
            return movement;
        }
        if movement > 0.0 && self.min_z >= moving.max_z {
            return movement.min(self.min_z - moving.max_z);
        }
        if movement < 0.0 && self.max_z <= moving.min_z {
            return movement.max(self.max_z - moving.min_z);
        }
        movement
    }

    /// Minimum x coordinate.
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Minimum y coordinate.
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Minimum z coordinate.
    pub fn min_z(&self) -> f64 {
        self.min_z
    }

    /// Maximum x coordinate.
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Maximum y coordinate.
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Maximum z coordinate.
    pub fn max_z(&self) -> f64 {
        self.max_z
    }
}
