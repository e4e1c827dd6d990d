//! # Kinematic Body
//!
//! Position, velocity and collision hull of a simulated entity.
//!
//! A body is advanced once per fixed tick. Rendering never reads `position` directly;
//! it interpolates between the position at the start of the tick and the current one.

use cgmath::{Vector3, VectorSpace};

use super::{
    aabb::Aabb,
    collision::{self, CollisionSource},
};

/// Below this squared magnitude an acceleration request is ignored.
const MIN_ACCELERATION_MAGNITUDE_SQUARED: f64 = 0.01;

/// An entity moved by velocity integration and swept collision against the world.
///
/// # Invariants
/// * `aabb` is always the hull of `position` with the body's width, height and depth,
///   `position` being the horizontal centre and vertical minimum of the hull.
/// * `prev_position` is `position` as of the start of the latest tick.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    /// Position at the start of the most recent tick
    pub prev_position: Vector3<f64>,
    /// Current position (horizontal centre, feet height)
    pub position: Vector3<f64>,
    /// Velocity in blocks per tick
    pub velocity: Vector3<f64>,
    /// Whether the last move was a downward move that got stopped
    pub on_ground: bool,
    /// Flying bodies ignore gravity
    pub flying: bool,
    width: f64,
    height: f64,
    depth: f64,
    aabb: Aabb,
}

impl KinematicBody {
    /// Creates a body with the given hull size, standing at `position`.
    pub fn new(width: f64, height: f64, depth: f64, position: Vector3<f64>) -> Self {
        let mut body = Self {
            prev_position: position,
            position,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            on_ground: false,
            flying: false,
            width,
            height,
            depth,
            aabb: Aabb::UNIT,
        };
        body.teleport(position.x, position.y, position.z);
        body
    }

    /// The current collision hull.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Places the body at a new position and rebuilds its hull.
    ///
    /// The previous position is reset as well so the jump is not interpolated.
    pub fn teleport(&mut self, x: f64, y: f64, z: f64) {
        self.position = Vector3::new(x, y, z);
        self.prev_position = self.position;
        let half_width = self.width * 0.5;
        let half_depth = self.depth * 0.5;
        self.aabb = Aabb::of_pos(
            x - half_width,
            y,
            z - half_depth,
            x + half_width,
            y + self.height,
            z + half_depth,
        );
    }

    /// Adds `speed` to the horizontal velocity along the normalized direction `(x, z)`.
    ///
    /// Requests with a near-zero direction are ignored. Repeated calls within one tick
    /// accumulate.
    pub fn accelerate(&mut self, x: f64, z: f64, speed: f64) {
        let magnitude_squared = x * x + z * z;
        if magnitude_squared < MIN_ACCELERATION_MAGNITUDE_SQUARED {
            return;
        }
        let scale = speed / magnitude_squared.sqrt();
        self.velocity.x += x * scale;
        self.velocity.z += z * scale;
    }

    /// Moves the body through the world, stopping at static boxes.
    ///
    /// Every axis whose movement was cut short loses its velocity. Only a clipped
    /// downward move sets `on_ground`; hitting a ceiling clears it.
    pub fn move_and_collide<S: CollisionSource + ?Sized>(
        &mut self,
        world: &S,
        dx: f64,
        dy: f64,
        dz: f64,
    ) {
        let requested = Vector3::new(dx, dy, dz);
        let resolution = collision::sweep(world, self.aabb, requested);
        let clipped = resolution.clipped(requested);

        self.aabb = resolution.aabb;
        self.on_ground = clipped.y && dy < 0.0;

        if clipped.x {
            self.velocity.x = 0.0;
        }
        if clipped.y {
            self.velocity.y = 0.0;
        }
        if clipped.z {
            self.velocity.z = 0.0;
        }

        self.position = Vector3::new(
            (self.aabb.min_x() + self.aabb.max_x()) * 0.5,
            self.aabb.min_y(),
            (self.aabb.min_z() + self.aabb.max_z()) * 0.5,
        );
    }

    /// Records the current position as the start of a new tick.
    pub fn begin_tick(&mut self) {
        self.prev_position = self.position;
    }

    /// Position blended between the last two ticks, `fraction` in `[0, 1)`.
    pub fn interpolated_position(&self, fraction: f64) -> Vector3<f64> {
        self.prev_position.lerp(self.position, fraction)
    }
}
