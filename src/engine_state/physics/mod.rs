//! # Physics Module
//!
//! Axis-aligned boxes, swept collision against a static world, and the kinematic
//! bodies moved through it once per fixed tick.
//!
//! ## Key Components
//!
//! * `Aabb` - Immutable axis-aligned box with per-axis clipping
//! * `collision` - Y, then X, then Z resolution of a displacement
//! * `KinematicBody` - Velocity integration and ground detection
//! * `PlayerEntity` - Input-driven motion of the local player

pub mod aabb;
pub mod body;
pub mod collision;
pub mod player;

pub use aabb::Aabb;
pub use body::KinematicBody;
pub use collision::CollisionSource;
pub use player::{MotionProfile, MovementIntent, PlayerEntity};
