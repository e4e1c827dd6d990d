//! # Player Motion
//!
//! Turns one tick of movement input into velocity changes on the player's body.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use super::{body::KinematicBody, collision::CollisionSource};

/// Tuning constants for player movement, all in blocks per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    /// Acceleration while flying
    pub fly_speed: f64,
    /// Acceleration while standing on the ground
    pub ground_speed: f64,
    /// Acceleration while airborne
    pub air_speed: f64,
    /// Vertical velocity set by a jump from the ground
    pub jump_velocity: f64,
    /// Vertical velocity set by the ascend and descend keys while flying
    pub fly_vertical_velocity: f64,
    /// Subtracted from the vertical velocity every tick unless flying
    pub gravity: f64,
    /// Horizontal damping applied after every move
    pub horizontal_damping: f64,
    /// Vertical damping applied after every move while walking
    pub vertical_damping: f64,
    /// Vertical damping applied after every move while flying
    pub fly_vertical_damping: f64,
    /// Extra horizontal damping while standing on the ground
    pub ground_friction: f64,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            fly_speed: 0.07,
            ground_speed: 0.1,
            air_speed: 0.02,
            jump_velocity: 0.5,
            fly_vertical_velocity: 0.2,
            gravity: 0.08,
            horizontal_damping: 0.91,
            vertical_damping: 0.98,
            fly_vertical_damping: 0.8,
            ground_friction: 0.7,
        }
    }
}

/// Movement requested by the player for a single tick.
///
/// `strafe` runs along the X axis and `forward` along the Z axis, so walking away
/// from the viewer is a negative `forward`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementIntent {
    /// -1 for left, 1 for right
    pub strafe: f64,
    /// -1 for into the screen, 1 for out of it
    pub forward: f64,
    /// Jump, or ascend while flying
    pub jump: bool,
    /// Descend while flying
    pub descend: bool,
}

/// The locally controlled player.
#[derive(Debug, Clone)]
pub struct PlayerEntity {
    /// The simulated body
    pub body: KinematicBody,
    profile: MotionProfile,
}

impl PlayerEntity {
    /// Creates a player whose body has the given hull, standing at `spawn`.
    pub fn new(size: Vector3<f64>, spawn: Vector3<f64>, profile: MotionProfile) -> Self {
        Self {
            body: KinematicBody::new(size.x, size.y, size.z, spawn),
            profile,
        }
    }

    /// Flips between flying and walking.
    pub fn toggle_flying(&mut self) {
        self.body.flying = !self.body.flying;
        log::debug!("Flying: {}", self.body.flying);
    }

    fn speed_factor(&self) -> f64 {
        if self.body.flying {
            self.profile.fly_speed
        } else if self.body.on_ground {
            self.profile.ground_speed
        } else {
            self.profile.air_speed
        }
    }

    /// Advances the player by one fixed tick.
    ///
    /// # Arguments
    ///
    /// * `world` - Source of the static boxes the body collides with
    /// * `intent` - Input sampled for this tick
    pub fn tick<S: CollisionSource + ?Sized>(&mut self, world: &S, intent: MovementIntent) {
        let profile = &self.profile;
        let speed = self.speed_factor();
        let body = &mut self.body;

        body.begin_tick();

        if body.flying {
            if intent.descend {
                body.velocity.y = -profile.fly_vertical_velocity;
            }
            if intent.jump {
                body.velocity.y = profile.fly_vertical_velocity;
            }
        } else if body.on_ground && intent.jump {
            body.velocity.y = profile.jump_velocity;
        }

        body.accelerate(intent.strafe, intent.forward, speed);

        if !body.flying {
            body.velocity.y -= profile.gravity;
        }

        let velocity = body.velocity;
        body.move_and_collide(world, velocity.x, velocity.y, velocity.z);

        let vertical_damping = if body.flying {
            profile.fly_vertical_damping
        } else {
            profile.vertical_damping
        };
        body.velocity.x *= profile.horizontal_damping;
        body.velocity.y *= vertical_damping;
        body.velocity.z *= profile.horizontal_damping;

        if !body.flying && body.on_ground {
            body.velocity.x *= profile.ground_friction;
            body.velocity.z *= profile.ground_friction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::physics::Aabb;

    fn floor() -> Vec<Aabb> {
        vec![Aabb::of_pos(-64.0, 0.0, -64.0, 64.0, 1.0, 64.0)]
    }

    fn player_at(y: f64) -> PlayerEntity {
        PlayerEntity::new(
            Vector3::new(0.6, 1.8, 0.6),
            Vector3::new(0.5, y, 0.5),
            MotionProfile::default(),
        )
    }

    fn settle(player: &mut PlayerEntity, world: &[Aabb]) {
        for _ in 0..100 {
            player.tick(world, MovementIntent::default());
        }
    }

    #[test]
    fn falls_and_comes_to_rest_on_the_floor() {
        let world = floor();
        let mut player = player_at(5.0);
        settle(&mut player, &world);

        assert!(player.body.on_ground);
        assert!((player.body.position.y - 1.0).abs() < 1e-9);
        assert_eq!(player.body.velocity.y, 0.0);
    }

    #[test]
    fn jump_only_works_from_the_ground() {
        let world = floor();
        let mut player = player_at(5.0);
        let jump = MovementIntent {
            jump: true,
            ..Default::default()
        };

        player.tick(&world[..], jump);
        assert!(player.body.velocity.y < 0.0);

        settle(&mut player, &world);
        player.tick(&world[..], jump);
        assert!(player.body.position.y > 1.0);
        assert!(player.body.velocity.y > 0.0);
    }

    #[test]
    fn flying_ignores_gravity() {
        let world = floor();
        let mut player = player_at(5.0);
        player.toggle_flying();
        player.tick(&world[..], MovementIntent::default());
        assert_eq!(player.body.position.y, 5.0);

        let ascend = MovementIntent {
            jump: true,
            ..Default::default()
        };
        player.tick(&world[..], ascend);
        assert!((player.body.position.y - 5.2).abs() < 1e-9);
        assert!((player.body.velocity.y - 0.16).abs() < 1e-9);
    }

    #[test]
    fn ground_walking_is_faster_than_air_control() {
        let world = floor();
        let mut grounded = player_at(1.0);
        settle(&mut grounded, &world);
        let mut airborne = player_at(30.0);

        let walk = MovementIntent {
            strafe: 1.0,
            ..Default::default()
        };
        grounded.tick(&world[..], walk);
        airborne.tick(&world[..], walk);

        let grounded_dx = grounded.body.position.x - grounded.body.prev_position.x;
        let airborne_dx = airborne.body.position.x - airborne.body.prev_position.x;
        assert!((grounded_dx - 0.1).abs() < 1e-9);
        assert!((airborne_dx - 0.02).abs() < 1e-9);
    }

    #[test]
    fn profile_deserializes_partially() {
        let profile: MotionProfile = serde_json::from_str(r#"{ "gravity": 0.1 }"#).unwrap();
        assert_eq!(profile.gravity, 0.1);
        assert_eq!(profile.jump_velocity, 0.5);
    }
}
