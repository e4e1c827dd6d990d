//! # Engine State Module
//!
//! The core engine module that owns the simulation and the renderer of the client.
//!
//! ## Key Components
//!
//! * `Simulation` - The world, the player and the hotbar; everything that runs without a GPU
//! * `EngineState` - A `Simulation` plus the camera, timer and rendering resources
//! * `camera_state` - Orthographic world camera and GUI projection
//! * `physics` - Boxes, swept collision and kinematic bodies
//! * `rendering` - Batched geometry, pipelines and the world renderer
//! * `voxels` - Blocks and the voxel grid
//!
//! ## Frame Order
//!
//! Each frame runs the fixed-rate ticks the timer hands out, then applies block edits
//! for the block hovered in the previous frame, then renders with the player position
//! interpolated by the leftover fraction of a tick.

use cgmath::Vector3;

use camera_state::OrthoCamera;
use hotbar::Hotbar;
use physics::{MovementIntent, PlayerEntity};
use rendering::{BatchBuffer, BatchBuffers, HitResult, RenderContext, WorldRenderer};
use voxels::{block::Block, world::VoxelGrid};
use winit::event::MouseButton;

use crate::{
    application_state::{graphics_resources_builder::Graphics, input_state::ProcessedInputState},
    config::ClientConfig,
    core::Timer,
    error::ClientError,
};

pub mod camera_state;
pub mod hotbar;
pub mod physics;
pub mod rendering;
pub mod voxels;

/// Path of the block texture strip, relative to the asset root.
const BLOCK_TEXTURE_PATH: &str = "textures/blocks.png";

/// Edge length of one tile in the placeholder block texture.
const PLACEHOLDER_TILE_SIZE: u32 = 16;

/// Block edits requested for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCommands {
    /// Replace the hovered block with air
    pub remove: bool,
    /// Put the selected hotbar block in the hovered position if it is free
    pub place: bool,
}

impl EditCommands {
    /// Reads the edits from the held mouse buttons.
    pub fn from_input(input: &ProcessedInputState) -> Self {
        Self {
            remove: input.get_mouse_button_state(MouseButton::Left).is_active(),
            place: input.get_mouse_button_state(MouseButton::Right).is_active(),
        }
    }
}

/// The simulated part of the client.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// The block grid
    pub world: VoxelGrid,
    /// The player body and its flying state
    pub player: PlayerEntity,
    /// Placeable blocks and the selection
    pub hotbar: Hotbar,
}

impl Simulation {
    /// Generates the world and spawns the player as configured.
    pub fn new(config: &ClientConfig) -> Self {
        let world = VoxelGrid::generate(config.world.width, config.world.height, config.world.depth);
        let player = PlayerEntity::new(
            config.player.size(),
            config.player.spawn(),
            config.player.motion.clone(),
        );
        Self {
            world,
            player,
            hotbar: Hotbar::new(config.hotbar_blocks()),
        }
    }

    /// Applies the per-frame commands that are not movement.
    pub fn handle_commands(&mut self, input: &ProcessedInputState) {
        if input.fly_toggled() {
            self.player.toggle_flying();
        }
        if let Some(slot) = input.selected_hotbar_slot() {
            self.hotbar.select(slot);
        }
        if input.scroll_steps != 0 {
            self.hotbar.scroll(input.scroll_steps);
        }
    }

    /// Runs one fixed tick.
    pub fn tick(&mut self, intent: MovementIntent) {
        self.player.tick(&self.world, intent);
    }

    /// Applies block edits at the hovered position. Removal happens before placement.
    pub fn apply_edits(&mut self, hit: Option<HitResult>, edits: EditCommands) {
        let Some(HitResult { x, y, z, .. }) = hit else {
            return;
        };
        if edits.remove {
            self.world.set_block(x, y, z, Block::Air);
        }
        if edits.place && self.world.block_at(x, y, z).can_be_replaced() {
            self.world.set_block(x, y, z, self.hotbar.selected_block());
        }
    }

    /// The player position to draw, `fraction` of the way through the current tick.
    pub fn player_render_position(&self, fraction: f64) -> Vector3<f64> {
        self.player.body.interpolated_position(fraction)
    }
}

/// The main state container of the running client.
///
/// Owns the GPU resources; `shutdown` releases them in a fixed order and must run
/// before the window goes away.
pub struct EngineState {
    /// World, player and hotbar
    pub simulation: Simulation,
    camera: OrthoCamera,
    timer: Timer,
    clock_start: web_time::Instant,
    render_context: RenderContext,
    batch: BatchBuffer<BatchBuffers>,
    world_renderer: WorldRenderer,
    is_shut_down: bool,
}

impl EngineState {
    /// Creates the simulation and every rendering resource.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated client settings
    /// * `graphics` - Device, queue and configured surface
    ///
    /// # Returns
    ///
    /// The engine, or the error that prevented loading the shaders
    pub fn new(config: &ClientConfig, graphics: Graphics) -> Result<Self, ClientError> {
        let Graphics {
            surface,
            surface_config,
            device,
            queue,
            ..
        } = graphics;
        let (width, height) = (surface_config.width, surface_config.height);

        let mut render_context = RenderContext::new(
            device,
            queue,
            surface,
            surface_config,
            &config.asset_root.join("shaders"),
        )?;
        let block_texture = render_context.load_texture(
            &config.asset_root.join(BLOCK_TEXTURE_PATH),
            (
                PLACEHOLDER_TILE_SIZE * voxels::block::BLOCK_TEXTURE_TILES,
                PLACEHOLDER_TILE_SIZE,
            ),
        );

        let simulation = Simulation::new(config);
        let mut camera = OrthoCamera::new(width, height);
        camera.follow(simulation.player_render_position(0.0));

        log::info!("Engine initialized at {}x{}", width, height);
        Ok(Self {
            simulation,
            camera,
            timer: Timer::new(config.ticks_per_second, 0.0),
            clock_start: web_time::Instant::now(),
            render_context,
            batch: BatchBuffer::new(config.batch.vertex_capacity, config.batch.index_capacity),
            world_renderer: WorldRenderer::new(block_texture),
            is_shut_down: false,
        })
    }

    fn now(&self) -> f64 {
        self.clock_start.elapsed().as_secs_f64()
    }

    /// Runs one frame: ticks, block edits, rendering and frame counting.
    ///
    /// # Arguments
    ///
    /// * `input` - Input gathered since the previous frame
    pub fn run_frame(&mut self, input: &ProcessedInputState) {
        if self.is_shut_down {
            return;
        }
        self.simulation.handle_commands(input);

        let ticks = self.timer.advance(self.now());
        let intent = input.movement_intent();
        for _ in 0..ticks {
            self.simulation.tick(intent);
        }

        self.simulation
            .apply_edits(self.world_renderer.hit_result(), EditCommands::from_input(input));

        self.render(input.cursor_position);

        if self.timer.count_frame(self.now()).is_some() {
            log::debug!("{} draws in the last second", self.batch.take_flush_count());
        }
    }

    fn render(&mut self, cursor: (f64, f64)) {
        let position = self
            .simulation
            .player_render_position(self.timer.partial_tick());
        self.camera.follow(position);

        if !self.render_context.begin_frame() {
            return;
        }
        let simulation = &self.simulation;
        self.world_renderer
            .pick(&self.camera, &simulation.world, cursor);
        self.world_renderer.render_world(
            &mut self.render_context,
            &mut self.batch,
            &simulation.world,
            &self.camera,
        );
        self.world_renderer.render_hotbar(
            &mut self.render_context,
            &mut self.batch,
            simulation.hotbar.selected_block(),
        );
        self.render_context.end_frame();
    }

    /// Follows a window resize. Zero sizes pause rendering.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.render_context.resize(width, height);
        self.camera.resize(width, height);
    }

    /// Releases batch buffers, then pipelines, then textures. Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.is_shut_down {
            return;
        }
        self.batch.release(&mut self.render_context);
        self.render_context.release_pipelines();
        self.render_context.release_textures();
        self.is_shut_down = true;
        log::info!("Engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use winit::keyboard::KeyCode;

    use super::*;
    use crate::application_state::input_state::RawInputState;

    fn simulation() -> Simulation {
        let mut config = ClientConfig::default();
        config.world.width = 16;
        config.world.height = 16;
        Simulation::new(&config)
    }

    fn hit(simulation: &Simulation, x: i32, y: i32) -> Option<HitResult> {
        let z = simulation.world.depth() - 1;
        Some(HitResult {
            x,
            y,
            z,
            block: simulation.world.block_at(x, y, z),
        })
    }

    #[test]
    fn player_lands_on_the_terrain() {
        let mut simulation = simulation();
        for _ in 0..40 {
            simulation.tick(MovementIntent::default());
        }
        let body = &simulation.player.body;
        assert!(body.on_ground);
        assert!((body.aabb().min_y() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn removing_then_placing_uses_the_hotbar() {
        let mut simulation = simulation();
        simulation.hotbar.select(4);

        let target = hit(&simulation, 3, 4);
        simulation.apply_edits(
            target,
            EditCommands {
                remove: true,
                place: false,
            },
        );
        assert_eq!(simulation.world.block_at(3, 4, 1), Block::Air);

        simulation.apply_edits(
            target,
            EditCommands {
                remove: false,
                place: true,
            },
        );
        assert_eq!(simulation.world.block_at(3, 4, 1), Block::Bedrock);
    }

    #[test]
    fn placing_never_overwrites_solid_blocks() {
        let mut simulation = simulation();
        let target = hit(&simulation, 3, 2);
        simulation.apply_edits(
            target,
            EditCommands {
                remove: false,
                place: true,
            },
        );
        assert_eq!(simulation.world.block_at(3, 2, 1), Block::Cobblestone);
    }

    #[test]
    fn misses_edit_nothing() {
        let mut simulation = simulation();
        let before = simulation.world.block_at(0, 4, 1);
        simulation.apply_edits(
            None,
            EditCommands {
                remove: true,
                place: true,
            },
        );
        assert_eq!(simulation.world.block_at(0, 4, 1), before);
    }

    #[test]
    fn commands_toggle_flying_and_select_slots() {
        let mut simulation = simulation();
        let input = ProcessedInputState {
            keyboard_states: HashMap::from([
                (KeyCode::KeyF, RawInputState::Pressed),
                (KeyCode::Digit2, RawInputState::Pressed),
            ]),
            scroll_steps: -1,
            ..Default::default()
        };
        simulation.handle_commands(&input);

        assert!(simulation.player.body.flying);
        // second slot selected, then one step towards the end
        assert_eq!(simulation.hotbar.selected_slot(), 2);
        assert_eq!(simulation.hotbar.selected_block(), Block::Dirt);
    }
}
