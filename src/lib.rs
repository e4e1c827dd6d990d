#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Client
//!
//! A side-view voxel world client built with Rust and WGPU.
//!
//! The player walks, jumps and flies through a fixed-size block grid, removing and
//! placing blocks with the mouse. Simulation runs at a fixed tick rate; rendering runs
//! as fast as the surface presents and interpolates between ticks.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, graphics initialization and input handling
//! * `config` - Runtime settings loaded from JSON
//! * `core` - Fixed timestep timer and matrix stack
//! * `engine_state` - Physics, voxels and rendering
//! * `error` - The crate error type
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_client::run() {
//!         eprintln!("{}", err);
//!     }
//! }
//! ```

use application_state::ApplicationState;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::{config::ClientConfig, error::ClientError};

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

/// Initializes logging, loads the configuration and runs the client until its window
/// closes.
///
/// # Returns
/// The error that stopped the client, if it did not exit normally
pub fn run() -> Result<(), ClientError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    log::info!("Logger initialized");

    let config = ClientConfig::load()?;

    let event_loop = EventLoop::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut state = ApplicationState::new(config, event_loop.create_proxy());
    event_loop.run_app(&mut state)?;

    match state.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
