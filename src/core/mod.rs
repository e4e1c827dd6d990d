//! # Core Module
//!
//! Small building blocks shared by the simulation and the renderer.
//!
//! ## Key Components
//! - `Timer`: Fixed-rate tick scheduling, interpolation fraction and FPS counting
//! - `MatrixStack`: Push/pop stack of 4x4 transforms

pub mod matrix_stack;
pub mod timer;

pub use matrix_stack::MatrixStack;
pub use timer::Timer;
