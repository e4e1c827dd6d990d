//! # Camera State Management
//!
//! Camera matrices for the world view and the GUI overlay.
//!
//! ## Core Components
//! - `OrthoCamera`: Side-on orthographic camera following the player
//! - `gui_projection`: Pixel-space projection for overlay elements

pub mod camera;

pub use camera::{gui_projection, OrthoCamera};
