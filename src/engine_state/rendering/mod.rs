//! Rendering system for the voxel client.
//!
//! Geometry is written into a bounded `BatchBuffer` and flushed to the GPU through
//! the `GeometryDevice` trait. `RenderContext` implements that trait with wgpu and
//! holds the pipelines, textures and matrices every flush is drawn with.
//!
//! ## Modules
//!
//! * `batch` - CPU staging and the flush protocol
//! * `draw_mode` - Primitive kinds and their index counts
//! * `vertex` - The shared 24-byte vertex layout
//! * `pipeline_manager` - Shader programs and render pipelines
//! * `render_context` - Device state, bind cache and frame lifecycle
//! * `texture` - Image loading with a placeholder fallback
//! * `world_renderer` - Block, outline and hotbar geometry

pub mod batch;
pub mod draw_mode;
pub mod pipeline_manager;
pub mod render_context;
pub mod texture;
pub mod vertex;
pub mod world_renderer;

pub use batch::{BatchBuffer, BatchScope, GeometryDevice};
pub use draw_mode::DrawMode;
pub use render_context::{BatchBuffers, RenderContext, TextureId};
pub use vertex::Vertex;
pub use world_renderer::{HitResult, WorldRenderer};
