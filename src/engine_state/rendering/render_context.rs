//! The wgpu side of batched rendering.
//!
//! `RenderContext` owns the device, the surface and every GPU resource the client
//! draws with. It records which program and texture are current and applies them to
//! each flush a `BatchBuffer` hands it through `GeometryDevice`.
//!
//! # Frame Lifecycle
//!
//! 1. `begin_frame` acquires the next surface texture
//! 2. every flush writes its data, encodes one render pass and submits it; the first
//!    pass of the frame clears the target
//! 3. `end_frame` presents
//!
//! Each flush is its own submission, so `Queue::write_buffer` calls issued for a flush
//! land before its draw and after every earlier draw of the frame.

use std::path::Path;

use cgmath::{Matrix4, SquareMatrix};
use wgpu::{util::DeviceExt, Device, Queue, Surface, SurfaceConfiguration};

use crate::{core::MatrixStack, error::ClientError};

use super::{
    batch::GeometryDevice,
    draw_mode::DrawMode,
    pipeline_manager::{PipelineManager, ShaderProgram},
    texture::{self, Texture},
};

/// Background colour of every frame.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.4,
    g: 0.6,
    b: 0.9,
    a: 1.0,
};

/// Deepest the view matrix stack may grow.
const MATRIX_STACK_DEPTH: usize = 32;

/// The uniform block shared by every shader program.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    projection_view: [[f32; 4]; 4],
}

impl Uniforms {
    fn new(projection: &Matrix4<f32>, view: &Matrix4<f32>) -> Self {
        Self {
            projection_view: (*projection * *view).into(),
        }
    }
}

/// Handle of a texture registered with a `RenderContext`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(usize);

/// The GPU buffers behind one `BatchBuffer`.
pub struct BatchBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

struct BoundTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    cleared: bool,
}

/// Device, surface and draw state of the client.
pub struct RenderContext {
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    pipeline_manager: PipelineManager,
    textures: Vec<BoundTexture>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    projection: Matrix4<f32>,
    matrix_stack: MatrixStack,
    current_program: Option<ShaderProgram>,
    current_texture: Option<TextureId>,
    uniforms_dirty: bool,
    frame: Option<Frame>,
    minimized: bool,
}

impl RenderContext {
    /// Builds pipelines and uniform storage for an already configured surface.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The queue every upload and draw is submitted to
    /// * `surface` - The window surface, configured with `surface_config`
    /// * `surface_config` - Current surface size and format
    /// * `shader_dir` - Directory holding the WGSL programs
    pub fn new(
        device: Device,
        queue: Queue,
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        shader_dir: &Path,
    ) -> Result<Self, ClientError> {
        let pipeline_manager = PipelineManager::new(&device, surface_config.format, shader_dir)?;

        let identity = Matrix4::identity();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(&identity, &identity)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &pipeline_manager.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            pipeline_manager,
            textures: Vec::new(),
            uniform_buffer,
            uniform_bind_group,
            projection: identity,
            matrix_stack: MatrixStack::new(MATRIX_STACK_DEPTH),
            current_program: None,
            current_texture: None,
            uniforms_dirty: true,
            frame: None,
            minimized: false,
        })
    }

    /// Loads an image from disk, falling back to a placeholder of `fallback_size`.
    pub fn load_texture(&mut self, path: &Path, fallback_size: (u32, u32)) -> TextureId {
        let image = texture::load_image_or_placeholder(path, fallback_size);
        let label = path.to_string_lossy();
        let texture = Texture::from_image(&self.device, &self.queue, &image, &label);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout: &self.pipeline_manager.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        self.textures.push(BoundTexture {
            texture,
            bind_group,
        });
        TextureId(self.textures.len() - 1)
    }

    /// Current surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Reconfigures the surface for a new window size.
    ///
    /// A zero size means the window is minimized; frames are skipped until it has an
    /// area again.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.minimized = width == 0 || height == 0;
        if self.minimized {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Makes `program` current for the following flushes.
    pub fn use_program(&mut self, program: Option<ShaderProgram>) {
        if self.current_program == program {
            return;
        }
        log::trace!("Switching program to {:?}", program);
        self.current_program = program;
    }

    /// Makes `texture` current for the following textured flushes.
    pub fn bind_texture(&mut self, texture: Option<TextureId>) {
        if self.current_texture == texture {
            return;
        }
        log::trace!("Binding texture {:?}", texture);
        self.current_texture = texture;
    }

    /// Replaces the projection. The new matrix is uploaded at the next flush.
    pub fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
        self.uniforms_dirty = true;
    }

    /// The view matrix stack.
    pub fn matrix_stack(&self) -> &MatrixStack {
        &self.matrix_stack
    }

    /// Mutable access to the view matrix stack. The top is uploaded at the next flush.
    pub fn matrix_stack_mut(&mut self) -> &mut MatrixStack {
        self.uniforms_dirty = true;
        &mut self.matrix_stack
    }

    /// Acquires the next surface texture.
    ///
    /// # Returns
    /// `false` if nothing can be drawn this frame, in which case `end_frame` must not
    /// be expected to present anything.
    pub fn begin_frame(&mut self) -> bool {
        if self.minimized {
            return false;
        }
        let surface_texture = match self.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return false;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Timed out acquiring the next frame");
                return false;
            }
            Err(err) => {
                log::error!("Error getting current frame: {:?}", err);
                return false;
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some(Frame {
            surface_texture,
            view,
            cleared: false,
        });
        true
    }

    /// Presents the current frame. A frame nothing was drawn to is still cleared.
    pub fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        if !frame.cleared {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Clear Encoder"),
                });
            let clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            drop(clear_pass);
            self.queue.submit([encoder.finish()]);
        }
        frame.surface_texture.present();
    }

    /// Drops every render pipeline.
    pub fn release_pipelines(&mut self) {
        self.use_program(None);
        self.pipeline_manager.release();
    }

    /// Destroys every registered texture. Their ids become invalid.
    pub fn release_textures(&mut self) {
        self.bind_texture(None);
        for bound in self.textures.drain(..) {
            bound.texture.destroy();
        }
        log::debug!("Released textures");
    }

    fn upload_uniforms(&mut self) {
        if !self.uniforms_dirty {
            return;
        }
        let uniforms = Uniforms::new(&self.projection, self.matrix_stack.top());
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.uniforms_dirty = false;
    }
}

impl GeometryDevice for RenderContext {
    type Buffers = BatchBuffers;

    fn create_buffers(&mut self, vertices: &[u8], indices: &[u32]) -> BatchBuffers {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Batch Vertex Buffer"),
                contents: vertices,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Batch Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            });
        BatchBuffers {
            vertex_buffer,
            index_buffer,
        }
    }

    fn update_buffers(&mut self, buffers: &BatchBuffers, vertices: &[u8], indices: &[u32]) {
        self.queue.write_buffer(&buffers.vertex_buffer, 0, vertices);
        if !indices.is_empty() {
            self.queue
                .write_buffer(&buffers.index_buffer, 0, bytemuck::cast_slice(indices));
        }
    }

    fn draw_indexed(&mut self, buffers: &BatchBuffers, mode: DrawMode, index_count: u32) {
        let Some(program) = self.current_program else {
            log::warn!("Flush without a program dropped");
            return;
        };
        self.upload_uniforms();

        let Some(frame) = self.frame.as_mut() else {
            log::warn!("Flush outside of a frame dropped");
            return;
        };
        let Some(pipeline) = self.pipeline_manager.pipeline(program, mode) else {
            log::warn!("No pipeline for {:?} in {:?}", program, mode);
            return;
        };
        let texture_bind_group = if program.is_textured() {
            match self.current_texture.and_then(|id| self.textures.get(id.0)) {
                Some(bound) => Some(&bound.bind_group),
                None => {
                    log::warn!("Textured flush without a texture dropped");
                    return;
                }
            }
        } else {
            None
        };

        let load = if frame.cleared {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(CLEAR_COLOR)
        };
        frame.cleared = true;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Batch Encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Batch Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &self.uniform_bind_group, &[]);
            if let Some(bind_group) = texture_bind_group {
                rpass.set_bind_group(1, bind_group, &[]);
            }
            rpass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
            rpass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..index_count, 0, 0..1);
        }
        self.queue.submit([encoder.finish()]);
    }

    fn release_buffers(&mut self, buffers: BatchBuffers) {
        buffers.vertex_buffer.destroy();
        buffers.index_buffer.destroy();
    }
}
