//! Shader programs and the render pipelines built from them.
//!
//! # Architecture
//!
//! Every program shares the batch vertex layout and the uniform bind group at
//! group 0. Textured programs additionally read a texture and sampler from group 1.
//! Pipelines are created up front for each program and each topology a `DrawMode`
//! can map to, so switching mode or program between flushes is a map lookup.
//!
//! # Resources
//!
//! - `uniform_layout`: projection-view matrix, visible to the vertex stage
//! - `texture_layout`: texture and sampler, visible to the fragment stage
//! - one `wgpu::RenderPipeline` per `(ShaderProgram, PrimitiveTopology)`

use std::{collections::HashMap, fs, path::Path};

use wgpu::{
    BindGroupLayout, Device, PrimitiveTopology, RenderPipeline, ShaderModule, TextureFormat,
};

use crate::error::ClientError;

use super::{draw_mode::DrawMode, vertex::Vertex};

/// The shader programs geometry can be drawn with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    /// Vertex colour only. Used for outlines.
    PositionColor,
    /// Texture sampled at the vertex UV, multiplied by the vertex colour.
    PositionColorTex,
}

impl ShaderProgram {
    /// Every program, in pipeline creation order.
    pub const ALL: [ShaderProgram; 2] =
        [ShaderProgram::PositionColor, ShaderProgram::PositionColorTex];

    /// WGSL file of this program, relative to the shader directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ShaderProgram::PositionColor => "position_color.wgsl",
            ShaderProgram::PositionColorTex => "position_color_tex.wgsl",
        }
    }

    /// Whether the program reads the texture bind group.
    pub fn is_textured(self) -> bool {
        matches!(self, ShaderProgram::PositionColorTex)
    }
}

/// Every topology a draw mode can ask for.
fn topologies() -> Vec<PrimitiveTopology> {
    let mut topologies: Vec<PrimitiveTopology> = Vec::new();
    for mode in DrawMode::ALL {
        if !topologies.contains(&mode.topology()) {
            topologies.push(mode.topology());
        }
    }
    topologies
}

/// Owns the bind group layouts and every render pipeline.
pub struct PipelineManager {
    /// Layout of the uniform bind group (group 0)
    pub uniform_layout: BindGroupLayout,
    /// Layout of the texture bind group (group 1)
    pub texture_layout: BindGroupLayout,
    pipelines: HashMap<(ShaderProgram, PrimitiveTopology), RenderPipeline>,
}

impl PipelineManager {
    /// Compiles every program found in `shader_dir` into pipelines.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `surface_format` - Format of the colour target
    /// * `shader_dir` - Directory containing the WGSL files
    ///
    /// # Returns
    /// The manager, or `ClientError::ShaderIo` if a shader file cannot be read
    pub fn new(
        device: &Device,
        surface_format: TextureFormat,
        shader_dir: &Path,
    ) -> Result<Self, ClientError> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let mut pipelines = HashMap::new();
        for program in ShaderProgram::ALL {
            let module = load_shader(device, &shader_dir.join(program.file_name()))?;

            let bind_group_layouts: Vec<&BindGroupLayout> = if program.is_textured() {
                vec![&uniform_layout, &texture_layout]
            } else {
                vec![&uniform_layout]
            };
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(program.file_name()),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });

            for topology in topologies() {
                let pipeline =
                    create_pipeline(device, &layout, &module, surface_format, topology, program);
                pipelines.insert((program, topology), pipeline);
            }
        }
        log::info!("Created {} render pipelines", pipelines.len());

        Ok(Self {
            uniform_layout,
            texture_layout,
            pipelines,
        })
    }

    /// The pipeline drawing `program` with the topology of `mode`.
    pub fn pipeline(&self, program: ShaderProgram, mode: DrawMode) -> Option<&RenderPipeline> {
        self.pipelines.get(&(program, mode.topology()))
    }

    /// Drops every pipeline. Lookups afterwards return `None`.
    pub fn release(&mut self) {
        if !self.pipelines.is_empty() {
            log::debug!("Released {} render pipelines", self.pipelines.len());
            self.pipelines.clear();
        }
    }
}

fn load_shader(device: &Device, path: &Path) -> Result<ShaderModule, ClientError> {
    let source = fs::read_to_string(path).map_err(|source| ClientError::ShaderIo {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Compiling shader {}", path.display());
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: path.file_name().and_then(|name| name.to_str()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}

fn create_pipeline(
    device: &Device,
    layout: &wgpu::PipelineLayout,
    module: &ShaderModule,
    surface_format: TextureFormat,
    topology: PrimitiveTopology,
    program: ShaderProgram,
) -> RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(program.file_name()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Quads are only ever seen from the front, outlines have no faces
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_topology_per_distinct_mode_mapping() {
        assert_eq!(
            topologies(),
            vec![PrimitiveTopology::TriangleList, PrimitiveTopology::LineList]
        );
    }

    #[test]
    fn only_the_textured_program_has_a_texture_group() {
        assert!(!ShaderProgram::PositionColor.is_textured());
        assert!(ShaderProgram::PositionColorTex.is_textured());
        assert_ne!(
            ShaderProgram::PositionColor.file_name(),
            ShaderProgram::PositionColorTex.file_name()
        );
    }
}
