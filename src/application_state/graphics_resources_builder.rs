//! # Graphics Resources Builder
//!
//! This module handles the creation of the window and the WebGPU resources required by
//! the client.
//!
//! The main components are:
//! - `Graphics`: Holds the window, surface, device and queue
//! - `GraphicsBuilder`: Builds `Graphics` once and sends it to the event loop
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::{future::Future, sync::Arc};

use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    dpi::PhysicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{config::WindowConfig, error::ClientError};

/// The user event delivered to the event loop once initialization finished.
pub type GraphicsEvent = Result<Graphics, ClientError>;

/// Contains all graphics-related resources required by the application.
///
/// The surface is already configured with `surface_config` when this is built.
pub struct Graphics {
    /// The window the surface presents to
    pub window: Arc<Window>,
    /// Surface of `window`
    pub surface: Surface<'static>,
    /// Format, size and present mode the surface is configured with
    pub surface_config: SurfaceConfiguration,
    /// Device owning every GPU resource
    pub device: Device,
    /// Queue for uploads and submissions
    pub queue: Queue,
}

/// Creates the window and surface, and returns a future resolving the GPU resources.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window
/// * `window_config` - Initial window title and size
///
/// # Returns
/// A `Future` resolving to the initialized `Graphics`, or the error that prevented
/// creating the window or surface
fn create_graphics(
    event_loop: &ActiveEventLoop,
    window_config: &WindowConfig,
) -> Result<impl Future<Output = GraphicsEvent> + 'static, ClientError> {
    let window_attrs = Window::default_attributes()
        .with_title(window_config.title.clone())
        .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
        ..Default::default()
    });

    let surface = instance.create_surface(window.clone())?;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(ClientError::UnsupportedSurface)?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok::<_, ClientError>(Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
        })
    })
}

/// Helper struct for the one-time initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<GraphicsEvent>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// State before initialization, holding the builder
    Builder(GraphicsBuilder),

    /// State after graphics resources have been handed to the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the main thread
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsEvent>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Builds the graphics resources and sends the result to the event loop.
    ///
    /// Adapter and device requests are blocked on with `pollster`. Only the first call
    /// does anything.
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop used to create the window
    /// * `window_config` - Initial window title and size
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop, window_config: &WindowConfig) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let gfx = create_graphics(event_loop, window_config).and_then(pollster::block_on);
        if event_loop_proxy.send_event(gfx).is_err() {
            log::error!("Event loop closed before graphics were ready");
        }
    }
}
