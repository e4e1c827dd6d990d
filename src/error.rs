//! Errors that can stop the client from starting.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Every failure the client reports instead of panicking.
///
/// All of these happen during startup; once the first frame is drawn nothing in the
/// frame loop returns an error.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The configuration file is not valid JSON for `ClientConfig`.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        /// File that was being parsed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
    /// The configuration parsed but holds unusable values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A shader source file could not be read.
    #[error("failed to read shader {path}: {source}")]
    ShaderIo {
        /// Shader file that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The window could not be created.
    #[error("failed to create window: {0}")]
    CreateWindow(#[from] winit::error::OsError),
    /// No surface could be created for the window.
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    /// The adapter cannot present to the window surface.
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
    /// No adapter can drive the surface.
    #[error("no suitable graphics adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to create a device.
    #[error("failed to create graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    /// The event loop failed to start or stopped with an error.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
