//! Fatal startup errors. Any of these ends the process with exit code -1.
//!
//! Shader compile/link problems are not listed here: they are reported as
//! diagnostics and rendering carries on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to initialize the windowing system: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("event loop exited before a window was created")]
    NeverStarted,
}

pub type StartupResult<T> = std::result::Result<T, StartupError>;
