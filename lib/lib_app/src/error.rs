use lib_gpu::{CreateSurfaceError, RequestAdapterError, RequestDeviceError};
use lib_window::error::{EventLoopError, OsError};
use thiserror::Error;

/// Failures while bringing up the window and GPU. Anything past setup is
/// recovered from or logged instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] EventLoopError),

    #[error("failed to create window: {0}")]
    CreateWindow(#[from] OsError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] RequestDeviceError),

    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,
}
