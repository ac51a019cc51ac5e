use std::time::Duration;

use lib_gpu::{Device, Queue, TextureFormat, TextureView};
use lib_window::{DeviceEvent, DeviceId, Window, WindowAttributes};

mod error;
mod runner;
pub use error::*;
pub use runner::run_app;

pub trait AppHandler {
    const TITLE: &'static str = "Untitled App";

    fn window_attributes() -> WindowAttributes {
        WindowAttributes::default().with_title(Self::TITLE)
    }

    fn new(_ctx: AppContext<'_>) -> Self;

    fn update(&mut self, _delta_time: Duration, _ctx: AppContext<'_>) -> AppFlow {
        AppFlow::Continue
    }

    fn event(&mut self, event: AppEvent<'_>, _ctx: AppContext<'_>) -> AppFlow {
        match event {
            AppEvent::CloseRequested => AppFlow::Exit,
            _ => AppFlow::Continue,
        }
    }

    fn draw(&mut self, output: &TextureView, ctx: AppContext<'_>);
}

#[derive(Debug, Clone, Copy)]
pub struct AppContext<'a> {
    pub window: &'a Window,
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: TextureFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFlow {
    Continue,
    Exit,
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub enum AppEvent<'a> {
    CloseRequested,
    Device {
        device: DeviceId,
        event: DeviceEvent<'a>,
    },
    UnhandledWindowEvent(&'a lib_window::event::WindowEvent),
}

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}

#[macro_export]
macro_rules! app_main {
    ($App:ty) => {
        fn main() -> ::std::process::ExitCode {
            $crate::hidden::run_main::<$App>()
        }
    };
}

#[doc(hidden)]
pub mod hidden {
    use std::process::ExitCode;

    use crate::{AppHandler, init_logging, run_app};

    pub fn run_main<T: AppHandler>() -> ExitCode {
        init_logging();

        match run_app::<T>() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(error = %err, "{} failed to start", T::TITLE);
                ExitCode::FAILURE
            }
        }
    }
}
