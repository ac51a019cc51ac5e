use std::{sync::Arc, time::Instant};

use lib_gpu::{
    Device, DeviceDescriptor, Instance, PollType, PresentMode, Queue, RequestAdapterOptions,
    Surface, SurfaceConfiguration, SurfaceError, TextureViewDescriptor,
};
use lib_window::{
    PhysicalSize,
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};
use tracing::{debug, info, warn};

use crate::{AppContext, AppError, AppEvent, AppFlow, AppHandler, DeviceEvent, DeviceId};

/// Opens the main window and drives `T` until it asks to exit or the window
/// is closed. Setup failures are returned after the event loop shuts down.
pub fn run_app<T: AppHandler>() -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;

    let mut application = AppRunner::<T>::Uninitialized;

    event_loop.run_app(&mut application)?;

    match application {
        AppRunner::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum AppRunner<T: AppHandler> {
    Uninitialized,
    Initialized(InitializedAppRunner<T>),
    Failed(AppError),
    Exited,
}

struct InitializedAppRunner<T: AppHandler> {
    window: Arc<Window>,
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    app: T,
    last_instant: Instant,
}

impl<T: AppHandler> ApplicationHandler for AppRunner<T> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppRunner::Uninitialized = self else {
            return;
        };

        match InitializedAppRunner::new(event_loop) {
            Ok(init_self) => *self = AppRunner::Initialized(init_self),
            Err(err) => {
                *self = AppRunner::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppRunner::Initialized(init_self) = self else {
            return;
        };

        let now = Instant::now();
        let delta_time = now.duration_since(init_self.last_instant);
        init_self.last_instant = now;

        handle_appflow!(
            event_loop,
            init_self.app.update(
                delta_time,
                AppContext {
                    window: &init_self.window,
                    device: &init_self.device,
                    queue: &init_self.queue,
                    surface_format: init_self.surface_config.format,
                },
            )
        );

        init_self.window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let AppRunner::Initialized(init_self) = self else {
            return;
        };

        let app_event = match &event {
            WindowEvent::CloseRequested => AppEvent::CloseRequested,
            WindowEvent::KeyboardInput {
                device_id,
                event,
                is_synthetic: _,
            } => AppEvent::Device {
                device: DeviceId::Winit(*device_id),
                event: DeviceEvent::Key(event),
            },
            _ => AppEvent::UnhandledWindowEvent(&event),
        };

        handle_appflow!(
            event_loop,
            init_self.app.event(
                app_event,
                AppContext {
                    window: &init_self.window,
                    device: &init_self.device,
                    queue: &init_self.queue,
                    surface_format: init_self.surface_config.format,
                },
            )
        );

        match &event {
            WindowEvent::RedrawRequested => init_self.redraw(),
            WindowEvent::Resized(size) => init_self.resize(*size),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let AppRunner::Initialized(_) = self {
            info!("releasing GPU resources");
            *self = AppRunner::Exited;
        }
    }
}

impl<T: AppHandler> InitializedAppRunner<T> {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self, AppError> {
        let window = Arc::new(event_loop.create_window(T::window_attributes())?);

        let instance = Instance::default();

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        }))?;

        let adapter_info = adapter.get_info();
        info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            "selected GPU adapter"
        );

        let (device, queue) =
            pollster::block_on(adapter.request_device(&DeviceDescriptor::default()))?;

        let size = window.inner_size();
        let mut surface_config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(AppError::UnsupportedSurface)?;

        // Colors are written to the framebuffer as-is, without sRGB encoding.
        if let Some(format) = surface
            .get_capabilities(&adapter)
            .formats
            .into_iter()
            .find(|format| !format.is_srgb())
        {
            surface_config.format = format;
        }
        surface_config.present_mode = PresentMode::AutoVsync;

        surface.configure(&device, &surface_config);

        info!(
            width = surface_config.width,
            height = surface_config.height,
            format = ?surface_config.format,
            "configured surface"
        );

        let app = T::new(AppContext {
            window: &window,
            device: &device,
            queue: &queue,
            surface_format: surface_config.format,
        });

        let last_instant = Instant::now();

        Ok(Self {
            window,
            device,
            queue,
            surface,
            surface_config,
            app,
            last_instant,
        })
    }

    fn redraw(&mut self) {
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(err) => {
                warn!(error = %err, "failed to acquire surface texture, skipping frame");
                return;
            }
        };

        let view = texture
            .texture
            .create_view(&TextureViewDescriptor::default());

        let ctx = AppContext {
            window: &self.window,
            device: &self.device,
            queue: &self.queue,
            surface_format: self.surface_config.format,
        };
        self.app.draw(&view, ctx);

        self.window.pre_present_notify();
        texture.present();

        if let Err(err) = self.device.poll(PollType::Poll) {
            warn!(error = %err, "device poll failed");
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        // Minimized windows report a zero size, which is not a valid surface.
        if size.width == 0 || size.height == 0 {
            return;
        }

        debug!(width = size.width, height = size.height, "resizing surface");

        self.surface_config.width = size.width;
        self.surface_config.height = size.height;

        self.surface.configure(&self.device, &self.surface_config);
    }
}

macro_rules! handle_appflow {
    ($event_loop:expr, $flow:expr) => {
        match $flow {
            AppFlow::Continue => {}
            AppFlow::Exit => {
                $event_loop.exit();
                return;
            }
        }
    };
}

use handle_appflow;
