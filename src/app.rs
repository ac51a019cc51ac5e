use std::time::Instant;

use lib_app::{AppContext, AppEvent, AppFlow, AppHandler};
use lib_gpu::TextureView;
use lib_renderer::{Colormap, PointBuffer, PointRenderer};
use lib_window::{KeyCode, LogicalSize, WindowAttributes};
use tracing::{debug, info};

use crate::{
    cloud::{self, CloudConfig},
    transform,
};

pub const WINDOW_WIDTH: f64 = 800.0;
pub const WINDOW_HEIGHT: f64 = 600.0;

#[derive(Debug)]
pub struct Viewer {
    renderer: PointRenderer,
    points: PointBuffer,
    started: Instant,
}

impl AppHandler for Viewer {
    const TITLE: &'static str = "Stress Cloud";

    fn window_attributes() -> WindowAttributes {
        WindowAttributes::default()
            .with_title(Self::TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false)
    }

    fn new(ctx: AppContext<'_>) -> Self {
        let colormap = Colormap::new();
        let points = PointBuffer::new_init(&cloud::generate(&CloudConfig::default()), ctx.into());

        info!(
            points = points.len(),
            colormap_entries = colormap.len(),
            "uploaded point cloud"
        );

        Self {
            renderer: PointRenderer::new(&colormap, ctx.into()),
            points,
            started: Instant::now(),
        }
    }

    fn event(&mut self, event: AppEvent<'_>, _ctx: AppContext<'_>) -> AppFlow {
        match event {
            AppEvent::CloseRequested => AppFlow::Exit,
            AppEvent::Device { device: _, event } => key_flow(event.pressed_key()),
            _ => AppFlow::Continue,
        }
    }

    fn draw(&mut self, output: &TextureView, ctx: AppContext<'_>) {
        let cam = transform::camera_at(self.started.elapsed());

        self.renderer
            .render(self.points.slice(..), &cam, output, ctx.into());
    }
}

fn key_flow(pressed: Option<KeyCode>) -> AppFlow {
    match pressed {
        Some(KeyCode::Escape) => {
            debug!("escape pressed, exiting");
            AppFlow::Exit
        }
        _ => AppFlow::Continue,
    }
}

#[cfg(test)]
mod tests {
    use lib_window::{ElementState, PhysicalKey, pressed_code};

    use super::*;

    #[test]
    fn escape_press_exits() {
        let pressed = pressed_code(PhysicalKey::Code(KeyCode::Escape), ElementState::Pressed);

        assert_eq!(key_flow(pressed), AppFlow::Exit);
    }

    #[test]
    fn escape_release_continues() {
        let released = pressed_code(PhysicalKey::Code(KeyCode::Escape), ElementState::Released);

        assert_eq!(key_flow(released), AppFlow::Continue);
    }

    #[test]
    fn other_keys_continue() {
        for code in [KeyCode::Space, KeyCode::KeyQ, KeyCode::Enter] {
            assert_eq!(key_flow(Some(code)), AppFlow::Continue);
        }
    }
}
