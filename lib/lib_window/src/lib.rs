pub use winit::*;

mod input;
pub use input::*;

pub use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};
