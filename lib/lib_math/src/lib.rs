pub use glam::*;
