pub use wgpu::{util::*, *};
