//! Window + display loop.
//!
//! Owns the `winit` EventLoop and Window and drives one `SurfaceView` over
//! the wgpu backend.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
