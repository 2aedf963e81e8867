//! wgpu implementation of [`RenderBackend`](crate::backend::RenderBackend).
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for a window
//! - configuring the Surface (swapchain) as the color render buffer
//! - depth textures, mesh buffers, shader modules and pipelines
//! - acquiring, recording and presenting frames

mod backend;
mod init;
mod pipeline;
mod surface;

pub use backend::WgpuBackend;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
