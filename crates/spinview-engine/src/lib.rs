//! spinview engine crate.
//!
//! A GPU-rendered surface view with an explicit resource lifecycle, a wgpu
//! backend for real windows and a headless backend for everything else.

pub mod backend;
pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod mesh;
pub mod time;
pub mod transform;
pub mod view;
pub mod window;
