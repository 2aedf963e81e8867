//! The surface view: a rendering context, its render buffers, shader slots
//! and the per-frame rotation, with an explicit lifecycle.
//!
//! Lifecycle:
//! - `initialize(size)` creates the context and sizes the buffers
//! - `layout_changed(size)` reallocates the buffers
//! - `render_frame()` runs once per display refresh
//! - `teardown()` releases everything (also run on drop)

mod buffers;
mod config;
mod error;
mod handles;
mod rotation;
mod slots;
mod state;
mod surface_view;

pub use buffers::{DepthFormat, DepthMode, RenderBuffer, RenderBufferDesc, RenderBufferKind};
pub use config::{ApiVersion, ViewConfig};
pub use error::ViewError;
pub use handles::{AttributeSlot, BufferHandle, ContextId, MeshHandle, ProgramHandle, UniformSlot};
pub use rotation::{Rotation, RotationPolicy};
pub use slots::{ShaderSlotSet, SlotName};
pub use state::ViewState;
pub use surface_view::SurfaceView;
