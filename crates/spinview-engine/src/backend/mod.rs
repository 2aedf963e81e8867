//! The seam between a [`SurfaceView`](crate::view::SurfaceView) and the GPU.
//!
//! A backend owns the actual GPU objects; the view only holds typed handles.
//! Every call names its context explicitly, there is no "current" context.
//!
//! Implementations:
//! - [`WgpuBackend`](crate::device::WgpuBackend): wgpu over a winit window
//! - [`HeadlessBackend`]: CPU-only bookkeeping for offscreen runs and tests

mod headless;
mod program;

pub use headless::{DrawRecord, HeadlessBackend, HeadlessOp};
pub use program::{ProgramInterface, ProgramSource};

use glam::Mat4;

use crate::coords::{Color, PixelSize};
use crate::mesh::Mesh;
use crate::view::{
    ApiVersion, BufferHandle, ContextId, MeshHandle, ProgramHandle, RenderBuffer,
    RenderBufferDesc, ShaderSlotSet, ViewError,
};

/// Outcome of recording a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// The frame was drawn and presented.
    Presented,
    /// Nothing was presented (no drawable, or a transient surface issue).
    Skipped,
}

/// Everything a backend needs to record one frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawSubmission<'a> {
    pub color: &'a RenderBuffer,
    pub depth: Option<&'a RenderBuffer>,
    pub program: Option<ProgramHandle>,
    pub slots: &'a ShaderSlotSet,
    pub mesh: Option<MeshHandle>,
    pub projection: Mat4,
    pub model_view: Mat4,
    pub clear_color: Color,
}

/// GPU operations used by a view over its lifetime.
pub trait RenderBackend {
    /// Creates a rendering context.
    fn create_context(&mut self, api: ApiVersion) -> Result<ContextId, ViewError>;

    /// Prepares the backing surface for rendering at `size`.
    fn configure_surface(&mut self, ctx: ContextId, size: PixelSize) -> Result<(), ViewError>;

    fn create_render_buffer(
        &mut self,
        ctx: ContextId,
        desc: RenderBufferDesc,
    ) -> Result<BufferHandle, ViewError>;

    /// Releases a render buffer. Unknown handles are ignored.
    fn release_render_buffer(&mut self, ctx: ContextId, buffer: BufferHandle);

    fn upload_mesh(&mut self, ctx: ContextId, mesh: &Mesh) -> Result<MeshHandle, ViewError>;

    /// Releases uploaded geometry. Unknown handles are ignored.
    fn release_mesh(&mut self, ctx: ContextId, mesh: MeshHandle);

    /// Compiles and links a program. Programs live until their context is released.
    fn link_program(
        &mut self,
        ctx: ContextId,
        source: &ProgramSource<'_>,
    ) -> Result<ProgramHandle, ViewError>;

    /// Location of a vertex attribute, `None` if the program does not declare it.
    fn attribute_location(
        &self,
        ctx: ContextId,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>, ViewError>;

    /// Binding of a uniform, `None` if the program does not declare it.
    fn uniform_location(
        &self,
        ctx: ContextId,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>, ViewError>;

    /// Records a frame into `submission.color`.
    ///
    /// Returns `Skipped` when there is nothing to present; `present` must then
    /// not be called for this frame.
    fn draw(
        &mut self,
        ctx: ContextId,
        submission: &DrawSubmission<'_>,
    ) -> Result<FrameStatus, ViewError>;

    /// Presents the color buffer drawn by the preceding `draw`.
    fn present(&mut self, ctx: ContextId, color: BufferHandle) -> Result<(), ViewError>;

    /// Destroys the context and anything still attached to it. Unknown ids are ignored.
    fn release_context(&mut self, ctx: ContextId);
}
