use std::collections::HashMap;

use glam::Mat4;

use crate::coords::PixelSize;
use crate::mesh::Mesh;
use crate::view::{
    ApiVersion, BufferHandle, ContextId, MeshHandle, ProgramHandle, RenderBufferDesc,
    RenderBufferKind, ShaderSlotSet, ViewError,
};

use super::{DrawSubmission, FrameStatus, ProgramInterface, ProgramSource, RenderBackend};

/// Operations whose next invocation can be made to fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HeadlessOp {
    CreateContext,
    ConfigureSurface,
    ColorBuffer,
    DepthBuffer,
    UploadMesh,
    Draw,
}

/// What the backend saw for one recorded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub color: BufferHandle,
    pub color_size: PixelSize,
    pub depth_size: Option<PixelSize>,
    pub program: Option<ProgramHandle>,
    pub slots: ShaderSlotSet,
    /// Indices drawn; zero when only the clear ran.
    pub index_count: u32,
    pub projection: Mat4,
    pub model_view: Mat4,
}

/// Backend that keeps GPU bookkeeping on the CPU and draws nothing.
///
/// Tracks every live object per context, records draws and presents, and
/// counts releases of handles that are no longer live. Failures can be
/// injected per operation with [`fail_next`](Self::fail_next).
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u32,
    contexts: HashMap<ContextId, Option<PixelSize>>,
    buffers: HashMap<BufferHandle, (ContextId, RenderBufferDesc)>,
    meshes: HashMap<MeshHandle, (ContextId, u32)>,
    programs: HashMap<ProgramHandle, (ContextId, ProgramInterface)>,

    pending_failures: Vec<HeadlessOp>,
    pending_frame: Option<BufferHandle>,

    draws: Vec<DrawRecord>,
    presents: Vec<BufferHandle>,
    released_contexts: usize,
    double_releases: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `op` fail. Calls stack.
    pub fn fail_next(&mut self, op: HeadlessOp) {
        self.pending_failures.push(op);
    }

    pub fn live_contexts(&self) -> usize {
        self.contexts.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn buffer_desc(&self, buffer: BufferHandle) -> Option<RenderBufferDesc> {
        self.buffers.get(&buffer).map(|(_, desc)| *desc)
    }

    /// Current surface size of `ctx`: the configured size, then the size of
    /// the latest color buffer.
    pub fn surface_size(&self, ctx: ContextId) -> Option<PixelSize> {
        self.contexts.get(&ctx).copied().flatten()
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn presents(&self) -> &[BufferHandle] {
        &self.presents
    }

    pub fn released_contexts(&self) -> usize {
        self.released_contexts
    }

    /// Releases of handles that were already gone.
    pub fn double_releases(&self) -> usize {
        self.double_releases
    }

    fn mint(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn take_failure(&mut self, op: HeadlessOp) -> bool {
        match self.pending_failures.iter().position(|&p| p == op) {
            Some(i) => {
                self.pending_failures.remove(i);
                true
            }
            None => false,
        }
    }

    fn live(&self, ctx: ContextId) -> Result<(), ViewError> {
        if self.contexts.contains_key(&ctx) {
            Ok(())
        } else {
            Err(ViewError::StaleContext(ctx))
        }
    }

    fn program(&self, ctx: ContextId, program: ProgramHandle) -> Result<&ProgramInterface, ViewError> {
        self.live(ctx)?;
        match self.programs.get(&program) {
            Some((owner, iface)) if *owner == ctx => Ok(iface),
            _ => Err(ViewError::UnknownHandle {
                kind: "program",
                raw: program.raw(),
            }),
        }
    }

    fn buffer(&self, ctx: ContextId, buffer: BufferHandle) -> Result<RenderBufferDesc, ViewError> {
        match self.buffers.get(&buffer) {
            Some((owner, desc)) if *owner == ctx => Ok(*desc),
            _ => Err(ViewError::UnknownHandle {
                kind: "render buffer",
                raw: buffer.raw(),
            }),
        }
    }

    fn note_double_release(&mut self, what: &str, raw: u32) {
        log::warn!("headless: release of {what} {raw} which is not live");
        self.double_releases += 1;
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_context(&mut self, api: ApiVersion) -> Result<ContextId, ViewError> {
        if self.take_failure(HeadlessOp::CreateContext) {
            return Err(ViewError::Setup(format!("{api:?} context unavailable")));
        }
        let ctx = ContextId::from_raw(self.mint());
        self.contexts.insert(ctx, None);
        log::debug!("headless: created {api:?} context {}", ctx.raw());
        Ok(ctx)
    }

    fn configure_surface(&mut self, ctx: ContextId, size: PixelSize) -> Result<(), ViewError> {
        self.live(ctx)?;
        if self.take_failure(HeadlessOp::ConfigureSurface) {
            return Err(ViewError::Setup("surface rejected configuration".into()));
        }
        self.contexts.insert(ctx, Some(size));
        Ok(())
    }

    fn create_render_buffer(
        &mut self,
        ctx: ContextId,
        desc: RenderBufferDesc,
    ) -> Result<BufferHandle, ViewError> {
        self.live(ctx)?;
        let op = match desc.kind {
            RenderBufferKind::Color => HeadlessOp::ColorBuffer,
            RenderBufferKind::Depth(_) => HeadlessOp::DepthBuffer,
        };
        if self.take_failure(op) {
            return Err(ViewError::Resource(format!(
                "out of memory allocating {:?} buffer ({})",
                desc.kind, desc.size
            )));
        }
        if desc.size.is_empty() {
            return Err(ViewError::Resource(format!(
                "cannot allocate a {} render buffer",
                desc.size
            )));
        }
        // The color buffer is the surface's backing store.
        if desc.kind == RenderBufferKind::Color {
            self.contexts.insert(ctx, Some(desc.size));
        }
        let handle = BufferHandle::from_raw(self.mint());
        self.buffers.insert(handle, (ctx, desc));
        Ok(handle)
    }

    fn release_render_buffer(&mut self, ctx: ContextId, buffer: BufferHandle) {
        match self.buffers.get(&buffer) {
            Some((owner, _)) if *owner == ctx => {
                self.buffers.remove(&buffer);
            }
            _ => self.note_double_release("render buffer", buffer.raw()),
        }
    }

    fn upload_mesh(&mut self, ctx: ContextId, mesh: &Mesh) -> Result<MeshHandle, ViewError> {
        self.live(ctx)?;
        if self.take_failure(HeadlessOp::UploadMesh) {
            return Err(ViewError::Resource("out of memory uploading mesh".into()));
        }
        let handle = MeshHandle::from_raw(self.mint());
        self.meshes.insert(handle, (ctx, mesh.index_count()));
        Ok(handle)
    }

    fn release_mesh(&mut self, ctx: ContextId, mesh: MeshHandle) {
        match self.meshes.get(&mesh) {
            Some((owner, _)) if *owner == ctx => {
                self.meshes.remove(&mesh);
            }
            _ => self.note_double_release("mesh", mesh.raw()),
        }
    }

    fn link_program(
        &mut self,
        ctx: ContextId,
        source: &ProgramSource<'_>,
    ) -> Result<ProgramHandle, ViewError> {
        self.live(ctx)?;
        let iface = ProgramInterface::from_source(source)?;
        let handle = ProgramHandle::from_raw(self.mint());
        self.programs.insert(handle, (ctx, iface));
        Ok(handle)
    }

    fn attribute_location(
        &self,
        ctx: ContextId,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>, ViewError> {
        Ok(self.program(ctx, program)?.attribute(name))
    }

    fn uniform_location(
        &self,
        ctx: ContextId,
        program: ProgramHandle,
        name: &str,
    ) -> Result<Option<u32>, ViewError> {
        Ok(self.program(ctx, program)?.uniform(name))
    }

    fn draw(
        &mut self,
        ctx: ContextId,
        submission: &DrawSubmission<'_>,
    ) -> Result<FrameStatus, ViewError> {
        self.live(ctx)?;

        // Sizes come from the live allocations, not from the view's copies,
        // so a stale handle shows up as an error here.
        let color = self.buffer(ctx, submission.color.handle)?;
        let depth = submission
            .depth
            .map(|d| self.buffer(ctx, d.handle))
            .transpose()?;

        if let Some(program) = submission.program {
            self.program(ctx, program)?;
        }

        if self.take_failure(HeadlessOp::Draw) {
            return Ok(FrameStatus::Skipped);
        }

        let index_count = match (submission.program, submission.mesh) {
            (Some(_), Some(mesh)) if submission.slots.position.is_resolved() => {
                match self.meshes.get(&mesh) {
                    Some((owner, count)) if *owner == ctx => *count,
                    _ => {
                        return Err(ViewError::UnknownHandle {
                            kind: "mesh",
                            raw: mesh.raw(),
                        });
                    }
                }
            }
            _ => 0,
        };

        self.draws.push(DrawRecord {
            color: submission.color.handle,
            color_size: color.size,
            depth_size: depth.map(|d| d.size),
            program: submission.program,
            slots: *submission.slots,
            index_count,
            projection: submission.projection,
            model_view: submission.model_view,
        });
        self.pending_frame = Some(submission.color.handle);

        Ok(FrameStatus::Presented)
    }

    fn present(&mut self, ctx: ContextId, color: BufferHandle) -> Result<(), ViewError> {
        self.live(ctx)?;
        self.buffer(ctx, color)?;
        match self.pending_frame.take() {
            Some(drawn) if drawn == color => {
                self.presents.push(color);
                Ok(())
            }
            _ => Err(ViewError::UnknownHandle {
                kind: "pending frame",
                raw: color.raw(),
            }),
        }
    }

    fn release_context(&mut self, ctx: ContextId) {
        if self.contexts.remove(&ctx).is_none() {
            self.note_double_release("context", ctx.raw());
            return;
        }

        // Objects still attached go down with their context.
        self.buffers.retain(|_, (owner, _)| *owner != ctx);
        self.meshes.retain(|_, (owner, _)| *owner != ctx);
        self.programs.retain(|_, (owner, _)| *owner != ctx);
        self.pending_frame = None;
        self.released_contexts += 1;
        log::debug!("headless: released context {}", ctx.raw());
    }
}
