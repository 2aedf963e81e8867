use glam::Mat4;

use crate::backend::{DrawSubmission, FrameStatus, RenderBackend};
use crate::coords::PixelSize;
use crate::mesh::Mesh;
use crate::time::FrameClock;
use crate::transform;

use super::buffers::{RenderBuffer, RenderBufferDesc, RenderBufferKind};
use super::config::ViewConfig;
use super::error::ViewError;
use super::handles::{ContextId, MeshHandle, ProgramHandle};
use super::rotation::Rotation;
use super::slots::ShaderSlotSet;
use super::state::ViewState;

/// A GPU-rendered surface and every resource needed to present frames on it.
///
/// The view exclusively owns its rendering context, its color (and optional
/// depth) render buffer, the uploaded mesh and the resolved shader slots.
/// Programs and projection matrices come from outside.
///
/// All operations take `&mut self`: a view is driven from a single thread,
/// once per display refresh.
pub struct SurfaceView<B: RenderBackend> {
    backend: B,
    config: ViewConfig,
    state: ViewState,

    context: Option<ContextId>,
    surface_size: PixelSize,
    color: Option<RenderBuffer>,
    depth: Option<RenderBuffer>,

    program: Option<ProgramHandle>,
    slots: ShaderSlotSet,
    mesh: Option<MeshHandle>,

    projection: Mat4,
    rotation: Rotation,
    clock: FrameClock,
}

impl<B: RenderBackend> SurfaceView<B> {
    pub fn new(backend: B, config: ViewConfig) -> Self {
        Self {
            backend,
            config,
            state: ViewState::Uninitialized,
            context: None,
            surface_size: PixelSize::ZERO,
            color: None,
            depth: None,
            program: None,
            slots: ShaderSlotSet::UNRESOLVED,
            mesh: None,
            projection: Mat4::IDENTITY,
            rotation: Rotation::ZERO,
            clock: FrameClock::new(),
        }
    }

    /// Creates the context, configures the surface and allocates render
    /// buffers sized to `size`.
    ///
    /// On failure everything built so far is released and the view stays
    /// `Uninitialized`, so the call may be retried.
    pub fn initialize(&mut self, size: PixelSize) -> Result<(), ViewError> {
        self.expect_state("initialize", &[ViewState::Uninitialized])?;

        if size.is_empty() {
            return Err(ViewError::Setup(format!("surface has no pixels ({size})")));
        }

        let ctx = self.backend.create_context(self.config.api)?;
        self.context = Some(ctx);

        let built = self
            .backend
            .configure_surface(ctx, size)
            .and_then(|()| self.allocate_buffers(ctx, size));

        if let Err(e) = built {
            log::error!("surface view setup failed: {e}");
            self.release_all();
            return Err(e);
        }

        self.surface_size = size;
        self.clock.reset();
        self.state = ViewState::Ready;
        log::info!(
            "surface view ready: {size}, depth {}",
            if self.depth.is_some() { "on" } else { "off" }
        );
        Ok(())
    }

    /// Reallocates the render buffers for a new surface size.
    ///
    /// Same-size notifications are ignored while the buffers are live. A zero
    /// size releases the buffers and frames are skipped until a non-zero size
    /// arrives. If allocation fails the view is `Stalled` until a later call
    /// succeeds.
    pub fn layout_changed(&mut self, size: PixelSize) -> Result<(), ViewError> {
        self.expect_state("layout_changed", &[ViewState::Ready, ViewState::Stalled])?;
        let ctx = self.live_context("layout_changed")?;

        if self.state == ViewState::Ready && size == self.surface_size && self.color.is_some() {
            return Ok(());
        }

        self.release_buffers(ctx);
        self.surface_size = size;

        if size.is_empty() {
            log::debug!("surface collapsed to {size}; deferring render buffer allocation");
            self.state = ViewState::Ready;
            return Ok(());
        }

        match self.allocate_buffers(ctx, size) {
            Ok(()) => {
                log::debug!("render buffers reallocated at {size}");
                self.clock.reset();
                self.state = ViewState::Ready;
                Ok(())
            }
            Err(e) => {
                log::error!("render buffer reallocation at {size} failed: {e}");
                self.state = ViewState::Stalled;
                Err(e)
            }
        }
    }

    /// Advances the rotation, draws the mesh with the attached program and
    /// presents the color buffer.
    pub fn render_frame(&mut self) -> Result<FrameStatus, ViewError> {
        self.expect_state("render_frame", &[ViewState::Ready])?;
        let ctx = self.live_context("render_frame")?;

        let ft = self.clock.tick();
        self.rotation.advance(self.config.rotation.increment(ft.dt));

        let Some(color) = self.color else {
            return Ok(FrameStatus::Skipped);
        };

        let model_view = transform::model_view(self.rotation, self.config.model_translation);
        let submission = DrawSubmission {
            color: &color,
            depth: self.depth.as_ref(),
            program: self.program,
            slots: &self.slots,
            mesh: self.mesh,
            projection: self.projection,
            model_view,
            clear_color: self.config.clear_color,
        };

        self.state = ViewState::Rendering;
        let result = match self.backend.draw(ctx, &submission) {
            Ok(FrameStatus::Presented) => self
                .backend
                .present(ctx, color.handle)
                .map(|()| FrameStatus::Presented),
            other => other,
        };

        self.state = match &result {
            Err(ViewError::Resource(_)) => ViewState::Stalled,
            _ => ViewState::Ready,
        };

        if let Err(e) = &result {
            log::error!("frame {} failed: {e}", ft.frame_index);
        }
        result
    }

    /// Releases the mesh, the render buffers and the context.
    ///
    /// Safe to call any number of times and in any state.
    pub fn teardown(&mut self) {
        if self.state == ViewState::TornDown {
            return;
        }
        self.release_all();
        self.state = ViewState::TornDown;
        log::debug!("surface view torn down");
    }

    /// Attaches a linked program and resolves the view's shader slots from it.
    ///
    /// The program is attached even when some slots are missing; those stay
    /// unresolved and a [`ViewError::ShaderBinding`] is returned once.
    pub fn attach_program(&mut self, program: ProgramHandle) -> Result<(), ViewError> {
        self.expect_state("attach_program", &[ViewState::Ready, ViewState::Stalled])?;
        let ctx = self.live_context("attach_program")?;

        let slots = ShaderSlotSet::resolve(&self.backend, ctx, program)?;
        self.program = Some(program);
        self.slots = slots;

        let missing = slots.missing();
        if missing.is_empty() {
            log::debug!("program {} attached, all slots resolved", program.raw());
            Ok(())
        } else {
            let err = ViewError::ShaderBinding { missing };
            log::warn!("program {} attached with gaps: {err}", program.raw());
            Err(err)
        }
    }

    /// Uploads `mesh` as the geometry drawn each frame, replacing any previous one.
    pub fn set_mesh(&mut self, mesh: &Mesh) -> Result<(), ViewError> {
        self.expect_state("set_mesh", &[ViewState::Ready, ViewState::Stalled])?;
        let ctx = self.live_context("set_mesh")?;

        if !mesh.is_valid() {
            return Err(ViewError::Resource(format!(
                "mesh with {} vertices and {} indices is not a valid triangle list",
                mesh.vertices.len(),
                mesh.indices.len()
            )));
        }

        let handle = self.backend.upload_mesh(ctx, mesh)?;
        if let Some(old) = self.mesh.replace(handle) {
            self.backend.release_mesh(ctx, old);
        }
        Ok(())
    }

    /// Sets the projection matrix supplied by the transform collaborator.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Runs `f` with the backend and the view's live context.
    ///
    /// This is how collaborators link programs against the view's context.
    pub fn with_context<R>(
        &mut self,
        f: impl FnOnce(&mut B, ContextId) -> R,
    ) -> Result<R, ViewError> {
        let ctx = self.live_context("with_context")?;
        Ok(f(&mut self.backend, ctx))
    }

    #[inline]
    pub fn state(&self) -> ViewState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[inline]
    pub fn surface_size(&self) -> PixelSize {
        self.surface_size
    }

    #[inline]
    pub fn color_buffer(&self) -> Option<&RenderBuffer> {
        self.color.as_ref()
    }

    #[inline]
    pub fn depth_buffer(&self) -> Option<&RenderBuffer> {
        self.depth.as_ref()
    }

    #[inline]
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    #[inline]
    pub fn slots(&self) -> &ShaderSlotSet {
        &self.slots
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Model-view matrix for the current rotation.
    pub fn model_view(&self) -> Mat4 {
        transform::model_view(self.rotation, self.config.model_translation)
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn expect_state(&self, operation: &'static str, allowed: &[ViewState]) -> Result<(), ViewError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ViewError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn live_context(&self, operation: &'static str) -> Result<ContextId, ViewError> {
        match (self.state, self.context) {
            (state, Some(ctx)) if state.has_context() => Ok(ctx),
            (state, _) => Err(ViewError::InvalidState { operation, state }),
        }
    }

    fn allocate_buffers(&mut self, ctx: ContextId, size: PixelSize) -> Result<(), ViewError> {
        let color = self.allocate(ctx, RenderBufferKind::Color, size)?;

        let depth = match self.config.depth.format() {
            Some(format) => match self.allocate(ctx, RenderBufferKind::Depth(format), size) {
                Ok(d) => Some(d),
                Err(e) => {
                    self.backend.release_render_buffer(ctx, color.handle);
                    return Err(e);
                }
            },
            None => None,
        };

        self.color = Some(color);
        self.depth = depth;
        Ok(())
    }

    fn allocate(
        &mut self,
        ctx: ContextId,
        kind: RenderBufferKind,
        size: PixelSize,
    ) -> Result<RenderBuffer, ViewError> {
        let handle = self
            .backend
            .create_render_buffer(ctx, RenderBufferDesc { kind, size })?;
        Ok(RenderBuffer { handle, kind, size })
    }

    fn release_buffers(&mut self, ctx: ContextId) {
        if let Some(depth) = self.depth.take() {
            self.backend.release_render_buffer(ctx, depth.handle);
        }
        if let Some(color) = self.color.take() {
            self.backend.release_render_buffer(ctx, color.handle);
        }
    }

    fn release_all(&mut self) {
        let Some(ctx) = self.context.take() else {
            return;
        };

        if let Some(mesh) = self.mesh.take() {
            self.backend.release_mesh(ctx, mesh);
        }
        self.release_buffers(ctx);

        // Slots die with the program, which dies with the context.
        self.program = None;
        self.slots = ShaderSlotSet::UNRESOLVED;

        self.backend.release_context(ctx);
    }
}

impl<B: RenderBackend> Drop for SurfaceView<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, HeadlessOp, ProgramSource};
    use crate::view::{DepthFormat, DepthMode, RotationPolicy, SlotName};

    const STEP: f32 = 1.0;

    const FULL_PROGRAM: ProgramSource<'static> = ProgramSource {
        label: "full",
        wgsl: "",
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        attributes: &[("position", 0), ("color", 1)],
        uniforms: &[("projection", 0), ("modelView", 1)],
        depth_test: true,
    };

    const NO_COLOR_PROGRAM: ProgramSource<'static> = ProgramSource {
        label: "no color",
        wgsl: "",
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        attributes: &[("position", 0)],
        uniforms: &[("projection", 0), ("modelView", 1)],
        depth_test: false,
    };

    fn config(depth: DepthMode) -> ViewConfig {
        ViewConfig {
            depth,
            rotation: RotationPolicy::FixedStep { degrees: STEP },
            ..ViewConfig::default()
        }
    }

    fn view() -> SurfaceView<HeadlessBackend> {
        SurfaceView::new(HeadlessBackend::new(), config(DepthMode::Disabled))
    }

    fn view_with_depth() -> SurfaceView<HeadlessBackend> {
        SurfaceView::new(
            HeadlessBackend::new(),
            config(DepthMode::Enabled(DepthFormat::Depth24Plus)),
        )
    }

    fn link(view: &mut SurfaceView<HeadlessBackend>, source: &ProgramSource<'_>) -> ProgramHandle {
        view.with_context(|b, ctx| b.link_program(ctx, source))
            .unwrap()
            .unwrap()
    }

    fn size(w: u32, h: u32) -> PixelSize {
        PixelSize::new(w, h)
    }

    // ── initialize ────────────────────────────────────────────────────────

    #[test]
    fn initialize_sizes_color_buffer_to_surface() {
        for s in [size(1, 1), size(320, 480), size(2048, 1536)] {
            let mut v = view();
            v.initialize(s).unwrap();
            assert_eq!(v.state(), ViewState::Ready);
            assert_eq!(v.color_buffer().unwrap().size, s);
            assert!(v.depth_buffer().is_none());
        }
    }

    #[test]
    fn initialize_with_depth_allocates_matching_depth_buffer() {
        let mut v = view_with_depth();
        v.initialize(size(320, 480)).unwrap();
        let depth = v.depth_buffer().unwrap();
        assert_eq!(depth.size, size(320, 480));
        assert_eq!(depth.kind, RenderBufferKind::Depth(DepthFormat::Depth24Plus));
        assert_eq!(v.backend().live_buffers(), 2);
    }

    #[test]
    fn initialize_rejects_zero_size() {
        let mut v = view();
        assert!(matches!(v.initialize(size(0, 480)), Err(ViewError::Setup(_))));
        assert_eq!(v.state(), ViewState::Uninitialized);
        assert_eq!(v.backend().live_contexts(), 0);
    }

    #[test]
    fn context_failure_is_a_setup_error() {
        let mut backend = HeadlessBackend::new();
        backend.fail_next(HeadlessOp::CreateContext);
        let mut v = SurfaceView::new(backend, config(DepthMode::Disabled));
        assert!(matches!(v.initialize(size(320, 480)), Err(ViewError::Setup(_))));
        assert_eq!(v.state(), ViewState::Uninitialized);
    }

    #[test]
    fn surface_failure_releases_the_context() {
        let mut backend = HeadlessBackend::new();
        backend.fail_next(HeadlessOp::ConfigureSurface);
        let mut v = SurfaceView::new(backend, config(DepthMode::Disabled));
        assert!(matches!(v.initialize(size(320, 480)), Err(ViewError::Setup(_))));
        assert_eq!(v.backend().live_contexts(), 0);
        assert_eq!(v.backend().released_contexts(), 1);
    }

    #[test]
    fn depth_failure_during_setup_releases_color_buffer() {
        let mut backend = HeadlessBackend::new();
        backend.fail_next(HeadlessOp::DepthBuffer);
        let mut v = SurfaceView::new(backend, config(DepthMode::Enabled(DepthFormat::Depth16Unorm)));
        assert!(matches!(v.initialize(size(320, 480)), Err(ViewError::Resource(_))));
        assert_eq!(v.state(), ViewState::Uninitialized);
        assert_eq!(v.backend().live_buffers(), 0);
        assert_eq!(v.backend().double_releases(), 0);
    }

    #[test]
    fn failed_initialize_can_be_retried() {
        let mut backend = HeadlessBackend::new();
        backend.fail_next(HeadlessOp::ColorBuffer);
        let mut v = SurfaceView::new(backend, config(DepthMode::Disabled));
        assert!(v.initialize(size(320, 480)).is_err());
        v.initialize(size(320, 480)).unwrap();
        assert_eq!(v.state(), ViewState::Ready);
    }

    #[test]
    fn initialize_twice_is_invalid() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        assert!(matches!(
            v.initialize(size(320, 480)),
            Err(ViewError::InvalidState { operation: "initialize", state: ViewState::Ready })
        ));
    }

    // ── layout_changed ────────────────────────────────────────────────────

    #[test]
    fn layout_change_reallocates_at_new_size() {
        let mut v = view_with_depth();
        v.initialize(size(320, 480)).unwrap();
        let old = *v.color_buffer().unwrap();

        v.layout_changed(size(640, 960)).unwrap();

        let color = v.color_buffer().unwrap();
        assert_ne!(color.handle, old.handle);
        assert_eq!(color.size, size(640, 960));
        assert_eq!(v.depth_buffer().unwrap().size, size(640, 960));
        assert_eq!(v.backend().buffer_desc(old.handle), None);
        assert_eq!(v.backend().live_buffers(), 2);
        let ctx = v.with_context(|_, ctx| ctx).unwrap();
        assert_eq!(v.backend().surface_size(ctx), Some(size(640, 960)));
    }

    #[test]
    fn frame_after_layout_change_never_reads_old_buffer() {
        let mut v = view_with_depth();
        v.initialize(size(320, 480)).unwrap();
        v.render_frame().unwrap();
        v.layout_changed(size(640, 960)).unwrap();
        v.render_frame().unwrap();

        let draws = v.backend().draws();
        assert_eq!(draws[0].color_size, size(320, 480));
        assert_eq!(draws[1].color_size, size(640, 960));
        assert_eq!(draws[1].depth_size, Some(size(640, 960)));
    }

    #[test]
    fn same_size_layout_keeps_buffers() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        let handle = v.color_buffer().unwrap().handle;
        v.layout_changed(size(320, 480)).unwrap();
        assert_eq!(v.color_buffer().unwrap().handle, handle);
    }

    #[test]
    fn zero_size_layout_skips_frames_until_resized() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        v.layout_changed(size(0, 0)).unwrap();
        assert!(v.color_buffer().is_none());
        assert_eq!(v.render_frame().unwrap(), FrameStatus::Skipped);

        v.layout_changed(size(100, 100)).unwrap();
        assert_eq!(v.render_frame().unwrap(), FrameStatus::Presented);
        assert_eq!(v.backend().draws().len(), 1);
    }

    #[test]
    fn allocation_failure_stalls_until_next_layout() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();

        v.with_context(|b, _| b.fail_next(HeadlessOp::ColorBuffer)).unwrap();
        assert!(matches!(v.layout_changed(size(640, 960)), Err(ViewError::Resource(_))));
        assert_eq!(v.state(), ViewState::Stalled);
        assert!(matches!(
            v.render_frame(),
            Err(ViewError::InvalidState { state: ViewState::Stalled, .. })
        ));
        assert!(v.backend().draws().is_empty());

        v.layout_changed(size(640, 960)).unwrap();
        assert_eq!(v.state(), ViewState::Ready);
        assert_eq!(v.render_frame().unwrap(), FrameStatus::Presented);
    }

    #[test]
    fn layout_before_initialize_is_invalid() {
        let mut v = view();
        assert!(matches!(
            v.layout_changed(size(10, 10)),
            Err(ViewError::InvalidState { state: ViewState::Uninitialized, .. })
        ));
    }

    // ── render_frame ──────────────────────────────────────────────────────

    #[test]
    fn each_frame_advances_rotation_by_one_step() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        for n in 1..=10 {
            v.render_frame().unwrap();
            assert_eq!(v.rotation().degrees(), n as f32 * STEP);
        }
    }

    #[test]
    fn full_cycle_of_frames_restores_rotation() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        let ticks = (360.0 / STEP) as usize;
        for _ in 0..ticks {
            v.render_frame().unwrap();
        }
        assert_eq!(v.rotation(), Rotation::ZERO);
        assert_eq!(v.backend().presents().len(), ticks);
    }

    #[test]
    fn fractional_steps_complete_a_cycle_exactly() {
        for (step, ticks) in [(0.1_f32, 3600), (0.3, 1200), (1.2, 300), (7.2, 50)] {
            let mut v = SurfaceView::new(
                HeadlessBackend::new(),
                ViewConfig {
                    rotation: RotationPolicy::FixedStep { degrees: step },
                    ..ViewConfig::default()
                },
            );
            v.initialize(size(320, 480)).unwrap();
            for _ in 0..ticks {
                v.render_frame().unwrap();
            }
            assert_eq!(v.rotation(), Rotation::ZERO, "step {step} over {ticks} frames");
        }
    }

    #[test]
    fn frame_submits_current_transforms_and_mesh() {
        let mut v = view_with_depth();
        v.initialize(size(320, 480)).unwrap();
        let program = link(&mut v, &FULL_PROGRAM);
        v.attach_program(program).unwrap();
        v.set_mesh(&Mesh::cube()).unwrap();
        let projection = transform::frustum_projection(size(320, 480));
        v.set_projection(projection);

        v.render_frame().unwrap();

        let draw = &v.backend().draws()[0];
        assert_eq!(draw.program, Some(program));
        assert_eq!(draw.index_count, 36);
        assert_eq!(draw.projection, projection);
        assert_eq!(draw.model_view, v.model_view());
        assert!(draw.slots.is_complete());
    }

    #[test]
    fn frame_without_program_only_clears() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        v.set_mesh(&Mesh::cube()).unwrap();
        assert_eq!(v.render_frame().unwrap(), FrameStatus::Presented);
        assert_eq!(v.backend().draws()[0].index_count, 0);
    }

    #[test]
    fn skipped_draw_is_not_presented() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        v.with_context(|b, _| b.fail_next(HeadlessOp::Draw)).unwrap();
        assert_eq!(v.render_frame().unwrap(), FrameStatus::Skipped);
        assert!(v.backend().presents().is_empty());
        assert_eq!(v.state(), ViewState::Ready);
    }

    // ── shader slots ──────────────────────────────────────────────────────

    #[test]
    fn missing_attribute_is_reported_and_left_unresolved() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        let program = link(&mut v, &NO_COLOR_PROGRAM);

        let err = v.attach_program(program).unwrap_err();
        assert_eq!(err, ViewError::ShaderBinding { missing: vec![SlotName::Color] });
        assert!(!v.slots().color.is_resolved());
        assert_eq!(v.slots().position.location(), Some(0));
        assert_eq!(v.program(), Some(program));
    }

    #[test]
    fn reattaching_resolves_against_the_new_program() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        let partial = link(&mut v, &NO_COLOR_PROGRAM);
        let full = link(&mut v, &FULL_PROGRAM);

        let _ = v.attach_program(partial);
        v.attach_program(full).unwrap();
        assert!(v.slots().is_complete());
        assert_eq!(v.slots().color.location(), Some(1));
    }

    #[test]
    fn invalid_mesh_is_rejected_without_upload() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        let bad = Mesh::new(Mesh::cube().vertices, vec![0, 1, 99]);
        assert!(matches!(v.set_mesh(&bad), Err(ViewError::Resource(_))));
        assert_eq!(v.backend().live_meshes(), 0);
    }

    #[test]
    fn replacing_mesh_releases_the_old_upload() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        v.set_mesh(&Mesh::cube()).unwrap();
        v.set_mesh(&Mesh::cube()).unwrap();
        assert_eq!(v.backend().live_meshes(), 1);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn teardown_twice_releases_once() {
        let mut v = view_with_depth();
        v.initialize(size(320, 480)).unwrap();
        let program = link(&mut v, &FULL_PROGRAM);
        v.attach_program(program).unwrap();
        v.set_mesh(&Mesh::cube()).unwrap();
        assert_eq!(v.backend().live_programs(), 1);

        v.teardown();
        v.teardown();

        assert_eq!(v.state(), ViewState::TornDown);
        let b = v.backend();
        assert_eq!(b.live_contexts(), 0);
        assert_eq!(b.live_buffers(), 0);
        assert_eq!(b.live_meshes(), 0);
        assert_eq!(b.live_programs(), 0);
        assert_eq!(b.released_contexts(), 1);
        assert_eq!(b.double_releases(), 0);
    }

    #[test]
    fn teardown_of_uninitialized_view_is_a_no_op() {
        let mut v = view();
        v.teardown();
        assert_eq!(v.state(), ViewState::TornDown);
        assert_eq!(v.backend().released_contexts(), 0);
        assert_eq!(v.backend().double_releases(), 0);
    }

    #[test]
    fn teardown_after_failed_initialize_does_not_double_release() {
        let mut backend = HeadlessBackend::new();
        backend.fail_next(HeadlessOp::ColorBuffer);
        let mut v = SurfaceView::new(backend, config(DepthMode::Disabled));
        assert!(v.initialize(size(320, 480)).is_err());
        v.teardown();
        v.teardown();
        assert_eq!(v.backend().released_contexts(), 1);
        assert_eq!(v.backend().double_releases(), 0);
    }

    #[test]
    fn torn_down_view_refuses_everything() {
        let mut v = view();
        v.initialize(size(320, 480)).unwrap();
        v.teardown();
        assert!(v.render_frame().is_err());
        assert!(v.layout_changed(size(10, 10)).is_err());
        assert!(v.initialize(size(10, 10)).is_err());
        assert!(v.with_context(|_, _| ()).is_err());
        assert_eq!(v.state(), ViewState::TornDown);
    }

    // ── scenario ──────────────────────────────────────────────────────────

    #[test]
    fn portrait_phone_lifecycle() {
        let mut v = view();

        v.initialize(size(320, 480)).unwrap();
        assert_eq!(v.state(), ViewState::Ready);
        assert_eq!(v.color_buffer().unwrap().size, size(320, 480));

        let before = v.rotation().degrees();
        v.render_frame().unwrap();
        assert_eq!(v.state(), ViewState::Ready);
        assert_eq!(v.rotation().degrees(), before + STEP);

        v.layout_changed(size(640, 960)).unwrap();
        assert_eq!(v.color_buffer().unwrap().size, size(640, 960));

        v.teardown();
        v.teardown();
        assert_eq!(v.state(), ViewState::TornDown);
        assert_eq!(v.backend().double_releases(), 0);
    }
}
