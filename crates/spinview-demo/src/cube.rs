use spinview_engine::backend::{ProgramSource, RenderBackend};
use spinview_engine::coords::PixelSize;
use spinview_engine::core::App;
use spinview_engine::mesh::Mesh;
use spinview_engine::transform;
use spinview_engine::view::{SurfaceView, ViewError};

/// Vertex-colored program with `projection`/`modelView` uniforms.
pub const CUBE_PROGRAM: ProgramSource<'static> = ProgramSource {
    label: "cube",
    wgsl: include_str!("shaders/cube.wgsl"),
    vertex_entry: "vs_main",
    fragment_entry: "fs_main",
    attributes: &[("position", 0), ("color", 1)],
    uniforms: &[("projection", 0), ("modelView", 1)],
    depth_test: true,
};

/// Feeds the view a colored cube and a frustum that tracks the surface size.
#[derive(Debug, Default)]
pub struct CubeApp {
    resizes: u32,
}

impl App for CubeApp {
    fn on_ready<B: RenderBackend>(&mut self, view: &mut SurfaceView<B>) -> Result<(), ViewError> {
        let program = view.with_context(|backend, ctx| backend.link_program(ctx, &CUBE_PROGRAM))??;
        view.attach_program(program)?;
        view.set_mesh(&Mesh::cube())?;
        view.set_projection(transform::frustum_projection(view.surface_size()));
        log::info!("cube ready at {}", view.surface_size());
        Ok(())
    }

    fn on_resize<B: RenderBackend>(&mut self, view: &mut SurfaceView<B>, size: PixelSize) {
        self.resizes += 1;
        view.set_projection(transform::frustum_projection(size));
        log::debug!("projection rebuilt for {size} (resize #{})", self.resizes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinview_engine::backend::{FrameStatus, HeadlessBackend};
    use spinview_engine::view::{DepthFormat, DepthMode, RotationPolicy, ViewConfig};

    fn ready_view() -> SurfaceView<HeadlessBackend> {
        let config = ViewConfig {
            depth: DepthMode::Enabled(DepthFormat::Depth24Plus),
            rotation: RotationPolicy::FixedStep { degrees: 3.0 },
            ..ViewConfig::default()
        };
        let mut view = SurfaceView::new(HeadlessBackend::new(), config);
        view.initialize(PixelSize::new(320, 480)).unwrap();
        CubeApp::default().on_ready(&mut view).unwrap();
        view
    }

    #[test]
    fn cube_program_resolves_every_slot() {
        let view = ready_view();
        assert!(view.slots().is_complete());
        assert_eq!(view.slots().position.location(), Some(0));
        assert_eq!(view.slots().model_view.binding(), Some(1));
    }

    #[test]
    fn ready_view_draws_the_whole_cube() {
        let mut view = ready_view();
        assert_eq!(view.render_frame().unwrap(), FrameStatus::Presented);
        let draw = &view.backend().draws()[0];
        assert_eq!(draw.index_count, 36);
        assert_eq!(draw.depth_size, Some(PixelSize::new(320, 480)));
    }

    #[test]
    fn resize_rebuilds_projection_for_new_aspect() {
        let mut view = ready_view();
        let mut app = CubeApp::default();
        let before = view.projection();

        view.layout_changed(PixelSize::new(960, 640)).unwrap();
        app.on_resize(&mut view, PixelSize::new(960, 640));

        assert_ne!(view.projection(), before);
        assert_eq!(
            view.projection(),
            transform::frustum_projection(PixelSize::new(960, 640))
        );
    }
}
