use winit::event::WindowEvent;

use crate::backend::RenderBackend;
use crate::coords::PixelSize;
use crate::view::{SurfaceView, ViewError};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Collaborator that supplies what the view does not build itself: linked
/// programs, geometry and projection matrices.
pub trait App {
    /// Called once after the view is initialized. Link and attach the
    /// program, upload the mesh and set the first projection here.
    fn on_ready<B: RenderBackend>(&mut self, view: &mut SurfaceView<B>) -> Result<(), ViewError>;

    /// Called after the view reallocated its buffers for `size`.
    fn on_resize<B: RenderBackend>(&mut self, view: &mut SurfaceView<B>, size: PixelSize) {
        let _ = (view, size);
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }
}
