use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::FrameStatus;
use crate::coords::PixelSize;
use crate::core::{App, AppControl};
use crate::device::{GpuInit, WgpuBackend};
use crate::view::{SurfaceView, ViewConfig, ViewError, ViewState};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub view: ViewConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "spinview".to_string(),
            initial_size: LogicalSize::new(320.0, 480.0),
            view: ViewConfig::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window, drives its view until the window closes and returns
    /// the first fatal view error, if any.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    view: SurfaceView<WgpuBackend<'this>>,
}

struct AppState<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,

    /// Redraws are paused until the next size change.
    stalled: bool,
}

/// What the event loop does after a `render_frame` result.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum RedrawAction {
    Continue,
    /// The view lost its render buffers; relayout at the current size.
    Recover,
    Fail,
}

impl RedrawAction {
    fn after(result: &Result<FrameStatus, ViewError>, state: ViewState) -> Self {
        match result {
            Err(e) if e.is_fatal() => Self::Fail,
            _ if state == ViewState::Stalled => Self::Recover,
            _ => Self::Continue,
        }
    }
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            failure: None,
            exit_requested: false,
            stalled: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let view_config = self.config.view.clone();
        let app = &mut self.app;

        let entry = WindowEntryTryBuilder {
            window,
            view_builder: |w| {
                let mut view = SurfaceView::new(WgpuBackend::new(w, gpu_init), view_config);
                view.initialize(PixelSize::from(w.inner_size()))?;
                app.on_ready(&mut view)?;
                Ok::<_, ViewError>(view)
            },
        }
        .try_build()
        .context("failed to set up the surface view")?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    /// Tears the view down and drops the window.
    fn destroy_entry(&mut self) {
        self.stalled = false;
        if let Some(mut entry) = self.entry.take() {
            entry.with_view_mut(|view| view.teardown());
        }
    }

    fn relayout(&mut self, size: PixelSize) {
        let (app, Some(entry)) = (&mut self.app, self.entry.as_mut()) else {
            return;
        };

        entry.with_view_mut(|view| match view.layout_changed(size) {
            Ok(()) => app.on_resize(view, size),
            Err(e) => log::warn!("layout change to {size} left the view {}: {e}", view.state()),
        });
        entry.with_window(|w| w.request_redraw());
        self.stalled = self.view_state() == Some(ViewState::Stalled);
    }

    fn view_state(&self) -> Option<ViewState> {
        self.entry.as_ref().map(|e| e.with_view(|v| v.state()))
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.stalled {
            return;
        }
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let result = entry.with_view_mut(|view| view.render_frame());
        let state = entry.with_view(|view| view.state());
        let size = entry.with_window(|w| PixelSize::from(w.inner_size()));

        match (RedrawAction::after(&result, state), result) {
            (RedrawAction::Fail, Err(e)) => {
                self.fail(event_loop, anyhow::Error::new(e).context("rendering stopped"));
            }
            (RedrawAction::Recover, _) => {
                log::warn!("view stalled; reallocating render buffers at {size}");
                self.relayout(size);
                if self.stalled {
                    log::warn!("view still stalled; redraws paused until the window is resized");
                }
            }
            (_, Ok(FrameStatus::Skipped)) => log::trace!("frame skipped"),
            _ => {}
        }
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_entry(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // Some platforms destroy the native surface while suspended.
        log::debug!("suspended; releasing the surface view");
        self.destroy_entry();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; FIFO presentation paces it to the display refresh.
        if self.stalled {
            return;
        }
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let ours = self
            .entry
            .as_ref()
            .is_some_and(|e| e.with_window(|w| w.id()) == window_id);
        if !ours {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.destroy_entry();
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.destroy_entry();
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.relayout(new_size.into()),

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self
                    .entry
                    .as_ref()
                    .map(|e| e.with_window(|w| PixelSize::from(w.inner_size())));
                if let Some(size) = size {
                    self.relayout(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.destroy_entry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presented_and_skipped_frames_continue() {
        for status in [FrameStatus::Presented, FrameStatus::Skipped] {
            assert_eq!(
                RedrawAction::after(&Ok(status), ViewState::Ready),
                RedrawAction::Continue
            );
        }
    }

    #[test]
    fn resource_failure_leaving_view_stalled_recovers() {
        let result = Err(ViewError::Resource("surface out of memory".into()));
        assert_eq!(
            RedrawAction::after(&result, ViewState::Stalled),
            RedrawAction::Recover
        );
    }

    #[test]
    fn frames_refused_while_stalled_recover() {
        let result = Err(ViewError::InvalidState {
            operation: "render_frame",
            state: ViewState::Stalled,
        });
        assert_eq!(
            RedrawAction::after(&result, ViewState::Stalled),
            RedrawAction::Recover
        );
    }

    #[test]
    fn fatal_errors_stop_the_loop() {
        let result = Err(ViewError::Setup("device lost".into()));
        assert_eq!(
            RedrawAction::after(&result, ViewState::Ready),
            RedrawAction::Fail
        );
    }

    #[test]
    fn recoverable_errors_on_a_ready_view_continue() {
        let result = Err(ViewError::ShaderBinding { missing: vec![] });
        assert_eq!(
            RedrawAction::after(&result, ViewState::Ready),
            RedrawAction::Continue
        );
    }
}
