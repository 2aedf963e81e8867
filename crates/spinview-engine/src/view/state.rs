use std::fmt;

/// Lifecycle state of a [`SurfaceView`](super::SurfaceView).
///
/// ```text
/// Uninitialized ──initialize──▶ Ready ◀──▶ Rendering
///                                │  ▲
///            allocation failure  ▼  │ layout_changed
///                               Stalled
///
/// any state ──teardown──▶ TornDown (terminal)
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ViewState {
    /// No context yet, or `initialize` failed and released what it built.
    Uninitialized,
    /// Context and render buffers are live; frames may be rendered.
    Ready,
    /// A frame is being recorded and presented.
    Rendering,
    /// Render buffers could not be (re)allocated; drawing is refused until a
    /// later `layout_changed` succeeds.
    Stalled,
    /// All resources released. No transition leaves this state.
    TornDown,
}

impl ViewState {
    /// Returns `true` if a rendering context is held in this state.
    #[inline]
    pub const fn has_context(self) -> bool {
        matches!(self, Self::Ready | Self::Rendering | Self::Stalled)
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Rendering => "rendering",
            Self::Stalled => "stalled",
            Self::TornDown => "torn down",
        };
        f.write_str(s)
    }
}
