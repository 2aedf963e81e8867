use thiserror::Error;

use super::handles::ContextId;
use super::slots::SlotName;
use super::state::ViewState;

/// Failures surfaced by the view and its backends.
///
/// Nothing is retried automatically; every error reaches the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The context could not be created or the surface could not be configured.
    #[error("surface setup failed: {0}")]
    Setup(String),

    /// A render buffer or mesh could not be allocated.
    #[error("render resource allocation failed: {0}")]
    Resource(String),

    /// The backend rejected a program source.
    #[error("shader program link failed: {0}")]
    ProgramLink(String),

    /// The attached program does not declare some of the required slots.
    #[error("shader program does not declare {}", list_slots(.missing))]
    ShaderBinding { missing: Vec<SlotName> },

    /// The operation is not permitted in the view's current state.
    #[error("`{operation}` is not allowed while the view is {state}")]
    InvalidState {
        operation: &'static str,
        state: ViewState,
    },

    /// A backend call named a context that was released or never existed.
    #[error("rendering context {} is not live", .0.raw())]
    StaleContext(ContextId),

    /// A backend call named a handle that does not belong to the context.
    #[error("unknown {kind} handle {raw}")]
    UnknownHandle { kind: &'static str, raw: u32 },
}

impl ViewError {
    /// Returns `true` for errors after which the view cannot render at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Setup(_) | Self::StaleContext(_))
    }
}

fn list_slots(slots: &[SlotName]) -> String {
    slots
        .iter()
        .map(|s| format!("`{}`", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_binding_message_lists_missing_names() {
        let err = ViewError::ShaderBinding {
            missing: vec![SlotName::Color, SlotName::ModelView],
        };
        assert_eq!(
            err.to_string(),
            "shader program does not declare `color`, `modelView`"
        );
    }

    #[test]
    fn invalid_state_message_names_operation_and_state() {
        let err = ViewError::InvalidState {
            operation: "render_frame",
            state: ViewState::TornDown,
        };
        assert_eq!(
            err.to_string(),
            "`render_frame` is not allowed while the view is torn down"
        );
    }

    #[test]
    fn only_setup_and_stale_context_are_fatal() {
        assert!(ViewError::Setup("x".into()).is_fatal());
        assert!(ViewError::StaleContext(ContextId::from_raw(3)).is_fatal());
        assert!(!ViewError::Resource("x".into()).is_fatal());
        assert!(!ViewError::ShaderBinding { missing: vec![] }.is_fatal());
    }
}
