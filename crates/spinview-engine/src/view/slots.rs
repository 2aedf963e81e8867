use std::fmt;

use crate::backend::RenderBackend;

use super::error::ViewError;
use super::handles::{AttributeSlot, ContextId, ProgramHandle, UniformSlot};

/// The four shader inputs the view feeds every frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SlotName {
    Position,
    Color,
    Projection,
    ModelView,
}

impl SlotName {
    pub const ALL: [SlotName; 4] = [
        SlotName::Position,
        SlotName::Color,
        SlotName::Projection,
        SlotName::ModelView,
    ];

    /// Name the program must declare for this slot.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Color => "color",
            Self::Projection => "projection",
            Self::ModelView => "modelView",
        }
    }

    pub const fn is_attribute(self) -> bool {
        matches!(self, Self::Position | Self::Color)
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved locations of the view's shader inputs for one program.
///
/// Valid only while the program it was resolved from stays attached.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ShaderSlotSet {
    pub position: AttributeSlot,
    pub color: AttributeSlot,
    pub projection: UniformSlot,
    pub model_view: UniformSlot,
}

impl ShaderSlotSet {
    pub const UNRESOLVED: Self = Self {
        position: AttributeSlot::UNRESOLVED,
        color: AttributeSlot::UNRESOLVED,
        projection: UniformSlot::UNRESOLVED,
        model_view: UniformSlot::UNRESOLVED,
    };

    /// Looks up every slot in `program`.
    ///
    /// Names the program does not declare stay `UNRESOLVED`; only backend
    /// failures (stale context, unknown program) are errors here.
    pub fn resolve<B>(backend: &B, ctx: ContextId, program: ProgramHandle) -> Result<Self, ViewError>
    where
        B: RenderBackend + ?Sized,
    {
        let attr = |name: SlotName| -> Result<AttributeSlot, ViewError> {
            Ok(backend
                .attribute_location(ctx, program, name.as_str())?
                .map_or(AttributeSlot::UNRESOLVED, AttributeSlot::at))
        };
        let uniform = |name: SlotName| -> Result<UniformSlot, ViewError> {
            Ok(backend
                .uniform_location(ctx, program, name.as_str())?
                .map_or(UniformSlot::UNRESOLVED, UniformSlot::at))
        };

        Ok(Self {
            position: attr(SlotName::Position)?,
            color: attr(SlotName::Color)?,
            projection: uniform(SlotName::Projection)?,
            model_view: uniform(SlotName::ModelView)?,
        })
    }

    pub fn is_resolved(&self, name: SlotName) -> bool {
        match name {
            SlotName::Position => self.position.is_resolved(),
            SlotName::Color => self.color.is_resolved(),
            SlotName::Projection => self.projection.is_resolved(),
            SlotName::ModelView => self.model_view.is_resolved(),
        }
    }

    /// Slots the program did not declare, in declaration order.
    pub fn missing(&self) -> Vec<SlotName> {
        SlotName::ALL
            .into_iter()
            .filter(|n| !self.is_resolved(*n))
            .collect()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        SlotName::ALL.iter().all(|n| self.is_resolved(*n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_set_reports_every_slot_missing() {
        assert_eq!(ShaderSlotSet::UNRESOLVED.missing(), SlotName::ALL.to_vec());
        assert!(!ShaderSlotSet::UNRESOLVED.is_complete());
        assert_eq!(ShaderSlotSet::default(), ShaderSlotSet::UNRESOLVED);
    }

    #[test]
    fn partially_resolved_set_lists_the_gaps() {
        let set = ShaderSlotSet {
            position: AttributeSlot::at(0),
            projection: UniformSlot::at(0),
            ..ShaderSlotSet::UNRESOLVED
        };
        assert_eq!(set.missing(), vec![SlotName::Color, SlotName::ModelView]);
    }

    #[test]
    fn names_match_program_declarations() {
        let names: Vec<_> = SlotName::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, ["position", "color", "projection", "modelView"]);
        assert!(SlotName::Color.is_attribute());
        assert!(!SlotName::ModelView.is_attribute());
    }
}
