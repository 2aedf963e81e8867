use glam::Vec3;

use crate::coords::Color;

use super::buffers::DepthMode;
use super::rotation::RotationPolicy;

/// Rendering API level requested when the context is created.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ApiVersion {
    /// Programmable pipeline with vertex attributes and uniforms (ES 2 class).
    #[default]
    Es2,
}

/// Per-view configuration.
///
/// Keep this small. Settings that only matter to one backend belong in that
/// backend's init struct (see [`GpuInit`](crate::device::GpuInit)).
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// API level for the rendering context.
    pub api: ApiVersion,

    /// Depth render buffer allocation. Disabled unless a program needs it.
    pub depth: DepthMode,

    /// Per-frame rotation increment.
    pub rotation: RotationPolicy,

    /// Color the color buffer is cleared to at the start of every frame.
    pub clear_color: Color,

    /// Model position in view space, applied before the rotation.
    pub model_translation: Vec3,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            api: ApiVersion::Es2,
            depth: DepthMode::Disabled,
            rotation: RotationPolicy::default(),
            clear_color: Color::FOREST,
            model_translation: Vec3::new(0.0, 0.0, -7.0),
        }
    }
}
