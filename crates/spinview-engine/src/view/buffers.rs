use crate::coords::PixelSize;

use super::handles::BufferHandle;

/// Depth storage formats a backend may allocate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DepthFormat {
    Depth16Unorm,
    Depth24Plus,
    Depth32Float,
}

impl DepthFormat {
    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            Self::Depth16Unorm => wgpu::TextureFormat::Depth16Unorm,
            Self::Depth24Plus => wgpu::TextureFormat::Depth24Plus,
            Self::Depth32Float => wgpu::TextureFormat::Depth32Float,
        }
    }
}

/// Whether the view allocates a depth render buffer next to the color one.
///
/// Depth is opt-in: programs that want depth testing must also request it
/// (see [`ProgramSource::depth_test`](crate::backend::ProgramSource)).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DepthMode {
    #[default]
    Disabled,
    Enabled(DepthFormat),
}

impl DepthMode {
    #[inline]
    pub fn format(self) -> Option<DepthFormat> {
        match self {
            Self::Disabled => None,
            Self::Enabled(f) => Some(f),
        }
    }
}

/// What a render buffer stores.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderBufferKind {
    /// Pixels presented to the surface. The format is the surface's.
    Color,
    Depth(DepthFormat),
}

/// Allocation request passed to a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderBufferDesc {
    pub kind: RenderBufferKind,
    pub size: PixelSize,
}

/// A live render buffer owned by a view.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderBuffer {
    pub handle: BufferHandle,
    pub kind: RenderBufferKind,
    /// Surface size at the moment of allocation.
    pub size: PixelSize,
}

