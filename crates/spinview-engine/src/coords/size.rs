use std::fmt;

use winit::dpi::PhysicalSize;

/// Drawable size in physical pixels.
///
/// Render buffers are always allocated at exactly this size.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero (e.g. a minimized window).
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height; `1.0` for empty sizes.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<PhysicalSize<u32>> for PixelSize {
    #[inline]
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<(u32, u32)> for PixelSize {
    #[inline]
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_is_empty() {
        assert!(PixelSize::ZERO.is_empty());
        assert!(PixelSize::new(0, 480).is_empty());
        assert!(PixelSize::new(320, 0).is_empty());
        assert!(!PixelSize::new(320, 480).is_empty());
    }

    #[test]
    fn aspect_of_portrait_surface() {
        assert_eq!(PixelSize::new(320, 480).aspect(), 320.0 / 480.0);
    }

    #[test]
    fn aspect_of_empty_surface_is_one() {
        assert_eq!(PixelSize::new(0, 480).aspect(), 1.0);
    }

    #[test]
    fn converts_from_winit_physical_size() {
        let s: PixelSize = PhysicalSize::new(640u32, 960u32).into();
        assert_eq!(s, PixelSize::new(640, 960));
    }

    #[test]
    fn displays_as_width_by_height() {
        assert_eq!(PixelSize::new(640, 960).to_string(), "640x960");
    }
}
