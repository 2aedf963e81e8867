//! Size and color types shared by the view, the backends and the runtime.
//!
//! Surface sizes are always physical pixels. Colors are linear RGBA.

mod color;
mod size;

pub use color::Color;
pub use size::PixelSize;
