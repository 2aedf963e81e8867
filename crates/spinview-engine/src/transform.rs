//! Matrix helpers for the model-view and projection transforms.
//!
//! Clip space follows wgpu: right-handed view space, depth mapped to `[0, 1]`.

use glam::{EulerRot, Mat4, Vec3, Vec4};

use crate::coords::PixelSize;
use crate::view::Rotation;

/// Builds the model-view matrix `T * Rx(r) * Ry(r)`: an XYZ Euler rotation
/// of `(r, r, 0)` followed by the translation.
pub fn model_view(rotation: Rotation, translation: Vec3) -> Mat4 {
    let r = rotation.radians();
    Mat4::from_translation(translation) * Mat4::from_euler(EulerRot::XYZ, r, r, 0.0)
}

/// Perspective frustum with explicit clip planes.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let w = right - left;
    let h = top - bottom;
    let d = near - far;
    Mat4::from_cols(
        Vec4::new(2.0 * near / w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / h, 0.0, 0.0),
        Vec4::new((right + left) / w, (top + bottom) / h, far / d, -1.0),
        Vec4::new(0.0, 0.0, near * far / d, 0.0),
    )
}

/// Default projection for a surface: four units wide at the near plane,
/// height scaled to keep pixels square, near 4, far 10.
pub fn frustum_projection(size: PixelSize) -> Mat4 {
    let h = 4.0 / size.aspect();
    frustum(-2.0, 2.0, -h / 2.0, h / 2.0, 4.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(m: Mat4, p: Vec3) -> Vec3 {
        let c = m * p.extend(1.0);
        c.truncate() / c.w
    }

    #[test]
    fn zero_rotation_is_pure_translation() {
        let t = Vec3::new(0.0, 0.0, -7.0);
        assert_eq!(model_view(Rotation::ZERO, t), Mat4::from_translation(t));
    }

    #[test]
    fn model_view_is_translated_xy_euler_rotation() {
        let t = Vec3::new(0.0, 0.0, -7.0);
        let rotation = Rotation::from_degrees(30.0);
        let r = rotation.radians();
        let expected =
            Mat4::from_translation(t) * Mat4::from_rotation_x(r) * Mat4::from_rotation_y(r);
        assert!(model_view(rotation, t).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn model_view_keeps_origin_at_translation() {
        let t = Vec3::new(1.0, 2.0, -7.0);
        let m = model_view(Rotation::from_degrees(123.0), t);
        let o = m.transform_point3(Vec3::ZERO);
        assert!((o - t).length() < 1e-5);
    }

    #[test]
    fn near_and_far_planes_map_to_depth_range() {
        let m = frustum_projection(PixelSize::new(320, 480));
        let near = project(m, Vec3::new(0.0, 0.0, -4.0));
        let far = project(m, Vec3::new(0.0, 0.0, -10.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn near_plane_edges_map_to_clip_edges() {
        let size = PixelSize::new(320, 480);
        let m = frustum_projection(size);
        let h = 4.0 / size.aspect();
        let corner = project(m, Vec3::new(2.0, h / 2.0, -4.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_surface_still_yields_finite_projection() {
        let m = frustum_projection(PixelSize::ZERO);
        assert!(m.is_finite());
    }
}
