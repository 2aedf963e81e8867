//! CPU-side geometry uploaded once and drawn every frame.

use bytemuck::{Pod, Zeroable};

/// One vertex as laid out in the vertex buffer: position then color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    /// Byte offset of `color` within a vertex.
    pub const COLOR_OFFSET: u64 = std::mem::size_of::<[f32; 3]>() as u64;

    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    /// A two-unit colored cube centered on the origin, front face at z = 1.
    pub fn cube() -> Self {
        let vertices = vec![
            // front (z = +1)
            Vertex::new([1.0, -1.0, 1.0], RED),
            Vertex::new([1.0, 1.0, 1.0], RED),
            Vertex::new([-1.0, 1.0, 1.0], GREEN),
            Vertex::new([-1.0, -1.0, 1.0], GREEN),
            // back (z = -1)
            Vertex::new([1.0, -1.0, -1.0], BLUE),
            Vertex::new([1.0, 1.0, -1.0], BLUE),
            Vertex::new([-1.0, 1.0, -1.0], YELLOW),
            Vertex::new([-1.0, -1.0, -1.0], YELLOW),
        ];

        // Counter-clockwise when seen from outside the cube.
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2,  2, 3, 0, // front
            4, 7, 6,  6, 5, 4, // back
            3, 2, 6,  6, 7, 3, // left
            4, 5, 1,  1, 0, 4, // right
            1, 5, 6,  6, 2, 1, // top
            4, 0, 3,  3, 7, 4, // bottom
        ];

        Self { vertices, indices }
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Returns `true` if the mesh has whole triangles that only reference
    /// existing vertices.
    pub fn is_valid(&self) -> bool {
        !self.indices.is_empty()
            && self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 28);
        assert_eq!(Vertex::COLOR_OFFSET, 12);
    }

    #[test]
    fn cube_has_twelve_triangles() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.index_count(), 36);
        assert!(cube.is_valid());
    }

    #[test]
    fn cube_uses_every_vertex() {
        let cube = Mesh::cube();
        for v in 0..cube.vertices.len() as u16 {
            assert!(cube.indices.contains(&v), "vertex {v} unused");
        }
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let mut m = Mesh::cube();
        m.indices[5] = 8;
        assert!(!m.is_valid());
    }

    #[test]
    fn partial_triangle_is_invalid() {
        let m = Mesh::new(Mesh::cube().vertices, vec![0, 1]);
        assert!(!m.is_valid());
    }

    #[test]
    fn empty_mesh_is_invalid() {
        assert!(!Mesh::default().is_valid());
    }
}
