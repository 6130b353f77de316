use glam::{Mat4, Vec3};

/// Floats per vertex in [`MeshData::vertices`]
pub const VERTEX_STRIDE: usize = 6;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z]
///
/// Color lives on the owning material, not per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// 6 floats per vertex: position(3) + normal(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Interleave separate position/normal streams.
    /// Missing normals are filled with +Y.
    pub fn from_streams(positions: &[[f32; 3]], normals: Option<&[[f32; 3]]>, indices: Vec<u32>) -> Self {
        let mut vertices = Vec::with_capacity(positions.len() * VERTEX_STRIDE);
        for (i, p) in positions.iter().enumerate() {
            let n = normals
                .and_then(|n| n.get(i).copied())
                .unwrap_or([0.0, 1.0, 0.0]);
            vertices.extend_from_slice(&[p[0], p[1], p[2], n[0], n[1], n[2]]);
        }
        Self { vertices, indices }
    }

    /// Build a flat-shaded mesh: every triangle gets its own three vertices
    /// carrying the face normal.
    pub fn flat_shaded(triangles: &[[Vec3; 3]]) -> Self {
        let mut vertices = Vec::with_capacity(triangles.len() * 3 * VERTEX_STRIDE);
        let mut indices = Vec::with_capacity(triangles.len() * 3);
        for tri in triangles {
            let n = face_normal(tri[0], tri[1], tri[2]);
            for v in tri {
                indices.push((vertices.len() / VERTEX_STRIDE) as u32);
                vertices.extend_from_slice(&[v.x, v.y, v.z, n.x, n.y, n.z]);
            }
        }
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, i: usize) -> Vec3 {
        let base = i * VERTEX_STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        let base = i * VERTEX_STRIDE;
        Vec3::new(
            self.vertices[base + 3],
            self.vertices[base + 4],
            self.vertices[base + 5],
        )
    }

    /// Corner positions of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let i0 = self.indices[tri * 3] as usize;
        let i1 = self.indices[tri * 3 + 1] as usize;
        let i2 = self.indices[tri * 3 + 2] as usize;
        [self.position(i0), self.position(i1), self.position(i2)]
    }

    /// Shift every position by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for v in self.vertices.chunks_exact_mut(VERTEX_STRIDE) {
            v[0] += offset.x;
            v[1] += offset.y;
            v[2] += offset.z;
        }
    }

    /// Bake a node transform into positions and normals
    pub fn transformed(&self, m: &Mat4) -> Self {
        let normal_matrix = m.inverse().transpose();
        let mut out = self.clone();
        for v in out.vertices.chunks_exact_mut(VERTEX_STRIDE) {
            let p = m.transform_point3(Vec3::new(v[0], v[1], v[2]));
            let n = normal_matrix
                .transform_vector3(Vec3::new(v[3], v[4], v[5]))
                .normalize_or_zero();
            v[..3].copy_from_slice(&p.to_array());
            v[3..].copy_from_slice(&n.to_array());
        }
        out
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

// ── Primitive generation ─────────────────────────────────────

/// Axis-aligned box centered on the origin (used for the loading placeholder)
pub fn cube(w: f32, h: f32, d: f32) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * VERTEX_STRIDE);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = (vertices.len() / VERTEX_STRIDE) as u32;
        for v in quad {
            vertices.extend_from_slice(&[v.x, v.y, v.z, normal.x, normal.y, normal.z]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

// ── Grid ─────────────────────────────────────────────────────

pub fn grid(range: i32, cell_size: f32, opacity: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let grid_color = [0.25_f32, 0.25, 0.25, opacity];
    let origin_color_x = [0.5_f32, 0.2, 0.2, opacity * 0.7];
    let origin_color_z = [0.2_f32, 0.2, 0.5, opacity * 0.7];

    let extent = range as f32 * cell_size;

    for i in -range..=range {
        let f = i as f32 * cell_size;
        let color = if i == 0 { origin_color_z } else { grid_color };
        // Line along Z
        push_line_vert(&mut vertices, f, 0.0, -extent, color);
        push_line_vert(&mut vertices, f, 0.0, extent, color);

        let color = if i == 0 { origin_color_x } else { grid_color };
        // Line along X
        push_line_vert(&mut vertices, -extent, 0.0, f, color);
        push_line_vert(&mut vertices, extent, 0.0, f, color);
    }

    LineMeshData { vertices }
}

fn push_line_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, c: [f32; 4]) {
    v.extend_from_slice(&[px, py, pz, c[0], c[1], c[2], c[3]]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_streams_fills_missing_normals() {
        let m = MeshData::from_streams(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None, vec![0, 1, 2]);
        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.normal(1), Vec3::Y);
        assert_eq!(m.position(1), Vec3::X);
    }

    #[test]
    fn test_flat_shaded_normals() {
        let m = MeshData::flat_shaded(&[[Vec3::ZERO, Vec3::X, Vec3::Y]]);
        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.triangle_count(), 1);
        for i in 0..3 {
            assert_eq!(m.normal(i), Vec3::Z);
        }
    }

    #[test]
    fn test_translate() {
        let mut m = cube(1.0, 1.0, 1.0);
        m.translate(Vec3::new(2.0, 0.0, 0.0));
        for i in 0..m.vertex_count() {
            assert!(m.position(i).x >= 1.5 - 1e-6);
        }
    }

    #[test]
    fn test_transformed_scales_positions_and_keeps_unit_normals() {
        let m = cube(1.0, 1.0, 1.0);
        let t = m.transformed(&Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)));
        assert!((t.position(0).x.abs() - 1.0).abs() < 1e-6);
        for i in 0..t.vertex_count() {
            assert!((t.normal(i).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cube_counts() {
        let m = cube(1.0, 2.0, 3.0);
        assert_eq!(m.vertex_count(), 24);
        assert_eq!(m.triangle_count(), 12);
    }

    #[test]
    fn test_grid_line_count() {
        let g = grid(5, 1.0, 0.6);
        // 11 lines per direction, 2 vertices each, 7 floats per vertex
        assert_eq!(g.vertices.len(), 11 * 2 * 2 * 7);
    }
}
