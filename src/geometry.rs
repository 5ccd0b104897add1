use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Vertex layout for the textured cube mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Vertex layout for grid lines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Color of the regular grid lines (the classic 0x888888 helper gray).
pub const GRID_LINE_COLOR: [f32; 3] = [0.533, 0.533, 0.533];
/// Color of the two center lines (0x444444).
pub const GRID_CENTER_COLOR: [f32; 3] = [0.267, 0.267, 0.267];

/// Builds a unit cube centered on the origin with per-face normals and UVs.
///
/// Returns 24 vertices (4 per face) and 36 indices.
pub fn cube_mesh() -> (Vec<MeshVertex>, Vec<u32>) {
    // (normal, tangent along u, tangent along v) per face
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, tangent_u, tangent_v) in FACES {
        let n = Vec3::from(normal);
        let u = Vec3::from(tangent_u);
        let v = Vec3::from(tangent_v);
        let base = vertices.len() as u32;
        for (s, t) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let position = n * 0.5 + u * (s - 0.5) + v * (t - 0.5);
            vertices.push(MeshVertex {
                position: position.to_array(),
                normal,
                uv: [s, 1.0 - t],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// Builds a square grid of lines in the XZ plane, centered on the origin.
///
/// `divisions + 1` lines run along each axis; the pair crossing the center is
/// drawn in the darker center color.
pub fn grid_lines(size: f32, divisions: u32) -> Vec<LineVertex> {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let center = divisions / 2;

    let mut vertices = Vec::with_capacity(((divisions + 1) as usize) * 4);
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        let color = if i == center {
            GRID_CENTER_COLOR
        } else {
            GRID_LINE_COLOR
        };
        // line parallel to Z
        vertices.push(LineVertex {
            position: [offset, 0.0, -half],
            color,
        });
        vertices.push(LineVertex {
            position: [offset, 0.0, half],
            color,
        });
        // line parallel to X
        vertices.push(LineVertex {
            position: [-half, 0.0, offset],
            color,
        });
        vertices.push(LineVertex {
            position: [half, 0.0, offset],
            color,
        });
    }
    vertices
}

/// Applies a model matrix to line vertices, baking them into world space.
pub fn transform_lines(vertices: &[LineVertex], model: Mat4) -> Vec<LineVertex> {
    vertices
        .iter()
        .map(|vertex| LineVertex {
            position: model
                .transform_point3(Vec3::from(vertex.position))
                .to_array(),
            color: vertex.color,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_corners_sit_on_the_unit_box() {
        let (vertices, _) = cube_mesh();
        for vertex in vertices {
            for component in vertex.position {
                assert!((component.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn grid_line_count_matches_divisions() {
        let vertices = grid_lines(12.0, 10);
        // 11 lines per axis, 2 axes, 2 endpoints each
        assert_eq!(vertices.len(), 11 * 2 * 2);
    }

    #[test]
    fn grid_center_lines_use_the_darker_color() {
        let vertices = grid_lines(12.0, 10);
        let center: Vec<_> = vertices
            .iter()
            .filter(|v| v.color == GRID_CENTER_COLOR)
            .collect();
        assert_eq!(center.len(), 4);
        assert!(center.iter().all(|v| {
            let p = v.position;
            p[0].abs() < 1e-4 || p[2].abs() < 1e-4
        }));
    }

    #[test]
    fn grid_spans_the_requested_size() {
        let vertices = grid_lines(12.0, 10);
        let max = vertices
            .iter()
            .flat_map(|v| [v.position[0], v.position[2]])
            .fold(f32::MIN, f32::max);
        assert!((max - 6.0).abs() < 1e-4);
    }

    #[test]
    fn transform_bakes_translation() {
        let lines = grid_lines(2.0, 1);
        let moved = transform_lines(&lines, Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        assert!(moved.iter().all(|v| v.position[1] == 5.0));
    }
}
