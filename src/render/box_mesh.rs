//! Axis-aligned box emission.
//!
//! Corner `i` of a box takes max x if bit 0 is set, max y for bit 1 and
//! max z for bit 2. Every face is listed as a corner quad wound
//! counter-clockwise when seen from outside (right-handed, z-up), and is
//! split into the triangles `(a, b, c)` and `(a, c, d)`.

use bevy::prelude::*;

use super::geometry::{GeometryBuffer, Vertex};

/// Indices emitted per box: 6 faces, 2 triangles each.
pub const INDICES_PER_BOX: usize = 36;

/// Normal written on every vertex of a [`BoxTopology::PerCorner`] box.
pub const PLACEHOLDER_NORMAL: Vec3 = Vec3::Z;

/// One face of a box.
#[derive(Clone, Copy, Debug)]
pub struct BoxFace {
    pub normal: Vec3,
    pub corners: [u32; 4],
}

pub const BOX_FACES: [BoxFace; 6] = [
    BoxFace { normal: Vec3::NEG_X, corners: [0, 4, 6, 2] },
    BoxFace { normal: Vec3::X, corners: [1, 3, 7, 5] },
    BoxFace { normal: Vec3::NEG_Y, corners: [0, 1, 5, 4] },
    BoxFace { normal: Vec3::Y, corners: [2, 6, 7, 3] },
    BoxFace { normal: Vec3::NEG_Z, corners: [0, 2, 3, 1] },
    BoxFace { normal: Vec3::Z, corners: [4, 5, 7, 6] },
];

/// The 12 triangles of a box over its 8 logical corners.
pub fn box_triangles() -> [[u32; 3]; 12] {
    let mut triangles = [[0; 3]; 12];
    for (i, face) in BOX_FACES.iter().enumerate() {
        let [a, b, c, d] = face.corners;
        triangles[i * 2] = [a, b, c];
        triangles[i * 2 + 1] = [a, c, d];
    }
    triangles
}

/// Vertex sharing policy for emitted boxes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum BoxTopology {
    /// 24 vertices per box, each face carrying its flat normal.
    #[default]
    PerFace,
    /// 8 shared corners with [`PLACEHOLDER_NORMAL`]. Cheaper, unlit-looking.
    PerCorner,
}

impl BoxTopology {
    pub fn vertices_per_box(self) -> usize {
        match self {
            BoxTopology::PerFace => 24,
            BoxTopology::PerCorner => 8,
        }
    }
}

fn corner(min: Vec3, max: Vec3, index: u32) -> Vec3 {
    Vec3::new(
        if index & 1 != 0 { max.x } else { min.x },
        if index & 2 != 0 { max.y } else { min.y },
        if index & 4 != 0 { max.z } else { min.z },
    )
}

/// Append the box `[min, max]` to `buffer`.
pub fn emit_box(buffer: &mut GeometryBuffer, min: Vec3, max: Vec3, topology: BoxTopology) {
    match topology {
        BoxTopology::PerFace => {
            for face in &BOX_FACES {
                let base = buffer.vertex_count() as u32;
                for &c in &face.corners {
                    buffer.push_vertex(Vertex::new(corner(min, max, c), face.normal));
                }
                buffer.push_triangle([base, base + 1, base + 2]);
                buffer.push_triangle([base, base + 2, base + 3]);
            }
        }
        BoxTopology::PerCorner => {
            let base = buffer.vertex_count() as u32;
            for c in 0..8 {
                buffer.push_vertex(Vertex::new(corner(min, max, c), PLACEHOLDER_NORMAL));
            }
            for [a, b, c] in box_triangles() {
                buffer.push_triangle([base + a, base + b, base + c]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const MIN: Vec3 = Vec3::new(-2.0, 1.0, 0.0);
    const MAX: Vec3 = Vec3::new(3.0, 4.0, 7.5);

    fn emitted(topology: BoxTopology) -> GeometryBuffer {
        let mut buffer = GeometryBuffer::new();
        emit_box(&mut buffer, MIN, MAX, topology);
        buffer
    }

    fn triangle_normal(buffer: &GeometryBuffer, tri: &[u32]) -> (Vec3, Vec3) {
        let p = |i: u32| buffer.vertices()[i as usize].position();
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        ((b - a).cross(c - a), (a + b + c) / 3.0)
    }

    fn assert_outward(buffer: &GeometryBuffer) {
        let center = (MIN + MAX) / 2.0;
        for tri in buffer.indices().chunks(3) {
            let (normal, centroid) = triangle_normal(buffer, tri);
            assert!(normal.length() > 0.0, "degenerate triangle {tri:?}");
            assert!(
                normal.dot(centroid - center) > 0.0,
                "triangle {tri:?} faces inward"
            );
        }
    }

    #[test]
    fn per_face_box_counts() {
        let buffer = emitted(BoxTopology::PerFace);
        assert_eq!(buffer.vertex_count(), 24);
        assert_eq!(buffer.index_count(), INDICES_PER_BOX);
        assert_outward(&buffer);
    }

    #[test]
    fn per_face_normals_match_winding() {
        let buffer = emitted(BoxTopology::PerFace);
        for tri in buffer.indices().chunks(3) {
            let (normal, _) = triangle_normal(&buffer, tri);
            for &i in tri {
                let vertex_normal = buffer.vertices()[i as usize].normal();
                assert!(normal.normalize().abs_diff_eq(vertex_normal, 1e-6));
            }
        }
    }

    #[test]
    fn per_corner_box_is_closed() {
        let buffer = emitted(BoxTopology::PerCorner);
        assert_eq!(buffer.vertex_count(), 8);
        assert_eq!(buffer.index_count(), INDICES_PER_BOX);
        assert!(buffer
            .vertices()
            .iter()
            .all(|v| v.normal() == PLACEHOLDER_NORMAL));
        assert_outward(&buffer);

        let used: HashSet<u32> = buffer.indices().iter().copied().collect();
        assert_eq!(used.len(), 8);

        // Every directed edge appears once and its reverse exists: a closed,
        // consistently wound surface.
        let mut edges = HashSet::new();
        for tri in buffer.indices().chunks(3) {
            for k in 0..3 {
                assert!(edges.insert((tri[k], tri[(k + 1) % 3])));
            }
        }
        for &(a, b) in &edges {
            assert!(edges.contains(&(b, a)), "edge {a}->{b} has no twin");
        }
    }

    #[test]
    fn boxes_append_after_existing_vertices() {
        let mut buffer = emitted(BoxTopology::PerCorner);
        emit_box(&mut buffer, MIN, MAX, BoxTopology::PerCorner);
        assert_eq!(buffer.vertex_count(), 16);
        assert!(buffer.indices()[36..].iter().all(|&i| (8..16).contains(&i)));
    }
}
