//! Turns a generated [`Block`] into one shared vertex/index buffer.
//!
//! The ground slab is always the first box, followed by one box per
//! building in block order. Overlapping or touching boxes are emitted
//! independently; nothing is culled or merged.

use bevy::prelude::*;

use super::box_mesh::{emit_box, BoxTopology, INDICES_PER_BOX};
use super::geometry::{GeometryBuffer, IndexBuffer, IndexWidth};
use crate::error::CityError;
use crate::procgen::block::Block;
use crate::procgen::GeneratorKind;

/// Bottom of the ground slab.
pub const GROUND_BOTTOM: f32 = -1.0;
/// Top of the ground slab. Buildings start at z = 0, just below it.
pub const GROUND_TOP: f32 = 0.05;

/// How a block's boxes are laid out in the final buffers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MeshPolicy {
    pub topology: BoxTopology,
    pub index_width: IndexWidth,
}

impl MeshPolicy {
    /// Partitioned blocks get flat-shaded faces and 32-bit indices; the
    /// grid's small fixed count fits shared corners in 16 bits
    /// (`(count + 1) * 8` vertices, so at most 8191 buildings).
    pub fn for_generator(kind: GeneratorKind) -> Self {
        match kind {
            GeneratorKind::Partition => Self {
                topology: BoxTopology::PerFace,
                index_width: IndexWidth::U32,
            },
            GeneratorKind::Grid => Self {
                topology: BoxTopology::PerCorner,
                index_width: IndexWidth::U16,
            },
        }
    }
}

/// Counters reported after meshing a block.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GenerationStats {
    pub buildings: usize,
    pub vertices: usize,
    pub indices: usize,
    pub triangles: usize,
}

/// Final buffers plus the bounding box promised to consumers.
#[derive(Clone, Debug)]
pub struct BlockMesh {
    pub geometry: GeometryBuffer,
    pub indices: IndexBuffer,
    pub bounds: (Vec3, Vec3),
    pub stats: GenerationStats,
}

/// Emit the ground slab and every building of `block` into a new buffer.
pub fn render_block(block: &Block, topology: BoxTopology) -> GeometryBuffer {
    let boxes = block.buildings.len() + 1;
    let mut buffer = GeometryBuffer::with_capacity(
        boxes * topology.vertices_per_box(),
        boxes * INDICES_PER_BOX,
    );

    emit_box(
        &mut buffer,
        block.bounds.min().extend(GROUND_BOTTOM),
        block.bounds.max().extend(GROUND_TOP),
        topology,
    );

    for building in &block.buildings {
        emit_box(
            &mut buffer,
            building.footprint.min().extend(0.0),
            building.footprint.max().extend(building.height),
            topology,
        );
    }

    buffer
}

/// Mesh `block` and narrow its indices per `policy`.
pub fn build_block_mesh(block: &Block, policy: MeshPolicy) -> Result<BlockMesh, CityError> {
    let geometry = render_block(block, policy.topology);
    let indices = geometry.index_buffer(policy.index_width)?;
    let stats = GenerationStats {
        buildings: block.buildings.len(),
        vertices: geometry.vertex_count(),
        indices: geometry.index_count(),
        triangles: geometry.triangle_count(),
    };

    Ok(BlockMesh {
        geometry,
        indices,
        bounds: block.bounding_box(GROUND_BOTTOM),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::block::AxisRect;
    use crate::procgen::grid::generate_grid;
    use crate::procgen::partition::generate_partition;

    #[test]
    fn ground_slab_comes_first() {
        let block = generate_partition(0, AxisRect::new(-2000.0, 2000.0, -2000.0, 2000.0));
        let buffer = render_block(&block, BoxTopology::PerFace);

        let ground = &buffer.vertices()[..24];
        let (min, max) = ground.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), v| (lo.min(v.position()), hi.max(v.position())),
        );
        assert_eq!(min, Vec3::new(-2000.0, -2000.0, -1.0));
        assert_eq!(max, Vec3::new(2000.0, 2000.0, 0.05));
        assert_eq!(buffer.vertex_count(), (block.buildings.len() + 1) * 24);
    }

    #[test]
    fn buildings_stand_on_the_ground() {
        let block = generate_grid(1, 10, AxisRect::new(0.0, 100.0, 0.0, 100.0));
        let buffer = render_block(&block, BoxTopology::PerCorner);
        for (i, building) in block.buildings.iter().enumerate() {
            let corners = &buffer.vertices()[(i + 1) * 8..(i + 2) * 8];
            assert_eq!(corners[0].position[2], 0.0);
            assert_eq!(corners[7].position[2], building.height);
            assert_eq!(corners[0].position[0], building.footprint.xmin);
            assert_eq!(corners[7].position[1], building.footprint.ymax);
        }
    }

    #[test]
    fn indices_stay_in_bounds() {
        let bounds = AxisRect::new(-200.0, 200.0, -200.0, 200.0);
        for kind in [GeneratorKind::Partition, GeneratorKind::Grid] {
            let block = match kind {
                GeneratorKind::Partition => generate_partition(4, bounds),
                GeneratorKind::Grid => generate_grid(4, 1500, bounds),
            };
            let mesh = build_block_mesh(&block, MeshPolicy::for_generator(kind)).unwrap();
            let count = mesh.geometry.vertex_count() as u32;
            assert_eq!(mesh.indices.len() % 3, 0);
            assert!(mesh.indices.iter().all(|i| i < count));
            assert_eq!(mesh.stats.triangles, (mesh.stats.buildings + 1) * 12);
        }
    }

    #[test]
    fn reference_grid_fits_sixteen_bits() {
        let block = generate_grid(0, 1500, AxisRect::new(0.0, 100.0, 0.0, 100.0));
        let mesh = build_block_mesh(&block, MeshPolicy::for_generator(GeneratorKind::Grid)).unwrap();
        assert_eq!(mesh.indices.width(), IndexWidth::U16);
        assert_eq!(mesh.stats.vertices, 1501 * 8);
        assert_eq!(mesh.bounds.1.z, 5.0);
    }

    #[test]
    fn too_many_vertices_for_sixteen_bits() {
        let bounds = AxisRect::new(0.0, 100.0, 0.0, 100.0);
        let per_face_u16 = MeshPolicy {
            topology: BoxTopology::PerFace,
            index_width: IndexWidth::U16,
        };

        // 2730 boxes * 24 = 65520 vertices fit; one more box does not.
        assert!(build_block_mesh(&generate_grid(0, 2729, bounds), per_face_u16).is_ok());
        let err = build_block_mesh(&generate_grid(0, 2730, bounds), per_face_u16).unwrap_err();
        assert!(matches!(
            err,
            CityError::IndexOverflow {
                vertices: 65_544,
                ..
            }
        ));

        // Shared corners: 8192 boxes * 8 = 65536 is the exact limit.
        let grid = MeshPolicy::for_generator(GeneratorKind::Grid);
        assert!(build_block_mesh(&generate_grid(0, 8191, bounds), grid).is_ok());
        assert!(build_block_mesh(&generate_grid(0, 8192, bounds), grid).is_err());
    }

    #[test]
    fn partition_bounds_use_fixed_max_height() {
        let block = generate_partition(0, AxisRect::new(0.0, 200.0, 0.0, 200.0));
        let mesh = build_block_mesh(&block, MeshPolicy::for_generator(GeneratorKind::Partition))
            .unwrap();
        assert_eq!(mesh.bounds.0, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(mesh.bounds.1, Vec3::new(200.0, 200.0, 100.0));
    }
}
