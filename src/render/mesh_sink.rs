//! Boundary between generated buffers and whatever owns GPU resources.

use bevy::prelude::*;

use super::block_mesh::BlockMesh;
use super::geometry::{mesh_from_parts, IndexBuffer, Vertex};
use crate::error::CityError;

/// What a vertex attribute means to the renderer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VertexSemantic {
    Position,
    Normal,
}

/// One `float32` vector attribute inside an interleaved vertex.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub components: u32,
    pub offset: usize,
}

/// Layout of [`Vertex`]: position (3×f32) then normal (3×f32).
pub const BLOCK_VERTEX_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute {
        semantic: VertexSemantic::Position,
        components: 3,
        offset: 0,
    },
    VertexAttribute {
        semantic: VertexSemantic::Normal,
        components: 3,
        offset: 12,
    },
];

/// Single triangle-list draw covering the whole index buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BatchInfo {
    pub primitive_count: usize,
}

/// Everything a sink needs to create one mesh.
#[derive(Clone, Copy, Debug)]
pub struct MeshUpload<'a> {
    pub vertices: &'a [Vertex],
    pub indices: &'a IndexBuffer,
    pub layout: &'a [VertexAttribute],
    pub bounds: (Vec3, Vec3),
    pub batch: BatchInfo,
}

impl<'a> MeshUpload<'a> {
    pub fn from_block_mesh(mesh: &'a BlockMesh) -> Self {
        Self {
            vertices: mesh.geometry.vertices(),
            indices: &mesh.indices,
            layout: &BLOCK_VERTEX_LAYOUT,
            bounds: mesh.bounds,
            batch: BatchInfo {
                primitive_count: mesh.indices.len() / 3,
            },
        }
    }

    pub fn vertex_stride(&self) -> usize {
        Vertex::STRIDE
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.vertices)
    }

    pub fn index_stride(&self) -> usize {
        self.indices.width().stride()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn index_bytes(&self) -> &'a [u8] {
        self.indices.as_bytes()
    }
}

/// Creates and destroys mesh resources from generated buffers.
///
/// Failures are returned as-is; callers never retry, since regenerating
/// from the same seed would produce the same buffers.
pub trait MeshSink {
    type Handle: Clone + Send + Sync + 'static;

    fn create_mesh(&mut self, upload: &MeshUpload<'_>) -> Result<Self::Handle, CityError>;

    fn destroy_mesh(&mut self, handle: &Self::Handle);
}

impl MeshSink for Assets<Mesh> {
    type Handle = Handle<Mesh>;

    fn create_mesh(&mut self, upload: &MeshUpload<'_>) -> Result<Handle<Mesh>, CityError> {
        if upload.batch.primitive_count * 3 != upload.index_count() {
            return Err(CityError::ResourceCreation(format!(
                "batch of {} triangles does not match {} indices",
                upload.batch.primitive_count,
                upload.index_count()
            )));
        }

        let mesh = mesh_from_parts(upload.vertices, upload.indices.clone());
        Ok(self.add(mesh))
    }

    fn destroy_mesh(&mut self, handle: &Handle<Mesh>) {
        self.remove(handle.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::block::AxisRect;
    use crate::procgen::grid::generate_grid;
    use crate::procgen::GeneratorKind;
    use crate::render::block_mesh::{build_block_mesh, MeshPolicy};

    fn grid_mesh() -> BlockMesh {
        let block = generate_grid(0, 20, AxisRect::new(0.0, 100.0, 0.0, 100.0));
        build_block_mesh(&block, MeshPolicy::for_generator(GeneratorKind::Grid)).unwrap()
    }

    #[test]
    fn upload_describes_buffers() {
        let mesh = grid_mesh();
        let upload = MeshUpload::from_block_mesh(&mesh);
        assert_eq!(upload.vertex_stride(), 24);
        assert_eq!(upload.vertex_count(), 21 * 8);
        assert_eq!(upload.vertex_bytes().len(), 21 * 8 * 24);
        assert_eq!(upload.index_stride(), 2);
        assert_eq!(upload.index_bytes().len(), upload.index_count() * 2);
        assert_eq!(upload.batch.primitive_count, 21 * 12);
        assert_eq!(upload.layout[1].offset, 12);
    }

    #[test]
    fn assets_sink_adds_and_removes_meshes() {
        let mut meshes = Assets::<Mesh>::default();
        let mesh = grid_mesh();
        let handle = meshes
            .create_mesh(&MeshUpload::from_block_mesh(&mesh))
            .unwrap();
        assert_eq!(meshes.get(&handle).unwrap().count_vertices(), 21 * 8);

        meshes.destroy_mesh(&handle);
        assert!(meshes.get(&handle).is_none());
    }

    #[test]
    fn mismatched_batch_is_rejected() {
        let mut meshes = Assets::<Mesh>::default();
        let mesh = grid_mesh();
        let mut upload = MeshUpload::from_block_mesh(&mesh);
        upload.batch.primitive_count += 1;
        assert!(matches!(
            meshes.create_mesh(&upload),
            Err(CityError::ResourceCreation(_))
        ));
    }
}
