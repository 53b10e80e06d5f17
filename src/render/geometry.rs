//! CPU-side vertex and index buffers for generated city meshes.
//!
//! Boxes are accumulated into one [`GeometryBuffer`] with 32-bit indices;
//! the final index width is chosen when the buffer is handed off, and a
//! vertex count the width cannot address is rejected rather than wrapped.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bytemuck::{Pod, Zeroable};

use crate::error::CityError;

/// Interleaved vertex: position then normal, 24 bytes.
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Width of one index in the final index buffer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum IndexWidth {
    /// 16-bit: at most 65536 vertices.
    U16,
    #[default]
    U32,
}

impl IndexWidth {
    /// Bytes per index.
    pub fn stride(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }

    /// Largest vertex count this width can address.
    pub fn max_vertices(self) -> usize {
        match self {
            IndexWidth::U16 => u16::MAX as usize + 1,
            IndexWidth::U32 => (u32::MAX as usize).saturating_add(1),
        }
    }
}

/// Final index buffer at its chosen width.
#[derive(Clone, Debug, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    pub fn width(&self) -> IndexWidth {
        match self {
            IndexBuffer::U16(_) => IndexWidth::U16,
            IndexBuffer::U32(_) => IndexWidth::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(v) => bytemuck::cast_slice(v),
            IndexBuffer::U32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Indices widened to `u32`, in buffer order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            IndexBuffer::U16(v) => Box::new(v.iter().map(|&i| i as u32)),
            IndexBuffer::U32(v) => Box::new(v.iter().copied()),
        }
    }
}

impl From<IndexBuffer> for Indices {
    fn from(buffer: IndexBuffer) -> Self {
        match buffer {
            IndexBuffer::U16(v) => Indices::U16(v),
            IndexBuffer::U32(v) => Indices::U32(v),
        }
    }
}

/// Growable vertex and index lists shared by every box of a block.
#[derive(Clone, Debug, Default)]
pub struct GeometryBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw interleaved vertex bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    pub fn push_triangle(&mut self, triangle: [u32; 3]) {
        self.indices.extend(triangle);
    }

    /// Narrow the indices to `width`.
    ///
    /// Fails with [`CityError::IndexOverflow`] before any index is converted
    /// if the vertex count cannot be addressed at that width.
    pub fn index_buffer(&self, width: IndexWidth) -> Result<IndexBuffer, CityError> {
        let limit = width.max_vertices();
        if self.vertices.len() > limit {
            return Err(CityError::IndexOverflow {
                vertices: self.vertices.len(),
                width,
                limit,
            });
        }

        Ok(match width {
            IndexWidth::U16 => {
                IndexBuffer::U16(self.indices.iter().map(|&i| i as u16).collect())
            }
            IndexWidth::U32 => IndexBuffer::U32(self.indices.clone()),
        })
    }
}

/// Assemble a render-world [`Mesh`] from interleaved vertices.
pub fn mesh_from_parts(vertices: &[Vertex], indices: IndexBuffer) -> Mesh {
    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
    let normals: Vec<[f32; 3]> = vertices.iter().map(|v| v.normal).collect();

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_indices(indices.into())
}
