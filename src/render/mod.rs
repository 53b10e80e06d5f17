//! Geometry and mesh output for generated city blocks.
//!
//! Blocks are flattened into a [`geometry::GeometryBuffer`] of axis-aligned
//! boxes, narrowed to a [`geometry::IndexBuffer`] of the configured width,
//! and handed to a [`mesh_sink::MeshSink`] for upload.

pub mod block_mesh;
pub mod box_mesh;
pub mod geometry;
pub mod mesh_sink;
