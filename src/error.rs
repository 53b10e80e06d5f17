//! Errors raised while generating, meshing, or managing city instances.

use bevy::prelude::Entity;

use crate::render::geometry::IndexWidth;

/// Everything that can go wrong between a seed and a spawned city mesh.
#[derive(Debug, thiserror::Error)]
pub enum CityError {
    /// An RNG draw was requested with `lo > hi`.
    #[error("invalid random range: {lo} > {hi}")]
    InvalidRange { lo: f32, hi: f32 },

    /// The accumulated vertex count cannot be addressed by the index width.
    #[error(
        "{vertices} vertices exceed the {width:?} index limit of {limit}; \
         use a wider index or fewer buildings"
    )]
    IndexOverflow {
        vertices: usize,
        width: IndexWidth,
        limit: usize,
    },

    /// The scene node already owns a city.
    #[error("scene node {node:?} already has a city")]
    DoubleCreate { node: Entity },

    /// The scene node to attach a city to does not exist.
    #[error("scene node {node:?} does not exist")]
    MissingNode { node: Entity },

    /// No live city with this id.
    #[error("no city with id {id}")]
    MissingInstance { id: u64 },

    /// Material name not present in the material library.
    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    /// The mesh sink failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),
}
