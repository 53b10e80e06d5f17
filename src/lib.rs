//! Procedural city block generation.
//!
//! Seeded generators fill a rectangular area with box-shaped buildings,
//! which are turned into a single static mesh and attached to a scene node.

pub mod camera;
pub mod city;
pub mod error;
pub mod procgen;
pub mod render;
