//! Host-side configuration for spawned cities.

use std::collections::HashMap;

use bevy::prelude::*;

use super::registry::CityRequest;
use crate::procgen::block::AxisRect;
use crate::procgen::GeneratorKind;

/// Name of the material registered by default.
pub const DEFAULT_MATERIAL: &str = "city";

/// Defaults used when the demo (or any caller) asks for "a city".
#[derive(Resource, Clone, Debug)]
pub struct CityConfig {
    pub generator: GeneratorKind,
    pub seed: u64,
    /// Area partitioned by the lot generator.
    pub partition_bounds: AxisRect,
    /// Nominal world for the grid generator.
    pub grid_bounds: AxisRect,
    pub material: String,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorKind::Partition,
            seed: 0,
            partition_bounds: AxisRect::new(-2000.0, 2000.0, -2000.0, 2000.0),
            grid_bounds: AxisRect::new(0.0, 100.0, 0.0, 100.0),
            material: DEFAULT_MATERIAL.to_string(),
        }
    }
}

impl CityConfig {
    pub fn bounds_for(&self, generator: GeneratorKind) -> AxisRect {
        match generator {
            GeneratorKind::Partition => self.partition_bounds,
            GeneratorKind::Grid => self.grid_bounds,
        }
    }

    /// Request for the configured city on `node`.
    pub fn request(&self, node: Entity) -> CityRequest {
        CityRequest {
            node,
            material: self.material.clone(),
            generator: self.generator,
            seed: self.seed,
            bounds: self.bounds_for(self.generator),
        }
    }
}

/// Materials available to cities, looked up by name.
#[derive(Resource)]
pub struct CityMaterials {
    by_name: HashMap<String, Handle<StandardMaterial>>,
}

impl CityMaterials {
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, material: Handle<StandardMaterial>) {
        self.by_name.insert(name.into(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Handle<StandardMaterial>> {
        self.by_name.get(name)
    }
}

impl FromWorld for CityMaterials {
    fn from_world(world: &mut World) -> Self {
        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let concrete = materials.add(StandardMaterial {
            base_color: Color::srgb(0.65, 0.65, 0.65),
            perceptual_roughness: 0.9,
            ..default()
        });

        let mut library = Self::empty();
        library.insert(DEFAULT_MATERIAL, concrete);
        library
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_follows_generator() {
        let mut config = CityConfig::default();
        let node = Entity::from_raw(4);
        assert_eq!(config.request(node).bounds, config.partition_bounds);

        config.generator = GeneratorKind::Grid;
        config.seed = 9;
        let request = config.request(node);
        assert_eq!(request.bounds, AxisRect::new(0.0, 100.0, 0.0, 100.0));
        assert_eq!(request.seed, 9);
        assert_eq!(request.material, DEFAULT_MATERIAL);
    }
}
