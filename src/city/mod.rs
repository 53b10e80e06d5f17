//! City instances inside the Bevy world.
//!
//! Requests arrive as events. Each city becomes a child entity of its scene
//! node carrying the generated mesh, its material and an explicit bounding
//! box. Generation is z-up; the child is rotated so z maps to Bevy's +Y.

use std::f32::consts::FRAC_PI_2;

use bevy::ecs::entity::Entities;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;

pub mod config;
pub mod controls;
pub mod registry;

use crate::error::CityError;
use crate::procgen::GeneratorSettings;
use crate::render::block_mesh::GenerationStats;
use config::{CityConfig, CityMaterials};
use registry::{CityId, CityInstance, CityRegistry, CityReloadState, CityRequest};

pub struct CityPlugin;

impl Plugin for CityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CityConfig>()
            .init_resource::<GeneratorSettings>()
            .init_resource::<CityRegistry>()
            .init_resource::<CityMaterials>()
            .init_resource::<CityReloadState>()
            .add_event::<SpawnCity>()
            .add_event::<DespawnCity>()
            .add_event::<HotReload>()
            .add_event::<CitySpawned>()
            .add_systems(
                Update,
                (prune_orphaned_cities, despawn_cities, spawn_cities, hot_reload).chain(),
            );
    }
}

/// Ask for a new city.
#[derive(Event, Clone, Debug)]
pub struct SpawnCity(pub CityRequest);

/// Ask for a city to be torn down.
#[derive(Event, Clone, Copy, Debug)]
pub struct DespawnCity(pub CityId);

/// Snapshot every city, tear everything down and regenerate from the
/// snapshots.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct HotReload;

/// Sent once a city's mesh is attached to its node.
#[derive(Event, Clone, Debug)]
pub struct CitySpawned {
    pub id: CityId,
    pub node: Entity,
    /// Bounds in block space (z-up).
    pub bounds: (Vec3, Vec3),
    pub stats: GenerationStats,
}

/// Marks the entity rendering a city.
#[derive(Component, Clone, Copy, Debug)]
pub struct CityMesh {
    pub id: CityId,
}

/// Rotation taking block space (z-up) to Bevy world space (y-up).
pub fn z_up_to_y_up() -> Quat {
    Quat::from_rotation_x(-FRAC_PI_2)
}

/// Check the node and material before any geometry is generated.
fn resolve_material(
    commands: &mut Commands,
    materials: &CityMaterials,
    request: &CityRequest,
) -> Result<Handle<StandardMaterial>, CityError> {
    if commands.get_entity(request.node).is_none() {
        return Err(CityError::MissingNode { node: request.node });
    }
    materials
        .get(&request.material)
        .cloned()
        .ok_or_else(|| CityError::UnknownMaterial(request.material.clone()))
}

fn attach_city(
    commands: &mut Commands,
    instance: &CityInstance<Handle<Mesh>>,
    material: Handle<StandardMaterial>,
) -> CitySpawned {
    let (min, max) = instance.bounds;
    let id = instance.id;

    commands.entity(instance.request.node).with_children(|parent| {
        parent.spawn((
            Mesh3d(instance.mesh.clone()),
            MeshMaterial3d(material),
            Transform::from_rotation(z_up_to_y_up()),
            Aabb::from_min_max(min, max),
            CityMesh { id },
        ));
    });

    CitySpawned {
        id,
        node: instance.request.node,
        bounds: instance.bounds,
        stats: instance.stats,
    }
}

fn spawn_cities(
    mut commands: Commands,
    mut requests: EventReader<SpawnCity>,
    mut spawned: EventWriter<CitySpawned>,
    mut registry: ResMut<CityRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Res<CityMaterials>,
    settings: Res<GeneratorSettings>,
) {
    for SpawnCity(request) in requests.read() {
        let result = resolve_material(&mut commands, &materials, request).and_then(|material| {
            let id = registry.create(meshes.as_mut(), request.clone(), &settings)?;
            let instance = registry
                .get(id)
                .ok_or(CityError::MissingInstance { id: id.0 })?;
            Ok(attach_city(&mut commands, instance, material))
        });

        match result {
            Ok(event) => {
                spawned.send(event);
            }
            Err(err) => warn!("Failed to spawn city on {:?}: {err}", request.node),
        }
    }
}

fn despawn_cities(
    mut commands: Commands,
    mut requests: EventReader<DespawnCity>,
    mut registry: ResMut<CityRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    city_meshes: Query<(Entity, &CityMesh)>,
) {
    for DespawnCity(id) in requests.read() {
        if let Err(err) = registry.destroy(meshes.as_mut(), *id) {
            warn!("Failed to despawn {id}: {err}");
            continue;
        }

        for (entity, city_mesh) in &city_meshes {
            if city_mesh.id == *id {
                commands.entity(entity).despawn_recursive();
            }
        }
    }
}

/// Release cities whose scene node was despawned without a `DespawnCity`.
fn prune_orphaned_cities(
    mut commands: Commands,
    entities: &Entities,
    mut registry: ResMut<CityRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    city_meshes: Query<(Entity, &CityMesh)>,
) {
    let orphaned: Vec<CityId> = registry
        .iter()
        .filter(|instance| !entities.contains(instance.request.node))
        .map(|instance| instance.id)
        .collect();

    for id in orphaned {
        if let Err(err) = registry.destroy(meshes.as_mut(), id) {
            warn!("Failed to prune {id}: {err}");
            continue;
        }
        debug!("Pruned {id}: its scene node is gone");

        // A non-recursive despawn of the node leaves the mesh child behind.
        for (entity, city_mesh) in &city_meshes {
            if city_mesh.id == id {
                commands.entity(entity).despawn_recursive();
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn hot_reload(
    mut commands: Commands,
    mut requests: EventReader<HotReload>,
    mut spawned: EventWriter<CitySpawned>,
    mut registry: ResMut<CityRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut reload_state: ResMut<CityReloadState>,
    materials: Res<CityMaterials>,
    settings: Res<GeneratorSettings>,
    city_meshes: Query<Entity, With<CityMesh>>,
) {
    if requests.read().count() == 0 {
        return;
    }

    let state = registry.start_reload(meshes.as_mut());
    for entity in &city_meshes {
        commands.entity(entity).despawn_recursive();
    }
    info!("Hot reload: regenerating {} cities", state.snapshots.len());
    *reload_state = state.clone();

    // Unlike `CityRegistry::finish_reload`, one bad snapshot does not keep
    // the others from coming back.
    for snapshot in state.snapshots {
        let node = snapshot.request.node;
        let result = resolve_material(&mut commands, &materials, &snapshot.request).and_then(
            |material| {
                let id = registry.restore(meshes.as_mut(), snapshot, &settings)?;
                let instance = registry
                    .get(id)
                    .ok_or(CityError::MissingInstance { id: id.0 })?;
                Ok(attach_city(&mut commands, instance, material))
            },
        );

        match result {
            Ok(event) => {
                spawned.send(event);
            }
            Err(err) => warn!("Failed to restore city on {node:?}: {err}"),
        }
    }
}
