//! Ownership of generated city instances.
//!
//! Any number of cities can be live at once, one per scene node. Geometry
//! is never persisted: a [`CitySnapshot`] records only what is needed to
//! regenerate an equivalent city from its seed.

use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;

use crate::error::CityError;
use crate::procgen::block::AxisRect;
use crate::procgen::{generate_block, GeneratorKind, GeneratorSettings};
use crate::render::block_mesh::{build_block_mesh, GenerationStats, MeshPolicy};
use crate::render::mesh_sink::{MeshSink, MeshUpload};

/// Identifies one live city.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CityId(pub u64);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city#{}", self.0)
    }
}

/// Everything needed to (re)create a city.
#[derive(Clone, Debug, PartialEq)]
pub struct CityRequest {
    /// Scene node the mesh is attached to.
    pub node: Entity,
    /// Material name, resolved by the host.
    pub material: String,
    pub generator: GeneratorKind,
    pub seed: u64,
    pub bounds: AxisRect,
}

/// Minimal reload state for one city.
#[derive(Clone, Debug, PartialEq)]
pub struct CitySnapshot {
    pub request: CityRequest,
}

/// Snapshots taken by [`CityRegistry::start_reload`].
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct CityReloadState {
    pub snapshots: Vec<CitySnapshot>,
}

/// A live city and the resources it owns.
#[derive(Clone, Debug)]
pub struct CityInstance<H> {
    pub id: CityId,
    pub request: CityRequest,
    pub mesh: H,
    pub bounds: (Vec3, Vec3),
    pub stats: GenerationStats,
}

/// All live cities, keyed by id.
#[derive(Resource)]
pub struct CityRegistry<H: Send + Sync + 'static = Handle<Mesh>> {
    instances: BTreeMap<CityId, CityInstance<H>>,
    next_id: u64,
}

impl<H: Send + Sync + 'static> Default for CityRegistry<H> {
    fn default() -> Self {
        Self {
            instances: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<H: Clone + Send + Sync + 'static> CityRegistry<H> {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: CityId) -> Option<&CityInstance<H>> {
        self.instances.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CityInstance<H>> {
        self.instances.values()
    }

    pub fn ids(&self) -> Vec<CityId> {
        self.instances.keys().copied().collect()
    }

    /// City attached to `node`, if any.
    pub fn find_by_node(&self, node: Entity) -> Option<CityId> {
        self.iter()
            .find(|instance| instance.request.node == node)
            .map(|instance| instance.id)
    }

    /// Generate, mesh and upload a new city.
    ///
    /// The block is dropped as soon as its buffers exist; only the mesh
    /// handle outlives this call.
    pub fn create<S>(
        &mut self,
        sink: &mut S,
        request: CityRequest,
        settings: &GeneratorSettings,
    ) -> Result<CityId, CityError>
    where
        S: MeshSink<Handle = H>,
    {
        if self.find_by_node(request.node).is_some() {
            return Err(CityError::DoubleCreate { node: request.node });
        }

        let block = generate_block(request.generator, request.seed, request.bounds, settings);
        let mesh = build_block_mesh(&block, MeshPolicy::for_generator(request.generator))?;
        let (tallest, max_height) = (block.tallest(), block.max_height);
        drop(block);

        let handle = sink.create_mesh(&MeshUpload::from_block_mesh(&mesh))?;

        let id = CityId(self.next_id);
        self.next_id += 1;

        info!(
            "Created {id} ({} generator, seed {}): {} buildings, {} vertices, {} triangles, \
             tallest {tallest:.1} of {max_height:.1}",
            request.generator.label(),
            request.seed,
            mesh.stats.buildings,
            mesh.stats.vertices,
            mesh.stats.triangles
        );

        self.instances.insert(
            id,
            CityInstance {
                id,
                request,
                mesh: handle,
                bounds: mesh.bounds,
                stats: mesh.stats,
            },
        );
        Ok(id)
    }

    /// Release a city's resources and forget it.
    pub fn destroy<S>(&mut self, sink: &mut S, id: CityId) -> Result<CityInstance<H>, CityError>
    where
        S: MeshSink<Handle = H>,
    {
        let instance = self
            .instances
            .remove(&id)
            .ok_or(CityError::MissingInstance { id: id.0 })?;
        sink.destroy_mesh(&instance.mesh);
        debug!("Destroyed {id}");
        Ok(instance)
    }

    pub fn snapshot(&self, id: CityId) -> Result<CitySnapshot, CityError> {
        self.get(id)
            .map(|instance| CitySnapshot {
                request: instance.request.clone(),
            })
            .ok_or(CityError::MissingInstance { id: id.0 })
    }

    /// Recreate a city from a snapshot. Geometry is regenerated from the
    /// seed, so the result matches the city the snapshot was taken from.
    pub fn restore<S>(
        &mut self,
        sink: &mut S,
        snapshot: CitySnapshot,
        settings: &GeneratorSettings,
    ) -> Result<CityId, CityError>
    where
        S: MeshSink<Handle = H>,
    {
        self.create(sink, snapshot.request, settings)
    }

    /// Snapshot every live city, then tear them all down.
    pub fn start_reload<S>(&mut self, sink: &mut S) -> CityReloadState
    where
        S: MeshSink<Handle = H>,
    {
        let snapshots = self
            .iter()
            .map(|instance| CitySnapshot {
                request: instance.request.clone(),
            })
            .collect();

        for instance in std::mem::take(&mut self.instances).into_values() {
            sink.destroy_mesh(&instance.mesh);
        }

        CityReloadState { snapshots }
    }

    /// Restore every snapshot in order. Stops at the first failure; cities
    /// restored before it stay live.
    pub fn finish_reload<S>(
        &mut self,
        sink: &mut S,
        state: CityReloadState,
        settings: &GeneratorSettings,
    ) -> Result<Vec<CityId>, CityError>
    where
        S: MeshSink<Handle = H>,
    {
        state
            .snapshots
            .into_iter()
            .map(|snapshot| self.restore(sink, snapshot, settings))
            .collect()
    }
}
