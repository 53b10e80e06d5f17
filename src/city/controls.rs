//! Keyboard controls for the demo app.
//!
//! - R: regenerate with the next seed
//! - G: switch generator
//! - F5: hot reload (snapshot, tear down, regenerate)
//! - Delete: destroy every city

use bevy::prelude::*;

use super::config::CityConfig;
use super::registry::CityRegistry;
use super::{DespawnCity, HotReload, SpawnCity};

pub struct CityControlsPlugin;

impl Plugin for CityControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, city_controls);
    }
}

/// Scene node the demo city hangs off.
#[derive(Component)]
pub struct CityRoot;

fn setup_scene(
    mut commands: Commands,
    config: Res<CityConfig>,
    mut spawn: EventWriter<SpawnCity>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(300.0, 800.0, 200.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.8, 0.85, 1.0),
        brightness: 300.0,
    });

    let root = commands
        .spawn((CityRoot, Transform::default(), Visibility::default()))
        .id();
    spawn.send(SpawnCity(config.request(root)));
}

fn city_controls(
    keys: Res<ButtonInput<KeyCode>>,
    mut config: ResMut<CityConfig>,
    registry: Res<CityRegistry>,
    roots: Query<Entity, With<CityRoot>>,
    mut spawn: EventWriter<SpawnCity>,
    mut despawn: EventWriter<DespawnCity>,
    mut reload: EventWriter<HotReload>,
) {
    if keys.just_pressed(KeyCode::F5) {
        reload.send(HotReload);
        return;
    }

    if keys.just_pressed(KeyCode::Delete) {
        for id in registry.ids() {
            despawn.send(DespawnCity(id));
        }
        return;
    }

    let regenerate = if keys.just_pressed(KeyCode::KeyR) {
        config.seed = config.seed.wrapping_add(1);
        true
    } else if keys.just_pressed(KeyCode::KeyG) {
        config.generator = config.generator.toggled();
        true
    } else {
        false
    };

    if !regenerate {
        return;
    }

    info!(
        "Regenerating: {} generator, seed {}",
        config.generator.label(),
        config.seed
    );
    for root in &roots {
        if let Some(id) = registry.find_by_node(root) {
            despawn.send(DespawnCity(id));
        }
        spawn.send(SpawnCity(config.request(root)));
    }
}
