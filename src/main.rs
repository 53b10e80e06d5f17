//! Cityblock - procedural city block viewer
//!
//! Generates a seeded city block, frames it with an orthographic camera,
//! and lets you regenerate or hot reload it from the keyboard.

use bevy::prelude::*;

use cityblock::camera::CameraPlugin;
use cityblock::city::controls::CityControlsPlugin;
use cityblock::city::CityPlugin;

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Cityblock".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(CameraPlugin)
        // Generation, meshing, and instance lifecycle
        .add_plugins(CityPlugin)
        // R / G / F5 / Delete
        .add_plugins(CityControlsPlugin)
        .run();
}
