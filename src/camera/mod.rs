//! Orthographic camera with zoom, pan, and rotate controls.
//!
//! Frames each newly spawned city so both the 4 km partitioned block and
//! the 100 m grid fill the view.

use bevy::{input::mouse::MouseMotion, prelude::*};

use crate::city::{z_up_to_y_up, CitySpawned};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera).add_systems(
            Update,
            (frame_city, camera_zoom, camera_pan, camera_rotate).chain(),
        );
    }
}

/// Standard isometric elevation: ~35.264 degrees (arctan(1/sqrt(2))).
const ISO_ANGLE_DEG: f32 = 35.264;
/// Far enough that the largest city fits between near and far planes.
const CAMERA_DISTANCE: f32 = 6000.0;

#[derive(Component)]
pub struct IsometricCamera {
    /// World units per pixel.
    pub zoom: f32,
    pub rotation: f32,
    pub target: Vec3,
}

impl Default for IsometricCamera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation: 0.0,
            target: Vec3::ZERO,
        }
    }
}

impl IsometricCamera {
    fn eye(&self) -> Vec3 {
        let iso_angle = ISO_ANGLE_DEG.to_radians();
        let offset = Vec3::new(
            CAMERA_DISTANCE,
            CAMERA_DISTANCE * iso_angle.tan(),
            CAMERA_DISTANCE,
        );
        self.target + Quat::from_rotation_y(self.rotation) * offset
    }

    fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

fn setup_camera(mut commands: Commands) {
    let iso_cam = IsometricCamera::default();
    commands.spawn((
        Camera3d::default(),
        Projection::Orthographic(OrthographicProjection {
            scale: iso_cam.zoom,
            far: CAMERA_DISTANCE * 4.0,
            ..OrthographicProjection::default_3d()
        }),
        iso_cam.transform(),
        iso_cam,
    ));
}

/// Center on a new city and zoom so its footprint spans the window.
fn frame_city(
    mut spawned: EventReader<CitySpawned>,
    mut query: Query<(&mut Transform, &mut Projection, &mut IsometricCamera)>,
    windows: Query<&Window>,
) {
    let Some(event) = spawned.read().last() else {
        return;
    };

    let (min, max) = event.bounds;
    let center = z_up_to_y_up() * ((min + max) / 2.0).with_z(0.0);
    let extent = (max - min).truncate().max_element();
    let pixels = windows
        .iter()
        .next()
        .map(|w| w.width().min(w.height()))
        .unwrap_or(720.0);

    for (mut transform, mut projection, mut iso_cam) in &mut query {
        iso_cam.target = center;
        iso_cam.zoom = (extent * 1.2 / pixels).max(0.01);
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = iso_cam.zoom;
        }
        *transform = iso_cam.transform();
    }
}

fn camera_zoom(
    mut query: Query<(&mut Projection, &mut IsometricCamera)>,
    mut scroll_events: EventReader<bevy::input::mouse::MouseWheel>,
) {
    let scroll: f32 = scroll_events.read().map(|e| e.y).sum();
    if scroll == 0.0 {
        return;
    }

    for (mut projection, mut iso_cam) in &mut query {
        iso_cam.zoom = (iso_cam.zoom * (1.0 - scroll * 0.1)).clamp(0.005, 20.0);
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = iso_cam.zoom;
        }
    }
}

/// -1, 0 or 1 depending on which of the two key sets is held.
fn key_axis(keys: &ButtonInput<KeyCode>, negative: &[KeyCode], positive: &[KeyCode]) -> f32 {
    let held = |set: &[KeyCode]| set.iter().any(|key| keys.pressed(*key));
    held(positive) as i32 as f32 - held(negative) as i32 as f32
}

/// Pan speed in world units per second at zoom 1.
const PAN_SPEED: f32 = 600.0;
/// Radians per second.
const ROTATE_SPEED: f32 = 1.0;

const PAN_LEFT: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const PAN_RIGHT: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];
const PAN_UP: [KeyCode; 2] = [KeyCode::KeyW, KeyCode::ArrowUp];
const PAN_DOWN: [KeyCode; 2] = [KeyCode::KeyS, KeyCode::ArrowDown];

fn camera_pan(
    mut query: Query<(&mut Transform, &mut IsometricCamera)>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    time: Res<Time>,
) {
    let direction = Vec3::new(
        key_axis(&keys, &PAN_LEFT, &PAN_RIGHT),
        0.0,
        key_axis(&keys, &PAN_UP, &PAN_DOWN),
    );

    let dragging = mouse_buttons.any_pressed([MouseButton::Middle, MouseButton::Right]);
    let drag: Vec2 = mouse_motion.read().map(|event| event.delta).sum();
    let drag = if dragging { drag } else { Vec2::ZERO };

    if direction == Vec3::ZERO && drag == Vec2::ZERO {
        return;
    }

    for (mut transform, mut iso_cam) in &mut query {
        // Both inputs scale with zoom so panning feels the same at any scale.
        let step = direction.normalize_or_zero() * PAN_SPEED * time.delta_secs()
            - Vec3::new(drag.x, 0.0, drag.y);
        let offset = Quat::from_rotation_y(iso_cam.rotation) * step * iso_cam.zoom;
        iso_cam.target += offset;
        *transform = iso_cam.transform();
    }
}

fn camera_rotate(
    mut query: Query<(&mut Transform, &mut IsometricCamera)>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let turn = key_axis(&keys, &[KeyCode::KeyQ], &[KeyCode::KeyE]);
    if turn == 0.0 {
        return;
    }

    for (mut transform, mut iso_cam) in &mut query {
        iso_cam.rotation += turn * ROTATE_SPEED * time.delta_secs();
        *transform = iso_cam.transform();
    }
}
