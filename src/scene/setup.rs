//! Scene construction, run once at startup in this order: camera, lights,
//! environment (stars, planet, atmosphere, rings), satellites, effects.
//!
//! Everything that can later be replaced by a loaded model is spawned with
//! procedural geometry here, so the scene is complete from the first frame.

use crate::camera::{CameraRig, SceneCamera};
use crate::config::{linear, SceneConfig};
use crate::lifecycle::{scene_target_image, window_target_size, SceneEntity, SceneTarget};
use crate::models::ModelKind;
use crate::orbit::ring_points;
use crate::post::full_screen;
use crate::rng::SeededRng;
use crate::scene::atmosphere::AtmosphereMaterial;
use crate::scene::effects::{
    CollisionLight, DebrisSprite, EffectMaterials, FlashSprite, FragmentSprite, KesslerRing,
};
use crate::scene::environment::{
    generate_stars, star_mesh, AtmosphereShell, EnvironmentState, OrbitRing, Planet, StarField,
};
use crate::scene::meshes::{point_cloud_mesh, tube_mesh, CloudPoint};
use crate::scene::satellites::{
    park_position, DangerGlow, DangerPulse, DangerRing, DangerSatellite, HighlightGlow, PoolMember,
    SatelliteMaterials, SatellitePool,
};
use crate::scene::stars::StarMaterial;
use bevy::camera::RenderTarget;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::render::view::Hdr;
use bevy::ui::IsDefaultUiCamera;
use bevy::window::PrimaryWindow;

const RING_TUBE_RADIUS: f32 = 0.0025;

fn unlit(color: Color, alpha_mode: AlphaMode) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        unlit: true,
        alpha_mode,
        ..Default::default()
    }
}

fn glowing(color: Color, emissive: LinearRgba, alpha_mode: AlphaMode) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        emissive,
        alpha_mode,
        perceptual_roughness: 0.6,
        ..Default::default()
    }
}

/// Orientation that carries the XZ plane into the mean danger-orbit plane,
/// using the same tilt-then-turn order as [`orbital_position`].
///
/// [`orbital_position`]: crate::orbit::orbital_position
pub fn kessler_rotation(config: &SceneConfig) -> Quat {
    let tilt = (config.danger_inclinations[0] + config.danger_inclinations[1]) * 0.5;
    let right_ascension = config.danger_orbit[1];
    Quat::from_rotation_y(right_ascension) * Quat::from_rotation_x(tilt)
}

/// Points of the long-term contamination cloud: a thin annulus in the XZ
/// plane, placed into the danger plane by [`kessler_rotation`].
pub fn kessler_points(config: &SceneConfig) -> Vec<CloudPoint> {
    let mut rng = SeededRng::new(config.debris_seed ^ 0x4B45_5353);
    let inner_sq = config.kessler_inner_radius.powi(2);
    let outer_sq = config.kessler_outer_radius.powi(2);
    (0..config.kessler_count)
        .map(|_| {
            // Area-uniform radius across the annulus.
            let r = rng.range(inner_sq, outer_sq).sqrt();
            let angle = rng.range(0.0, std::f32::consts::TAU);
            let y = rng.range(-config.kessler_thickness, config.kessler_thickness);
            let tint = config
                .debris_tints
                .get((rng.next_f32() * config.debris_tints.len() as f32) as usize)
                .copied()
                .unwrap_or(config.color_debris_hot);
            CloudPoint {
                position: Vec3::new(r * angle.cos(), y, r * angle.sin()),
                size: rng.range(0.003, 0.008),
                color: linear(tint).with_alpha(rng.range(0.3, 1.0)),
            }
        })
        .collect()
}

/// Spawn the scene camera rendering into [`SceneTarget`], and a 2D camera
/// that presents the target full-screen underneath the overlays.
pub fn setup_camera(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut images: ResMut<Assets<Image>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let size = windows
        .single()
        .ok()
        .and_then(|window| window_target_size(window, config.max_pixel_ratio))
        .unwrap_or(UVec2::ONE);
    let target = images.add(scene_target_image(size));

    let rig = CameraRig::new(&config);
    commands.spawn((
        SceneEntity,
        SceneCamera,
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(target.clone().into()),
            ..Default::default()
        },
        Hdr,
        Tonemapping::TonyMcMapface,
        Projection::Perspective(PerspectiveProjection {
            fov: rig.fov.to_radians(),
            ..Default::default()
        }),
        Transform::from_translation(rig.position(Vec2::ZERO)).looking_at(Vec3::ZERO, Vec3::Y),
        AmbientLight {
            color: Color::srgb(0.45, 0.55, 0.8),
            brightness: 40.0,
            ..Default::default()
        },
    ));
    commands.spawn((
        SceneEntity,
        Camera2d,
        Camera {
            order: 1,
            ..Default::default()
        },
        IsDefaultUiCamera,
    ));
    commands.spawn((SceneEntity, full_screen(), ImageNode::new(target.clone()), ZIndex(0)));

    commands.insert_resource(rig);
    commands.insert_resource(SceneTarget(target));
    info!(
        "Camera ready (fov {:.0} deg, target {}x{})",
        config.chapter_fov[0], size.x, size.y
    );
}

pub fn setup_lights(mut commands: Commands, config: Res<SceneConfig>) {
    // Sun.
    commands.spawn((
        SceneEntity,
        DirectionalLight {
            illuminance: 12_000.0,
            color: Color::srgb(1.0, 0.97, 0.92),
            ..Default::default()
        },
        Transform::from_xyz(5.0, 3.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    // Rim.
    commands.spawn((
        SceneEntity,
        DirectionalLight {
            illuminance: 1_500.0,
            color: Color::srgb(0.45, 0.6, 1.0),
            ..Default::default()
        },
        Transform::from_xyz(-4.0, 1.0, -6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        SceneEntity,
        CollisionLight,
        PointLight {
            intensity: 0.0,
            range: 6.0,
            color: Color::from(linear(config.color_debris_hot)),
            shadows_enabled: false,
            ..Default::default()
        },
        Transform::from_translation(Vec3::ZERO),
    ));
}

pub fn setup_environment(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut atmosphere: ResMut<Assets<AtmosphereMaterial>>,
    mut star_materials: ResMut<Assets<StarMaterial>>,
) {
    let stars = generate_stars(config.star_count, config.star_shell_radius, config.star_seed);
    commands.spawn((
        SceneEntity,
        StarField,
        Mesh3d(meshes.add(star_mesh(&stars))),
        MeshMaterial3d(star_materials.add(StarMaterial::new(config.reduced_motion))),
        Transform::default(),
    ));

    commands.spawn((
        SceneEntity,
        Planet,
        ModelKind::Planet,
        Mesh3d(meshes.add(Sphere::new(config.planet_radius).mesh().uv(64, 48))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::from(linear(config.planet_color)),
            perceptual_roughness: 0.85,
            ..Default::default()
        })),
        Transform::default(),
    ));

    for [scale, opacity, falloff] in config.atmosphere_shells.iter().copied() {
        commands.spawn((
            SceneEntity,
            AtmosphereShell,
            Mesh3d(meshes.add(Sphere::new(config.planet_radius * scale).mesh().uv(64, 48))),
            MeshMaterial3d(atmosphere.add(AtmosphereMaterial::new(
                linear(config.atmosphere_base),
                opacity,
                falloff,
            ))),
            Transform::default(),
        ));
    }

    for band in &config.orbit_bands {
        let tint = linear(band.tint).with_alpha(config.ring_opacity[0]);
        commands.spawn((
            SceneEntity,
            OrbitRing,
            Mesh3d(meshes.add(tube_mesh(&band.ring_points(config.ring_samples), RING_TUBE_RADIUS, 4))),
            MeshMaterial3d(materials.add(unlit(Color::from(tint), AlphaMode::Blend))),
            Transform::default(),
        ));
    }

    commands.insert_resource(EnvironmentState::new(&config));
    info!(
        "Environment ready: {} stars, {} atmosphere shells, {} orbit bands",
        config.star_count,
        config.atmosphere_shells.len(),
        config.orbit_bands.len()
    );
}

pub fn setup_satellites(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let pool = SatellitePool::from_config(&config);
    let neutral = Color::from(linear(config.color_neutral));
    let danger_color = linear(config.color_danger);

    let handles = SatelliteMaterials {
        crowd: materials.add(glowing(neutral, LinearRgba::BLACK, AlphaMode::Opaque)),
        highlight: materials.add(glowing(neutral, LinearRgba::BLACK, AlphaMode::Opaque)),
        glow: materials.add(unlit(Color::NONE, AlphaMode::Add)),
        danger: materials.add(glowing(Color::from(danger_color), danger_color, AlphaMode::Opaque)),
        danger_glow: materials.add(unlit(Color::NONE, AlphaMode::Add)),
        danger_ring: materials.add(unlit(Color::NONE, AlphaMode::Blend)),
    };

    // Fallback body; a loaded satellite model replaces it on every member.
    let body_mesh = meshes.add(Cuboid::new(1.4, 0.6, 0.9));
    let glow_mesh = meshes.add(Sphere::new(1.0).mesh().uv(16, 12));
    let parked = Transform::from_translation(park_position());

    for index in 0..pool.bodies.len() {
        let material = if pool.is_highlighted(index) {
            handles.highlight.clone()
        } else {
            handles.crowd.clone()
        };
        commands.spawn((
            SceneEntity,
            PoolMember(index),
            ModelKind::Satellite,
            Mesh3d(body_mesh.clone()),
            MeshMaterial3d(material),
            parked,
        ));
    }

    for &index in &pool.highlighted {
        commands.spawn((
            SceneEntity,
            HighlightGlow(index),
            Mesh3d(glow_mesh.clone()),
            MeshMaterial3d(handles.glow.clone()),
            parked,
        ));
    }

    let [radius, right_ascension, ..] = config.danger_orbit;
    for (i, inclination) in config.danger_inclinations.iter().copied().enumerate() {
        commands.spawn((
            SceneEntity,
            DangerSatellite(i),
            ModelKind::Satellite,
            Mesh3d(body_mesh.clone()),
            MeshMaterial3d(handles.danger.clone()),
            parked,
        ));
        commands.spawn((
            SceneEntity,
            DangerGlow(i),
            Mesh3d(glow_mesh.clone()),
            MeshMaterial3d(handles.danger_glow.clone()),
            parked,
        ));
        let path = ring_points(radius, inclination, right_ascension, config.ring_samples);
        commands.spawn((
            SceneEntity,
            DangerRing,
            Mesh3d(meshes.add(tube_mesh(&path, RING_TUBE_RADIUS * 1.5, 4))),
            MeshMaterial3d(handles.danger_ring.clone()),
            Transform::default(),
        ));
    }

    info!(
        "Satellites ready: pool of {}, {} highlighted",
        pool.bodies.len(),
        pool.highlighted.len()
    );
    commands.insert_resource(pool);
    commands.insert_resource(handles);
    commands.insert_resource(DangerPulse::default());
}

pub fn setup_effects(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let hot = linear(config.color_debris_hot);
    let handles = EffectMaterials {
        debris: config
            .debris_tints
            .iter()
            .map(|tint| materials.add(glowing(Color::from(linear(*tint)), hot, AlphaMode::Blend)))
            .collect(),
        fragment: materials.add(glowing(Color::srgba(0.7, 0.65, 0.6, 0.0), LinearRgba::BLACK, AlphaMode::Blend)),
        flash: materials.add(glowing(Color::from(hot), hot, AlphaMode::Add)),
    };
    let parked = Transform::from_translation(park_position());

    let particle_mesh = meshes.add(Sphere::new(1.0).mesh().uv(8, 6));
    for index in 0..config.debris_count {
        let Some(material) = handles.debris.get(index % handles.debris.len().max(1)) else {
            break;
        };
        commands.spawn((
            SceneEntity,
            DebrisSprite(index),
            Mesh3d(particle_mesh.clone()),
            MeshMaterial3d(material.clone()),
            parked,
        ));
    }

    let fragment_mesh = meshes.add(Cuboid::new(1.0, 0.35, 0.6));
    for index in 0..config.fragment_count {
        commands.spawn((
            SceneEntity,
            FragmentSprite(index),
            Mesh3d(fragment_mesh.clone()),
            MeshMaterial3d(handles.fragment.clone()),
            parked,
        ));
    }

    commands.spawn((
        SceneEntity,
        FlashSprite,
        Mesh3d(particle_mesh.clone()),
        MeshMaterial3d(handles.flash.clone()),
        parked,
    ));

    commands.spawn((
        SceneEntity,
        KesslerRing,
        Mesh3d(meshes.add(point_cloud_mesh(&kessler_points(&config)))),
        MeshMaterial3d(materials.add(unlit(Color::srgba(1.0, 1.0, 1.0, 0.0), AlphaMode::Blend))),
        Transform::from_rotation(kessler_rotation(&config)),
        Visibility::Hidden,
    ));

    info!(
        "Effects ready: {} debris, {} fragments, {} cloud points",
        config.debris_count, config.fragment_count, config.kessler_count
    );
    commands.insert_resource(handles);
}
