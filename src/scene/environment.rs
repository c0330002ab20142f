//! Planet, starfield, atmosphere and orbit-ring animation.

use crate::config::{linear, SceneConfig};
use crate::easing::{damp, mix_color};
use crate::rng::SeededRng;
use crate::scene::atmosphere::AtmosphereMaterial;
use crate::scene::meshes::{point_cloud_mesh, CloudPoint, POINT_VERTICES};
use crate::scene::stars::StarMaterial;
use crate::timeline::{Chapter, Timeline};
use bevy::prelude::*;
use std::f32::consts::TAU;

/// Range of per-star twinkle rates (rad/s).
const TWINKLE_RATE: [f32; 2] = [0.5, 2.5];

#[derive(Component)]
pub struct Planet;

/// The starfield mesh.
#[derive(Component, Debug, Clone, Copy)]
pub struct StarField;

/// One star: its cloud point plus its own twinkle rate and phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub point: CloudPoint,
    pub rate: f32,
    pub phase: f32,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct AtmosphereShell;

#[derive(Component, Debug, Clone, Copy)]
pub struct OrbitRing;

/// Smoothed environment values.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentState {
    pub ring_opacity: f32,
    /// 0 = calm atmosphere tint, 1 = fully stressed.
    pub stress: f32,
}

impl EnvironmentState {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            ring_opacity: config.ring_opacity[0],
            stress: 0.0,
        }
    }

    pub fn update(&mut self, config: &SceneConfig, timeline: &Timeline, dt: f32) {
        let ring_target = timeline.chapter.pick(&config.ring_opacity);
        self.ring_opacity = damp(self.ring_opacity, ring_target, config.ring_approach_rate, dt);
        self.stress = damp(
            self.stress,
            timeline.phase(Chapter::Congestion),
            config.atmosphere_tint_rate,
            dt,
        );
    }
}

/// Seeded stars on a shell of `shell_radius`.
///
/// Each star draws its direction, shell jitter, size, brightness, twinkle
/// rate and twinkle phase from the PRNG, so the field is identical on every
/// run.
pub fn generate_stars(count: usize, shell_radius: f32, seed: u64) -> Vec<Star> {
    let mut rng = SeededRng::new(seed);
    (0..count)
        .map(|_| {
            let position = rng.unit_vector() * shell_radius * rng.range(0.95, 1.05);
            let size = rng.range(0.05, 0.16) * shell_radius / 80.0;
            let alpha = rng.range(0.3, 1.0);
            let warmth = rng.range(-0.08, 0.08);
            Star {
                point: CloudPoint {
                    position,
                    size,
                    color: LinearRgba::new(1.0 + warmth, 1.0, 1.0 - warmth, alpha),
                },
                rate: rng.range(TWINKLE_RATE[0], TWINKLE_RATE[1]),
                phase: rng.range(0.0, TAU),
            }
        })
        .collect()
}

/// Point-cloud mesh of `stars` with `(rate, phase)` in `UV_0` on every
/// vertex of each star.
pub fn star_mesh(stars: &[Star]) -> Mesh {
    let points: Vec<CloudPoint> = stars.iter().map(|star| star.point).collect();
    let twinkle: Vec<[f32; 2]> = stars
        .iter()
        .flat_map(|star| [[star.rate, star.phase]; POINT_VERTICES])
        .collect();
    point_cloud_mesh(&points).with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, twinkle)
}

pub fn planet_spin_system(
    time: Res<Time>,
    config: Res<SceneConfig>,
    mut planet: Query<&mut Transform, With<Planet>>,
) {
    for mut transform in planet.iter_mut() {
        transform.rotate_y(config.planet_spin * time.delta_secs());
    }
}

/// Feed scene time to the star shader and drift the sky.
pub fn starfield_system(
    time: Res<Time>,
    mut materials: ResMut<Assets<StarMaterial>>,
    mut fields: Query<(&MeshMaterial3d<StarMaterial>, &mut Transform), With<StarField>>,
) {
    let t = time.elapsed_secs();
    for (material, mut transform) in fields.iter_mut() {
        if let Some(material) = materials.get_mut(&material.0) {
            material.set_time(t);
        }
        // Slow sky drift.
        transform.rotation = Quat::from_rotation_y(t * 0.002);
    }
}

/// Ease ring opacity and atmosphere stress, then write them to materials.
pub fn environment_system(
    time: Res<Time>,
    config: Res<SceneConfig>,
    timeline: Res<Timeline>,
    mut state: ResMut<EnvironmentState>,
    mut standard: ResMut<Assets<StandardMaterial>>,
    mut atmosphere: ResMut<Assets<AtmosphereMaterial>>,
    rings: Query<&MeshMaterial3d<StandardMaterial>, With<OrbitRing>>,
    shells: Query<&MeshMaterial3d<AtmosphereMaterial>, With<AtmosphereShell>>,
) {
    state.update(&config, &timeline, time.delta_secs());

    for handle in rings.iter() {
        if let Some(material) = standard.get_mut(&handle.0) {
            material.base_color.set_alpha(state.ring_opacity);
        }
    }

    let tint = mix_color(
        linear(config.atmosphere_base),
        linear(config.atmosphere_stressed),
        state.stress,
    );
    for handle in shells.iter() {
        if let Some(material) = atmosphere.get_mut(&handle.0) {
            material.set_tint(tint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starfield_is_identical_every_load() {
        let a = generate_stars(500, 80.0, 11);
        let b = generate_stars(500, 80.0, 11);
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);
        for star in &a {
            let r = star.point.position.length();
            assert!((76.0 - 1e-3..=84.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn every_star_twinkles_at_its_own_rate() {
        let stars = generate_stars(200, 80.0, 5);
        for star in &stars {
            assert!((TWINKLE_RATE[0]..TWINKLE_RATE[1]).contains(&star.rate));
            assert!((0.0..TAU).contains(&star.phase));
        }
        let mut rates: Vec<u32> = stars.iter().map(|s| s.rate.to_bits()).collect();
        rates.sort_unstable();
        rates.dedup();
        assert!(rates.len() > 150, "only {} distinct rates", rates.len());
    }

    #[test]
    fn star_mesh_carries_twinkle_per_vertex() {
        let stars = generate_stars(10, 80.0, 3);
        let mesh = star_mesh(&stars);
        let Some(bevy_mesh::VertexAttributeValues::Float32x2(uvs)) =
            mesh.attribute(Mesh::ATTRIBUTE_UV_0)
        else {
            panic!("twinkle attribute missing");
        };
        assert_eq!(uvs.len(), stars.len() * POINT_VERTICES);
        for (i, star) in stars.iter().enumerate() {
            for uv in &uvs[i * POINT_VERTICES..(i + 1) * POINT_VERTICES] {
                assert_eq!(*uv, [star.rate, star.phase]);
            }
        }
    }

    #[test]
    fn rings_fade_as_the_story_advances() {
        let config = SceneConfig::default();
        let mut state = EnvironmentState::new(&config);
        let late = Timeline::from_progress(0.9, 0.9);
        for _ in 0..600 {
            state.update(&config, &late, 1.0 / 60.0);
        }
        assert!((state.ring_opacity - config.ring_opacity[4]).abs() < 1e-3);
        assert!(state.ring_opacity < config.ring_opacity[0]);
    }

    #[test]
    fn atmosphere_stress_is_smoothed() {
        let config = SceneConfig::default();
        let mut state = EnvironmentState::new(&config);
        state.update(&config, &Timeline::from_progress(0.5, 0.5), 1.0 / 60.0);
        assert!(state.stress > 0.0 && state.stress < 0.1, "no snap: {}", state.stress);
    }
}
