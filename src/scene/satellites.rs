//! Satellite pool, highlight glows, and the converging danger pair.
//!
//! The pool is a fixed arena of entities sharing one mesh; members beyond the
//! visible count are parked at [`PARK_POSITION`] instead of being hidden, so
//! the whole swarm stays one batch.  Colour is chapter-driven through two
//! shared materials, one for the crowd and one for the highlighted members.

use crate::collision::DangerPair;
use crate::config::{linear, SceneConfig};
use crate::constants::PARK_POSITION;
use crate::easing::{ease_out_cubic, lerp, mix_color};
use crate::orbit::{generate_satellites, OrbitalBody};
use crate::timeline::{phase_bounds, phase_local_progress, Chapter, Timeline};
use bevy::prelude::*;
use std::f32::consts::TAU;

#[derive(Component, Debug, Clone, Copy)]
pub struct PoolMember(pub usize);

#[derive(Component, Debug, Clone, Copy)]
pub struct HighlightGlow(pub usize);

#[derive(Component, Debug, Clone, Copy)]
pub struct DangerSatellite(pub usize);

#[derive(Component, Debug, Clone, Copy)]
pub struct DangerGlow(pub usize);

#[derive(Component)]
pub struct DangerRing;

#[inline]
pub fn park_position() -> Vec3 {
    Vec3::from_array(PARK_POSITION)
}

/// Immutable orbital parameters for every pool member.
#[derive(Resource, Debug, Clone)]
pub struct SatellitePool {
    pub bodies: Vec<OrbitalBody>,
    pub highlighted: Vec<usize>,
}

impl SatellitePool {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            bodies: generate_satellites(
                &config.orbit_bands,
                config.satellite_pool_size,
                config.satellite_seed,
                config.satellite_spread(),
            ),
            highlighted: config.highlighted_satellites.clone(),
        }
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.highlighted.contains(&index)
    }
}

/// Materials whose colours are rewritten every frame.
#[derive(Resource, Debug, Clone)]
pub struct SatelliteMaterials {
    pub crowd: Handle<StandardMaterial>,
    pub highlight: Handle<StandardMaterial>,
    pub glow: Handle<StandardMaterial>,
    pub danger: Handle<StandardMaterial>,
    pub danger_glow: Handle<StandardMaterial>,
    pub danger_ring: Handle<StandardMaterial>,
}

/// Accumulated phase of the danger pulse, so frequency changes never jump.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct DangerPulse {
    pub phase: f32,
}

impl DangerPulse {
    /// Advance at a frequency rising with `risk`; returns brightness in `[0, 1]`.
    pub fn advance(&mut self, freq: [f32; 2], risk: f32, dt: f32) -> f32 {
        let hz = lerp(freq[0], freq[1], risk);
        self.phase = (self.phase + TAU * hz * dt).rem_euclid(TAU);
        0.5 + 0.5 * self.phase.sin()
    }
}

/// Number of pool members on screen at `progress`.
///
/// `initial` through the first chapter, an ease-out ramp to the full pool
/// across the congestion chapter, the full pool afterwards.
pub fn visible_count(progress: f32, pool: usize, initial: usize) -> usize {
    let initial = initial.min(pool);
    let (lo, hi) = phase_bounds(Chapter::Congestion.index());
    let local = phase_local_progress(progress, lo, hi);
    let extra = ((pool - initial) as f32 * ease_out_cubic(local)).round() as usize;
    (initial + extra).min(pool)
}

/// Crowd and highlight colours for the current timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolColors {
    pub crowd: LinearRgba,
    pub highlight: LinearRgba,
}

pub fn pool_colors(config: &SceneConfig, timeline: &Timeline) -> PoolColors {
    let congestion = timeline.phase(Chapter::Congestion);
    let dependence = timeline.phase(Chapter::Dependence);
    let risk = timeline.phase(Chapter::Risk);

    let warm = mix_color(linear(config.color_neutral), linear(config.color_warning), congestion);
    let crowd = mix_color(warm, linear(config.color_dimmed), dependence);
    let active = mix_color(warm, linear(config.color_active), dependence);
    let highlight = mix_color(active, linear(config.color_drained), risk);
    PoolColors { crowd, highlight }
}

/// Opacity of the highlight glows: in during dependence, out during risk.
pub fn highlight_glow_alpha(timeline: &Timeline) -> f32 {
    match timeline.chapter {
        Chapter::Dependence | Chapter::Risk => {
            timeline.phase(Chapter::Dependence) * (1.0 - timeline.phase(Chapter::Risk))
        }
        _ => 0.0,
    }
}

/// Rendered positions of the danger pair, or `None` while they are hidden.
///
/// During the risk chapter each satellite leaves its orbit toward the shared
/// midpoint in proportion to the eased risk progress.
pub fn danger_positions(chapter: Chapter, risk: f32, danger: &DangerPair, t: f32) -> Option<[Vec3; 2]> {
    if chapter != Chapter::Risk {
        return None;
    }
    let mid = danger.midpoint(t);
    let [a, b] = danger.positions(t);
    Some([a.lerp(mid, risk), b.lerp(mid, risk)])
}

fn set_color(materials: &mut Assets<StandardMaterial>, handle: &Handle<StandardMaterial>, color: LinearRgba, glow: f32) {
    if let Some(material) = materials.get_mut(handle) {
        material.base_color = Color::from(color.with_alpha(material.base_color.alpha()));
        material.emissive = color * glow;
    }
}

/// Position every pool member and recolour the shared materials.
#[allow(clippy::too_many_arguments)]
pub fn satellite_pool_system(
    time: Res<Time>,
    timeline: Res<Timeline>,
    config: Res<SceneConfig>,
    pool: Res<SatellitePool>,
    handles: Res<SatelliteMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut members: Query<(&PoolMember, &mut Transform)>,
) {
    let t = time.elapsed_secs();
    let visible = visible_count(
        timeline.progress,
        pool.bodies.len(),
        config.satellite_initial_visible,
    );

    for (PoolMember(index), mut transform) in members.iter_mut() {
        let Some(body) = pool.bodies.get(*index) else {
            continue;
        };
        if *index >= visible {
            transform.translation = park_position();
            continue;
        }
        let position = body.position(t);
        *transform = Transform::from_translation(position)
            .looking_to(body.tangent(t), position.normalize_or(Vec3::Y))
            .with_scale(Vec3::splat(body.size));
    }

    let colors = pool_colors(&config, &timeline);
    let glow = highlight_glow_alpha(&timeline);
    set_color(&mut materials, &handles.crowd, colors.crowd, 0.0);
    set_color(&mut materials, &handles.highlight, colors.highlight, 2.0 * glow);
}

/// Glow shells follow highlighted members while the glow is up.
pub fn highlight_glow_system(
    time: Res<Time>,
    timeline: Res<Timeline>,
    config: Res<SceneConfig>,
    pool: Res<SatellitePool>,
    handles: Res<SatelliteMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut glows: Query<(&HighlightGlow, &mut Transform)>,
) {
    let t = time.elapsed_secs();
    let alpha = highlight_glow_alpha(&timeline);
    let color = pool_colors(&config, &timeline).highlight;

    if let Some(material) = materials.get_mut(&handles.glow) {
        material.base_color = Color::from(color.with_alpha(alpha * 0.6));
        material.emissive = color * (alpha * 4.0);
    }

    for (HighlightGlow(index), mut transform) in glows.iter_mut() {
        match pool.bodies.get(*index) {
            Some(body) if alpha > 1e-3 => {
                transform.translation = body.position(t);
                transform.scale = Vec3::splat(body.size * (2.5 + alpha));
            }
            _ => transform.translation = park_position(),
        }
    }
}

/// Converge, pulse and reveal the danger pair during the risk chapter.
#[allow(clippy::too_many_arguments)]
pub fn danger_system(
    time: Res<Time>,
    timeline: Res<Timeline>,
    config: Res<SceneConfig>,
    danger: Res<DangerPair>,
    handles: Res<SatelliteMaterials>,
    mut pulse: ResMut<DangerPulse>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut satellites: Query<(&DangerSatellite, &mut Transform), Without<DangerGlow>>,
    mut glows: Query<(&DangerGlow, &mut Transform), Without<DangerSatellite>>,
) {
    let t = time.elapsed_secs();
    let risk = timeline.phase(Chapter::Risk);
    let positions = danger_positions(timeline.chapter, risk, &danger, t);
    let brightness = if positions.is_some() {
        pulse.advance(config.danger_pulse_freq, risk, time.delta_secs())
    } else {
        0.0
    };

    let danger_color = linear(config.color_danger);
    if let Some(material) = materials.get_mut(&handles.danger) {
        material.emissive = danger_color * (1.0 + 6.0 * brightness * risk.max(0.2));
    }
    if let Some(material) = materials.get_mut(&handles.danger_glow) {
        material.base_color = Color::from(danger_color.with_alpha(0.25 + 0.35 * brightness));
        material.emissive = danger_color * (2.0 + 4.0 * brightness);
    }
    if let Some(material) = materials.get_mut(&handles.danger_ring) {
        let alpha = if positions.is_some() {
            risk * (0.3 + 0.4 * brightness)
        } else {
            0.0
        };
        material.base_color = Color::from(danger_color.with_alpha(alpha));
    }

    for (DangerSatellite(i), mut transform) in satellites.iter_mut() {
        match positions {
            Some(p) => {
                let body = danger.bodies[*i % 2];
                *transform = Transform::from_translation(p[*i % 2])
                    .looking_to(body.tangent(t), p[*i % 2].normalize_or(Vec3::Y))
                    .with_scale(Vec3::splat(body.size));
            }
            None => transform.translation = park_position(),
        }
    }
    for (DangerGlow(i), mut transform) in glows.iter_mut() {
        match positions {
            Some(p) => {
                transform.translation = p[*i % 2];
                transform.scale = Vec3::splat(config.danger_size * (3.0 + 6.0 * risk) * (0.8 + 0.4 * brightness));
            }
            None => transform.translation = park_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: LinearRgba, b: LinearRgba) {
        let d = a.to_vec4() - b.to_vec4();
        assert!(d.abs().max_element() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn visible_count_ramps_to_full_pool() {
        assert_eq!(visible_count(0.0, 200, 4), 4);
        assert_eq!(visible_count(0.19, 200, 4), 4);
        assert_eq!(visible_count(0.2, 200, 4), 4);
        assert_eq!(visible_count(0.4, 200, 4), 200);
        assert_eq!(visible_count(1.0, 200, 4), 200);

        let mut prev = 0;
        for i in 0..=1000 {
            let n = visible_count(i as f32 / 1000.0, 200, 4);
            assert!(n >= prev && n <= 200);
            prev = n;
        }
    }

    #[test]
    fn visible_count_fills_fast_then_slows() {
        let early = visible_count(0.25, 200, 4) - visible_count(0.2, 200, 4);
        let late = visible_count(0.4, 200, 4) - visible_count(0.35, 200, 4);
        assert!(early > late);
    }

    #[test]
    fn initial_larger_than_pool_is_capped() {
        assert_eq!(visible_count(0.0, 3, 10), 3);
    }

    #[test]
    fn colors_are_neutral_at_the_start() {
        let config = SceneConfig::default();
        let colors = pool_colors(&config, &Timeline::from_progress(0.05, 0.05));
        assert_close(colors.crowd, linear(config.color_neutral));
        assert_close(colors.highlight, linear(config.color_neutral));
    }

    #[test]
    fn crowd_dims_while_highlight_lights_up() {
        let config = SceneConfig::default();
        let colors = pool_colors(&config, &Timeline::from_progress(0.6, 0.6));
        assert_close(colors.crowd, linear(config.color_dimmed));
        assert_close(colors.highlight, linear(config.color_active));
    }

    #[test]
    fn highlight_drains_through_risk() {
        let config = SceneConfig::default();
        let colors = pool_colors(&config, &Timeline::from_progress(0.8, 0.8));
        assert_close(colors.highlight, linear(config.color_drained));
    }

    #[test]
    fn glow_only_during_dependence_and_risk() {
        assert_eq!(highlight_glow_alpha(&Timeline::from_progress(0.3, 0.3)), 0.0);
        assert!(highlight_glow_alpha(&Timeline::from_progress(0.55, 0.55)) > 0.5);
        assert!(highlight_glow_alpha(&Timeline::from_progress(0.78, 0.78)) < 0.1);
        assert_eq!(highlight_glow_alpha(&Timeline::from_progress(0.9, 0.9)), 0.0);
    }

    #[test]
    fn danger_pair_converges_on_the_midpoint() {
        let danger = DangerPair::from_config(&SceneConfig::default());
        assert!(danger_positions(Chapter::Dependence, 0.0, &danger, 1.0).is_none());
        assert!(danger_positions(Chapter::Cascade, 1.0, &danger, 1.0).is_none());

        let apart = danger_positions(Chapter::Risk, 0.0, &danger, 4.0).expect("visible in risk");
        let close = danger_positions(Chapter::Risk, 1.0, &danger, 4.0).expect("visible in risk");
        assert!(apart[0].distance(apart[1]) > close[0].distance(close[1]));
        assert!(close[0].distance(close[1]) < 1e-5);
    }

    #[test]
    fn pulse_speeds_up_with_risk() {
        let mut slow = DangerPulse::default();
        let mut fast = DangerPulse::default();
        slow.advance([2.0, 14.0], 0.0, 0.01);
        fast.advance([2.0, 14.0], 1.0, 0.01);
        assert!(fast.phase > slow.phase);
    }

    #[test]
    fn pool_is_deterministic() {
        let config = SceneConfig::default();
        let a = SatellitePool::from_config(&config);
        let b = SatellitePool::from_config(&config);
        assert_eq!(a.bodies, b.bodies);
        assert_eq!(a.bodies.len(), config.satellite_pool_size);
        assert!(a.is_highlighted(3));
        assert!(!a.is_highlighted(4));
    }
}
