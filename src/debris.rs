//! Collision debris: particle and fragment arenas, integration, and the
//! persistent Kessler-ring contamination level.
//!
//! ## Design
//!
//! Both arenas are fixed-size vectors allocated once at startup and indexed by
//! particle / fragment id; nothing is allocated or freed per frame.  Inactive
//! members are parked far outside the view frustum by the render layer.
//!
//! | System                        | Schedule | Purpose                                        |
//! |-------------------------------|----------|------------------------------------------------|
//! | `debris_spawn_system`         | Update   | Re-seed both arenas on `CollisionTriggered`    |
//! | `debris_integration_system`   | Update   | Decaying-velocity motion, band clamp, life     |
//! | `debris_presence_system`      | Update   | Fade debris out after the trigger is re-armed  |
//! | `kessler_cloud_system`        | Update   | Latched contamination opacity                  |
//!
//! Everything here is render-free so the motion rules can be exercised by
//! headless tests; `scene::effects` copies the state onto entities.

use crate::collision::{Collision, CollisionMachine, CollisionTriggered, DangerPair};
use crate::config::SceneConfig;
use crate::easing::{damp, smoothstep};
use crate::rng::SeededRng;
use crate::timeline::{Chapter, Timeline};
use bevy::prelude::*;
use rand::RngCore;

// ── Tuning ───────────────────────────────────────────────────────────────────

/// Debris parameters extracted from [`SceneConfig`].
#[derive(Debug, Clone, Copy)]
pub struct DebrisTuning {
    pub jitter: f32,
    pub shear_speed: [f32; 2],
    pub noise_speed: f32,
    pub decay_rate: f32,
    pub clamp_min: f32,
    pub clamp_max: f32,
    pub lifetime: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub fragment_lifetime: f32,
    /// Debris never goes below this distance from the planet centre.
    pub surface: f32,
    pub tint_count: usize,
}

impl From<&SceneConfig> for DebrisTuning {
    fn from(config: &SceneConfig) -> Self {
        Self {
            jitter: config.debris_jitter,
            shear_speed: config.debris_shear_speed,
            noise_speed: config.debris_noise_speed,
            decay_rate: config.debris_decay_rate,
            clamp_min: config.debris_clamp_min,
            clamp_max: config.debris_clamp_max,
            lifetime: config.debris_lifetime,
            size_min: config.debris_size_min,
            size_max: config.debris_size_max,
            fragment_lifetime: config.fragment_lifetime,
            surface: config.planet_radius * config.surface_margin,
            tint_count: config.debris_tints.len().max(1),
        }
    }
}

// ── Motion helpers ───────────────────────────────────────────────────────────

/// Velocity scale `since` seconds after the trigger: `exp(-rate * since)`.
#[inline]
pub fn decay_factor(rate: f32, since: f32) -> f32 {
    (-rate * since.max(0.0)).exp()
}

/// Clamp the distance of `position` from `center` into `[min, max]`.
///
/// A particle sitting exactly on the centre is pushed out along `fallback`.
pub fn clamp_to_band(position: Vec3, center: Vec3, min: f32, max: f32, fallback: Vec3) -> Vec3 {
    let offset = position - center;
    let distance = offset.length();
    if distance >= min && distance <= max {
        return position;
    }
    let dir = if distance > 1e-6 {
        offset / distance
    } else {
        fallback.normalize_or(Vec3::Y)
    };
    center + dir * distance.clamp(min, max)
}

/// Push `position` out to `surface` if it is inside the planet.
#[inline]
pub fn keep_above_surface(position: Vec3, surface: f32) -> Vec3 {
    if position.length() < surface {
        position.normalize_or(Vec3::Y) * surface
    } else {
        position
    }
}

/// Direction the debris shears along: the mean heading of the two danger
/// satellites at the moment of impact.
pub fn shear_direction(danger: &DangerPair, collision: &Collision) -> Vec3 {
    let [a, b] = danger.bodies;
    let mean = a.tangent(collision.at) + b.tangent(collision.at);
    let fallback = Vec3::Y.cross(collision.point).normalize_or(Vec3::X);
    mean.normalize_or(fallback)
}

/// 0 right after the trigger, 1 once fully cooled.
#[inline]
pub fn cooling(since: f32, cool_time: f32) -> f32 {
    if cool_time <= 0.0 {
        return 1.0;
    }
    smoothstep(since / cool_time)
}

// ── Particles ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebrisParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining life, `[0, 1]`; only ever decreases between triggers.
    pub life: f32,
    pub size: f32,
    /// Index into the configured debris tint palette.
    pub tint: usize,
    /// Phase offset of the size pulse (rad).
    pub pulse_phase: f32,
    pub active: bool,
}

impl Default for DebrisParticle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            life: 0.0,
            size: 0.0,
            tint: 0,
            pulse_phase: 0.0,
            active: false,
        }
    }
}

impl DebrisParticle {
    /// Rendered size at time `t`: a slight per-particle pulse.
    #[inline]
    pub fn pulsed_size(&self, t: f32) -> f32 {
        self.size * (1.0 + 0.15 * (t * 3.0 + self.pulse_phase).sin())
    }
}

/// Fixed arena of debris particles.
#[derive(Resource, Debug, Clone)]
pub struct DebrisField {
    particles: Vec<DebrisParticle>,
    rng: SeededRng,
    /// Visual presence, `[0, 1]`: 1 while a cascade is live, fades after reset.
    pub presence: f32,
}

impl DebrisField {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            particles: vec![DebrisParticle::default(); count],
            rng: SeededRng::new(seed),
            presence: 0.0,
        }
    }

    #[inline]
    pub fn particles(&self) -> &[DebrisParticle] {
        &self.particles
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    /// Re-initialise every particle around the collision point.
    pub fn spawn(&mut self, collision: &Collision, shear: Vec3, tuning: &DebrisTuning) {
        let rng = &mut self.rng;
        for particle in &mut self.particles {
            let sign = if rng.next_f32() < 0.5 { -1.0 } else { 1.0 };
            let shear_speed = rng.range(tuning.shear_speed[0], tuning.shear_speed[1]);
            let noise = rng.unit_vector() * tuning.noise_speed * rng.next_f32();
            // Offsets start inside the band, spread over `jitter` past its
            // inner edge.
            let reach = (tuning.clamp_min + tuning.jitter).min(tuning.clamp_max);
            let offset = rng.unit_vector() * rng.range(tuning.clamp_min, reach);
            let position = clamp_to_band(
                collision.point + offset,
                collision.point,
                tuning.clamp_min,
                tuning.clamp_max,
                offset + noise,
            );

            *particle = DebrisParticle {
                position: keep_above_surface(position, tuning.surface),
                velocity: shear * shear_speed * sign + noise,
                life: 1.0,
                size: rng.range(tuning.size_min, tuning.size_max),
                tint: (rng.next_u32() as usize) % tuning.tint_count,
                pulse_phase: rng.range(0.0, std::f32::consts::TAU),
                active: true,
            };
        }
        self.presence = 1.0;
    }

    /// Advance every active particle by `dt` at scene time `t`.
    pub fn integrate(&mut self, collision: &Collision, t: f32, dt: f32, tuning: &DebrisTuning) {
        let decay = decay_factor(tuning.decay_rate, collision.since(t));
        let life_step = if tuning.lifetime > 0.0 { dt / tuning.lifetime } else { 1.0 };

        for particle in self.particles.iter_mut().filter(|p| p.active) {
            let moved = particle.position + particle.velocity * decay * dt;
            let banded = clamp_to_band(
                moved,
                collision.point,
                tuning.clamp_min,
                tuning.clamp_max,
                particle.velocity,
            );
            particle.position = keep_above_surface(banded, tuning.surface);
            particle.life = (particle.life - life_step).max(0.0);
        }
    }

    pub fn deactivate_all(&mut self) {
        for particle in &mut self.particles {
            particle.active = false;
        }
        self.presence = 0.0;
    }
}

// ── Fragments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Vec3,
    pub velocity: Vec3,
    pub spin_axis: Vec3,
    /// Spin rate (rad/s).
    pub spin_rate: f32,
    pub rotation: Quat,
    pub scale: f32,
    /// Remaining life, `[0, 1]`.
    pub life: f32,
    pub active: bool,
}

impl Default for Fragment {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            spin_axis: Vec3::Y,
            spin_rate: 0.0,
            rotation: Quat::IDENTITY,
            scale: 0.0,
            life: 0.0,
            active: false,
        }
    }
}

/// Fixed arena of disintegration fragments.
#[derive(Resource, Debug, Clone)]
pub struct FragmentSet {
    fragments: Vec<Fragment>,
    rng: SeededRng,
}

impl FragmentSet {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            fragments: vec![Fragment::default(); count],
            rng: SeededRng::new(seed),
        }
    }

    #[inline]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn spawn(&mut self, collision: &Collision, shear: Vec3, tuning: &DebrisTuning) {
        let rng = &mut self.rng;
        for fragment in &mut self.fragments {
            let sign = if rng.next_f32() < 0.5 { -1.0 } else { 1.0 };
            let burst = rng.unit_vector() * tuning.noise_speed * rng.range(1.0, 2.0);
            let shear_speed = rng.range(tuning.shear_speed[0], tuning.shear_speed[1]) * 1.4;
            *fragment = Fragment {
                position: collision.point + rng.in_unit_ball() * tuning.jitter * 0.5,
                velocity: shear * shear_speed * sign + burst,
                spin_axis: rng.unit_vector(),
                spin_rate: rng.range(2.0, 8.0),
                rotation: Quat::IDENTITY,
                scale: rng.range(0.012, 0.03),
                life: 1.0,
                active: true,
            };
        }
    }

    /// Same decaying-velocity motion as the particles, plus spin and a
    /// short fixed lifetime.  Fragments whose life runs out are deactivated.
    pub fn integrate(&mut self, collision: &Collision, t: f32, dt: f32, tuning: &DebrisTuning) {
        let decay = decay_factor(tuning.decay_rate, collision.since(t));
        let life_step = dt / tuning.fragment_lifetime.max(f32::EPSILON);

        for fragment in self.fragments.iter_mut().filter(|f| f.active) {
            let moved = fragment.position + fragment.velocity * decay * dt;
            fragment.position = keep_above_surface(moved, tuning.surface);
            fragment.rotation =
                (Quat::from_axis_angle(fragment.spin_axis, fragment.spin_rate * dt) * fragment.rotation)
                    .normalize();
            fragment.life = (fragment.life - life_step).max(0.0);
            if fragment.life == 0.0 {
                fragment.active = false;
            }
        }
    }

    pub fn deactivate_all(&mut self) {
        for fragment in &mut self.fragments {
            fragment.active = false;
        }
    }
}

// ── Kessler cloud ────────────────────────────────────────────────────────────

/// Opacity of the long-term contamination cloud.
///
/// Inside the terminal chapter the opacity only ratchets upward, so scrolling
/// back within the chapter never "cleans" orbit.  Leaving the chapter lets it
/// fade out again.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct KesslerCloud {
    pub opacity: f32,
}

impl KesslerCloud {
    /// Outside the terminal chapter, or once the trigger is re-armed, the
    /// cloud decays to zero; the latch holds only within the chapter.
    pub fn advance(&mut self, chapter: Chapter, terminal_phase: f32, triggered: bool, cap: f32, dt: f32) {
        if chapter.is_terminal() && triggered {
            let target = (cap * terminal_phase).min(cap);
            self.opacity = self.opacity.max(target);
        } else {
            self.opacity = damp(self.opacity, 0.0, 1.5, dt);
            if self.opacity < 1e-3 {
                self.opacity = 0.0;
            }
        }
    }
}

// ── Systems ──────────────────────────────────────────────────────────────────

/// Re-seed both arenas around the new collision point.
pub fn debris_spawn_system(
    mut triggers: MessageReader<CollisionTriggered>,
    config: Res<SceneConfig>,
    danger: Res<DangerPair>,
    mut field: ResMut<DebrisField>,
    mut fragments: ResMut<FragmentSet>,
) {
    let tuning = DebrisTuning::from(config.as_ref());
    for CollisionTriggered(collision) in triggers.read() {
        let shear = shear_direction(&danger, collision);
        field.spawn(collision, shear, &tuning);
        fragments.spawn(collision, shear, &tuning);
        debug!(
            "Spawned {} debris particles and {} fragments",
            field.active_count(),
            fragments.fragments().len()
        );
    }
}

/// Integrate debris and fragments while a cascade is live.
pub fn debris_integration_system(
    time: Res<Time>,
    timeline: Res<Timeline>,
    config: Res<SceneConfig>,
    machine: Res<CollisionMachine>,
    mut field: ResMut<DebrisField>,
    mut fragments: ResMut<FragmentSet>,
) {
    if !timeline.chapter.is_terminal() {
        return;
    }
    let Some(collision) = machine.collision() else {
        return;
    };
    let tuning = DebrisTuning::from(config.as_ref());
    let (t, dt) = (time.elapsed_secs(), time.delta_secs());
    field.integrate(&collision, t, dt, &tuning);
    fragments.integrate(&collision, t, dt, &tuning);
}

/// Fade debris out once the cascade has been re-armed, then park it.
pub fn debris_presence_system(
    time: Res<Time>,
    machine: Res<CollisionMachine>,
    mut field: ResMut<DebrisField>,
    mut fragments: ResMut<FragmentSet>,
) {
    if machine.is_triggered() || field.presence == 0.0 {
        return;
    }
    field.presence = damp(field.presence, 0.0, 2.0, time.delta_secs());
    if field.presence < 0.01 {
        field.deactivate_all();
        fragments.deactivate_all();
    }
}

pub fn kessler_cloud_system(
    time: Res<Time>,
    timeline: Res<Timeline>,
    config: Res<SceneConfig>,
    machine: Res<CollisionMachine>,
    mut cloud: ResMut<KesslerCloud>,
) {
    cloud.advance(
        timeline.chapter,
        timeline.phase(Chapter::Cascade),
        machine.is_triggered(),
        config.kessler_opacity_cap,
        time.delta_secs(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (DangerPair, Collision, DebrisTuning) {
        let config = SceneConfig::default();
        let danger = DangerPair::from_config(&config);
        let collision = Collision::new(12.0, danger.midpoint(12.0));
        (danger, collision, DebrisTuning::from(&config))
    }

    #[test]
    fn particles_stay_inside_band_and_above_surface() {
        let (danger, collision, tuning) = setup();
        let mut field = DebrisField::new(300, 5);
        field.spawn(&collision, shear_direction(&danger, &collision), &tuning);

        let dt = 1.0 / 60.0;
        for frame in 0..1200 {
            let t = collision.at + frame as f32 * dt;
            field.integrate(&collision, t, dt, &tuning);
            for p in field.particles().iter().filter(|p| p.active) {
                let d = p.position.distance(collision.point);
                assert!(
                    d >= tuning.clamp_min - 1e-4 && d <= tuning.clamp_max + 1e-4,
                    "frame {frame}: distance {d}"
                );
                assert!(p.position.length() >= tuning.surface - 1e-4);
            }
        }
    }

    #[test]
    fn life_never_increases_between_triggers() {
        let (danger, collision, tuning) = setup();
        let mut field = DebrisField::new(50, 1);
        let mut fragments = FragmentSet::new(12, 2);
        let shear = shear_direction(&danger, &collision);
        field.spawn(&collision, shear, &tuning);
        fragments.spawn(&collision, shear, &tuning);

        let mut prev_p: Vec<f32> = field.particles().iter().map(|p| p.life).collect();
        let mut prev_f: Vec<f32> = fragments.fragments().iter().map(|f| f.life).collect();
        for frame in 0..400 {
            let t = collision.at + frame as f32 * 0.02;
            field.integrate(&collision, t, 0.02, &tuning);
            fragments.integrate(&collision, t, 0.02, &tuning);
            for (p, prev) in field.particles().iter().zip(prev_p.iter_mut()) {
                assert!(p.life <= *prev);
                *prev = p.life;
            }
            for (f, prev) in fragments.fragments().iter().zip(prev_f.iter_mut()) {
                assert!(f.life <= *prev);
                *prev = f.life;
            }
        }
    }

    #[test]
    fn fragments_expire_after_lifetime() {
        let (danger, collision, tuning) = setup();
        let mut fragments = FragmentSet::new(8, 3);
        fragments.spawn(&collision, shear_direction(&danger, &collision), &tuning);
        let dt = 0.05;
        let frames = (tuning.fragment_lifetime / dt).ceil() as usize + 2;
        for frame in 0..frames {
            fragments.integrate(&collision, collision.at + frame as f32 * dt, dt, &tuning);
        }
        assert!(fragments.fragments().iter().all(|f| !f.active && f.life == 0.0));
    }

    #[test]
    fn motion_decelerates() {
        assert!(decay_factor(0.6, 5.0) < decay_factor(0.6, 1.0));
        assert_eq!(decay_factor(0.6, -1.0), 1.0);
        assert!(decay_factor(0.6, 100.0) > 0.0);
    }

    #[test]
    fn band_clamp_handles_centre_and_far_points() {
        let c = Vec3::new(1.5, 0.0, 0.0);
        let inner = clamp_to_band(c, c, 0.05, 0.3, Vec3::Z);
        assert!((inner.distance(c) - 0.05).abs() < 1e-5);
        let outer = clamp_to_band(c + Vec3::Y * 4.0, c, 0.05, 0.3, Vec3::Z);
        assert!((outer.distance(c) - 0.3).abs() < 1e-5);
        let inside = c + Vec3::Y * 0.1;
        assert_eq!(clamp_to_band(inside, c, 0.05, 0.3, Vec3::Z), inside);
    }

    #[test]
    fn spawn_is_deterministic_per_seed() {
        let (danger, collision, tuning) = setup();
        let shear = shear_direction(&danger, &collision);
        let mut a = DebrisField::new(20, 77);
        let mut b = DebrisField::new(20, 77);
        a.spawn(&collision, shear, &tuning);
        b.spawn(&collision, shear, &tuning);
        assert_eq!(a.particles(), b.particles());
        assert!(a.particles().iter().all(|p| p.tint < tuning.tint_count));
    }

    #[test]
    fn kessler_opacity_latches_inside_terminal_chapter() {
        let mut cloud = KesslerCloud::default();
        cloud.advance(Chapter::Cascade, 0.8, true, 0.7, 0.016);
        let high = cloud.opacity;
        assert!((high - 0.56).abs() < 1e-5);
        cloud.advance(Chapter::Cascade, 0.2, true, 0.7, 0.016);
        assert_eq!(cloud.opacity, high, "backward scroll must not clean orbit");
        cloud.advance(Chapter::Cascade, 1.0, true, 0.7, 0.016);
        assert!(cloud.opacity <= 0.7);
        for _ in 0..2000 {
            cloud.advance(Chapter::Risk, 1.0, false, 0.7, 0.016);
        }
        assert_eq!(cloud.opacity, 0.0);
    }

    #[test]
    fn spawn_spreads_particles_across_the_band() {
        let (danger, collision, tuning) = setup();
        let mut field = DebrisField::new(200, 13);
        field.spawn(&collision, shear_direction(&danger, &collision), &tuning);

        let distances: Vec<f32> = field
            .particles()
            .iter()
            .map(|p| p.position.distance(collision.point))
            .collect();
        let nearest = distances.iter().copied().fold(f32::INFINITY, f32::min);
        let farthest = distances.iter().copied().fold(0.0, f32::max);
        assert!(nearest >= tuning.clamp_min - 1e-4);
        assert!(farthest <= tuning.clamp_max + 1e-4);
        assert!(
            farthest - nearest > tuning.jitter * 0.5,
            "spawn distances collapsed onto one shell: {nearest}..{farthest}"
        );
    }

    #[test]
    fn kessler_opacity_decays_when_leaving_terminal_chapter() {
        let mut cloud = KesslerCloud { opacity: 0.5 };
        cloud.advance(Chapter::Risk, 1.0, true, 0.7, 0.1);
        assert!(cloud.opacity < 0.5);
    }

    #[test]
    fn cooling_runs_from_hot_to_base() {
        assert_eq!(cooling(0.0, 3.0), 0.0);
        assert_eq!(cooling(3.0, 3.0), 1.0);
        assert_eq!(cooling(1.0, 0.0), 1.0);
    }

    #[test]
    fn pulsed_size_stays_near_base() {
        let p = DebrisParticle {
            size: 0.01,
            ..DebrisParticle::default()
        };
        for i in 0..100 {
            let s = p.pulsed_size(i as f32 * 0.1);
            assert!(s >= 0.0085 - 1e-6 && s <= 0.0115 + 1e-6);
        }
    }
}
