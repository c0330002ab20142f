//! Spherical camera rig: per-chapter framing, free-look, shake, and FOV.
//!
//! The camera's world position is always derived from the rig's spherical
//! coordinates plus user offsets (and, briefly, shake); it is never written
//! directly.  Field of view is the only zoom mechanism: the rig radius stays
//! fixed and each chapter picks a narrower or wider lens.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`pointer_input_system`]: mouse motion / buttons → [`PointerInput`].
//! 2. [`camera_rig_system`]: framing, free-look, shake, FOV → camera entity.

use crate::collision::{CollisionTriggered, DangerPair};
use crate::config::SceneConfig;
use crate::easing::{damp, lerp};
use crate::scroll::ScrollState;
use crate::timeline::{Chapter, Timeline};
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::f32::consts::{PI, TAU};

/// Marker for the single scene camera.
#[derive(Component)]
pub struct SceneCamera;

/// Pointer state sampled from input events, read once per frame by the rig.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerInput {
    /// Cursor position in normalized device coordinates (`[-1, 1]`, +Y up).
    pub ndc: Vec2,
    /// Mouse motion this frame while the left button is held (pixels).
    pub drag_delta: Vec2,
    pub dragging: bool,
}

/// Point on a sphere: `polar` measured from +Y, `azimuth` around Y from +Z.
pub fn spherical_to_cartesian(radius: f32, polar: f32, azimuth: f32) -> Vec3 {
    let (sin_p, cos_p) = polar.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    Vec3::new(radius * sin_p * sin_a, radius * cos_p, radius * sin_p * cos_a)
}

/// Inverse of [`spherical_to_cartesian`] for a direction: `(polar, azimuth)`.
pub fn direction_angles(dir: Vec3) -> (f32, f32) {
    let d = dir.normalize_or(Vec3::Z);
    (d.y.clamp(-1.0, 1.0).acos(), d.x.atan2(d.z))
}

/// Signed shortest difference `to - from`, wrapped into `(-π, π]`.
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Interpolate angles along the shortest arc.
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    from + angle_delta(from, to) * t
}

/// Shake displacement `since` seconds after it started: quadratic envelope
/// over `duration` times a cheap three-frequency wobble.
pub fn shake_offset(since: f32, duration: f32, amplitude: f32, t: f32) -> Vec3 {
    if since < 0.0 || since >= duration || duration <= 0.0 {
        return Vec3::ZERO;
    }
    let envelope = (1.0 - since / duration).powi(2);
    Vec3::new(
        (t * 47.0).sin(),
        (t * 53.0 + 1.3).sin(),
        (t * 41.0 + 2.1).sin(),
    ) * amplitude
        * envelope
}

/// Per-frame inputs to [`CameraRig::update`].
#[derive(Debug, Clone, Copy)]
pub struct RigInputs {
    pub chapter: Chapter,
    /// Eased progress of the risk phase.
    pub risk_phase: f32,
    /// Current midpoint of the danger pair.
    pub danger_midpoint: Vec3,
    pub is_scrolling: bool,
    pub pointer: PointerInput,
    pub t: f32,
    pub dt: f32,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
    /// User-applied offsets from drag input.
    pub user_polar: f32,
    pub user_azimuth: f32,
    /// Smoothed field of view (degrees).
    pub fov: f32,
    /// A drag has been released while idle; auto-rotate continues from it.
    pub auto_rotate: bool,
    /// Scene time at which the current shake started.
    pub shake_started: Option<f32>,
}

impl CameraRig {
    pub fn new(config: &SceneConfig) -> Self {
        let [polar, azimuth] = config.chapter_framing[0];
        Self {
            radius: config.camera_distance,
            polar,
            azimuth,
            user_polar: 0.0,
            user_azimuth: 0.0,
            fov: config.chapter_fov[0],
            auto_rotate: false,
            shake_started: None,
        }
    }

    /// Target `(polar, azimuth)` for this frame.
    ///
    /// During the risk chapter the locked framing leans toward the converging
    /// danger satellites as the phase advances.
    pub fn target_framing(config: &SceneConfig, inputs: &RigInputs) -> (f32, f32) {
        let [polar, azimuth] = inputs.chapter.pick(&config.chapter_framing);
        if inputs.chapter != Chapter::Risk {
            return (polar, azimuth);
        }
        let (lean_polar, lean_azimuth) = direction_angles(inputs.danger_midpoint);
        let w = inputs.risk_phase * 0.6;
        (lerp(polar, lean_polar, w), lerp_angle(azimuth, lean_azimuth, w))
    }

    pub fn update(&mut self, config: &SceneConfig, inputs: &RigInputs) {
        let dt = inputs.dt;
        let (target_polar, target_azimuth) = Self::target_framing(config, inputs);
        let follow = 1.0 - (-config.framing_approach_rate * dt).exp();
        self.polar = lerp(self.polar, target_polar, follow);
        self.azimuth = lerp_angle(self.azimuth, target_azimuth, follow).rem_euclid(TAU);

        let target_fov = inputs.chapter.pick(&config.chapter_fov);
        self.fov = damp(self.fov, target_fov, config.fov_approach_rate, dt);

        if inputs.is_scrolling {
            self.user_polar = damp(self.user_polar, 0.0, config.offset_decay_rate, dt);
            self.user_azimuth = damp(self.user_azimuth, 0.0, config.offset_decay_rate, dt);
            self.auto_rotate = false;
        } else if inputs.pointer.dragging {
            let delta = inputs.pointer.drag_delta * config.drag_sensitivity;
            self.user_azimuth -= delta.x;
            self.user_polar = (self.user_polar - delta.y)
                .clamp(-config.polar_offset_limit, config.polar_offset_limit);
            self.auto_rotate = true;
        } else if self.auto_rotate {
            self.user_azimuth += config.auto_rotate_speed * dt;
        }
        self.user_azimuth = angle_delta(0.0, self.user_azimuth);
    }

    /// Final camera position (before shake).
    pub fn position(&self, pointer_ndc: Vec2) -> Vec3 {
        // A slight parallax toward the cursor.
        let parallax = pointer_ndc.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)) * 0.03;
        let polar = (self.polar + self.user_polar + parallax.y).clamp(0.05, PI - 0.05);
        spherical_to_cartesian(self.radius, polar, self.azimuth + self.user_azimuth - parallax.x)
    }

    pub fn shake(&self, config: &SceneConfig, t: f32) -> Vec3 {
        if config.reduced_motion {
            return Vec3::ZERO;
        }
        self.shake_started.map_or(Vec3::ZERO, |start| {
            shake_offset(t - start, config.shake_duration, config.shake_amplitude, t)
        })
    }
}

/// Sample mouse motion, left-button drag state, and cursor NDC.
pub fn pointer_input_system(
    motion: Res<AccumulatedMouseMotion>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut pointer: ResMut<PointerInput>,
) {
    pointer.dragging = buttons.pressed(MouseButton::Left);
    pointer.drag_delta = if pointer.dragging {
        motion.delta
    } else {
        Vec2::ZERO
    };

    let Ok(window) = windows.single() else {
        return;
    };
    if let Some(cursor) = window.cursor_position() {
        let size = window.size().max(Vec2::ONE);
        pointer.ndc = Vec2::new(cursor.x / size.x * 2.0 - 1.0, 1.0 - cursor.y / size.y * 2.0);
    }
}

/// Advance the rig and write it to the camera's transform and projection.
#[allow(clippy::too_many_arguments)]
pub fn camera_rig_system(
    time: Res<Time>,
    timeline: Res<Timeline>,
    scroll: Res<ScrollState>,
    pointer: Res<PointerInput>,
    danger: Res<DangerPair>,
    config: Res<SceneConfig>,
    mut triggers: MessageReader<CollisionTriggered>,
    mut rig: ResMut<CameraRig>,
    mut camera: Query<(&mut Transform, &mut Projection), With<SceneCamera>>,
) {
    let t = time.elapsed_secs();
    for CollisionTriggered(collision) in triggers.read() {
        rig.shake_started = Some(collision.at);
    }

    let inputs = RigInputs {
        chapter: timeline.chapter,
        risk_phase: timeline.phase(Chapter::Risk),
        danger_midpoint: danger.midpoint(t),
        is_scrolling: scroll.is_scrolling,
        pointer: *pointer,
        t,
        dt: time.delta_secs(),
    };
    rig.update(&config, &inputs);

    let Ok((mut transform, mut projection)) = camera.single_mut() else {
        return;
    };
    let position = rig.position(pointer.ndc) + rig.shake(&config, t);
    *transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
    if let Projection::Perspective(ref mut perspective) = *projection {
        perspective.fov = rig.fov.to_radians();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(chapter: Chapter) -> RigInputs {
        RigInputs {
            chapter,
            risk_phase: 0.0,
            danger_midpoint: Vec3::new(1.0, 0.2, 0.5),
            is_scrolling: false,
            pointer: PointerInput::default(),
            t: 0.0,
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn spherical_round_trip_direction() {
        let p = spherical_to_cartesian(3.0, 1.1, 2.3);
        assert!((p.length() - 3.0).abs() < 1e-5);
        let (polar, azimuth) = direction_angles(p);
        assert!((polar - 1.1).abs() < 1e-4);
        assert!(angle_delta(azimuth, 2.3).abs() < 1e-4);
    }

    #[test]
    fn angle_delta_takes_short_way_round() {
        assert!((angle_delta(0.1, TAU - 0.1) + 0.2).abs() < 1e-5);
        assert!((angle_delta(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
    }

    #[test]
    fn fov_eases_toward_chapter_value() {
        let config = SceneConfig::default();
        let mut rig = CameraRig::new(&config);
        let first = {
            rig.update(&config, &inputs(Chapter::Risk));
            rig.fov
        };
        assert!(first < config.chapter_fov[0], "moved toward the narrower lens");
        assert!(first > config.chapter_fov[3], "but did not snap");
        for _ in 0..600 {
            rig.update(&config, &inputs(Chapter::Risk));
        }
        assert!((rig.fov - config.chapter_fov[3]).abs() < 0.01);
    }

    #[test]
    fn radius_is_constant_across_chapters() {
        let config = SceneConfig::default();
        let mut rig = CameraRig::new(&config);
        for chapter in Chapter::ALL {
            for _ in 0..30 {
                rig.update(&config, &inputs(chapter));
            }
            assert!((rig.position(Vec2::ZERO).length() - config.camera_distance).abs() < 1e-3);
        }
    }

    #[test]
    fn drag_only_applies_while_idle() {
        let config = SceneConfig::default();
        let mut rig = CameraRig::new(&config);
        let mut idle = inputs(Chapter::Orbit);
        idle.pointer = PointerInput {
            ndc: Vec2::ZERO,
            drag_delta: Vec2::new(40.0, 0.0),
            dragging: true,
        };
        rig.update(&config, &idle);
        assert!(rig.user_azimuth < 0.0);
        assert!(rig.auto_rotate);

        let before = rig.user_azimuth;
        let mut scrolling = idle;
        scrolling.is_scrolling = true;
        rig.update(&config, &scrolling);
        assert!(rig.user_azimuth.abs() < before.abs(), "scrolling decays the offset");
        assert!(!rig.auto_rotate);
    }

    #[test]
    fn released_drag_keeps_auto_rotating() {
        let config = SceneConfig::default();
        let mut rig = CameraRig::new(&config);
        rig.auto_rotate = true;
        let before = rig.user_azimuth;
        rig.update(&config, &inputs(Chapter::Orbit));
        assert!(rig.user_azimuth > before);
    }

    #[test]
    fn polar_offset_is_limited() {
        let config = SceneConfig::default();
        let mut rig = CameraRig::new(&config);
        let mut drag = inputs(Chapter::Orbit);
        drag.pointer.dragging = true;
        drag.pointer.drag_delta = Vec2::new(0.0, -100_000.0);
        rig.update(&config, &drag);
        assert!(rig.user_polar <= config.polar_offset_limit);
    }

    #[test]
    fn risk_framing_leans_toward_danger() {
        let config = SceneConfig::default();
        let mut start = inputs(Chapter::Risk);
        let mut end = start;
        start.risk_phase = 0.0;
        end.risk_phase = 1.0;
        let (_, az0) = CameraRig::target_framing(&config, &start);
        let (_, az1) = CameraRig::target_framing(&config, &end);
        let (_, toward) = direction_angles(start.danger_midpoint);
        assert!(angle_delta(az1, toward).abs() < angle_delta(az0, toward).abs());
    }

    #[test]
    fn shake_is_bounded_and_ends() {
        for i in 0..100 {
            let since = i as f32 * 0.01;
            let s = shake_offset(since, 0.9, 0.08, since);
            assert!(s.length() <= 0.08 * 3f32.sqrt() + 1e-5);
        }
        assert_eq!(shake_offset(0.95, 0.9, 0.08, 1.0), Vec3::ZERO);
    }

    #[test]
    fn reduced_motion_disables_shake() {
        let config = SceneConfig {
            reduced_motion: true,
            ..SceneConfig::default()
        };
        let mut rig = CameraRig::new(&config);
        rig.shake_started = Some(0.0);
        assert_eq!(rig.shake(&config, 0.1), Vec3::ZERO);
    }
}
