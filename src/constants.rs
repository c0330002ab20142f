//! Centralised scene, timeline, and effect constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! Every value is mirrored by a field in [`crate::config::SceneConfig`] and can
//! be overridden at runtime from `assets/scene.toml`.
//!
//! World units: the planet radius is `1.0`; everything else is scaled to it.

// ── Timeline ──────────────────────────────────────────────────────────────────

/// Lower bounds of the five chapters.  Chapter `i` covers
/// `[CHAPTER_BREAKPOINTS[i], CHAPTER_BREAKPOINTS[i + 1])`; the last chapter is
/// closed at `1.0`.
pub const CHAPTER_BREAKPOINTS: [f32; 5] = [0.0, 0.2, 0.4, 0.6, 0.8];

/// Number of narrative chapters.
pub const CHAPTER_COUNT: usize = 5;

// ── Scroll Tracking ───────────────────────────────────────────────────────────

/// Height of the virtual scroll document beyond one viewport (pixels).
///
/// 1200 px per chapter gives roughly ten wheel notches per chapter.
pub const SCROLLABLE_HEIGHT: f32 = 6000.0;

/// Pixels scrolled per wheel "line" (for line-unit wheel events and arrow keys).
pub const SCROLL_LINE_HEIGHT: f32 = 40.0;

/// Follow factor applied per frame when the follower is far behind `raw`.
pub const SCROLL_FAST_K: f32 = 0.18;

/// Follow factor applied per frame once the follower is close to `raw`.
pub const SCROLL_SETTLE_K: f32 = 0.08;

/// `|raw - smoothed|` above which the fast follow factor is used.
///
/// A chapter jump (0.2) is well above this; a single wheel notch (≈0.007) is not.
pub const SCROLL_JUMP_THRESHOLD: f32 = 0.05;

/// Gap below which the smoothed value snaps onto `raw`.
pub const SCROLL_SNAP_EPSILON: f32 = 1.0e-4;

/// Wall-clock window (s) after the last raw change during which the user is
/// considered to be actively scrolling.
pub const SCROLL_IDLE_WINDOW: f32 = 0.2;

// ── Planet & Atmosphere ──────────────────────────────────────────────────────

/// Design radius of the planet.  Loaded models are rescaled to this.
pub const PLANET_RADIUS: f32 = 1.0;

/// Fraction of the planet radius debris is kept above.
pub const SURFACE_MARGIN: f32 = 1.02;

/// Planet rotation speed (rad/s).
pub const PLANET_SPIN: f32 = 0.03;

/// Atmosphere shells: (scale relative to planet, opacity, rim falloff exponent).
///
/// Inner shells are tight and bright, outer shells wide and faint, which gives
/// a graduated glow instead of a single hard ring.
pub const ATMOSPHERE_SHELLS: [[f32; 3]; 3] = [[1.015, 0.55, 4.0], [1.05, 0.30, 2.5], [1.12, 0.14, 1.6]];

/// Exponential approach rate (1/s) of the atmosphere tint.
pub const ATMOSPHERE_TINT_RATE: f32 = 1.5;

// ── Starfield ─────────────────────────────────────────────────────────────────

pub const STAR_COUNT: usize = 4000;
pub const STAR_SHELL_RADIUS: f32 = 80.0;

/// Seed for the star field stream.  Changing it changes the sky.
pub const STAR_SEED: u64 = 0x5747_4152;

// ── Satellites ────────────────────────────────────────────────────────────────

/// Fixed size of the instanced satellite pool.
pub const SATELLITE_POOL_SIZE: usize = 200;

/// Members drawn in the calm opening chapter.
pub const SATELLITE_INITIAL_VISIBLE: usize = 4;

/// Seed for orbital parameter generation.
pub const SATELLITE_SEED: u64 = 0x0BB1_7A15;

/// Reference angular speed (rad/s) at `SATELLITE_REFERENCE_RADIUS`.
///
/// Other radii scale by `(r_ref / r)^1.5` so outer bands move visibly slower.
pub const SATELLITE_BASE_SPEED: f32 = 0.35;
pub const SATELLITE_REFERENCE_RADIUS: f32 = 1.3;

pub const SATELLITE_SIZE_MIN: f32 = 0.010;
pub const SATELLITE_SIZE_MAX: f32 = 0.018;

/// Pool members that take the "active infrastructure" accent from chapter 2.
pub const HIGHLIGHTED_SATELLITES: [usize; 10] = [3, 17, 42, 58, 77, 91, 120, 144, 163, 188];

/// World-space radius a loaded satellite model is rescaled to (before per-body size).
pub const SATELLITE_MODEL_RADIUS: f32 = 1.0;

/// Where parked instances and inactive particles are moved (far outside the frustum).
pub const PARK_POSITION: [f32; 3] = [0.0, -10_000.0, 0.0];

// ── Danger Pair ───────────────────────────────────────────────────────────────

/// Shared orbit of the two scripted satellites: (radius, right ascension, phase, speed).
///
/// Both bodies use these values and differ only in inclination, so they cross
/// at the orbital nodes and their midpoint never dips far below `radius`.
pub const DANGER_ORBIT: [f32; 4] = [1.45, 0.6, 0.4, 0.28];
pub const DANGER_INCLINATIONS: [f32; 2] = [0.35, 0.85];
pub const DANGER_SIZE: f32 = 0.03;

/// Pulse frequency (rad/s) at the start and end of the risk chapter.
pub const DANGER_PULSE_FREQ: [f32; 2] = [2.0, 14.0];

// ── Camera ────────────────────────────────────────────────────────────────────

/// Field of view (degrees) per chapter.  This is the only zoom mechanism.
pub const CHAPTER_FOV: [f32; 5] = [50.0, 42.0, 36.0, 28.0, 40.0];

/// Locked framing per chapter: (polar angle, azimuth) in radians.
pub const CHAPTER_FRAMING: [[f32; 2]; 5] = [
    [1.30, 0.00],
    [1.20, 0.55],
    [1.10, 1.10],
    [1.05, 1.60],
    [1.15, 2.20],
];

pub const CAMERA_DISTANCE: f32 = 6.0;
pub const FOV_APPROACH_RATE: f32 = 2.5;
pub const FRAMING_APPROACH_RATE: f32 = 1.8;

/// Radians of rig rotation per pixel of drag.
pub const DRAG_SENSITIVITY: f32 = 0.005;

/// Auto-rotate speed (rad/s) once a drag has been released while idle.
pub const AUTO_ROTATE_SPEED: f32 = 0.05;

/// Decay rate (1/s) of user offsets once scrolling resumes.
pub const OFFSET_DECAY_RATE: f32 = 3.0;

/// Polar offset limit so free-look never flips over the poles.
pub const POLAR_OFFSET_LIMIT: f32 = 0.9;

pub const SHAKE_DURATION: f32 = 0.9;
pub const SHAKE_AMPLITUDE: f32 = 0.08;

// ── Orbit Rings ───────────────────────────────────────────────────────────────

/// Target ring opacity per chapter.
pub const RING_OPACITY: [f32; 5] = [0.55, 0.35, 0.20, 0.12, 0.08];
pub const RING_APPROACH_RATE: f32 = 3.0;
pub const RING_SAMPLES: usize = 360;

// ── Debris & Fragments ───────────────────────────────────────────────────────

pub const DEBRIS_COUNT: usize = 600;
pub const DEBRIS_SEED: u64 = 0xDEB2_15;

/// Initial jitter radius around the collision point.
pub const DEBRIS_JITTER: f32 = 0.04;

/// Tangential shear speed range (units/s).
pub const DEBRIS_SHEAR_SPEED: [f32; 2] = [0.15, 0.55];

/// Isotropic noise speed (units/s).
pub const DEBRIS_NOISE_SPEED: f32 = 0.22;

/// Exponential decay rate (1/s) of debris and fragment velocity.
pub const DEBRIS_DECAY_RATE: f32 = 0.6;

/// Radial band (distance from the collision point) debris is kept inside.
///
/// `clamp_max` must stay below `collision radius - planet radius * SURFACE_MARGIN`;
/// see [`crate::config::SceneConfig::validate`].
pub const DEBRIS_CLAMP_MIN: f32 = 0.05;
pub const DEBRIS_CLAMP_MAX: f32 = 0.30;

/// Seconds for a debris particle's life to run from 1 to 0.
pub const DEBRIS_LIFETIME: f32 = 45.0;

/// Seconds for the hot tint to cool to the base tint.
pub const DEBRIS_COOL_TIME: f32 = 3.0;

pub const DEBRIS_SIZE_MIN: f32 = 0.006;
pub const DEBRIS_SIZE_MAX: f32 = 0.016;

pub const FRAGMENT_COUNT: usize = 24;
pub const FRAGMENT_LIFETIME: f32 = 2.5;

// ── Kessler Ring ──────────────────────────────────────────────────────────────

pub const KESSLER_COUNT: usize = 2500;
pub const KESSLER_INNER_RADIUS: f32 = 1.3;
pub const KESSLER_OUTER_RADIUS: f32 = 2.1;
pub const KESSLER_THICKNESS: f32 = 0.08;
pub const KESSLER_OPACITY_CAP: f32 = 0.7;

// ── Collision Flash ───────────────────────────────────────────────────────────

pub const FLASH_PEAK_INTENSITY: f32 = 400_000.0;
pub const FLASH_DECAY_RATE: f32 = 3.0;

// ── Post-processing ───────────────────────────────────────────────────────────

/// Bloom intensity per chapter.
pub const BLOOM_INTENSITY: [f32; 5] = [0.15, 0.18, 0.22, 0.32, 0.45];

/// Chromatic aberration intensity per chapter.
pub const ABERRATION_INTENSITY: [f32; 5] = [0.0, 0.002, 0.004, 0.010, 0.018];

pub const GRAIN_OPACITY: f32 = 0.06;
pub const VIGNETTE_STRENGTH: f32 = 0.55;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Upper bound on the device pixel ratio used for the output surface.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// ── Palette (sRGB) ────────────────────────────────────────────────────────────

pub const COLOR_NEUTRAL: [f32; 3] = [0.82, 0.87, 0.93];
pub const COLOR_WARNING: [f32; 3] = [1.0, 0.62, 0.22];
pub const COLOR_ACTIVE: [f32; 3] = [0.30, 0.92, 1.0];
pub const COLOR_DIMMED: [f32; 3] = [0.06, 0.06, 0.08];
pub const COLOR_DRAINED: [f32; 3] = [0.36, 0.36, 0.38];
pub const COLOR_DANGER: [f32; 3] = [1.0, 0.18, 0.12];
pub const COLOR_DEBRIS_HOT: [f32; 3] = [1.0, 0.78, 0.45];
pub const DEBRIS_TINTS: [[f32; 3]; 4] = [
    [0.70, 0.70, 0.74],
    [0.85, 0.55, 0.35],
    [0.55, 0.60, 0.70],
    [0.95, 0.85, 0.70],
];
pub const ATMOSPHERE_BASE: [f32; 3] = [0.30, 0.62, 1.0];
pub const ATMOSPHERE_STRESSED: [f32; 3] = [1.0, 0.45, 0.25];
pub const PLANET_COLOR: [f32; 3] = [0.10, 0.22, 0.42];
