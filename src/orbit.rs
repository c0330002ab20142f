//! Simplified circular-orbit kinematics.
//!
//! Positions are a pure function of the orbital parameters and elapsed time;
//! nothing here stores mutable state.  The orbit plane starts as the XZ plane
//! (Y is up), is tilted about X by the inclination and then turned about Y by
//! the right ascension.

use crate::rng::SeededRng;
use bevy::prelude::*;
use serde::Deserialize;
use std::f32::consts::TAU;

/// Position on a circular orbit at orbital angle `angle`.
pub fn orbital_position(radius: f32, inclination: f32, right_ascension: f32, angle: f32) -> Vec3 {
    let (sin_a, cos_a) = angle.sin_cos();
    let (sin_i, cos_i) = inclination.sin_cos();
    let (sin_o, cos_o) = right_ascension.sin_cos();

    // In-plane point tilted about X.
    let x = radius * cos_a;
    let y = -radius * sin_a * sin_i;
    let z = radius * sin_a * cos_i;

    // Turn about Y.
    Vec3::new(x * cos_o + z * sin_o, y, -x * sin_o + z * cos_o)
}

/// Immutable orbital parameters of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalBody {
    pub radius: f32,
    pub inclination: f32,
    pub right_ascension: f32,
    /// Orbital angle at `t = 0` (rad).
    pub phase: f32,
    /// Angular speed (rad/s).  May be negative for retrograde bodies.
    pub speed: f32,
    /// Visual scale of the rendered mesh.
    pub size: f32,
}

impl OrbitalBody {
    #[inline]
    pub fn position(&self, t: f32) -> Vec3 {
        orbital_position(
            self.radius,
            self.inclination,
            self.right_ascension,
            self.phase + self.speed * t,
        )
    }

    /// Seconds per revolution, or `None` for a stationary body.
    pub fn period(&self) -> Option<f32> {
        (self.speed != 0.0).then(|| TAU / self.speed.abs())
    }

    /// Unit direction of motion at time `t`.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let angle = self.phase + self.speed * t;
        let ahead = orbital_position(1.0, self.inclination, self.right_ascension, angle + 0.01);
        let here = orbital_position(1.0, self.inclination, self.right_ascension, angle);
        let dir = (ahead - here).normalize_or_zero();
        if self.speed < 0.0 {
            -dir
        } else {
            dir
        }
    }
}

/// A named orbital band used for ring geometry and satellite generation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrbitBand {
    pub name: String,
    pub radius: f32,
    pub inclination: f32,
    pub right_ascension: f32,
    /// Linear RGB tint of the ring.
    pub tint: [f32; 3],
}

impl OrbitBand {
    pub fn new(name: &str, radius: f32, inclination: f32, right_ascension: f32, tint: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            radius,
            inclination,
            right_ascension,
            tint,
        }
    }

    /// Closed path around the band: `samples` points plus the first point
    /// repeated at the end so a line strip closes on itself.
    pub fn ring_points(&self, samples: usize) -> Vec<Vec3> {
        ring_points(self.radius, self.inclination, self.right_ascension, samples)
    }
}

/// Closed path of a circular orbit sampled at `samples` evenly spaced angles.
pub fn ring_points(radius: f32, inclination: f32, right_ascension: f32, samples: usize) -> Vec<Vec3> {
    let samples = samples.max(3);
    (0..=samples)
        .map(|i| {
            let angle = TAU * (i % samples) as f32 / samples as f32;
            orbital_position(radius, inclination, right_ascension, angle)
        })
        .collect()
}

/// Angular speed for a circular orbit of `radius`, scaled Kepler-style from a
/// reference orbit: `speed = base * (r_ref / r)^1.5`.
pub fn scaled_speed(base: f32, reference_radius: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    base * (reference_radius / radius).powf(1.5)
}

/// Parameters controlling [`generate_satellites`].
#[derive(Debug, Clone, Copy)]
pub struct SatelliteSpread {
    pub base_speed: f32,
    pub reference_radius: f32,
    pub size_min: f32,
    pub size_max: f32,
}

/// Generate `count` satellites scattered around the given bands.
///
/// Each body picks a band, then jitters its radius and inclination and takes a
/// random right ascension and phase so the band reads as a crowded shell
/// rather than a single ring.  Deterministic for a given seed.
pub fn generate_satellites(
    bands: &[OrbitBand],
    count: usize,
    seed: u64,
    spread: SatelliteSpread,
) -> Vec<OrbitalBody> {
    let mut rng = SeededRng::new(seed);
    let fallback = OrbitBand::new("fallback", 1.3, 0.5, 0.0, [1.0, 1.0, 1.0]);

    (0..count)
        .map(|_| {
            let band = if bands.is_empty() {
                &fallback
            } else {
                &bands[(rng.next_f32() * bands.len() as f32) as usize % bands.len()]
            };
            let radius = band.radius + rng.range(-0.04, 0.04) * band.radius;
            let inclination = band.inclination + rng.range(-0.12, 0.12);
            let right_ascension = rng.range(0.0, TAU);
            let phase = rng.range(0.0, TAU);
            let direction = if rng.next_f32() < 0.08 { -1.0 } else { 1.0 };
            OrbitalBody {
                radius,
                inclination,
                right_ascension,
                phase,
                speed: direction * scaled_speed(spread.base_speed, spread.reference_radius, radius),
                size: rng.range(spread.size_min, spread.size_max),
            }
        })
        .collect()
}
