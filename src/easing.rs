//! Interpolation and easing primitives shared by every animated value.

use bevy::prelude::*;

#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Hermite ease: zero slope at both ends.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}

/// Quintic ease (Perlin): zero first and second derivative at both ends.
#[inline]
pub fn smootherstep(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Decelerating ease: fast start, settles into 1.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - clamp01(t);
    1.0 - inv * inv * inv
}

/// Frame-rate independent exponential approach of `current` toward `target`.
///
/// `rate` is in 1/s; after `1/rate` seconds roughly 63 % of the gap is closed.
#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    lerp(current, target, 1.0 - (-rate * dt.max(0.0)).exp())
}

/// [`damp`] for vectors.
#[inline]
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, 1.0 - (-rate * dt.max(0.0)).exp())
}

/// Linear blend of two linear-space colours, alpha included.
#[inline]
pub fn mix_color(a: LinearRgba, b: LinearRgba, t: f32) -> LinearRgba {
    let t = clamp01(t);
    LinearRgba::new(
        lerp(a.red, b.red, t),
        lerp(a.green, b.green, t),
        lerp(a.blue, b.blue, t),
        lerp(a.alpha, b.alpha, t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easings_hit_endpoints_exactly() {
        for f in [smoothstep, smootherstep, ease_out_cubic] {
            assert_eq!(f(0.0), 0.0);
            assert_eq!(f(1.0), 1.0);
            assert_eq!(f(-3.0), 0.0);
            assert_eq!(f(4.0), 1.0);
        }
    }

    #[test]
    fn smoothstep_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = smoothstep(i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn ease_out_is_ahead_of_linear() {
        assert!(ease_out_cubic(0.25) > 0.25);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn damp_never_overshoots() {
        let mut v = 0.0;
        for _ in 0..600 {
            v = damp(v, 1.0, 2.5, 1.0 / 60.0);
            assert!(v <= 1.0);
        }
        assert!((v - 1.0).abs() < 1e-3);
    }

    #[test]
    fn damp_with_zero_dt_is_identity() {
        assert_eq!(damp(0.3, 1.0, 5.0, 0.0), 0.3);
    }

    #[test]
    fn clamp01_maps_nan_to_zero() {
        assert_eq!(clamp01(f32::NAN), 0.0);
    }
}
