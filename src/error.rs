//! Scene-specific error types.
//!
//! Nothing in the per-frame path can fail; these errors describe the two
//! recoverable boundaries of the engine: configuration loading and external
//! model assets.  Both are logged and then replaced by a fallback (compiled
//! defaults or procedural geometry), never propagated past the system that
//! observed them.

use std::fmt;

/// Top-level error enum for the scene engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// An external model asset failed to load (missing file, bad glTF, ...).
    AssetLoad {
        /// Asset path relative to the `assets/` directory.
        path: String,
        /// Loader error rendered to a string.
        reason: String,
    },

    /// A model loaded but its first primitive carries no position attribute.
    MissingGeometry {
        /// Asset path relative to the `assets/` directory.
        path: String,
    },

    /// A model's bounding sphere has zero (or non-finite) radius, so it cannot
    /// be rescaled to the design radius.
    DegenerateBounds {
        /// Asset path relative to the `assets/` directory.
        path: String,
    },

    /// A configuration value is outside its usable range.
    InvalidConfig {
        /// Name of the offending field.
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// `assets/scene.toml` exists but is not valid TOML for [`SceneConfig`].
    ///
    /// [`SceneConfig`]: crate::config::SceneConfig
    ConfigParse {
        path: String,
        reason: String,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::AssetLoad { path, reason } => {
                write!(f, "failed to load model '{}': {}", path, reason)
            }
            SceneError::MissingGeometry { path } => {
                write!(f, "model '{}' has no mesh positions in its first primitive", path)
            }
            SceneError::DegenerateBounds { path } => {
                write!(f, "model '{}' has a degenerate bounding sphere", path)
            }
            SceneError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(
                f,
                "config value '{}' = {} is outside expected range {}",
                name, value, expected
            ),
            SceneError::ConfigParse { path, reason } => {
                write!(f, "failed to parse {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Convenience alias: a `Result` using `SceneError` as the error type.
pub type SceneResult<T> = Result<T, SceneError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` lies strictly inside `(lo, hi)`.
pub fn validate_open_range(
    name: &'static str,
    value: f32,
    lo: f32,
    hi: f32,
    expected: &'static str,
) -> SceneResult<()> {
    if value.is_finite() && value > lo && value < hi {
        Ok(())
    } else {
        Err(SceneError::InvalidConfig {
            name,
            value,
            expected,
        })
    }
}

/// Returns an error unless `value` is a finite number.
pub fn validate_finite(name: &'static str, value: f32) -> SceneResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SceneError::InvalidConfig {
            name,
            value,
            expected: "a finite number",
        })
    }
}

/// Returns an error unless `[lo, hi]` is a finite, non-negative, non-empty
/// interval (`0 <= lo < hi`).
pub fn validate_interval(name: &'static str, [lo, hi]: [f32; 2]) -> SceneResult<()> {
    validate_finite(name, lo)?;
    validate_finite(name, hi)?;
    if lo >= 0.0 && lo < hi {
        Ok(())
    } else {
        Err(SceneError::InvalidConfig {
            name,
            value: lo,
            expected: "0 <= min < max",
        })
    }
}

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> SceneResult<()> {
    validate_open_range(name, value, 0.0, f32::INFINITY, "(0.0, ∞)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", f32::NAN).is_err());
        assert!(validate_positive("x", 0.5).is_ok());
    }

    #[test]
    fn finite_rejects_nan_and_infinity() {
        assert!(validate_finite("x", f32::NAN).is_err());
        assert!(validate_finite("x", f32::NEG_INFINITY).is_err());
        assert!(validate_finite("x", -3.0).is_ok());
    }

    #[test]
    fn interval_must_be_ordered_and_non_negative() {
        assert!(validate_interval("size", [0.01, 0.02]).is_ok());
        assert!(validate_interval("size", [0.02, 0.01]).is_err());
        assert!(validate_interval("size", [0.02, 0.02]).is_err());
        assert!(validate_interval("speed", [-0.1, 0.5]).is_err());
        assert!(validate_interval("size", [f32::NAN, 0.5]).is_err());
        assert!(validate_interval("size", [0.1, f32::INFINITY]).is_err());
    }

    #[test]
    fn open_range_excludes_bounds() {
        assert!(validate_open_range("fov", 0.0, 0.0, 180.0, "(0, 180)").is_err());
        assert!(validate_open_range("fov", 180.0, 0.0, 180.0, "(0, 180)").is_err());
        assert!(validate_open_range("fov", 45.0, 0.0, 180.0, "(0, 180)").is_ok());
    }

    #[test]
    fn display_names_the_offending_asset() {
        let err = SceneError::AssetLoad {
            path: "models/earth.glb".into(),
            reason: "not found".into(),
        };
        assert!(err.to_string().contains("models/earth.glb"));
    }
}
