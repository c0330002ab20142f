//! Runtime scene configuration loaded from `assets/scene.toml`.
//!
//! [`SceneConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_scene_config`] reads
//! `assets/scene.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! The configuration is immutable once the scene is built: systems take
//! `Res<SceneConfig>`, never `ResMut`.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/scene.toml`.
//! 2. Restart; no recompilation required.
//! 3. Watch the log: rejected values are reported and the compiled defaults
//!    are kept for the whole file.

use crate::constants::*;
use crate::error::{
    validate_finite, validate_interval, validate_open_range, validate_positive, SceneError, SceneResult,
};
use crate::orbit::{OrbitBand, SatelliteSpread};
use bevy::prelude::*;
use serde::Deserialize;

/// Path of the optional override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/scene.toml";

/// Runtime-tunable scene configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Colours are sRGB triples.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    // ── Scroll Tracking ──────────────────────────────────────────────────────
    pub scrollable_height: f32,
    pub scroll_line_height: f32,
    pub scroll_fast_k: f32,
    pub scroll_settle_k: f32,
    pub scroll_jump_threshold: f32,
    pub scroll_snap_epsilon: f32,
    pub scroll_idle_window: f32,

    // ── Planet & Atmosphere ──────────────────────────────────────────────────
    pub planet_radius: f32,
    pub surface_margin: f32,
    pub planet_spin: f32,
    pub atmosphere_shells: Vec<[f32; 3]>,
    pub atmosphere_tint_rate: f32,

    // ── Starfield ────────────────────────────────────────────────────────────
    pub star_count: usize,
    pub star_shell_radius: f32,
    pub star_seed: u64,

    // ── Satellites ───────────────────────────────────────────────────────────
    pub satellite_pool_size: usize,
    pub satellite_initial_visible: usize,
    pub satellite_seed: u64,
    pub satellite_base_speed: f32,
    pub satellite_reference_radius: f32,
    pub satellite_size_min: f32,
    pub satellite_size_max: f32,
    pub satellite_model_radius: f32,
    pub highlighted_satellites: Vec<usize>,

    // ── Danger Pair ──────────────────────────────────────────────────────────
    pub danger_orbit: [f32; 4],
    pub danger_inclinations: [f32; 2],
    pub danger_size: f32,
    pub danger_pulse_freq: [f32; 2],

    // ── Camera ───────────────────────────────────────────────────────────────
    pub chapter_fov: [f32; CHAPTER_COUNT],
    pub chapter_framing: [[f32; 2]; CHAPTER_COUNT],
    pub camera_distance: f32,
    pub fov_approach_rate: f32,
    pub framing_approach_rate: f32,
    pub drag_sensitivity: f32,
    pub auto_rotate_speed: f32,
    pub offset_decay_rate: f32,
    pub polar_offset_limit: f32,
    pub shake_duration: f32,
    pub shake_amplitude: f32,

    // ── Orbit Rings ──────────────────────────────────────────────────────────
    pub ring_opacity: [f32; CHAPTER_COUNT],
    pub ring_approach_rate: f32,
    pub ring_samples: usize,
    pub orbit_bands: Vec<OrbitBand>,

    // ── Debris & Fragments ───────────────────────────────────────────────────
    pub debris_count: usize,
    pub debris_seed: u64,
    pub debris_jitter: f32,
    pub debris_shear_speed: [f32; 2],
    pub debris_noise_speed: f32,
    pub debris_decay_rate: f32,
    pub debris_clamp_min: f32,
    pub debris_clamp_max: f32,
    pub debris_lifetime: f32,
    pub debris_cool_time: f32,
    pub debris_size_min: f32,
    pub debris_size_max: f32,
    pub fragment_count: usize,
    pub fragment_lifetime: f32,

    // ── Kessler Ring ─────────────────────────────────────────────────────────
    pub kessler_count: usize,
    pub kessler_inner_radius: f32,
    pub kessler_outer_radius: f32,
    pub kessler_thickness: f32,
    pub kessler_opacity_cap: f32,

    // ── Collision Flash ──────────────────────────────────────────────────────
    pub flash_peak_intensity: f32,
    pub flash_decay_rate: f32,

    // ── Post-processing ──────────────────────────────────────────────────────
    pub bloom_intensity: [f32; CHAPTER_COUNT],
    pub aberration_intensity: [f32; CHAPTER_COUNT],
    pub grain_opacity: f32,
    pub vignette_strength: f32,

    // ── Rendering ────────────────────────────────────────────────────────────
    pub max_pixel_ratio: f32,
    /// Disable camera shake, chromatic aberration, film grain and twinkle.
    pub reduced_motion: bool,

    // ── Palette ──────────────────────────────────────────────────────────────
    pub color_neutral: [f32; 3],
    pub color_warning: [f32; 3],
    pub color_active: [f32; 3],
    pub color_dimmed: [f32; 3],
    pub color_drained: [f32; 3],
    pub color_danger: [f32; 3],
    pub color_debris_hot: [f32; 3],
    pub debris_tints: Vec<[f32; 3]>,
    pub atmosphere_base: [f32; 3],
    pub atmosphere_stressed: [f32; 3],
    pub planet_color: [f32; 3],
}

/// The four named bands drawn as orbit rings.
pub fn default_orbit_bands() -> Vec<OrbitBand> {
    vec![
        OrbitBand::new("LEO", 1.30, 0.90, 0.00, [0.35, 0.80, 1.00]),
        OrbitBand::new("SSO", 1.38, 1.71, 1.20, [0.45, 1.00, 0.70]),
        OrbitBand::new("MEO", 1.90, 0.96, 2.40, [0.70, 0.55, 1.00]),
        OrbitBand::new("GEO", 2.60, 0.00, 0.00, [1.00, 0.80, 0.40]),
    ]
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            // Scroll Tracking
            scrollable_height: SCROLLABLE_HEIGHT,
            scroll_line_height: SCROLL_LINE_HEIGHT,
            scroll_fast_k: SCROLL_FAST_K,
            scroll_settle_k: SCROLL_SETTLE_K,
            scroll_jump_threshold: SCROLL_JUMP_THRESHOLD,
            scroll_snap_epsilon: SCROLL_SNAP_EPSILON,
            scroll_idle_window: SCROLL_IDLE_WINDOW,
            // Planet & Atmosphere
            planet_radius: PLANET_RADIUS,
            surface_margin: SURFACE_MARGIN,
            planet_spin: PLANET_SPIN,
            atmosphere_shells: ATMOSPHERE_SHELLS.to_vec(),
            atmosphere_tint_rate: ATMOSPHERE_TINT_RATE,
            // Starfield
            star_count: STAR_COUNT,
            star_shell_radius: STAR_SHELL_RADIUS,
            star_seed: STAR_SEED,
            // Satellites
            satellite_pool_size: SATELLITE_POOL_SIZE,
            satellite_initial_visible: SATELLITE_INITIAL_VISIBLE,
            satellite_seed: SATELLITE_SEED,
            satellite_base_speed: SATELLITE_BASE_SPEED,
            satellite_reference_radius: SATELLITE_REFERENCE_RADIUS,
            satellite_size_min: SATELLITE_SIZE_MIN,
            satellite_size_max: SATELLITE_SIZE_MAX,
            satellite_model_radius: SATELLITE_MODEL_RADIUS,
            highlighted_satellites: HIGHLIGHTED_SATELLITES.to_vec(),
            // Danger Pair
            danger_orbit: DANGER_ORBIT,
            danger_inclinations: DANGER_INCLINATIONS,
            danger_size: DANGER_SIZE,
            danger_pulse_freq: DANGER_PULSE_FREQ,
            // Camera
            chapter_fov: CHAPTER_FOV,
            chapter_framing: CHAPTER_FRAMING,
            camera_distance: CAMERA_DISTANCE,
            fov_approach_rate: FOV_APPROACH_RATE,
            framing_approach_rate: FRAMING_APPROACH_RATE,
            drag_sensitivity: DRAG_SENSITIVITY,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
            offset_decay_rate: OFFSET_DECAY_RATE,
            polar_offset_limit: POLAR_OFFSET_LIMIT,
            shake_duration: SHAKE_DURATION,
            shake_amplitude: SHAKE_AMPLITUDE,
            // Orbit Rings
            ring_opacity: RING_OPACITY,
            ring_approach_rate: RING_APPROACH_RATE,
            ring_samples: RING_SAMPLES,
            orbit_bands: default_orbit_bands(),
            // Debris & Fragments
            debris_count: DEBRIS_COUNT,
            debris_seed: DEBRIS_SEED,
            debris_jitter: DEBRIS_JITTER,
            debris_shear_speed: DEBRIS_SHEAR_SPEED,
            debris_noise_speed: DEBRIS_NOISE_SPEED,
            debris_decay_rate: DEBRIS_DECAY_RATE,
            debris_clamp_min: DEBRIS_CLAMP_MIN,
            debris_clamp_max: DEBRIS_CLAMP_MAX,
            debris_lifetime: DEBRIS_LIFETIME,
            debris_cool_time: DEBRIS_COOL_TIME,
            debris_size_min: DEBRIS_SIZE_MIN,
            debris_size_max: DEBRIS_SIZE_MAX,
            fragment_count: FRAGMENT_COUNT,
            fragment_lifetime: FRAGMENT_LIFETIME,
            // Kessler Ring
            kessler_count: KESSLER_COUNT,
            kessler_inner_radius: KESSLER_INNER_RADIUS,
            kessler_outer_radius: KESSLER_OUTER_RADIUS,
            kessler_thickness: KESSLER_THICKNESS,
            kessler_opacity_cap: KESSLER_OPACITY_CAP,
            // Collision Flash
            flash_peak_intensity: FLASH_PEAK_INTENSITY,
            flash_decay_rate: FLASH_DECAY_RATE,
            // Post-processing
            bloom_intensity: BLOOM_INTENSITY,
            aberration_intensity: ABERRATION_INTENSITY,
            grain_opacity: GRAIN_OPACITY,
            vignette_strength: VIGNETTE_STRENGTH,
            // Rendering
            max_pixel_ratio: MAX_PIXEL_RATIO,
            reduced_motion: false,
            // Palette
            color_neutral: COLOR_NEUTRAL,
            color_warning: COLOR_WARNING,
            color_active: COLOR_ACTIVE,
            color_dimmed: COLOR_DIMMED,
            color_drained: COLOR_DRAINED,
            color_danger: COLOR_DANGER,
            color_debris_hot: COLOR_DEBRIS_HOT,
            debris_tints: DEBRIS_TINTS.to_vec(),
            atmosphere_base: ATMOSPHERE_BASE,
            atmosphere_stressed: ATMOSPHERE_STRESSED,
            planet_color: PLANET_COLOR,
        }
    }
}

/// sRGB triple → linear colour.
#[inline]
pub fn linear(rgb: [f32; 3]) -> LinearRgba {
    Color::srgb(rgb[0], rgb[1], rgb[2]).to_linear()
}

impl SceneConfig {
    /// Spread parameters for [`crate::orbit::generate_satellites`].
    pub fn satellite_spread(&self) -> SatelliteSpread {
        SatelliteSpread {
            base_speed: self.satellite_base_speed,
            reference_radius: self.satellite_reference_radius,
            size_min: self.satellite_size_min,
            size_max: self.satellite_size_max,
        }
    }

    /// Lowest possible distance of the danger-pair midpoint from the origin.
    ///
    /// Both danger bodies share radius and phase and differ only in
    /// inclination, so the angle between them never exceeds the inclination
    /// difference and `|mid| >= r * cos(Δi / 2)`.
    pub fn min_collision_radius(&self) -> f32 {
        let delta = (self.danger_inclinations[0] - self.danger_inclinations[1]).abs();
        self.danger_orbit[0] * (delta * 0.5).cos()
    }

    /// Every float in the configuration, by field name.
    fn float_fields(&self) -> Vec<(&'static str, f32)> {
        let mut fields = vec![
            ("scrollable_height", self.scrollable_height),
            ("scroll_line_height", self.scroll_line_height),
            ("scroll_fast_k", self.scroll_fast_k),
            ("scroll_settle_k", self.scroll_settle_k),
            ("scroll_jump_threshold", self.scroll_jump_threshold),
            ("scroll_snap_epsilon", self.scroll_snap_epsilon),
            ("scroll_idle_window", self.scroll_idle_window),
            ("planet_radius", self.planet_radius),
            ("surface_margin", self.surface_margin),
            ("planet_spin", self.planet_spin),
            ("atmosphere_tint_rate", self.atmosphere_tint_rate),
            ("star_shell_radius", self.star_shell_radius),
            ("satellite_base_speed", self.satellite_base_speed),
            ("satellite_reference_radius", self.satellite_reference_radius),
            ("satellite_size_min", self.satellite_size_min),
            ("satellite_size_max", self.satellite_size_max),
            ("satellite_model_radius", self.satellite_model_radius),
            ("danger_size", self.danger_size),
            ("camera_distance", self.camera_distance),
            ("fov_approach_rate", self.fov_approach_rate),
            ("framing_approach_rate", self.framing_approach_rate),
            ("drag_sensitivity", self.drag_sensitivity),
            ("auto_rotate_speed", self.auto_rotate_speed),
            ("offset_decay_rate", self.offset_decay_rate),
            ("polar_offset_limit", self.polar_offset_limit),
            ("shake_duration", self.shake_duration),
            ("shake_amplitude", self.shake_amplitude),
            ("ring_approach_rate", self.ring_approach_rate),
            ("debris_jitter", self.debris_jitter),
            ("debris_noise_speed", self.debris_noise_speed),
            ("debris_decay_rate", self.debris_decay_rate),
            ("debris_clamp_min", self.debris_clamp_min),
            ("debris_clamp_max", self.debris_clamp_max),
            ("debris_lifetime", self.debris_lifetime),
            ("debris_cool_time", self.debris_cool_time),
            ("debris_size_min", self.debris_size_min),
            ("debris_size_max", self.debris_size_max),
            ("fragment_lifetime", self.fragment_lifetime),
            ("kessler_inner_radius", self.kessler_inner_radius),
            ("kessler_outer_radius", self.kessler_outer_radius),
            ("kessler_thickness", self.kessler_thickness),
            ("kessler_opacity_cap", self.kessler_opacity_cap),
            ("flash_peak_intensity", self.flash_peak_intensity),
            ("flash_decay_rate", self.flash_decay_rate),
            ("grain_opacity", self.grain_opacity),
            ("vignette_strength", self.vignette_strength),
            ("max_pixel_ratio", self.max_pixel_ratio),
        ];
        let tables: [(&'static str, &[f32]); 8] = [
            ("danger_orbit", &self.danger_orbit),
            ("danger_inclinations", &self.danger_inclinations),
            ("danger_pulse_freq", &self.danger_pulse_freq),
            ("chapter_fov", &self.chapter_fov),
            ("ring_opacity", &self.ring_opacity),
            ("debris_shear_speed", &self.debris_shear_speed),
            ("bloom_intensity", &self.bloom_intensity),
            ("aberration_intensity", &self.aberration_intensity),
        ];
        for (name, values) in tables {
            fields.extend(values.iter().map(|&v| (name, v)));
        }
        fields.extend(self.chapter_framing.iter().flatten().map(|&v| ("chapter_framing", v)));
        fields.extend(self.atmosphere_shells.iter().flatten().map(|&v| ("atmosphere_shells", v)));
        fields.extend(self.debris_tints.iter().flatten().map(|&v| ("debris_tints", v)));
        for band in &self.orbit_bands {
            fields.extend([
                ("orbit_bands.radius", band.radius),
                ("orbit_bands.inclination", band.inclination),
                ("orbit_bands.right_ascension", band.right_ascension),
            ]);
            fields.extend(band.tint.iter().map(|&v| ("orbit_bands.tint", v)));
        }
        let colors = [
            ("color_neutral", self.color_neutral),
            ("color_warning", self.color_warning),
            ("color_active", self.color_active),
            ("color_dimmed", self.color_dimmed),
            ("color_drained", self.color_drained),
            ("color_danger", self.color_danger),
            ("color_debris_hot", self.color_debris_hot),
            ("atmosphere_base", self.atmosphere_base),
            ("atmosphere_stressed", self.atmosphere_stressed),
            ("planet_color", self.planet_color),
        ];
        for (name, rgb) in colors {
            fields.extend(rgb.map(|v| (name, v)));
        }
        fields
    }

    /// Reject values that would break an invariant of the scene engine.
    pub fn validate(&self) -> SceneResult<()> {
        for (name, value) in self.float_fields() {
            validate_finite(name, value)?;
        }
        validate_interval(
            "satellite_size_min",
            [self.satellite_size_min, self.satellite_size_max],
        )?;
        validate_interval("debris_size_min", [self.debris_size_min, self.debris_size_max])?;
        validate_interval("debris_shear_speed", self.debris_shear_speed)?;
        validate_positive("scrollable_height", self.scrollable_height)?;
        validate_open_range("scroll_fast_k", self.scroll_fast_k, 0.0, 1.0001, "(0.0, 1.0]")?;
        validate_open_range("scroll_settle_k", self.scroll_settle_k, 0.0, 1.0001, "(0.0, 1.0]")?;
        validate_positive("scroll_idle_window", self.scroll_idle_window)?;
        validate_positive("planet_radius", self.planet_radius)?;
        validate_positive("camera_distance", self.camera_distance)?;
        validate_positive("max_pixel_ratio", self.max_pixel_ratio)?;
        validate_positive("fragment_lifetime", self.fragment_lifetime)?;
        validate_positive("debris_lifetime", self.debris_lifetime)?;
        validate_positive("debris_cool_time", self.debris_cool_time)?;

        for fov in self.chapter_fov {
            validate_open_range("chapter_fov", fov, 0.0, 180.0, "(0, 180) degrees")?;
        }

        if self.satellite_initial_visible > self.satellite_pool_size {
            return Err(SceneError::InvalidConfig {
                name: "satellite_initial_visible",
                value: self.satellite_initial_visible as f32,
                expected: "<= satellite_pool_size",
            });
        }
        if let Some(&bad) = self
            .highlighted_satellites
            .iter()
            .find(|&&i| i >= self.satellite_pool_size)
        {
            return Err(SceneError::InvalidConfig {
                name: "highlighted_satellites",
                value: bad as f32,
                expected: "indices < satellite_pool_size",
            });
        }

        if !(self.debris_clamp_min >= 0.0 && self.debris_clamp_min < self.debris_clamp_max) {
            return Err(SceneError::InvalidConfig {
                name: "debris_clamp_min",
                value: self.debris_clamp_min,
                expected: "[0, debris_clamp_max)",
            });
        }
        let surface = self.planet_radius * self.surface_margin;
        if self.debris_clamp_max >= self.min_collision_radius() - surface {
            return Err(SceneError::InvalidConfig {
                name: "debris_clamp_max",
                value: self.debris_clamp_max,
                expected: "< min collision radius - planet surface",
            });
        }
        if !(self.kessler_inner_radius > surface && self.kessler_inner_radius < self.kessler_outer_radius) {
            return Err(SceneError::InvalidConfig {
                name: "kessler_inner_radius",
                value: self.kessler_inner_radius,
                expected: "(planet surface, kessler_outer_radius)",
            });
        }
        validate_open_range(
            "kessler_opacity_cap",
            self.kessler_opacity_cap,
            0.0,
            1.0,
            "(0.0, 1.0)",
        )?;
        Ok(())
    }
}

/// Parse and validate a TOML document into a [`SceneConfig`].
pub fn parse_scene_config(contents: &str) -> SceneResult<SceneConfig> {
    let config = toml::from_str::<SceneConfig>(contents).map_err(|e| SceneError::ConfigParse {
        path: CONFIG_PATH.to_string(),
        reason: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Startup system: attempt to load `assets/scene.toml` and overwrite the
/// `SceneConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort startup.  A missing file is not an error.
pub fn load_scene_config(mut config: ResMut<SceneConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match parse_scene_config(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded scene config from {CONFIG_PATH}");
            }
            Err(e) => {
                warn!("{e}; using compiled defaults");
            }
        },
        Err(_) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SceneConfig::default()
            .validate()
            .expect("compiled defaults must validate");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_scene_config("").expect("empty toml is valid");
        assert_eq!(config.satellite_pool_size, SATELLITE_POOL_SIZE);
        assert_eq!(config.orbit_bands.len(), 4);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = parse_scene_config("camera_distance = 7.5\nreduced_motion = true\n")
            .expect("partial override parses");
        assert_eq!(config.camera_distance, 7.5);
        assert!(config.reduced_motion);
        assert_eq!(config.chapter_fov, CHAPTER_FOV);
    }

    #[test]
    fn orbit_bands_parse_from_array_of_tables() {
        let doc = r#"
            [[orbit_bands]]
            name = "LEO"
            radius = 1.25
            inclination = 0.5
            right_ascension = 0.0
            tint = [1.0, 1.0, 1.0]
        "#;
        let config = parse_scene_config(doc).expect("band table parses");
        assert_eq!(config.orbit_bands.len(), 1);
        assert_eq!(config.orbit_bands[0].name, "LEO");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse_scene_config("camera_distance = = 3").unwrap_err();
        assert!(matches!(err, SceneError::ConfigParse { .. }));
    }

    #[test]
    fn debris_band_reaching_the_planet_is_rejected() {
        let config = SceneConfig {
            debris_clamp_max: 0.6,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SceneError::InvalidConfig { name: "debris_clamp_max", .. })
        ));
    }

    #[test]
    fn highlighted_index_outside_pool_is_rejected() {
        let config = SceneConfig {
            highlighted_satellites: vec![1, 250],
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for doc in [
            "debris_size_min = nan\n",
            "planet_spin = inf\n",
            "color_warning = [1.0, nan, 0.2]\n",
            "danger_orbit = [1.45, 0.6, -inf, 0.28]\n",
        ] {
            assert!(
                matches!(parse_scene_config(doc), Err(SceneError::InvalidConfig { .. })),
                "accepted {doc:?}"
            );
        }
    }

    #[test]
    fn swapped_size_pairs_are_rejected() {
        let err = parse_scene_config("satellite_size_min = 0.03\nsatellite_size_max = 0.01\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig { name: "satellite_size_min", .. }));
        let err = parse_scene_config("debris_size_min = 0.02\ndebris_size_max = 0.01\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig { name: "debris_size_min", .. }));
    }

    #[test]
    fn shear_speed_must_be_ordered_and_non_negative() {
        let err = parse_scene_config("debris_shear_speed = [-0.5, 0.5]\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig { name: "debris_shear_speed", .. }));
        let err = parse_scene_config("debris_shear_speed = [0.6, 0.2]\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig { name: "debris_shear_speed", .. }));
    }

    #[test]
    fn non_finite_band_is_rejected() {
        let doc = r#"
            [[orbit_bands]]
            name = "LEO"
            radius = nan
            inclination = 0.5
            right_ascension = 0.0
            tint = [1.0, 1.0, 1.0]
        "#;
        assert!(parse_scene_config(doc).is_err());
    }

    #[test]
    fn fov_out_of_range_is_rejected() {
        let mut config = SceneConfig::default();
        config.chapter_fov[2] = 190.0;
        assert!(config.validate().is_err());
    }
}
