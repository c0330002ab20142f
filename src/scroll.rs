//! Scroll-progress tracking.
//!
//! The narrative is driven by a virtual scroll document: mouse wheel and
//! paging keys move an offset inside `scrollable_height`, which is normalized
//! to the `raw` progress.  Once per frame `smoothed` follows `raw` with a
//! two-speed exponential step, `velocity` records the per-frame delta, and
//! `is_scrolling` reports whether `raw` changed within the idle window.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`scroll_input_system`]: wheel / keys → `raw` (synchronous, clamped).
//! 2. [`scroll_smoothing_system`]: `smoothed`, `velocity`, `is_scrolling`.
//!
//! Both read wall-clock time (`Time<Real>`) so the idle window is unaffected
//! by any virtual-time scaling.

use crate::config::SceneConfig;
use crate::constants::CHAPTER_BREAKPOINTS;
use crate::easing::clamp01;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

/// Smoothing parameters extracted from [`SceneConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ScrollTuning {
    pub fast_k: f32,
    pub settle_k: f32,
    pub jump_threshold: f32,
    pub snap_epsilon: f32,
    pub idle_window: f32,
}

impl From<&SceneConfig> for ScrollTuning {
    fn from(config: &SceneConfig) -> Self {
        Self {
            fast_k: config.scroll_fast_k,
            settle_k: config.scroll_settle_k,
            jump_threshold: config.scroll_jump_threshold,
            snap_epsilon: config.scroll_snap_epsilon,
            idle_window: config.scroll_idle_window,
        }
    }
}

/// Scroll progress shared by the scene and the overlay.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    /// Document scroll offset in pixels, `[0, scrollable_height]`.
    pub offset: f32,
    /// Normalized progress sampled from the offset, `[0, 1]`.
    pub raw: f32,
    /// Lagged follower of `raw`, `[0, 1]`.
    pub smoothed: f32,
    /// Change of `smoothed` during the last step (signed).
    pub velocity: f32,
    /// `raw` changed within the idle window.
    pub is_scrolling: bool,
    /// Wall-clock time (s) of the last change to `raw`.
    last_change: Option<f64>,
}

impl ScrollState {
    /// Set the document offset; `raw` follows it, clamped.
    pub fn set_offset(&mut self, offset: f32, scrollable_height: f32, now: f64) {
        let height = scrollable_height.max(f32::EPSILON);
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.offset = offset.clamp(0.0, height);
        self.set_raw(self.offset / height, now);
    }

    /// Set normalized progress directly (clamped into `[0, 1]`).
    pub fn set_raw(&mut self, raw: f32, now: f64) {
        let raw = clamp01(raw);
        if raw != self.raw {
            self.raw = raw;
            self.last_change = Some(now);
        }
    }

    /// Jump both `raw` and `smoothed` to `progress` with no smoothing.
    pub fn snap(&mut self, progress: f32, scrollable_height: f32) {
        let p = clamp01(progress);
        self.raw = p;
        self.smoothed = p;
        self.velocity = 0.0;
        self.offset = p * scrollable_height.max(0.0);
    }

    /// One smoothing step: `smoothed += (raw - smoothed) * k`.
    ///
    /// `k` is the fast factor while the gap exceeds the jump threshold and the
    /// settle factor otherwise; inside `snap_epsilon` the follower lands on
    /// `raw` exactly.
    pub fn step(&mut self, tuning: &ScrollTuning, now: f64) {
        let previous = self.smoothed;
        let gap = self.raw - self.smoothed;

        self.smoothed = if gap.abs() <= tuning.snap_epsilon {
            self.raw
        } else {
            let k = if gap.abs() > tuning.jump_threshold {
                tuning.fast_k
            } else {
                tuning.settle_k
            };
            clamp01(self.smoothed + gap * k.clamp(0.0, 1.0))
        };

        self.velocity = self.smoothed - previous;
        self.is_scrolling = self
            .last_change
            .is_some_and(|t| now - t < tuning.idle_window as f64);
    }
}

/// Progress of the next chapter anchor strictly after `raw` (or 1.0).
pub fn next_anchor(raw: f32) -> f32 {
    CHAPTER_BREAKPOINTS
        .iter()
        .copied()
        .find(|&b| b > raw + 1e-4)
        .unwrap_or(1.0)
}

/// Progress of the previous chapter anchor strictly before `raw` (or 0.0).
pub fn prev_anchor(raw: f32) -> f32 {
    CHAPTER_BREAKPOINTS
        .iter()
        .copied()
        .rev()
        .find(|&b| b < raw - 1e-4)
        .unwrap_or(0.0)
}

/// Translate wheel and keyboard input into a new document offset.
///
/// - Wheel: line units × `scroll_line_height`, pixel units as-is.
/// - **PageDown / PageUp** → next / previous chapter anchor.
/// - **Home / End** → top / bottom.
/// - **ArrowDown / ArrowUp** → one line.
pub fn scroll_input_system(
    mut wheel: MessageReader<MouseWheel>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time<Real>>,
    config: Res<SceneConfig>,
    mut scroll: ResMut<ScrollState>,
) {
    let now = time.elapsed_secs_f64();
    let height = config.scrollable_height;
    let mut offset = scroll.offset;

    for event in wheel.read() {
        let pixels = match event.unit {
            MouseScrollUnit::Line => event.y * config.scroll_line_height,
            MouseScrollUnit::Pixel => event.y,
        };
        // Wheel "up" (positive y) moves back toward the top of the document.
        offset -= pixels;
    }

    if keys.just_pressed(KeyCode::ArrowDown) {
        offset += config.scroll_line_height;
    }
    if keys.just_pressed(KeyCode::ArrowUp) {
        offset -= config.scroll_line_height;
    }
    if keys.just_pressed(KeyCode::PageDown) {
        offset = next_anchor(scroll.raw) * height;
    }
    if keys.just_pressed(KeyCode::PageUp) {
        offset = prev_anchor(scroll.raw) * height;
    }
    if keys.just_pressed(KeyCode::Home) {
        offset = 0.0;
    }
    if keys.just_pressed(KeyCode::End) {
        offset = height;
    }

    if offset != scroll.offset {
        scroll.set_offset(offset, height, now);
    }
}

/// Advance `smoothed`, `velocity` and `is_scrolling` once per frame.
pub fn scroll_smoothing_system(
    time: Res<Time<Real>>,
    config: Res<SceneConfig>,
    mut scroll: ResMut<ScrollState>,
) {
    let tuning = ScrollTuning::from(config.as_ref());
    scroll.step(&tuning, time.elapsed_secs_f64());
}

/// Startup system: honour `KESSLER_START_PROGRESS` (0..1) by snapping the
/// tracker there, which is handy for iterating on a single chapter.
pub fn apply_start_progress(config: Res<SceneConfig>, mut scroll: ResMut<ScrollState>) {
    let Ok(value) = std::env::var("KESSLER_START_PROGRESS") else {
        return;
    };
    match value.trim().parse::<f32>() {
        Ok(p) => {
            scroll.snap(p, config.scrollable_height);
            info!("Starting at progress {:.3}", scroll.raw);
        }
        Err(e) => warn!("Ignoring KESSLER_START_PROGRESS={value:?}: {e}"),
    }
}
