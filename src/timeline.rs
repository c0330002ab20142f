//! Phase/timeline mapping: progress → chapter and per-phase eased progress.
//!
//! | Chapter | Range        | Narrative beat                                  |
//! |---------|--------------|-------------------------------------------------|
//! | 0       | `[0.0, 0.2)` | Orbit: a calm planet with a handful of satellites |
//! | 1       | `[0.2, 0.4)` | Congestion: the swarm fills in                  |
//! | 2       | `[0.4, 0.6)` | Dependence: critical satellites light up        |
//! | 3       | `[0.6, 0.8)` | Risk: two satellites converge                   |
//! | 4       | `[0.8, 1.0]` | Cascade: collision and the debris ring          |
//!
//! The scene reads the chapter of the *smoothed* progress; the overlay surface
//! reads the chapter of the *raw* progress.  Both come out of [`Timeline`].

use crate::constants::{CHAPTER_BREAKPOINTS, CHAPTER_COUNT};
use crate::easing::{clamp01, smoothstep};
use crate::scroll::ScrollState;
use bevy::prelude::*;

/// One of the five narrative chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Chapter {
    #[default]
    Orbit,
    Congestion,
    Dependence,
    Risk,
    Cascade,
}

impl Chapter {
    pub const ALL: [Chapter; CHAPTER_COUNT] = [
        Chapter::Orbit,
        Chapter::Congestion,
        Chapter::Dependence,
        Chapter::Risk,
        Chapter::Cascade,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(CHAPTER_COUNT - 1)]
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Chapter::Cascade
    }

    /// Look up this chapter's entry in a per-chapter table.
    #[inline]
    pub fn pick<T: Copy>(self, table: &[T; CHAPTER_COUNT]) -> T {
        table[self.index()]
    }
}

/// Map progress to its chapter.  Intervals are closed-open except the last.
pub fn chapter_of(progress: f32) -> Chapter {
    let p = clamp01(progress);
    let index = CHAPTER_BREAKPOINTS
        .iter()
        .rposition(|&lo| p >= lo)
        .unwrap_or(0);
    Chapter::from_index(index)
}

/// Linearly remap `progress` from `[lo, hi]` to `[0, 1]`, clamped.
pub fn phase_local_progress(progress: f32, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return if progress >= hi { 1.0 } else { 0.0 };
    }
    clamp01((progress - lo) / (hi - lo))
}

/// `[lo, hi]` bounds of phase `i` (the last phase ends at 1.0).
pub fn phase_bounds(i: usize) -> (f32, f32) {
    let i = i.min(CHAPTER_COUNT - 1);
    let hi = CHAPTER_BREAKPOINTS.get(i + 1).copied().unwrap_or(1.0);
    (CHAPTER_BREAKPOINTS[i], hi)
}

/// Eased local progress of each of the five phases.
pub fn eased_phases(progress: f32) -> [f32; CHAPTER_COUNT] {
    std::array::from_fn(|i| {
        let (lo, hi) = phase_bounds(i);
        smoothstep(phase_local_progress(progress, lo, hi))
    })
}

/// Per-frame timeline snapshot.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Timeline {
    /// Smoothed progress the scene animates from.
    pub progress: f32,
    /// Chapter of the smoothed progress; drives the 3D scene.
    pub chapter: Chapter,
    /// Chapter of the raw progress; consumed by the presentation overlay.
    pub overlay_chapter: Chapter,
    /// Smoothstep-eased local progress of each phase.
    pub phases: [f32; CHAPTER_COUNT],
}

impl Timeline {
    pub fn from_progress(raw: f32, smoothed: f32) -> Self {
        Self {
            progress: clamp01(smoothed),
            chapter: chapter_of(smoothed),
            overlay_chapter: chapter_of(raw),
            phases: eased_phases(smoothed),
        }
    }

    /// Eased local progress of `chapter`'s own phase.
    #[inline]
    pub fn phase(&self, chapter: Chapter) -> f32 {
        self.phases[chapter.index()]
    }
}

/// Written whenever the overlay chapter (raw progress) changes.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterChanged {
    pub from: Chapter,
    pub to: Chapter,
}

/// Recompute [`Timeline`] from the freshly smoothed scroll state.
pub fn timeline_system(
    scroll: Res<ScrollState>,
    mut timeline: ResMut<Timeline>,
    mut changed: MessageWriter<ChapterChanged>,
) {
    let next = Timeline::from_progress(scroll.raw, scroll.smoothed);
    if next.overlay_chapter != timeline.overlay_chapter {
        debug!(
            "chapter {:?} -> {:?}",
            timeline.overlay_chapter, next.overlay_chapter
        );
        changed.write(ChapterChanged {
            from: timeline.overlay_chapter,
            to: next.overlay_chapter,
        });
    }
    *timeline = next;
}
