//! Edge-triggered collision state machine.
//!
//! ```text
//!            chapter becomes Cascade
//!   Idle ─────────────────────────────▶ Triggered { at, point, radius }
//!    ▲                                        │
//!    └────────── chapter drops below ─────────┘
//!                    Cascade
//! ```
//!
//! The machine is the only place that decides when the collision happens.
//! It fires exactly once per forward entry into the terminal chapter; staying
//! inside the chapter never re-fires, and leaving it re-arms the trigger so
//! the sequence replays symmetrically in both scroll directions.

use crate::config::SceneConfig;
use crate::orbit::OrbitalBody;
use crate::timeline::{Chapter, Timeline};
use bevy::prelude::*;

/// The two scripted satellites whose orbits cross.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DangerPair {
    pub bodies: [OrbitalBody; 2],
}

impl DangerPair {
    pub fn from_config(config: &SceneConfig) -> Self {
        let [radius, right_ascension, phase, speed] = config.danger_orbit;
        let body = |inclination| OrbitalBody {
            radius,
            inclination,
            right_ascension,
            phase,
            speed,
            size: config.danger_size,
        };
        Self {
            bodies: [
                body(config.danger_inclinations[0]),
                body(config.danger_inclinations[1]),
            ],
        }
    }

    pub fn positions(&self, t: f32) -> [Vec3; 2] {
        [self.bodies[0].position(t), self.bodies[1].position(t)]
    }

    /// Midpoint of the two orbital positions at `t`.
    pub fn midpoint(&self, t: f32) -> Vec3 {
        let [a, b] = self.positions(t);
        (a + b) * 0.5
    }
}

/// A recorded collision: fixed for the whole cascade episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Elapsed scene time (s) of the trigger.
    pub at: f32,
    pub point: Vec3,
    /// Distance of `point` from the planet centre.
    pub radius: f32,
}

impl Collision {
    pub fn new(at: f32, point: Vec3) -> Self {
        Self {
            at,
            point,
            radius: point.length(),
        }
    }

    /// Seconds since the trigger (never negative).
    #[inline]
    pub fn since(&self, t: f32) -> f32 {
        (t - self.at).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CollisionState {
    #[default]
    Idle,
    Triggered(Collision),
}

/// Result of one [`CollisionMachine::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Unchanged,
    Triggered(Collision),
    Reset,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionMachine {
    state: CollisionState,
    /// Number of triggers so far; bumps once per cascade episode.
    episodes: u32,
}

impl CollisionMachine {
    #[inline]
    pub fn state(&self) -> CollisionState {
        self.state
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        matches!(self.state, CollisionState::Triggered(_))
    }

    pub fn collision(&self) -> Option<Collision> {
        match self.state {
            CollisionState::Triggered(c) => Some(c),
            CollisionState::Idle => None,
        }
    }

    #[inline]
    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    /// Feed the current chapter.  `point` is only evaluated on the trigger edge.
    pub fn advance(&mut self, chapter: Chapter, t: f32, point: impl FnOnce() -> Vec3) -> Transition {
        match (self.state, chapter.is_terminal()) {
            (CollisionState::Idle, true) => {
                let collision = Collision::new(t, point());
                self.state = CollisionState::Triggered(collision);
                self.episodes += 1;
                Transition::Triggered(collision)
            }
            (CollisionState::Triggered(_), false) => {
                self.state = CollisionState::Idle;
                Transition::Reset
            }
            _ => Transition::Unchanged,
        }
    }
}

/// Fired on the `Idle → Triggered` edge.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CollisionTriggered(pub Collision);

/// Fired on the `Triggered → Idle` edge.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionReset;

/// Drive the machine from the current timeline.
pub fn collision_system(
    time: Res<Time>,
    timeline: Res<Timeline>,
    danger: Res<DangerPair>,
    mut machine: ResMut<CollisionMachine>,
    mut triggered: MessageWriter<CollisionTriggered>,
    mut reset: MessageWriter<CollisionReset>,
) {
    let t = time.elapsed_secs();
    match machine.advance(timeline.chapter, t, || danger.midpoint(t)) {
        Transition::Triggered(collision) => {
            info!(
                "Collision #{} at ({:.2}, {:.2}, {:.2}), r = {:.3}",
                machine.episodes(),
                collision.point.x,
                collision.point.y,
                collision.point.z,
                collision.radius
            );
            triggered.write(CollisionTriggered(collision));
        }
        Transition::Reset => {
            debug!("Collision re-armed");
            reset.write(CollisionReset);
        }
        Transition::Unchanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::chapter_of;

    fn pair() -> DangerPair {
        DangerPair::from_config(&SceneConfig::default())
    }

    #[test]
    fn fires_once_per_forward_entry() {
        let danger = pair();
        let mut m = CollisionMachine::default();
        let mut fired = Vec::new();

        let script = [(0.75, 1.0), (0.81, 2.0), (0.9, 3.0), (0.95, 4.0)];
        for (p, t) in script {
            if let Transition::Triggered(c) = m.advance(chapter_of(p), t, || danger.midpoint(t)) {
                fired.push(c);
            }
        }
        assert_eq!(fired.len(), 1);
        let first = fired[0];
        assert_eq!(m.collision(), Some(first), "point stays fixed inside the chapter");

        assert_eq!(m.advance(chapter_of(0.5), 5.0, || Vec3::ZERO), Transition::Reset);
        assert!(!m.is_triggered());

        let again = m.advance(chapter_of(0.81), 9.0, || danger.midpoint(9.0));
        let Transition::Triggered(second) = again else {
            panic!("re-entry must trigger again, got {again:?}");
        };
        assert_eq!(second.at, 9.0);
        assert_ne!(second.point, first.point);
        assert_eq!(m.episodes(), 2);
    }

    #[test]
    fn idle_outside_terminal_chapter() {
        let mut m = CollisionMachine::default();
        for p in [0.0, 0.3, 0.5, 0.79] {
            assert_eq!(m.advance(chapter_of(p), 0.0, || Vec3::ONE), Transition::Unchanged);
        }
        assert_eq!(m.state(), CollisionState::Idle);
    }

    #[test]
    fn point_is_only_sampled_on_the_edge() {
        let mut m = CollisionMachine::default();
        m.advance(Chapter::Cascade, 1.0, || Vec3::X);
        m.advance(Chapter::Cascade, 2.0, || panic!("must not sample while triggered"));
    }

    #[test]
    fn collision_radius_is_distance_from_origin() {
        let c = Collision::new(0.0, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(c.radius, 5.0);
        assert_eq!(c.since(-1.0), 0.0);
    }

    #[test]
    fn danger_midpoint_stays_above_minimum_radius() {
        let config = SceneConfig::default();
        let danger = pair();
        let floor = config.min_collision_radius() - 1e-4;
        for i in 0..500 {
            let t = i as f32 * 0.37;
            assert!(danger.midpoint(t).length() >= floor);
        }
    }
}
