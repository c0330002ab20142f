//! Scroll-driven 3D visualization of orbital congestion and a Kessler
//! collision cascade.
//!
//! Scroll progress is the single input that moves the story through five
//! chapters; [`narrative::NarrativePlugin`] turns it into timeline, collision
//! and debris state, and [`scene::ScenePlugin`] renders that state.

pub mod camera;
pub mod collision;
pub mod config;
pub mod constants;
pub mod debris;
pub mod easing;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod narrative;
pub mod orbit;
pub mod post;
pub mod rng;
pub mod scene;
pub mod scroll;
pub mod timeline;
