//! Render-free narrative plugin: scroll → timeline → collision → debris.
//!
//! Everything registered here runs headless, which is what the integration
//! tests drive.  The 3D presentation lives in [`crate::scene::ScenePlugin`]
//! and hangs its systems off the sets defined below.

use crate::collision::{collision_system, CollisionMachine, CollisionReset, CollisionTriggered, DangerPair};
use crate::config::SceneConfig;
use crate::debris::{
    debris_integration_system, debris_presence_system, debris_spawn_system, kessler_cloud_system,
    DebrisField, FragmentSet, KesslerCloud,
};
use crate::scroll::{apply_start_progress, scroll_input_system, scroll_smoothing_system, ScrollState};
use crate::timeline::{timeline_system, ChapterChanged, Timeline};
use bevy::prelude::*;

/// Startup ordering: configuration first, then resources sized from it, then
/// entities.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneStartup {
    Config,
    Resources,
    Spawn,
}

/// Per-frame ordering: raw input, narrative state, then visuals reading it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NarrativeSet {
    Input,
    Logic,
    Visuals,
}

pub struct NarrativePlugin;

impl Plugin for NarrativePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneConfig>()
            .init_resource::<ScrollState>()
            .init_resource::<Timeline>()
            .init_resource::<CollisionMachine>()
            .init_resource::<KesslerCloud>()
            .add_message::<ChapterChanged>()
            .add_message::<CollisionTriggered>()
            .add_message::<CollisionReset>()
            .configure_sets(
                Startup,
                (SceneStartup::Config, SceneStartup::Resources, SceneStartup::Spawn).chain(),
            )
            .configure_sets(
                Update,
                (NarrativeSet::Input, NarrativeSet::Logic, NarrativeSet::Visuals).chain(),
            )
            .add_systems(
                Startup,
                (init_narrative_resources, apply_start_progress).in_set(SceneStartup::Resources),
            )
            .add_systems(
                Update,
                (
                    scroll_input_system,
                    scroll_smoothing_system,
                    timeline_system,
                    collision_system,
                    debris_spawn_system,
                    debris_integration_system,
                    debris_presence_system,
                    kessler_cloud_system,
                )
                    .chain()
                    .in_set(NarrativeSet::Logic),
            );
    }
}

/// Build the config-sized arenas once the final configuration is known.
pub fn init_narrative_resources(mut commands: Commands, config: Res<SceneConfig>) {
    commands.insert_resource(DangerPair::from_config(&config));
    commands.insert_resource(DebrisField::new(config.debris_count, config.debris_seed));
    commands.insert_resource(FragmentSet::new(
        config.fragment_count,
        config.debris_seed.wrapping_add(1),
    ));
    info!(
        "Narrative ready: {} debris particles, {} fragments",
        config.debris_count, config.fragment_count
    );
}
