//! 3D presentation of the narrative.
//!
//! [`ScenePlugin`] builds the scene at startup and, every frame after the
//! narrative logic has run, copies its state onto entities, materials and the
//! camera.  It requires [`crate::narrative::NarrativePlugin`].

pub mod atmosphere;
pub mod effects;
pub mod environment;
pub mod meshes;
pub mod satellites;
pub mod setup;
pub mod stars;

use crate::camera::{camera_rig_system, pointer_input_system, PointerInput};
use crate::lifecycle::{render_target_system, resize_system, teardown_system, TornDown};
use crate::models::{apply_model_swaps, poll_model_loads, start_model_loads, ModelLoads, ModelReady};
use crate::narrative::{NarrativeSet, SceneStartup};
use crate::post::{post_processing_system, setup_post_processing};
use atmosphere::AtmosphereMaterial;
use stars::StarMaterial;
use bevy::asset::embedded_asset;
use bevy::pbr::MaterialPlugin;
use bevy::prelude::*;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "atmosphere.wgsl");
        embedded_asset!(app, "stars.wgsl");

        app.add_plugins((
            MaterialPlugin::<AtmosphereMaterial>::default(),
            MaterialPlugin::<StarMaterial>::default(),
        ))
            .init_resource::<PointerInput>()
            .init_resource::<ModelLoads>()
            .init_resource::<TornDown>()
            .add_message::<ModelReady>()
            .configure_sets(Update, NarrativeSet::Visuals.run_if(scene_alive))
            .add_systems(
                Startup,
                (
                    setup::setup_camera,
                    setup::setup_lights,
                    setup::setup_environment,
                    setup::setup_satellites,
                    setup::setup_effects,
                    setup_post_processing,
                    start_model_loads,
                )
                    .chain()
                    .in_set(SceneStartup::Spawn),
            )
            .add_systems(
                Update,
                (
                    render_target_system,
                    resize_system,
                    pointer_input_system,
                    poll_model_loads,
                )
                    .in_set(NarrativeSet::Input),
            )
            .add_systems(
                Update,
                (
                    apply_model_swaps,
                    camera_rig_system,
                    environment::planet_spin_system,
                    environment::starfield_system,
                    environment::environment_system,
                    satellites::satellite_pool_system,
                    satellites::highlight_glow_system,
                    satellites::danger_system,
                    effects::debris_render_system,
                    effects::fragment_render_system,
                    effects::kessler_render_system,
                    effects::flash_system,
                    post_processing_system,
                )
                    .chain()
                    .in_set(NarrativeSet::Visuals),
            )
            .add_systems(Last, teardown_system);
    }
}

fn scene_alive(torn_down: Res<TornDown>) -> bool {
    !torn_down.0
}
