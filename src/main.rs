use bevy::prelude::*;
use bevy::window::WindowResolution;
use kessler::config::{self, SceneConfig};
use kessler::narrative::{NarrativePlugin, SceneStartup};
use kessler::scene::ScenePlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Kessler".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.004, 0.006, 0.015)))
        // Compiled defaults; load_scene_config overwrites them from
        // assets/scene.toml (if present) before anything else is built.
        .insert_resource(SceneConfig::default())
        .add_plugins((NarrativePlugin, ScenePlugin))
        .add_systems(Startup, config::load_scene_config.in_set(SceneStartup::Config))
        .run();
}
