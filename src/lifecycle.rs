//! Window lifecycle: pixel-ratio cap, resize, and teardown.
//!
//! The 3D camera renders into an offscreen [`SceneTarget`] sized at
//! `logical × min(native ratio, max_pixel_ratio)`, which a full-screen UI
//! image stretches over the window.  The window's own scale factor is never
//! touched.
//!
//! Teardown is the only cancellation the scene supports.  `Escape` or a
//! window close request despawns every [`SceneEntity`], releases the handles
//! the scene owns and asks the app to exit.

use crate::camera::SceneCamera;
use crate::config::SceneConfig;
use crate::models::ModelLoads;
use crate::scene::effects::EffectMaterials;
use crate::scene::satellites::{SatelliteMaterials, SatellitePool};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};
use bevy::window::{PrimaryWindow, WindowCloseRequested, WindowResized};
use bevy_asset::RenderAssetUsages;

/// Marker on everything the scene spawns, so teardown can find it.
#[derive(Component)]
pub struct SceneEntity;

/// Set once teardown has run; later requests are ignored.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TornDown(pub bool);

/// Offscreen image the scene camera renders into.
#[derive(Resource, Debug, Clone)]
pub struct SceneTarget(pub Handle<Image>);

/// Pixel size of the scene target for a window of `logical` size whose
/// native pixel ratio is `native`; `None` while minimized.
pub fn render_target_size(logical: Vec2, native: f32, max_ratio: f32) -> Option<UVec2> {
    let ratio = native.min(max_ratio).max(f32::EPSILON);
    let size = (logical * ratio).round();
    (size.x >= 1.0 && size.y >= 1.0).then(|| size.as_uvec2())
}

/// A render-attachment image of `size` pixels.
pub fn scene_target_image(size: UVec2) -> Image {
    let mut image = Image::new_fill(
        Extent3d {
            width: size.x.max(1),
            height: size.y.max(1),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    image.texture_descriptor.usage =
        TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC | TextureUsages::TEXTURE_BINDING;
    image
}

/// Target size for the primary window, if there is one.
pub fn window_target_size(window: &Window, max_ratio: f32) -> Option<UVec2> {
    render_target_size(
        Vec2::new(window.width(), window.height()),
        window.resolution.scale_factor(),
        max_ratio,
    )
}

/// Aspect ratio of a `width × height` surface; `None` while minimized.
pub fn aspect_ratio(width: f32, height: f32) -> Option<f32> {
    (width > 0.0 && height > 0.0).then(|| width / height)
}

/// Keep the scene target at the window's logical size times the capped
/// pixel ratio.
pub fn render_target_system(
    config: Res<SceneConfig>,
    target: Option<Res<SceneTarget>>,
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    mut images: ResMut<Assets<Image>>,
) {
    let Some(target) = target else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(size) = window_target_size(window, config.max_pixel_ratio) else {
        return;
    };
    if let Some(image) = images.get_mut(&target.0) {
        let current = image.texture_descriptor.size;
        if current.width != size.x || current.height != size.y {
            image.resize(Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            });
            debug!(
                "Scene target {}x{} (native ratio {:.2})",
                size.x,
                size.y,
                window.resolution.scale_factor()
            );
        }
    }
}

/// Apply the new aspect ratio in the same frame as the resize.
pub fn resize_system(
    mut resized: MessageReader<WindowResized>,
    mut camera: Query<&mut Projection, With<SceneCamera>>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    let Some(aspect) = aspect_ratio(last.width, last.height) else {
        return;
    };
    if let Ok(mut projection) = camera.single_mut() {
        if let Projection::Perspective(ref mut perspective) = *projection {
            perspective.aspect_ratio = aspect;
        }
    }
}

/// `Escape` or a close request: despawn the scene and exit.
pub fn teardown_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mut close: MessageReader<WindowCloseRequested>,
    scene: Query<Entity, With<SceneEntity>>,
    mut loads: Option<ResMut<ModelLoads>>,
    mut torn_down: ResMut<TornDown>,
    mut exit: MessageWriter<AppExit>,
) {
    let requested = close.read().count() > 0 || keys.just_pressed(KeyCode::Escape);
    if !requested || torn_down.0 {
        return;
    }
    let mut count = 0;
    for entity in scene.iter() {
        commands.entity(entity).despawn();
        count += 1;
    }
    if let Some(loads) = loads.as_mut() {
        loads.clear();
    }
    commands.remove_resource::<SatelliteMaterials>();
    commands.remove_resource::<EffectMaterials>();
    commands.remove_resource::<SatellitePool>();
    commands.remove_resource::<SceneTarget>();
    torn_down.0 = true;
    info!("Tore down {count} scene entities");
    exit.write(AppExit::Success);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_size_caps_the_pixel_ratio() {
        let logical = Vec2::new(1280.0, 720.0);
        assert_eq!(render_target_size(logical, 3.0, 2.0), Some(UVec2::new(2560, 1440)));
        assert_eq!(render_target_size(logical, 1.5, 2.0), Some(UVec2::new(1920, 1080)));
        assert_eq!(render_target_size(logical, 1.0, 2.0), Some(UVec2::new(1280, 720)));
        assert_eq!(render_target_size(Vec2::new(0.0, 720.0), 3.0, 2.0), None);
    }

    #[test]
    fn high_density_window_keeps_its_size() {
        let mut app = App::new();
        let mut config = SceneConfig::default();
        config.max_pixel_ratio = 2.0;
        let mut images = Assets::<Image>::default();
        let handle = images.add(scene_target_image(UVec2::ONE));
        app.insert_resource(config)
            .insert_resource(images)
            .insert_resource(SceneTarget(handle.clone()))
            .add_systems(Update, render_target_system);

        let mut window = Window::default();
        window.resolution.set_scale_factor(3.0);
        let (physical_width, physical_height) =
            (window.resolution.physical_width(), window.resolution.physical_height());
        let expected = UVec2::new(
            (window.width() * 2.0).round() as u32,
            (window.height() * 2.0).round() as u32,
        );
        let entity = app.world_mut().spawn((window, PrimaryWindow)).id();

        app.update();

        let window = app.world().get::<Window>(entity).expect("window");
        assert_eq!(window.resolution.scale_factor_override(), None);
        assert_eq!(window.resolution.physical_width(), physical_width);
        assert_eq!(window.resolution.physical_height(), physical_height);
        let image = app
            .world()
            .resource::<Assets<Image>>()
            .get(&handle)
            .expect("target image");
        let size = image.texture_descriptor.size;
        assert_eq!(UVec2::new(size.width, size.height), expected);
        assert!(size.width < physical_width, "ratio is capped below native");
    }

    #[test]
    fn aspect_ratio_ignores_minimized_windows() {
        assert_eq!(aspect_ratio(1600.0, 800.0), Some(2.0));
        assert_eq!(aspect_ratio(0.0, 800.0), None);
        assert_eq!(aspect_ratio(1600.0, 0.0), None);
    }

    #[test]
    fn escape_despawns_scene_and_exits() {
        let mut app = App::new();
        app.add_message::<WindowCloseRequested>()
            .add_message::<AppExit>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<TornDown>()
            .add_systems(Update, teardown_system);
        let tagged = app.world_mut().spawn(SceneEntity).id();
        let other = app.world_mut().spawn_empty().id();

        app.update();
        assert!(app.world().get_entity(tagged).is_ok(), "nothing requested yet");

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();

        assert!(app.world().get_entity(tagged).is_err());
        assert!(app.world().get_entity(other).is_ok());
        assert!(app.world().resource::<TornDown>().0);
        let exits = app.world().resource::<Messages<AppExit>>();
        assert!(!exits.is_empty());
    }
}
