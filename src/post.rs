//! Post-processing control: bloom and chromatic aberration follow chapter
//! severity; film grain and the vignette are screen-space UI overlays.
//!
//! Bloom and chromatic aberration are camera components configured once at
//! startup and eased toward the per-chapter table every frame.  Neither grain
//! nor vignette exists as a built-in pass, so both are full-screen
//! [`ImageNode`]s drawn over the 3D view: the vignette is a procedurally
//! generated radial falloff, the grain a seeded noise tile whose sampling
//! window jumps every frame.

use crate::camera::SceneCamera;
use crate::config::SceneConfig;
use crate::easing::{clamp01, damp, smoothstep};
use crate::lifecycle::SceneEntity;
use crate::rng::SeededRng;
use crate::timeline::Timeline;
use bevy::post_process::bloom::Bloom;
use bevy::post_process::effect_stack::ChromaticAberration;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_asset::RenderAssetUsages;

const VIGNETTE_SIZE: u32 = 256;
const GRAIN_SIZE: u32 = 256;
/// Side of the grain window sampled from the noise tile each frame.
const GRAIN_WINDOW: f32 = 128.0;
const GRAIN_SEED: u64 = 0x6A41_4E00;
const POST_APPROACH_RATE: f32 = 2.0;

#[derive(Component)]
pub struct VignetteOverlay;

#[derive(Component)]
pub struct GrainOverlay;

/// Eased post-processing strengths.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PostState {
    pub bloom: f32,
    pub aberration: f32,
    grain_rng_state: u64,
}

impl PostState {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            bloom: config.bloom_intensity[0],
            aberration: config.aberration_intensity[0],
            grain_rng_state: GRAIN_SEED,
        }
    }

    pub fn update(&mut self, config: &SceneConfig, timeline: &Timeline, dt: f32) {
        let chapter = timeline.chapter;
        self.bloom = damp(self.bloom, chapter.pick(&config.bloom_intensity), POST_APPROACH_RATE, dt);
        let aberration = if config.reduced_motion {
            0.0
        } else {
            chapter.pick(&config.aberration_intensity)
        };
        self.aberration = damp(self.aberration, aberration, POST_APPROACH_RATE, dt);
    }

    /// Next top-left corner of the grain sampling window.
    fn next_grain_offset(&mut self) -> Vec2 {
        let mut rng = SeededRng::new(self.grain_rng_state);
        let span = GRAIN_SIZE as f32 - GRAIN_WINDOW;
        let offset = Vec2::new(rng.range(0.0, span), rng.range(0.0, span)).floor();
        self.grain_rng_state = self.grain_rng_state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        offset
    }
}

/// Alpha of the vignette at normalized distance `d` from the screen centre
/// (`0` at the centre, `1` at the corners).
pub fn vignette_alpha(d: f32, strength: f32) -> f32 {
    clamp01(strength) * smoothstep(clamp01((d - 0.35) / 0.65))
}

/// Procedural radial falloff, black with varying alpha.
pub fn vignette_image(size: u32, strength: f32) -> Image {
    let half = size as f32 * 0.5;
    let max_d = (2.0 * half * half).sqrt();
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let d = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half).length() / max_d;
            let a = (vignette_alpha(d, strength) * 255.0).round() as u8;
            data.extend_from_slice(&[0, 0, 0, a]);
        }
    }
    rgba_image(size, data)
}

/// Seeded grey noise tile; identical on every run.
pub fn grain_image(size: u32, seed: u64) -> Image {
    let mut rng = SeededRng::new(seed);
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for _ in 0..size * size {
        let v = (rng.next_f32() * 255.0) as u8;
        data.extend_from_slice(&[v, v, v, 255]);
    }
    rgba_image(size, data)
}

fn rgba_image(size: u32, data: Vec<u8>) -> Image {
    Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

pub(crate) fn full_screen() -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(0.0),
        top: Val::Px(0.0),
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        ..Default::default()
    }
}

/// Startup system: add bloom and chromatic aberration to the camera and spawn
/// the vignette and grain overlays.
pub fn setup_post_processing(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut images: ResMut<Assets<Image>>,
    camera: Query<Entity, With<SceneCamera>>,
) {
    let state = PostState::new(&config);
    if let Ok(entity) = camera.single() {
        commands.entity(entity).insert((
            Bloom {
                intensity: state.bloom,
                ..Bloom::NATURAL
            },
            ChromaticAberration {
                intensity: state.aberration,
                ..Default::default()
            },
        ));
    } else {
        warn!("No scene camera; post-processing disabled");
    }

    let vignette = images.add(vignette_image(VIGNETTE_SIZE, config.vignette_strength));
    commands.spawn((
        SceneEntity,
        VignetteOverlay,
        full_screen(),
        ImageNode::new(vignette),
        ZIndex(10),
    ));

    let grain = images.add(grain_image(GRAIN_SIZE, GRAIN_SEED));
    let grain_visibility = if config.reduced_motion {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
    commands.spawn((
        SceneEntity,
        GrainOverlay,
        full_screen(),
        ImageNode {
            rect: Some(Rect::new(0.0, 0.0, GRAIN_WINDOW, GRAIN_WINDOW)),
            ..ImageNode::new(grain).with_color(Color::srgba(1.0, 1.0, 1.0, config.grain_opacity))
        },
        grain_visibility,
        ZIndex(11),
    ));
    commands.insert_resource(state);
}

/// Ease bloom / aberration toward the current chapter and jitter the grain.
pub fn post_processing_system(
    time: Res<Time>,
    config: Res<SceneConfig>,
    timeline: Res<Timeline>,
    mut state: ResMut<PostState>,
    mut camera: Query<(&mut Bloom, &mut ChromaticAberration), With<SceneCamera>>,
    mut grain: Query<&mut ImageNode, With<GrainOverlay>>,
) {
    state.update(&config, &timeline, time.delta_secs());

    if let Ok((mut bloom, mut aberration)) = camera.single_mut() {
        bloom.intensity = state.bloom;
        aberration.intensity = state.aberration;
    }

    if config.reduced_motion {
        return;
    }
    if let Ok(mut node) = grain.single_mut() {
        let min = state.next_grain_offset();
        node.rect = Some(Rect::from_corners(min, min + Vec2::splat(GRAIN_WINDOW)));
    }
}
