//! Copies debris, fragment, Kessler-cloud and flash state onto entities.
//!
//! | System                 | Reads                          | Writes                          |
//! |------------------------|--------------------------------|---------------------------------|
//! | `debris_render_system` | `DebrisField`, collision       | particle transforms, tint mats  |
//! | `fragment_render_system` | `FragmentSet`                | fragment transforms, fade       |
//! | `kessler_render_system`| `KesslerCloud`                 | cloud material alpha            |
//! | `flash_system`         | `CollisionMachine`, timeline   | collision light, flash sprite   |

use crate::collision::CollisionMachine;
use crate::config::{linear, SceneConfig};
use crate::debris::{cooling, DebrisField, FragmentSet, KesslerCloud};
use crate::easing::mix_color;
use crate::scene::satellites::park_position;
use crate::timeline::Timeline;
use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy)]
pub struct DebrisSprite(pub usize);

#[derive(Component, Debug, Clone, Copy)]
pub struct FragmentSprite(pub usize);

#[derive(Component)]
pub struct KesslerRing;

#[derive(Component)]
pub struct CollisionLight;

#[derive(Component)]
pub struct FlashSprite;

/// One material per debris tint plus the shared fragment and flash materials.
#[derive(Resource, Debug, Clone)]
pub struct EffectMaterials {
    pub debris: Vec<Handle<StandardMaterial>>,
    pub fragment: Handle<StandardMaterial>,
    pub flash: Handle<StandardMaterial>,
}

/// Collision light intensity `since` seconds after the trigger.
pub fn flash_intensity(peak: f32, rate: f32, since: f32) -> f32 {
    peak * (-rate * since.max(0.0)).exp()
}

/// Debris colour for tint `base` at `cool` (0 = just exploded, 1 = cooled).
pub fn debris_color(hot: LinearRgba, base: LinearRgba, cool: f32) -> LinearRgba {
    mix_color(hot, base, cool)
}

#[allow(clippy::too_many_arguments)]
pub fn debris_render_system(
    time: Res<Time>,
    config: Res<SceneConfig>,
    machine: Res<CollisionMachine>,
    field: Res<DebrisField>,
    handles: Res<EffectMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut sprites: Query<(&DebrisSprite, &mut Transform, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    let t = time.elapsed_secs();
    let cool = machine
        .collision()
        .map_or(1.0, |c| cooling(c.since(t), config.debris_cool_time));
    let hot = linear(config.color_debris_hot);

    // All particles share a spawn time, so one life sample fades the batch.
    let life = field
        .particles()
        .iter()
        .find(|p| p.active)
        .map_or(0.0, |p| p.life);
    let fade = field.presence * life.max(0.25);

    for (tint, handle) in config.debris_tints.iter().zip(handles.debris.iter()) {
        if let Some(material) = materials.get_mut(handle) {
            let color = debris_color(hot, linear(*tint), cool);
            material.base_color = Color::from(color.with_alpha(fade));
            material.emissive = color * (fade * (1.0 + 6.0 * (1.0 - cool)));
        }
    }

    for (DebrisSprite(index), mut transform, mut material) in sprites.iter_mut() {
        match field.particles().get(*index) {
            Some(p) if p.active => {
                transform.translation = p.position;
                transform.scale = Vec3::splat(p.pulsed_size(t));
                if let Some(handle) = handles.debris.get(p.tint) {
                    if material.0 != *handle {
                        material.0 = handle.clone();
                    }
                }
            }
            _ => transform.translation = park_position(),
        }
    }
}

pub fn fragment_render_system(
    fragments: Res<FragmentSet>,
    field: Res<DebrisField>,
    handles: Res<EffectMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut sprites: Query<(&FragmentSprite, &mut Transform)>,
) {
    let life = fragments
        .fragments()
        .iter()
        .filter(|f| f.active)
        .map(|f| f.life)
        .fold(0.0_f32, f32::max);
    if let Some(material) = materials.get_mut(&handles.fragment) {
        let alpha = life * field.presence;
        material.base_color.set_alpha(alpha);
        material.emissive = LinearRgba::rgb(1.0, 0.55, 0.2) * (alpha * 3.0);
    }

    for (FragmentSprite(index), mut transform) in sprites.iter_mut() {
        match fragments.fragments().get(*index) {
            Some(f) if f.active => {
                *transform = Transform::from_translation(f.position)
                    .with_rotation(f.rotation)
                    .with_scale(Vec3::splat(f.scale));
            }
            _ => transform.translation = park_position(),
        }
    }
}

pub fn kessler_render_system(
    time: Res<Time>,
    cloud: Res<KesslerCloud>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut ring: Query<(&MeshMaterial3d<StandardMaterial>, &mut Transform, &mut Visibility), With<KesslerRing>>,
) {
    for (handle, mut transform, mut visibility) in ring.iter_mut() {
        let wanted = if cloud.opacity > 0.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color.set_alpha(cloud.opacity);
        }
        transform.rotate_local_y(0.01 * time.delta_secs());
    }
}

/// Collision point light and flash sprite: spike at the trigger, exponential
/// decay, zero outside the terminal chapter.
#[allow(clippy::too_many_arguments)]
pub fn flash_system(
    time: Res<Time>,
    config: Res<SceneConfig>,
    timeline: Res<Timeline>,
    machine: Res<CollisionMachine>,
    handles: Res<EffectMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut light: Query<(&mut PointLight, &mut Transform), Without<FlashSprite>>,
    mut sprite: Query<&mut Transform, (With<FlashSprite>, Without<PointLight>)>,
) {
    let t = time.elapsed_secs();
    let active = machine
        .collision()
        .filter(|_| timeline.chapter.is_terminal());
    let intensity = active.map_or(0.0, |c| {
        flash_intensity(config.flash_peak_intensity, config.flash_decay_rate, c.since(t))
    });
    let strength = if config.flash_peak_intensity > 0.0 {
        intensity / config.flash_peak_intensity
    } else {
        0.0
    };

    for (mut point, mut transform) in light.iter_mut() {
        point.intensity = intensity;
        if let Some(c) = active {
            transform.translation = c.point;
        }
    }

    if let Some(material) = materials.get_mut(&handles.flash) {
        material.emissive = linear(config.color_debris_hot) * (40.0 * strength);
        material.base_color.set_alpha(strength);
    }
    for mut transform in sprite.iter_mut() {
        match active {
            Some(c) if strength > 1e-3 => {
                transform.translation = c.point;
                transform.scale = Vec3::splat(0.02 + 0.25 * strength);
            }
            _ => transform.translation = park_position(),
        }
    }
}
