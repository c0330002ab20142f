//! Additive starfield material with per-star twinkle.
//!
//! Each star carries its own twinkle rate and phase in `UV_0`, so the whole
//! field stays one mesh and one draw call.
//!
//! | Slot | x          | y                       |
//! |------|------------|-------------------------|
//! | `u`  | scene time | 1 when motion is frozen |

use bevy::pbr::Material;
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::render_resource::AsBindGroup;
use bevy::shader::ShaderRef;

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct StarMaterial {
    #[uniform(0)]
    u: Vec4,
}

impl StarMaterial {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            u: Vec4::new(0.0, if reduced_motion { 1.0 } else { 0.0 }, 0.0, 0.0),
        }
    }

    #[inline]
    pub fn set_time(&mut self, t: f32) {
        self.u.x = t;
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.u.x
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.u.y > 0.5
    }
}

impl Material for StarMaterial {
    fn fragment_shader() -> ShaderRef {
        let path = bevy::asset::embedded_path!("stars.wgsl");
        ShaderRef::from(bevy::asset::AssetPath::from_path_buf(path).with_source("embedded"))
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_time_keeps_the_motion_flag() {
        let mut m = StarMaterial::new(true);
        m.set_time(12.5);
        assert_eq!(m.time(), 12.5);
        assert!(m.is_frozen());
        assert!(!StarMaterial::new(false).is_frozen());
    }
}
