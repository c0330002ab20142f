//! Rim-lit translucent shell material for the atmosphere.
//!
//! All parameters are packed into one uniform array so the bind group stays
//! within the smallest per-stage uniform limits:
//!
//! | Slot   | xyz              | w          |
//! |--------|------------------|------------|
//! | `u[0]` | tint (linear)    | opacity    |
//! | `u[1]` | unused           | rim falloff exponent |

use bevy::pbr::Material;
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::render_resource::AsBindGroup;
use bevy::shader::ShaderRef;

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct AtmosphereMaterial {
    #[uniform(0)]
    u: [Vec4; 2],
}

impl AtmosphereMaterial {
    pub fn new(tint: LinearRgba, opacity: f32, falloff: f32) -> Self {
        Self {
            u: [
                Vec4::new(tint.red, tint.green, tint.blue, opacity),
                Vec4::new(0.0, 0.0, 0.0, falloff),
            ],
        }
    }

    pub fn set_tint(&mut self, tint: LinearRgba) {
        self.u[0].x = tint.red;
        self.u[0].y = tint.green;
        self.u[0].z = tint.blue;
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.u[0].w
    }

    #[inline]
    pub fn falloff(&self) -> f32 {
        self.u[1].w
    }
}

impl Material for AtmosphereMaterial {
    fn fragment_shader() -> ShaderRef {
        let path = bevy::asset::embedded_path!("atmosphere.wgsl");
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
    fn set_tint_keeps_opacity_and_falloff() {
        let mut m = AtmosphereMaterial::new(LinearRgba::BLUE, 0.3, 2.5);
        m.set_tint(LinearRgba::RED);
        assert_eq!(m.opacity(), 0.3);
        assert_eq!(m.falloff(), 2.5);
        assert_eq!(m.u[0].x, 1.0);
    }
}
