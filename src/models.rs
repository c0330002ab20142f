//! Asynchronous glTF model loading with in-place fallback replacement.
//!
//! Every visual that can come from a model file is spawned first with
//! procedural fallback geometry, so the scene is complete before any load
//! resolves.  Loads run on Bevy's asset task pool; [`poll_model_loads`]
//! watches their [`LoadState`] and, once a mesh arrives, normalizes it (centred
//! on its bounding sphere and rescaled to the target radius) and writes a
//! [`ModelReady`] swap message.  [`apply_model_swaps`] consumes it on the next
//! tick and replaces the `Mesh3d` on every entity of that kind.  The planet
//! also takes the file's first material, so its textures come with it.
//!
//! A missing or broken file is not an error for the scene: the failure is
//! logged once and the fallback stays.

use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

pub const EARTH_MODEL_PATH: &str = "models/earth.glb";
pub const SATELLITE_MODEL_PATH: &str = "models/satellite.glb";

/// Which family of entities a loaded model replaces.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Planet,
    Satellite,
}

impl ModelKind {
    pub fn path(self) -> &'static str {
        match self {
            ModelKind::Planet => EARTH_MODEL_PATH,
            ModelKind::Satellite => SATELLITE_MODEL_PATH,
        }
    }

    /// Bounding-sphere radius the loaded mesh is rescaled to.
    pub fn target_radius(self, config: &SceneConfig) -> f32 {
        match self {
            ModelKind::Planet => config.planet_radius,
            ModelKind::Satellite => config.satellite_model_radius,
        }
    }
}

/// Swap message: the normalized mesh for `kind` is ready.
#[derive(Message, Debug, Clone)]
pub struct ModelReady {
    pub kind: ModelKind,
    pub mesh: Handle<Mesh>,
    /// Material from the same file, when one was requested and loaded.
    pub material: Option<Handle<StandardMaterial>>,
}

#[derive(Debug)]
struct PendingModel {
    kind: ModelKind,
    path: String,
    source: Handle<Mesh>,
    material: Option<Handle<StandardMaterial>>,
}

/// In-flight loads.  Each is attempted exactly once.
#[derive(Resource, Debug, Default)]
pub struct ModelLoads {
    pending: Vec<PendingModel>,
}

impl ModelLoads {
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Start loading the first primitive of `path` as the model for `kind`.
    /// The planet also loads the file's first material.
    pub fn request(&mut self, asset_server: &AssetServer, kind: ModelKind, path: &str) {
        let source = asset_server.load(
            GltfAssetLabel::Primitive {
                mesh: 0,
                primitive: 0,
            }
            .from_asset(path.to_string()),
        );
        let material = (kind == ModelKind::Planet).then(|| {
            asset_server.load(
                GltfAssetLabel::Material {
                    index: 0,
                    is_scale_inverted: false,
                }
                .from_asset(path.to_string()),
            )
        });
        info!("Loading {} model from {path}", kind_name(kind));
        self.pending.push(PendingModel {
            kind,
            path: path.to_string(),
            source,
            material,
        });
    }
}

/// Centre and radius of a bounding sphere around `positions`.
///
/// The centre is the middle of the axis-aligned bounds; the radius is the
/// largest distance from it.  Returns `None` for empty input.
pub fn bounding_sphere(positions: &[[f32; 3]]) -> Option<(Vec3, f32)> {
    let first = Vec3::from_array(*positions.first()?);
    let (min, max) = positions
        .iter()
        .map(|p| Vec3::from_array(*p))
        .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    let center = (min + max) * 0.5;
    let radius = positions
        .iter()
        .map(|p| Vec3::from_array(*p).distance(center))
        .fold(0.0_f32, f32::max);
    Some((center, radius))
}

/// Recentre `mesh` on its bounding sphere and scale it to `target_radius`.
pub fn normalize_mesh(mesh: &Mesh, path: &str, target_radius: f32) -> SceneResult<Mesh> {
    let positions = mesh
        .attribute(Mesh::ATTRIBUTE_POSITION)
        .and_then(|values| values.as_float3())
        .ok_or_else(|| SceneError::MissingGeometry {
            path: path.to_string(),
        })?;
    let (center, radius) = bounding_sphere(positions).ok_or_else(|| SceneError::MissingGeometry {
        path: path.to_string(),
    })?;
    if !radius.is_finite() || radius <= f32::EPSILON {
        return Err(SceneError::DegenerateBounds {
            path: path.to_string(),
        });
    }
    Ok(mesh
        .clone()
        .translated_by(-center)
        .scaled_by(Vec3::splat(target_radius / radius)))
}

/// Startup system: request both model files.
pub fn start_model_loads(asset_server: Res<AssetServer>, mut loads: ResMut<ModelLoads>) {
    for kind in [ModelKind::Planet, ModelKind::Satellite] {
        loads.request(&asset_server, kind, kind.path());
    }
}

fn kind_name(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Planet => "planet",
        ModelKind::Satellite => "satellite",
    }
}

/// Watch pending loads; normalize finished meshes and announce them.
pub fn poll_model_loads(
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut loads: ResMut<ModelLoads>,
    mut ready: MessageWriter<ModelReady>,
) {
    if loads.is_idle() {
        return;
    }
    loads.pending.retain(|pending| {
        let path = pending.path.as_str();
        let outcome = match asset_server.load_state(pending.source.id()) {
            LoadState::Loaded => meshes
                .get(&pending.source)
                .ok_or_else(|| SceneError::MissingGeometry {
                    path: path.to_string(),
                })
                .and_then(|mesh| normalize_mesh(mesh, path, pending.kind.target_radius(&config))),
            LoadState::Failed(err) => Err(SceneError::AssetLoad {
                path: path.to_string(),
                reason: err.to_string(),
            }),
            LoadState::NotLoaded | LoadState::Loading => return true,
        };
        // The material only matters once the mesh is usable.
        let material = match (&outcome, &pending.material) {
            (Ok(_), Some(handle)) => match asset_server.load_state(handle.id()) {
                LoadState::Loaded => Some(handle.clone()),
                LoadState::Failed(err) => {
                    debug!("No material in {path} ({err}); keeping the fallback material");
                    None
                }
                LoadState::NotLoaded | LoadState::Loading => return true,
            },
            _ => None,
        };
        match outcome {
            Ok(mesh) => {
                info!("{} model ready", kind_name(pending.kind));
                ready.write(ModelReady {
                    kind: pending.kind,
                    mesh: meshes.add(mesh),
                    material,
                });
            }
            Err(e) => warn!("{e}; keeping procedural {}", kind_name(pending.kind)),
        }
        false
    });
}

/// Replace the fallback mesh, and material when one came with it, on every
/// entity tagged with the ready kind.
pub fn apply_model_swaps(
    mut ready: MessageReader<ModelReady>,
    mut targets: Query<(
        &ModelKind,
        &mut Mesh3d,
        Option<&mut MeshMaterial3d<StandardMaterial>>,
    )>,
) {
    for swap in ready.read() {
        let mut swapped = 0;
        for (kind, mut mesh, material) in targets.iter_mut() {
            if *kind != swap.kind {
                continue;
            }
            mesh.0 = swap.mesh.clone();
            if let (Some(mut material), Some(loaded)) = (material, swap.material.as_ref()) {
                material.0 = loaded.clone();
            }
            swapped += 1;
        }
        debug!("Swapped {swapped} {} meshes", kind_name(swap.kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_asset::RenderAssetUsages;
    use bevy_mesh::PrimitiveTopology;

    fn mesh_with(positions: Vec<[f32; 3]>) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::all());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh
    }

    #[test]
    fn bounding_sphere_of_offset_box() {
        let (center, radius) =
            bounding_sphere(&[[1.0, 1.0, 1.0], [3.0, 3.0, 3.0], [2.0, 1.0, 3.0]]).expect("non-empty");
        assert_eq!(center, Vec3::splat(2.0));
        assert!((radius - 3f32.sqrt()).abs() < 1e-5);
        assert!(bounding_sphere(&[]).is_none());
    }

    #[test]
    fn normalized_mesh_matches_target_radius() {
        let mesh = mesh_with(vec![[10.0, 0.0, 0.0], [30.0, 0.0, 0.0], [20.0, 5.0, 0.0]]);
        let normalized = normalize_mesh(&mesh, "test.glb", 1.0).expect("valid mesh");
        let positions = normalized
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|a| a.as_float3())
            .expect("positions survive");
        let (center, radius) = bounding_sphere(positions).expect("non-empty");
        assert!(center.length() < 1e-4);
        assert!((radius - 1.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_and_empty_meshes_are_rejected() {
        let point = mesh_with(vec![[1.0, 1.0, 1.0]; 3]);
        assert!(matches!(
            normalize_mesh(&point, "p.glb", 1.0),
            Err(SceneError::DegenerateBounds { .. })
        ));
        let empty = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::all());
        assert!(matches!(
            normalize_mesh(&empty, "e.glb", 1.0),
            Err(SceneError::MissingGeometry { .. })
        ));
    }

    #[test]
    fn swap_replaces_only_matching_kind() {
        let mut app = App::new();
        app.add_message::<ModelReady>()
            .add_systems(Update, apply_model_swaps);
        let fallback = Handle::<Mesh>::default();
        let planet = app
            .world_mut()
            .spawn((ModelKind::Planet, Mesh3d(fallback.clone())))
            .id();
        let sat = app
            .world_mut()
            .spawn((ModelKind::Satellite, Mesh3d(fallback.clone())))
            .id();

        let mut assets = Assets::<Mesh>::default();
        let loaded = assets.add(mesh_with(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]));
        app.world_mut().write_message(ModelReady {
            kind: ModelKind::Satellite,
            mesh: loaded.clone(),
            material: None,
        });
        app.update();

        assert_eq!(app.world().get::<Mesh3d>(sat).map(|m| m.0.id()), Some(loaded.id()));
        assert_eq!(app.world().get::<Mesh3d>(planet).map(|m| m.0.id()), Some(fallback.id()));
    }

    #[test]
    fn planet_swap_carries_the_model_material() {
        let mut app = App::new();
        app.add_message::<ModelReady>()
            .add_systems(Update, apply_model_swaps);
        let mut materials = Assets::<StandardMaterial>::default();
        let fallback_material = materials.add(StandardMaterial::default());
        let textured = materials.add(StandardMaterial {
            perceptual_roughness: 0.4,
            ..Default::default()
        });
        let planet = app
            .world_mut()
            .spawn((
                ModelKind::Planet,
                Mesh3d(Handle::default()),
                MeshMaterial3d(fallback_material.clone()),
            ))
            .id();
        let sat_material = materials.add(StandardMaterial::default());
        let sat = app
            .world_mut()
            .spawn((
                ModelKind::Satellite,
                Mesh3d(Handle::default()),
                MeshMaterial3d(sat_material.clone()),
            ))
            .id();

        let mut meshes = Assets::<Mesh>::default();
        let loaded = meshes.add(mesh_with(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]));
        app.world_mut().write_message(ModelReady {
            kind: ModelKind::Planet,
            mesh: loaded.clone(),
            material: Some(textured.clone()),
        });
        app.update();

        let material_of = |app: &App, e: Entity| {
            app.world()
                .get::<MeshMaterial3d<StandardMaterial>>(e)
                .map(|m| m.0.id())
        };
        assert_eq!(app.world().get::<Mesh3d>(planet).map(|m| m.0.id()), Some(loaded.id()));
        assert_eq!(material_of(&app, planet), Some(textured.id()));
        assert_eq!(material_of(&app, sat), Some(sat_material.id()));
    }

    #[derive(Resource, Default)]
    struct Swaps(usize);

    fn count_swaps(mut ready: MessageReader<ModelReady>, mut swaps: ResMut<Swaps>) {
        swaps.0 += ready.read().count();
    }

    #[test]
    fn missing_model_keeps_the_fallback() {
        use bevy::asset::AssetPlugin;
        use std::time::Duration;

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_resource::<SceneConfig>()
            .init_resource::<ModelLoads>()
            .init_resource::<Swaps>()
            .add_message::<ModelReady>()
            .add_systems(Update, (poll_model_loads, count_swaps, apply_model_swaps).chain());

        let fallback = app
            .world_mut()
            .resource_mut::<Assets<Mesh>>()
            .add(mesh_with(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]));
        let planet = app
            .world_mut()
            .spawn((ModelKind::Planet, Mesh3d(fallback.clone())))
            .id();

        app.world_mut()
            .resource_scope(|world, mut loads: Mut<ModelLoads>| {
                let server = world.resource::<AssetServer>();
                loads.request(server, ModelKind::Planet, "models/does-not-exist.glb");
            });
        assert!(!app.world().resource::<ModelLoads>().is_idle());

        for _ in 0..500 {
            app.update();
            if app.world().resource::<ModelLoads>().is_idle() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(
            app.world().resource::<ModelLoads>().is_idle(),
            "a failed load is attempted once and dropped"
        );

        for _ in 0..3 {
            app.update();
        }
        assert_eq!(app.world().resource::<Swaps>().0, 0);
        assert_eq!(
            app.world().get::<Mesh3d>(planet).map(|m| m.0.id()),
            Some(fallback.id())
        );
    }
}
