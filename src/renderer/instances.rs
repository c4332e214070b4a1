//! Scene assembly: turns `SceneState` into per-mesh instance batches and
//! the light rig. No GPU calls here.

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::shapes;
use super::vertex::{InstanceRaw, Material, Vertex, colors};
use crate::sim::tree::{
    STAND_BOTTOM_RADIUS, STAND_HEIGHT, STAND_POSITION, STAND_TOP_RADIUS, TREE_LAYERS,
};
use crate::sim::{SceneState, ShapeVariant, star_rotation, star_transform, tree_transform};

/// Radius of a gold dust mote before its pulse scale
pub const DUST_RADIUS: f32 = 0.08;
/// Radius of a background star at full brightness
pub const STAR_SIZE: f32 = 0.3;
/// Floor plane
pub const FLOOR_Y: f32 = -1.0;
pub const FLOOR_SIZE: f32 = 50.0;

/// Meshes the scene is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Cone,
    Sphere,
    Octahedron,
    Dodecahedron,
    Stand,
    Plane,
}

impl MeshKind {
    pub const ALL: [MeshKind; 6] = [
        MeshKind::Cone,
        MeshKind::Sphere,
        MeshKind::Octahedron,
        MeshKind::Dodecahedron,
        MeshKind::Stand,
        MeshKind::Plane,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn vertices(self) -> Vec<Vertex> {
        match self {
            MeshKind::Cone => shapes::cone(64, true),
            MeshKind::Sphere => shapes::uv_sphere(32, 32),
            MeshKind::Octahedron => shapes::octahedron(),
            MeshKind::Dodecahedron => shapes::dodecahedron(),
            MeshKind::Stand => shapes::cylinder(STAND_TOP_RADIUS, STAND_BOTTOM_RADIUS, 8),
            MeshKind::Plane => shapes::plane(),
        }
    }
}

impl From<ShapeVariant> for MeshKind {
    fn from(shape: ShapeVariant) -> Self {
        match shape {
            ShapeVariant::Sphere => MeshKind::Sphere,
            ShapeVariant::Polyhedron => MeshKind::Octahedron,
        }
    }
}

/// Instances grouped by mesh, in `MeshKind::ALL` order
#[derive(Debug, Clone, Default)]
pub struct SceneInstances {
    batches: [Vec<InstanceRaw>; 6],
}

impl SceneInstances {
    pub fn push(&mut self, kind: MeshKind, instance: InstanceRaw) {
        self.batches[kind.index()].push(instance);
    }

    pub fn batch(&self, kind: MeshKind) -> &[InstanceRaw] {
        &self.batches[kind.index()]
    }

    pub fn total(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.batches.iter_mut().for_each(Vec::clear);
    }

    /// All instances back to back, with each batch's range
    pub fn flatten(&self, out: &mut Vec<InstanceRaw>) -> [std::ops::Range<u32>; 6] {
        out.clear();
        MeshKind::ALL.map(|kind| {
            let start = out.len() as u32;
            out.extend_from_slice(self.batch(kind));
            start..out.len() as u32
        })
    }
}

mod materials {
    use super::*;

    pub fn foliage() -> Material {
        Material {
            color: colors::hex(colors::EMERALD),
            emissive: [0.0; 3],
            metalness: 0.4,
            roughness: 0.3,
        }
    }

    pub fn gold() -> Material {
        Material {
            color: colors::hex(colors::GOLD),
            emissive: [0.0; 3],
            metalness: 1.0,
            roughness: 0.1,
        }
    }

    pub fn star() -> Material {
        Material {
            color: colors::hex(colors::STAR_CORE),
            emissive: colors::scaled(colors::hex(colors::STAR_GLOW), 2.0),
            metalness: 0.0,
            roughness: 0.5,
        }
    }

    pub fn stand() -> Material {
        Material {
            color: colors::hex(colors::STAND),
            emissive: [0.0; 3],
            metalness: 0.8,
            roughness: 0.2,
        }
    }

    pub fn floor() -> Material {
        Material {
            color: colors::hex(colors::FLOOR),
            emissive: [0.0; 3],
            metalness: 0.9,
            roughness: 0.05,
        }
    }

    pub fn sky_star(brightness: f32) -> Material {
        Material {
            color: [0.0; 3],
            emissive: [brightness; 3],
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

fn euler(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

/// Build every instance for the current frame
pub fn build_instances(state: &SceneState, out: &mut SceneInstances) {
    out.clear();
    let tree = tree_transform(state.spin.angle);

    let foliage = materials::foliage();
    for layer in &TREE_LAYERS {
        out.push(MeshKind::Cone, foliage.instance(tree * layer.transform()));
    }

    // Ornaments float inside their own group at the tree origin, so the bob
    // sways them around the trunk as well as lifting them
    let gold = materials::gold();
    for (ornament, float) in state.ornaments.iter().zip(&state.ornament_float) {
        let (lift, rotation) = float.sample(state.elapsed);
        let group = Mat4::from_rotation_translation(euler(rotation), Vec3::new(0.0, lift, 0.0));
        let local = Mat4::from_scale_rotation_translation(
            Vec3::splat(ornament.scale),
            Quat::IDENTITY,
            ornament.position,
        );
        out.push(ornament.shape.into(), gold.instance(tree * group * local));
    }

    out.push(
        MeshKind::Octahedron,
        materials::star().instance(tree * star_transform(star_rotation(state.elapsed))),
    );

    out.push(
        MeshKind::Stand,
        materials::stand().instance(
            tree * Mat4::from_scale_rotation_translation(
                Vec3::new(1.0, STAND_HEIGHT, 1.0),
                Quat::IDENTITY,
                STAND_POSITION,
            ),
        ),
    );

    out.push(
        MeshKind::Plane,
        materials::floor().instance(Mat4::from_scale_rotation_translation(
            Vec3::new(FLOOR_SIZE, 1.0, FLOOR_SIZE),
            Quat::IDENTITY,
            Vec3::new(0.0, FLOOR_Y, 0.0),
        )),
    );

    let dust = gold.with_emissive(colors::scaled(colors::hex(colors::GOLD), 0.5));
    for particle in &state.particles {
        out.push(
            MeshKind::Dodecahedron,
            dust.instance(Mat4::from_scale_rotation_translation(
                Vec3::splat(DUST_RADIUS * particle.scale),
                euler(particle.rotation),
                particle.position,
            )),
        );
    }

    for star in &state.stars {
        out.push(
            MeshKind::Octahedron,
            materials::sky_star(star.brightness).instance(Mat4::from_scale_rotation_translation(
                Vec3::splat(STAR_SIZE * star.brightness),
                Quat::IDENTITY,
                star.position,
            )),
        );
    }
}
