use std::sync::Arc;

use crate::camera::{Camera, CameraConfig};
use crate::material::Material;
use crate::math::*;
use crate::primitive::{Instance, Instancer, Primitive, TriangleMesh};

/// A complete scene: a camera and a root primitive. The root is always an
/// `Instancer` wrapping the scene's top-level primitives at identity
/// offset/scale — exactly the "instancer wrapping the scene" the render
/// loop hands every primary ray to.
pub struct Scene {
    pub root: Instancer,
    pub camera: Camera,
}

impl Scene {
    /// `camera_config.aspect_ratio` should already match the render's
    /// `width / height` before this is called.
    pub fn new(primitives: Vec<Primitive>, camera_config: CameraConfig) -> Self {
        let instances = primitives
            .into_iter()
            .map(|p| Instance::new(Arc::new(p), Vec3::zero()))
            .collect();
        Scene {
            root: Instancer::new(instances),
            camera: Camera::new(&camera_config),
        }
    }
}

/// The fixed set of built-in scene constructors selectable from the CLI.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// Diffuse, metal, and glass spheres over a single large ground sphere.
    Showcase,
    /// One reflective sphere on a ground sphere — useful for quick checks.
    Minimal,
    /// Showcase spheres plus every loaded mesh, instanced twice.
    Gallery,
}

impl ScenePreset {
    pub fn build(self, camera: CameraConfig, meshes: Vec<TriangleMesh>) -> Scene {
        match self {
            ScenePreset::Showcase => build_showcase(camera),
            ScenePreset::Minimal => build_minimal(camera),
            ScenePreset::Gallery => build_gallery(camera, meshes),
        }
    }
}

fn ground(radius: f64, albedo: Color) -> Primitive {
    Primitive::Sphere(crate::primitive::Sphere::new(
        Point3::new(0.0, -radius, 0.0),
        radius,
        Material::lambert(albedo),
    ))
}

fn build_showcase(camera: CameraConfig) -> Scene {
    let mut primitives = vec![ground(1000.0, Color::new(0.5, 0.5, 0.5))];

    primitives.push(Primitive::Sphere(crate::primitive::Sphere::new(
        Point3::new(-2.2, 1.0, 0.0),
        1.0,
        Material::lambert(Color::new(0.6, 0.2, 0.2)),
    )));
    primitives.push(Primitive::Sphere(crate::primitive::Sphere::new(
        Point3::zero(),
        1.0,
        Material::dielectric(1.5),
    )));
    primitives.push(Primitive::Sphere(crate::primitive::Sphere::new(
        Point3::new(2.2, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    )));

    Scene::new(primitives, camera)
}

fn build_minimal(camera: CameraConfig) -> Scene {
    let primitives = vec![
        ground(1000.0, Color::new(0.5, 0.5, 0.5)),
        Primitive::Sphere(crate::primitive::Sphere::new(
            Point3::new(0.0, 1.0, 0.0),
            1.0,
            Material::metal(Color::new(0.8, 0.8, 0.8), 0.05),
        )),
    ];
    Scene::new(primitives, camera)
}

fn build_gallery(camera: CameraConfig, meshes: Vec<TriangleMesh>) -> Scene {
    let mut primitives = vec![ground(1000.0, Color::new(0.4, 0.45, 0.4))];
    primitives.push(Primitive::Sphere(crate::primitive::Sphere::new(
        Point3::new(-2.2, 1.0, 0.0),
        1.0,
        Material::lambert(Color::new(0.2, 0.3, 0.6)),
    )));
    primitives.push(Primitive::Sphere(crate::primitive::Sphere::new(
        Point3::new(2.2, 1.0, 0.0),
        1.0,
        Material::dielectric(1.5),
    )));

    if !meshes.is_empty() {
        if meshes.len() > 1 {
            log::warn!(
                "gallery scene only instances the first of {} loaded meshes; discarding the rest",
                meshes.len()
            );
        }
        let mesh_primitive = Arc::new(Primitive::Mesh(
            meshes
                .into_iter()
                .next()
                .expect("checked non-empty above"),
        ));
        let instances = vec![
            Instance::new(mesh_primitive.clone(), Vec3::new(0.0, 0.0, -2.0)),
            Instance::new(mesh_primitive, Vec3::new(0.0, 0.0, 2.0)).with_scale(1.5),
        ];
        primitives.push(Primitive::Instancer(Instancer::new(instances)));
    }

    Scene::new(primitives, camera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Intersectable;

    #[test]
    fn minimal_scene_root_hits_ground_sphere() {
        let scene = build_minimal(CameraConfig::default());
        scene.root.on_before_render();
        let ray = Ray::new(Point3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = scene.root.intersect(&ray, 0.001, f64::INFINITY);
        assert!(hit.is_some());
    }

    #[test]
    fn showcase_scene_has_four_top_level_primitives() {
        let scene = build_showcase(CameraConfig::default());
        assert_eq!(scene.root.instances.len(), 4);
    }
}
