use crate::material::Material;
use crate::math::*;
use crate::octree::{Octree, Purpose};
use std::sync::{Arc, OnceLock};

/// Below this many instances an `Instancer` falls back to a linear scan
/// gated by a root-box rejection instead of building an octree.
const INSTANCER_ACCEL_THRESHOLD: usize = 50;

// ─── Hit Record ─────────────────────────────────────────────────────────────

/// `t`, hit point, surface normal, and a non-owning reference to the
/// material at the hit — exactly the data model spec.md §3 names.
pub struct HitRecord<'a> {
    pub t: f64,
    pub point: Point3,
    pub normal: Vec3,
    pub front_face: bool,
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    /// `front_face` is the sign of `dot(ray.direction, outward_normal)`;
    /// `normal` always points against the incoming ray.
    pub fn oriented(
        ray: &Ray,
        t: f64,
        point: Point3,
        outward_normal: Vec3,
        material: &'a Material,
    ) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            t,
            point,
            normal,
            front_face,
            material,
        }
    }
}

// ─── Capability set every primitive exposes ────────────────────────────────

/// `{intersect, boxIntersect, expandBox}` from spec.md §4.2. Implementors
/// only need `intersect` and `bounding_box`; `box_intersect`/`expand_box`
/// have AABB-vs-AABB default implementations.
pub trait Intersectable {
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>>;

    fn bounding_box(&self) -> Aabb;

    fn box_intersect(&self, b: &Aabb) -> bool {
        !self.bounding_box().intersection(b).is_empty()
    }

    fn expand_box(&self, b: &mut Aabb) {
        b.add_box(&self.bounding_box());
    }
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub const fn new(center: Point3, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Intersectable for Sphere {
    /// Solves `a t² + b t + c = 0` and reports only the nearer root — the
    /// far root is never tried, so rays starting inside the sphere miss
    /// (spec.md §9 open question 1, preserved deliberately).
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * oc.dot(ray.direction);
        let c = oc.dot(oc) - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = (-b - discriminant.sqrt()) / (2.0 * a);
        if root <= t_min || root >= t_max {
            return None;
        }

        let point = ray.at(root);
        let outward_normal = (point - self.center) / self.radius;
        Some(HitRecord::oriented(
            ray,
            root,
            point,
            outward_normal,
            &self.material,
        ))
    }

    fn bounding_box(&self) -> Aabb {
        let r = Vec3::new(self.radius.abs(), self.radius.abs(), self.radius.abs());
        Aabb::new(self.center - r, self.center + r)
    }
}

// ─── Triangle Mesh ──────────────────────────────────────────────────────────

/// A triangle face as indices into the mesh's shared vertex array.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub indices: [u32; 3],
}

pub struct TriangleMesh {
    pub vertices: Arc<Vec<Point3>>,
    pub faces: Vec<Face>,
    pub material: Material,
    bbox: Aabb,
}

impl TriangleMesh {
    pub fn new(vertices: Arc<Vec<Point3>>, faces: Vec<Face>, material: Material) -> Self {
        let mut bbox = Aabb::empty();
        for f in &faces {
            for &idx in &f.indices {
                bbox.add_point(vertices[idx as usize]);
            }
        }
        Self {
            vertices,
            faces,
            material,
            bbox,
        }
    }

    /// Möller–Trumbore-equivalent test using the `M = cross(AB, AC)` form
    /// from spec.md §4.2. `t_max` is the mesh's running closest hit, used
    /// as this face's own cutoff — not the caller's `hit.t`.
    fn intersect_triangle(&self, ray: &Ray, face: &Face, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let a = self.vertices[face.indices[0] as usize];
        let b = self.vertices[face.indices[1] as usize];
        let c = self.vertices[face.indices[2] as usize];

        let ab = b - a;
        let ac = c - a;
        let n = ab.cross(ac).normalized();

        if ray.direction.dot(n) > 0.0 {
            return None;
        }

        let m = ab.cross(ac);
        let dcr = -m.dot(ray.direction);
        if dcr.abs() < 1e-12 {
            return None;
        }

        let h = ray.origin - a;
        let t = m.dot(h) / dcr;
        if t <= t_min || t >= t_max {
            return None;
        }

        let h_cross_d = h.cross(ray.direction);
        let beta = h_cross_d.dot(ac) / dcr;
        if beta < 0.0 {
            return None;
        }
        let gamma = -ab.dot(h_cross_d) / dcr;
        if gamma < 0.0 || beta + gamma > 1.0 {
            return None;
        }

        let point = ray.at(t);
        Some(HitRecord::oriented(ray, t, point, n, &self.material))
    }
}

impl Intersectable for TriangleMesh {
    /// Linear scan over all faces, updating the closest hit. Still linear
    /// within a leaf when embedded in an octree — the mesh is never itself
    /// further subdivided.
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut closest = t_max;
        let mut best = None;
        for face in &self.faces {
            if let Some(hit) = self.intersect_triangle(ray, face, t_min, closest) {
                closest = hit.t;
                best = Some(hit);
            }
        }
        best
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

// ─── Instance & Instancer ───────────────────────────────────────────────────

/// A shared reference to a primitive with a per-reference translation,
/// uniform scale, and optional overriding material.
pub struct Instance {
    pub primitive: Arc<Primitive>,
    pub offset: Vec3,
    pub scale: f64,
    pub material_override: Option<Material>,
}

impl Instance {
    pub fn new(primitive: Arc<Primitive>, offset: Vec3) -> Self {
        Self {
            primitive,
            offset,
            scale: 1.0,
            material_override: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material_override = Some(material);
        self
    }
}

impl Intersectable for Instance {
    /// Transforms into the instance's local frame by `(o - offset)/scale`,
    /// leaving direction unchanged (scale is uniform so direction stays
    /// unit). The hit returned is reported in local space — the world-space
    /// point/normal are never transformed back (spec.md §9 open question 2,
    /// preserved deliberately).
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let local = Ray::new((ray.origin - self.offset) / self.scale, ray.direction);
        let mut hit = self.primitive.intersect(&local, t_min, t_max)?;
        if let Some(material) = &self.material_override {
            hit.material = material;
        }
        Some(hit)
    }

    fn bounding_box(&self) -> Aabb {
        let inner = self.primitive.bounding_box();
        Aabb::new(
            inner.min * self.scale + self.offset,
            inner.max * self.scale + self.offset,
        )
    }
}

pub struct Instancer {
    pub instances: Vec<Instance>,
    bbox: Aabb,
    accelerator: OnceLock<Octree>,
}

impl Instancer {
    pub fn new(instances: Vec<Instance>) -> Self {
        let mut bbox = Aabb::empty();
        for inst in &instances {
            inst.expand_box(&mut bbox);
        }
        Self {
            instances,
            bbox,
            accelerator: OnceLock::new(),
        }
    }

    /// Builds the internal octree on first call if the instance count meets
    /// the threshold; a no-op below it or on subsequent calls (idempotent —
    /// `OnceLock` only ever runs the initializer once).
    pub fn on_before_render(&self) {
        if self.instances.len() >= INSTANCER_ACCEL_THRESHOLD {
            self.accelerator
                .get_or_init(|| Octree::build(Purpose::Instances, &self.instances));
        }
    }

    fn accelerator(&self) -> Option<&Octree> {
        if self.instances.len() >= INSTANCER_ACCEL_THRESHOLD {
            Some(
                self.accelerator
                    .get_or_init(|| Octree::build(Purpose::Instances, &self.instances)),
            )
        } else {
            None
        }
    }
}

impl Intersectable for Instancer {
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        if let Some(tree) = self.accelerator() {
            return tree.intersect(&self.instances, ray, t_min, t_max);
        }

        if !self.bbox.hit(ray) {
            return None;
        }
        let mut closest = t_max;
        let mut best = None;
        for inst in &self.instances {
            if let Some(hit) = inst.intersect(ray, t_min, closest) {
                closest = hit.t;
                best = Some(hit);
            }
        }
        best
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

// ─── Tagged primitive sum ───────────────────────────────────────────────────

pub enum Primitive {
    Sphere(Sphere),
    Mesh(TriangleMesh),
    Instancer(Instancer),
}

impl Intersectable for Primitive {
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        match self {
            Primitive::Sphere(s) => s.intersect(ray, t_min, t_max),
            Primitive::Mesh(m) => m.intersect(ray, t_min, t_max),
            Primitive::Instancer(i) => i.intersect(ray, t_min, t_max),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Mesh(m) => m.bounding_box(),
            Primitive::Instancer(i) => i.bounding_box(),
        }
    }
}
