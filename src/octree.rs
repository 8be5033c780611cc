use crate::math::{Aabb, Ray};
use crate::primitive::{HitRecord, Intersectable};

/// Depth/leaf-size thresholds the accelerator is built with. The two
/// presets cover spec.md's instancing accelerator and a general-purpose
/// mesh accelerator; only `Instances` is wired up internally today (mesh
/// intersection is a flat scan per spec.md §4.2) but `Mesh` stays a public,
/// directly buildable preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Instances,
    Mesh,
}

impl Purpose {
    const fn max_depth(self) -> usize {
        match self {
            Purpose::Instances => 5,
            Purpose::Mesh => 35,
        }
    }

    const fn min_primitives(self) -> usize {
        match self {
            Purpose::Instances => 4,
            Purpose::Mesh => 20,
        }
    }
}

/// One node in the arena. Leaves carry the indices (into the original
/// items slice) that overlap their box; a primitive straddling multiple
/// octants is duplicated into each one it overlaps.
struct Node {
    bbox: Aabb,
    children: Option<[usize; 8]>,
    primitives: Vec<usize>,
}

/// An arena-of-indices octree built once over a borrowed items slice and
/// re-walked against that same slice on every query. Node 0 is always the
/// root.
pub struct Octree {
    nodes: Vec<Node>,
}

impl Octree {
    pub fn build<T: Intersectable>(purpose: Purpose, items: &[T]) -> Self {
        let mut bbox = Aabb::empty();
        for item in items {
            item.expand_box(&mut bbox);
        }
        let all: Vec<usize> = (0..items.len()).collect();

        let mut nodes = Vec::new();
        Self::build_node(&mut nodes, items, bbox, all, 0, purpose);
        Octree { nodes }
    }

    /// Pushes the subtree rooted at `bbox`/`indices` into `nodes` and
    /// returns its index. Stops subdividing at `min_primitives` or at
    /// `max_depth`. A child octant that fails to separate anything from
    /// its parent (it would inherit every one of the parent's primitives)
    /// is forced to become a leaf immediately — by recursing into it one
    /// past `max_depth` — without that failure stopping the other seven
    /// octants from subdividing normally.
    fn build_node<T: Intersectable>(
        nodes: &mut Vec<Node>,
        items: &[T],
        bbox: Aabb,
        indices: Vec<usize>,
        depth: usize,
        purpose: Purpose,
    ) -> usize {
        if indices.len() <= purpose.min_primitives() || depth >= purpose.max_depth() {
            nodes.push(Node {
                bbox,
                children: None,
                primitives: indices,
            });
            return nodes.len() - 1;
        }

        let octants = bbox.oct_split();
        let mut buckets: [Vec<usize>; 8] = Default::default();
        for &idx in &indices {
            for (o, bucket) in octants.iter().zip(buckets.iter_mut()) {
                if items[idx].box_intersect(o) {
                    bucket.push(idx);
                }
            }
        }

        let this_idx = nodes.len();
        nodes.push(Node {
            bbox,
            children: None,
            primitives: Vec::new(),
        });

        let mut children = [0usize; 8];
        for (i, (o, bucket)) in octants.into_iter().zip(buckets.into_iter()).enumerate() {
            let child_depth = if bucket.len() == indices.len() {
                purpose.max_depth() + 1
            } else {
                depth + 1
            };
            children[i] = Self::build_node(nodes, items, o, bucket, child_depth, purpose);
        }
        nodes[this_idx].children = Some(children);
        this_idx
    }

    /// Walks the tree, recursing only into children whose box the ray
    /// crosses, and keeps the closest hit seen across (possibly repeated)
    /// leaf visits of a straddling primitive.
    pub fn intersect<'a, T: Intersectable>(
        &self,
        items: &'a [T],
        ray: &Ray,
        t_min: f64,
        t_max: f64,
    ) -> Option<HitRecord<'a>> {
        self.intersect_node(0, items, ray, t_min, t_max)
    }

    fn intersect_node<'a, T: Intersectable>(
        &self,
        node_idx: usize,
        items: &'a [T],
        ray: &Ray,
        t_min: f64,
        t_max: f64,
    ) -> Option<HitRecord<'a>> {
        let node = &self.nodes[node_idx];
        if !node.bbox.hit(ray) {
            return None;
        }

        let mut closest = t_max;
        let mut best = None;

        match &node.children {
            Some(children) => {
                for &child in children {
                    if let Some(hit) = self.intersect_node(child, items, ray, t_min, closest) {
                        closest = hit.t;
                        best = Some(hit);
                    }
                }
            }
            None => {
                for &idx in &node.primitives {
                    if let Some(hit) = items[idx].intersect(ray, t_min, closest) {
                        closest = hit.t;
                        best = Some(hit);
                    }
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::math::{Color, Point3, Vec3};
    use crate::primitive::Sphere;

    fn spheres_along_x(n: usize) -> Vec<Sphere> {
        (0..n)
            .map(|i| {
                Sphere::new(
                    Point3::new(i as f64 * 5.0, 0.0, 0.0),
                    1.0,
                    Material::lambert(Color::new(0.5, 0.5, 0.5)),
                )
            })
            .collect()
    }

    #[test]
    fn octree_finds_same_hit_as_linear_scan() {
        let spheres = spheres_along_x(64);
        let tree = Octree::build(Purpose::Instances, &spheres);

        let ray = Ray::new(
            Point3::new(30.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
        );

        let mut closest = f64::INFINITY;
        let mut linear = None;
        for sphere in &spheres {
            if let Some(hit) = sphere.intersect(&ray, 0.001, closest) {
                closest = hit.t;
                linear = Some(hit.t);
            }
        }

        let accel = tree
            .intersect(&spheres, &ray, 0.001, f64::INFINITY)
            .map(|h| h.t);
        assert_eq!(linear, accel);
    }

    #[test]
    fn octree_miss_matches_linear_scan_miss() {
        let spheres = spheres_along_x(16);
        let tree = Octree::build(Purpose::Instances, &spheres);
        let ray = Ray::new(Point3::new(0.0, 100.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(tree.intersect(&spheres, &ray, 0.001, f64::INFINITY).is_none());
    }

    #[test]
    fn build_terminates_for_coincident_primitives() {
        // All spheres share the same bounding box, so every one of the 8
        // children's buckets inherits the full parent set: each child is
        // forced to an immediate leaf rather than recursing forever. The
        // root still splits once, giving 1 root + 8 leaf children.
        let spheres: Vec<Sphere> = (0..10)
            .map(|_| Sphere::new(Point3::zero(), 1.0, Material::lambert(Color::ones())))
            .collect();
        let tree = Octree::build(Purpose::Instances, &spheres);
        assert_eq!(tree.nodes.len(), 9);
        assert!(tree.nodes[1..].iter().all(|n| n.children.is_none()));
    }
}
