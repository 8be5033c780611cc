use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// A 3-component vector used for positions, directions, and colors.
///
/// Implements the usual pointwise arithmetic plus the geometric utilities
/// (dot, cross, reflect, refract) the intersection pipeline and material
/// model build on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector. Debug-asserts on a near-zero length rather
    /// than propagating an error — callers are expected to never normalize
    /// a degenerate vector.
    #[inline(always)]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "attempted to normalize a zero-length vector");
        self / len
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Specular reflection of `self` about the surface normal `n`: I - 2(I·N)N.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Snell's law refraction at `eta_ratio` (incident IOR / transmitted IOR).
    /// Returns `None` on total internal reflection.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: f64) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_perp = (self + normal * cos_theta) * eta_ratio;
        let discriminant = 1.0 - r_perp.length_squared();
        if discriminant < 0.0 {
            return None;
        }
        let r_parallel = normal * -(discriminant.sqrt());
        Some(r_perp + r_parallel)
    }

    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    #[inline(always)]
    pub fn saturate(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    /// Gamma-correct by square root per channel (γ ≈ 2.2 approximation).
    #[inline(always)]
    pub fn gamma_correct(self) -> Self {
        Self::new(self.x.sqrt(), self.y.sqrt(), self.z.sqrt())
    }

    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: f64 = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    /// Quantizes a saturated [0,1] color to 8-bit RGB for the PNG collaborator.
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.saturate();
        [
            (c.x * 255.0).floor() as u8,
            (c.y * 255.0).floor() as u8,
            (c.z * 255.0).floor() as u8,
        ]
    }

    /// Rejection-samples a point inside the unit ball. Expected iteration
    /// count is ≈1.9; there is intentionally no iteration bound.
    pub fn random_in_unit_sphere(rng: &mut dyn rand::RngCore) -> Self {
        use rand::Rng;
        loop {
            let v = Self::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }

    pub fn random_unit_vector(rng: &mut dyn rand::RngCore) -> Self {
        Self::random_in_unit_sphere(rng).normalized()
    }
}

/// A per-thread uniform draw in `[0, 0.9999]`, matching the fixed upper
/// bound of the original sampler (avoids ever landing exactly on 1.0).
pub fn rand_float(rng: &mut dyn rand::RngCore) -> f64 {
    use rand::Rng;
    rng.gen_range(0.0..0.9999)
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<f64> for Vec3 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of bounds: {i}"),
        }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray `R(t) = origin + t · direction`. `direction` must be
/// unit length; debug builds assert it, release builds trust the caller
/// (spec.md §7 item 5).
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    #[inline(always)]
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        debug_assert!(
            (direction.length() - 1.0).abs() < 1e-3,
            "Ray direction must be unit length"
        );
        Self { origin, direction }
    }

    #[inline(always)]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Axis-Aligned Bounding Box ──────────────────────────────────────────────

/// An axis-aligned bounding box. Empty iff any `min` component exceeds the
/// matching `max` component.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub const fn empty() -> Self {
        Self::new(
            Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expands the box to include `point`.
    pub fn add_point(&mut self, point: Point3) {
        self.min = Point3::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Point3::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    /// Expands the box to include `other`.
    pub fn add_box(&mut self, other: &Aabb) {
        self.add_point(other.min);
        self.add_point(other.max);
    }

    /// Returns the overlap of `self` and `other`; possibly empty.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        )
    }

    /// Splits the box into 8 equal-volume octants about its centroid, in a
    /// fixed canonical order (bit 0 = x half, bit 1 = y half, bit 2 = z half).
    pub fn oct_split(&self) -> [Aabb; 8] {
        let center = Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        );
        let mut children = [Aabb::empty(); 8];
        for (i, child) in children.iter_mut().enumerate() {
            let lo_x = i & 1 == 0;
            let lo_y = i & 2 == 0;
            let lo_z = i & 4 == 0;
            let min = Point3::new(
                if lo_x { self.min.x } else { center.x },
                if lo_y { self.min.y } else { center.y },
                if lo_z { self.min.z } else { center.z },
            );
            let max = Point3::new(
                if lo_x { center.x } else { self.max.x },
                if lo_y { center.y } else { self.max.y },
                if lo_z { center.z } else { self.max.z },
            );
            *child = Aabb::new(min, max);
        }
        children
    }

    /// Slab test. Returns whether the ray enters the box at any `t ≥ 0`;
    /// does not report entry/exit parameters.
    pub fn hit(&self, ray: &Ray) -> bool {
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max < t_min {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_hit_implies_ray_crosses_box() {
        let b = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let hits = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.hit(&hits));
        let misses = Ray::new(Point3::new(10.0, 10.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!b.hit(&misses));
    }

    #[test]
    fn box_behind_ray_origin_is_missed() {
        let b = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        // Box is entirely behind the ray origin along +z; t would be negative.
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!b.hit(&ray));
    }

    #[test]
    fn oct_split_partitions_volume_exactly() {
        let b = Aabb::new(Point3::zero(), Point3::new(2.0, 2.0, 2.0));
        let children = b.oct_split();
        let total: f64 = children
            .iter()
            .map(|c| (c.max.x - c.min.x) * (c.max.y - c.min.y) * (c.max.z - c.min.z))
            .sum();
        let full = (b.max.x - b.min.x) * (b.max.y - b.min.y) * (b.max.z - b.min.z);
        assert!((total - full).abs() < 1e-9);
    }

    #[test]
    fn add_point_expands_empty_box() {
        let mut b = Aabb::empty();
        b.add_point(Point3::new(1.0, -2.0, 3.0));
        b.add_point(Point3::new(-1.0, 2.0, -3.0));
        assert_eq!(b.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(b.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn intersection_of_disjoint_boxes_is_empty() {
        let a = Aabb::new(Point3::zero(), Point3::ones());
        let b = Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn reflect_and_refract_are_consistent_at_normal_incidence() {
        let d = Vec3::new(0.0, -1.0, 0.0);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let r = d.reflect(n);
        assert!((r - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-9);
        let refracted = d.refract(n, 1.0).unwrap();
        assert!((refracted - d).length() < 1e-9);
    }
}
