use crate::math::*;

/// A pinhole camera: no aperture, no depth of field. Constructs an
/// orthonormal basis from the look-at parameters, then maps normalized
/// image coordinates to primary ray directions through a virtual film
/// plane one unit in front of the eye.
///
///   h   = tan(vfov / 2)
///   w   = aspectRatio * h
///   fwd = normalize(origin - target)
///   right = normalize(cross(worldUp, fwd))
///   up    = cross(fwd, right)
///   lowerLeft = origin - w*right - h*up - fwd
pub struct Camera {
    origin: Point3,
    lower_left: Point3,
    horizontal: Vec3,
    vertical: Vec3,
}

pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3,
    pub vfov_degrees: f64,
    pub aspect_ratio: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let theta = config.vfov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        let w = config.aspect_ratio * h;

        let fwd = (config.look_from - config.look_at).normalized();
        let right = config.vup.cross(fwd).normalized();
        let up = fwd.cross(right);

        let horizontal = right * (2.0 * w);
        let vertical = up * (2.0 * h);
        let lower_left = config.look_from - horizontal / 2.0 - vertical / 2.0 - fwd;

        Camera {
            origin: config.look_from,
            lower_left,
            horizontal,
            vertical,
        }
    }

    /// Generates the primary ray for normalized film coordinates `(s, t)`
    /// in `[0, 1]²`; no lens jitter, so the same `(s, t)` always yields the
    /// same ray.
    pub fn get_ray(&self, s: f64, t: f64) -> Ray {
        let target = self.lower_left + self.horizontal * s + self.vertical * t;
        Ray::new(self.origin, (target - self.origin).normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_points_at_look_at_direction() {
        let config = CameraConfig {
            look_from: Point3::new(0.0, 0.0, 5.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 90.0,
            aspect_ratio: 1.0,
        };
        let camera = Camera::new(&config);
        let ray = camera.get_ray(0.5, 0.5);
        let expected = (config.look_at - config.look_from).normalized();
        assert!((ray.direction - expected).length() < 1e-6);
    }

    #[test]
    fn get_ray_is_deterministic_for_the_same_coordinates() {
        let camera = Camera::new(&CameraConfig::default());
        let a = camera.get_ray(0.25, 0.75);
        let b = camera.get_ray(0.25, 0.75);
        assert_eq!(a.origin, b.origin);
        assert!((a.direction - b.direction).length() < 1e-12);
    }

    #[test]
    fn sphere_at_origin_is_hit_at_exact_distance() {
        use crate::material::Material;
        use crate::primitive::{Intersectable, Sphere};

        let config = CameraConfig {
            look_from: Point3::new(0.0, 0.0, 4.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 1.0,
        };
        let camera = Camera::new(&config);
        let ray = camera.get_ray(0.5, 0.5);
        let sphere = Sphere::new(Point3::zero(), 1.0, Material::lambert(Color::ones()));
        let hit = sphere.intersect(&ray, 0.001, f64::INFINITY).expect("center ray hits sphere");
        assert!((hit.t - 3.0).abs() < 1e-6);
    }
}
