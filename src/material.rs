use crate::math::*;
use crate::primitive::HitRecord;
use rand::Rng;

/// The three shading models the intersection pipeline can hand a ray to.
/// Modeled as a closed sum rather than a trait object: the set is fixed by
/// spec, and a `match` dispatches statically instead of through a vtable.
#[derive(Debug, Clone)]
pub enum Material {
    /// Always scatters; direction sampled about the normal.
    Lambert { albedo: Color },
    /// Reflects about the normal, perturbed by `fuzz` times a unit-sphere sample.
    Metal { albedo: Color, fuzz: f64 },
    /// Refracts or reflects per Schlick's approximation and the TIR test.
    Dielectric { ior: f64 },
}

impl Material {
    pub const fn lambert(albedo: Color) -> Self {
        Material::Lambert { albedo }
    }

    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub const fn dielectric(ior: f64) -> Self {
        Material::Dielectric { ior }
    }

    fn schlick_reflectance(cosine: f64, ior: f64) -> f64 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }

    /// Decides whether/where the path continues. `Some((attenuation, scatter))`
    /// mirrors a `shade` call that filled its out-parameters and returned true.
    pub fn shade(
        &self,
        ray: &Ray,
        hit: &HitRecord,
        rng: &mut dyn rand::RngCore,
    ) -> Option<(Color, Ray)> {
        match self {
            Material::Lambert { albedo } => {
                let mut scatter_dir = hit.normal + Vec3::random_unit_vector(rng);
                if scatter_dir.near_zero() {
                    scatter_dir = hit.normal;
                }
                Some((*albedo, Ray::new(hit.point, scatter_dir.normalized())))
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = ray.direction.reflect(hit.normal);
                let scattered =
                    (reflected + Vec3::random_in_unit_sphere(rng) * *fuzz).normalized();
                if scattered.dot(hit.normal) > 0.0 {
                    Some((*albedo, Ray::new(hit.point, scattered)))
                } else {
                    None
                }
            }
            Material::Dielectric { ior } => {
                let eta_ratio = if hit.front_face { 1.0 / ior } else { *ior };
                let cos_theta = (-ray.direction).dot(hit.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = eta_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || Self::schlick_reflectance(cos_theta, eta_ratio) > rng.gen::<f64>()
                {
                    ray.direction.reflect(hit.normal)
                } else {
                    ray.direction
                        .refract(hit.normal, eta_ratio)
                        .unwrap_or_else(|| ray.direction.reflect(hit.normal))
                };

                Some((Color::ones(), Ray::new(hit.point, direction)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::HitRecord;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_hit(normal: Vec3, front_face: bool) -> HitRecord<'static> {
        static LAMBERT: Material = Material::Lambert {
            albedo: Color::new(0.5, 0.5, 0.5),
        };
        HitRecord {
            t: 1.0,
            point: Point3::zero(),
            normal,
            front_face,
            material: &LAMBERT,
        }
    }

    #[test]
    fn lambert_always_scatters_with_unit_direction() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mat = Material::lambert(Color::new(0.6, 0.2, 0.2));
        let hit = sample_hit(Vec3::new(0.0, 0.0, 1.0), true);
        let ray = Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0));
        let (atten, scattered) = mat.shade(&ray, &hit, &mut rng).expect("lambert scatters");
        assert!((scattered.direction.length() - 1.0).abs() < 1e-3);
        assert!(atten.x >= 0.0 && atten.x <= 1.0);
    }

    #[test]
    fn metal_zero_fuzz_reflects_exactly() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mat = Material::metal(Color::ones(), 0.0);
        let hit = sample_hit(Vec3::new(0.0, 1.0, 0.0), true);
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, -1.0, 0.0));
        let (_atten, scattered) = mat.shade(&ray, &hit, &mut rng).expect("metal scatters up");
        assert!((scattered.direction - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn dielectric_always_scatters_with_white_attenuation() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mat = Material::dielectric(1.5);
        let hit = sample_hit(Vec3::new(0.0, 0.0, 1.0), true);
        let ray = Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(0.1, 0.0, 0.9).normalized());
        let (atten, scattered) = mat.shade(&ray, &hit, &mut rng).expect("dielectric always scatters");
        assert_eq!(atten, Color::ones());
        assert!((scattered.direction.length() - 1.0).abs() < 1e-3);
    }
}
