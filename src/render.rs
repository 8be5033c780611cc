use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::math::*;
use crate::pool::WorkerPool;
use crate::primitive::{Instancer, Intersectable};
use crate::scene::Scene;

/// Bounces are cut off at this depth rather than terminated stochastically
/// (no Russian roulette).
pub const MAX_RAY_DEPTH: u32 = 35;

/// Self-intersection guard: hits closer than this to the ray origin are
/// rejected, which is what keeps shadow acne off adjacent-bounce rays.
const SELF_INTERSECT_EPSILON: f64 = 0.001;

pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub thread_count: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 225,
            samples_per_pixel: 50,
            thread_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Column-major image buffer: `columns[x][y]` with `y` already flipped so
/// row 0 is the top of the final image, matching `image[col][height - row
/// - 1]`.
pub struct Framebuffer {
    width: u32,
    height: u32,
    columns: Vec<Vec<Color>>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            columns: vec![vec![Color::zero(); height as usize]; width as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `row` is the sampling-loop row (0 at the bottom of the viewport);
    /// stored at `height - row - 1` so the buffer itself reads top-down.
    pub fn set(&mut self, col: u32, row: u32, color: Color) {
        let y = self.height - 1 - row;
        self.columns[col as usize][y as usize] = color;
    }

    /// `y` is a buffer-space (already top-down) row index.
    pub fn get(&self, col: u32, y: u32) -> Color {
        self.columns[col as usize][y as usize]
    }

    /// Row-major, top-to-bottom 8-bit RGB bytes for the PNG collaborator.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for col in 0..self.width {
                out.extend_from_slice(&self.get(col, y).to_rgb8());
            }
        }
        out
    }

    pub fn write_png(&self, path: &Path) -> Result<()> {
        crate::png::write_rgb8(path, self.width, self.height, &self.to_rgb8())
    }
}

/// Traces a single ray through the scene. On a hit that scatters, recurses
/// with the attenuation applied; on a hit that absorbs, the path
/// terminates black; on a miss, returns the background gradient
/// `(1 - f)·white + f·(0.5, 0.7, 1.0)` where `f = 0.5·(dir.y + 1)`.
pub fn color(ray: &Ray, root: &Instancer, depth: u32, rng: &mut dyn rand::RngCore) -> Color {
    match root.intersect(ray, SELF_INTERSECT_EPSILON, f64::INFINITY) {
        Some(hit) => {
            if depth >= MAX_RAY_DEPTH {
                return Color::zero();
            }
            match hit.material.shade(ray, &hit, rng) {
                Some((attenuation, scattered)) => {
                    attenuation.hadamard(color(&scattered, root, depth + 1, rng))
                }
                None => Color::zero(),
            }
        }
        None => {
            let t = 0.5 * (ray.direction.y + 1.0);
            Color::ones().lerp(Color::new(0.5, 0.7, 1.0), t)
        }
    }
}

/// Renders the scene with a fixed worker pool. Every worker processes
/// pixel indices `i, i+N, i+2N, …` into a private bucket (seeding its own
/// thread-local RNG from entropy), and the main thread assembles the
/// framebuffer from the buckets once every worker has joined — the
/// completion barrier `run_threads_collect` already provides.
pub fn render(scene: &Scene, config: &RenderConfig) -> Framebuffer {
    scene.root.on_before_render();

    let pool = WorkerPool::start(config.thread_count);
    let total_pixels = (config.width as usize) * (config.height as usize);

    let buckets: Vec<Vec<Color>> = pool.run_threads_collect(|worker, total| {
        let mut rng = SmallRng::from_entropy();
        let mut bucket = Vec::new();
        let mut idx = worker;
        while idx < total_pixels {
            let row = (idx as u32) / config.width;
            let col = (idx as u32) % config.width;

            let mut accum = Color::zero();
            for _ in 0..config.samples_per_pixel {
                let u = (col as f64 + rand_float(&mut rng)) / (config.width - 1) as f64;
                let v = (row as f64 + rand_float(&mut rng)) / (config.height - 1) as f64;
                let ray = scene.camera.get_ray(u, v);
                accum += color(&ray, &scene.root, 0, &mut rng);
            }
            accum /= config.samples_per_pixel as f64;
            bucket.push(accum.saturate().gamma_correct());

            idx += total;
        }
        bucket
    });
    pool.stop();

    let mut fb = Framebuffer::new(config.width, config.height);
    for (worker, bucket) in buckets.into_iter().enumerate() {
        let mut idx = worker;
        for pixel in bucket {
            let row = (idx as u32) / config.width;
            let col = (idx as u32) % config.width;
            fb.set(col, row, pixel);
            idx += config.thread_count;
        }
    }
    fb
}
