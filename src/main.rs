//! octant-trace
//!
//! A CPU path tracer whose engineering core is the intersection pipeline:
//! an axis-aligned octree over a polymorphic primitive/instance model,
//! driven by a parallel per-pixel Monte Carlo sampling loop and a
//! recursive scattering integrator. Renders a fixed scene to a PNG file.

mod camera;
mod error;
mod material;
mod math;
mod obj;
mod octree;
mod png;
mod pool;
mod primitive;
mod render;
mod scene;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use camera::CameraConfig;
use material::Material;
use math::Color;
use primitive::TriangleMesh;
use render::RenderConfig;
use scene::ScenePreset;

/// octant-trace — an octree-accelerated CPU path tracer
#[derive(Parser, Debug)]
#[command(
    name = "octant-trace",
    version,
    about = "Renders a static 3-D scene to PNG with an octree-accelerated path tracer"
)]
struct Cli {
    /// Scene to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Showcase)]
    scene: ScenePreset,

    /// Output image width in pixels
    #[arg(short = 'W', long, default_value_t = 800)]
    width: u32,

    /// Output image height in pixels
    #[arg(short = 'H', long, default_value_t = 450)]
    height: u32,

    /// Samples per pixel
    #[arg(long, default_value_t = 50)]
    spp: u32,

    /// Worker thread count; defaults to hardware parallelism
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,
}

/// Loads every `.obj` file directly inside `folder` as a set of meshes,
/// sharing `material`. A missing folder is not an error — it just means
/// no meshes are available for this render.
fn load_mesh_folder(folder: &Path, material: Material) -> Vec<TriangleMesh> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) => {
            log::info!(
                "mesh folder {} not available ({err}); rendering without meshes",
                folder.display()
            );
            return Vec::new();
        }
    };

    let mut meshes = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("obj") {
            continue;
        }
        match obj::load_meshes(&path, material.clone()) {
            Ok(loaded) => meshes.extend(loaded),
            Err(err) => log::warn!("skipping {}: {err}", path.display()),
        }
    }
    meshes
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mesh_folder =
        std::env::var("MESH_FOLDER").unwrap_or_else(|_| "./meshes".to_string());
    let mesh_material = Material::lambert(Color::new(0.6, 0.6, 0.6));
    let meshes = load_mesh_folder(Path::new(&mesh_folder), mesh_material);

    let camera_config = CameraConfig {
        aspect_ratio: cli.width as f64 / cli.height as f64,
        ..CameraConfig::default()
    };
    let scene = cli.scene.build(camera_config, meshes);

    let config = RenderConfig {
        width: cli.width,
        height: cli.height,
        samples_per_pixel: cli.spp,
        thread_count: cli.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }),
    };

    log::info!(
        "rendering {}x{} at {} spp across {} threads",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.thread_count
    );

    let t0 = Instant::now();
    let framebuffer = render::render(&scene, &config);
    let elapsed = t0.elapsed();

    if let Err(err) = framebuffer.write_png(&cli.output) {
        log::error!("failed to write {}: {err}", cli.output.display());
        std::process::exit(1);
    }

    let total_rays =
        config.width as u64 * config.height as u64 * config.samples_per_pixel as u64;
    log::info!(
        "wrote {} in {:.2}s ({:.2}M rays, {:.2} Mrays/s)",
        cli.output.display(),
        elapsed.as_secs_f64(),
        total_rays as f64 / 1e6,
        total_rays as f64 / elapsed.as_secs_f64() / 1e6
    );
}
