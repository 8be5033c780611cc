use std::path::PathBuf;

/// Errors that surface to the driver (top-level). Numerical edge cases in
/// the hot intersection path never produce one of these — they return
/// `None`/`false` and are folded into the background by the integrator.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load mesh {path}: {source}")]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("scene has no primitives to render")]
    EmptyScene,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
