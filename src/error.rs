//! Error types shared by the loader, the appearance code and the render loop.

use std::fmt;

use thiserror::Error;

/// The asset pipeline stage that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadStage {
    Material,
    Geometry,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStage::Material => f.write_str("material"),
            LoadStage::Geometry => f.write_str("geometry"),
        }
    }
}

/// A failed asset load.
///
/// Terminal for the loading phase only: the session keeps running and the
/// render loop keeps drawing the background. Nothing retries it.
#[derive(Debug, Error)]
#[error("could not load the {stage} asset: {cause:#}")]
pub struct LoadError {
    pub stage: LoadStage,
    pub cause: anyhow::Error,
}

impl LoadError {
    pub fn new(stage: LoadStage, cause: anyhow::Error) -> Self {
        Self { stage, cause }
    }

    pub fn material(cause: anyhow::Error) -> Self {
        Self::new(LoadStage::Material, cause)
    }

    pub fn geometry(cause: anyhow::Error) -> Self {
        Self::new(LoadStage::Geometry, cause)
    }
}

/// Geometry parsing was attempted before the material library was available.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("geometry parsing needs the material library, which has not been fetched yet")]
pub struct MaterialMissing;

/// A failed draw submission. Fatal for the render loop.
#[derive(Debug, Error)]
pub enum DrawFailure {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("draw submission failed: {0}")]
    Submission(String),
    #[error("the render loop was stopped by an earlier draw failure")]
    Terminated,
}

/// A colour string that is not `#rrggbb`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex digits in {0:?}")]
    InvalidDigit(String),
}
