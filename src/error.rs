//! Error types
//!
//! Geometry failures are recovered inside the controller where possible; the
//! variants here are what remains when no fallback applies.

use thiserror::Error;

/// Failure reported by a geometry factory while building a die
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Convex hull generation from the procedural mesh failed
    #[error("convex hull generation failed for d{face_count}")]
    ConvexHull { face_count: u32 },
    /// The render/collision mesh itself could not be generated
    #[error("mesh generation failed for d{face_count}")]
    Mesh { face_count: u32 },
}

#[derive(Debug, Error)]
pub enum DiceError {
    #[error("unsupported face count {0} (expected 2..=12)")]
    UnsupportedFaceCount(u32),

    #[error("no usable geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid argument {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, DiceError>;
