//! File adapters: STL meshes in and out, SVG outlines in and out.
//!
//! Only the subset needed by the pipelines is handled: triangle soup STL
//! (binary or ASCII) and the first `<path>` of an SVG document made of
//! straight segments.

pub mod stl;
pub mod svg;

use thiserror::Error;

use crate::mesh::MeshError;

/// Result type alias for the adapters.
pub type IoResult<T> = Result<T, IoError>;

/// Errors raised while reading or writing geometry files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Mesh failed validation before writing.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The SVG could not be parsed or uses unsupported path commands.
    #[error("svg: {0}")]
    Svg(String),

    /// No `<path>` element with a usable `d` attribute.
    #[error("no path data found in document")]
    MissingPathData,
}

impl From<::svg::parser::Error> for IoError {
    fn from(value: ::svg::parser::Error) -> Self {
        Self::Svg(value.to_string())
    }
}
