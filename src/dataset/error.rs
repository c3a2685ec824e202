//! Dataset-level errors.

use thiserror::Error;

/// Errors raised while opening or validating a tile dataset.
///
/// These are construction-time failures: the layer is not added to
/// the scene when open fails. Per-tile read problems are values on
/// [`crate::dataset::TileIoResult`], never errors here.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The underlying source could not be opened.
    #[error("failed to open dataset: {0}")]
    Open(String),

    /// The dataset's geo-transform has no inverse.
    #[error("dataset geo-transform is not invertible")]
    NonInvertibleTransform,

    /// The configured minimum pixel size is unusable.
    #[error("minimum pixel size must be a power of two, got {0}")]
    InvalidMinimumPixelSize(u32),

    /// The dataset reports no overview levels at all.
    #[error("dataset reports no overview levels")]
    NoOverviews,
}
