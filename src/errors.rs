//! Error Types
//!
//! Scene-database reads and writes never fail: a dead or sentinel ID makes a
//! write a no-op and a read return the dummy element's defaults. The error
//! type below is reserved for the fallible construction paths, such as
//! `try_create` variants, image format conversion and command-line parsing.
//!
//! ```rust
//! use strata::errors::{Result, StrataError};
//! use strata::math::parse_rgb;
//!
//! fn tint() -> Result<glam::Vec3> {
//!     parse_rgb("[0.5, 0.5, 1.0]")
//! }
//!
//! assert!(tint().is_ok());
//! assert!(matches!(parse_rgb("0.5"), Err(StrataError::InvalidColor(_))));
//! ```

use thiserror::Error;

use crate::assets::image::PixelFormat;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrataError {
    // ========================================================================
    // Capacity
    // ========================================================================
    /// The table's 24-bit index space is used up.
    #[error("{table}: no free identifiers left")]
    CapacityExhausted { table: &'static str },

    // ========================================================================
    // Identifiers
    // ========================================================================
    #[error("{table}: {id} is not a live identifier")]
    InvalidId { table: &'static str, id: String },

    // ========================================================================
    // Images
    // ========================================================================
    #[error("Unsupported pixel format: {0:?}")]
    UnsupportedPixelFormat(PixelFormat),

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    ImageSizeMismatch { expected: usize, actual: usize },

    // ========================================================================
    // Command line
    // ========================================================================
    /// A color argument that is not of the form `[r,g,b]`.
    #[error("Invalid color '{0}', expected [r,g,b]")]
    InvalidColor(String),
}

/// Alias for `Result<T, StrataError>`.
pub type Result<T> = std::result::Result<T, StrataError>;
