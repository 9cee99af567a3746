//! Error handling for brushkit
//!
//! Two kinds of failure are fatal to a painting run:
//! - Image load errors (missing, unreadable or corrupt layer artwork)
//! - Configuration errors (missing fields, invalid ranges)
//!
//! Degenerate geometry is not an error. It is described by
//! [`GeometryDegenerate`] and reported alongside an empty or reduced result.

use std::path::PathBuf;
use thiserror::Error;

/// A layer's source image could not be loaded or decoded.
#[derive(Error, Debug, Clone)]
#[error("Failed to load image for {layer} ({}): {reason}", .path.display())]
pub struct ImageLoadError {
    /// Human readable layer identifier, e.g. `layer 2 "Teal"`.
    pub layer: String,
    /// The path that was attempted.
    pub path: PathBuf,
    /// Why loading failed.
    pub reason: String,
}

impl ImageLoadError {
    pub fn new(
        layer: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            layer: layer.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration error type
///
/// Raised while parsing or validating a painter configuration, always before
/// any image is rasterized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required field was not supplied
    #[error("Missing required field '{field}' in {scope}")]
    MissingField {
        /// `global` or the layer identifier.
        scope: String,
        /// The missing field name.
        field: String,
    },

    /// A value failed a range or consistency check
    #[error("Invalid value for '{key}' in {scope}: {reason}")]
    InvalidRange {
        /// `global` or the layer identifier.
        scope: String,
        /// The offending key.
        key: String,
        /// The check that failed.
        reason: String,
    },

    /// The configuration file extension is not recognized
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The configuration text could not be parsed
    #[error("Malformed configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Shorthand for an [`ConfigError::InvalidRange`] error.
    pub fn invalid(
        scope: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRange {
            scope: scope.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Recoverable geometric conditions.
///
/// These are absorbed by the stage that meets them and produce an empty or
/// reduced output for the layer instead of failing the run.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryDegenerate {
    /// The binarized mask holds no ink pixels.
    #[error("mask contains no ink")]
    EmptyMask,

    /// The mask has ink but no stroke survived extraction.
    #[error("no strokes extracted")]
    NoPaths,

    /// A wipe target coincided with the station; a fixed direction was used.
    #[error("wipe target coincides with station")]
    CoincidentWipeTarget,
}

/// Main error type for brushkit
///
/// A unified error type for the public pipeline API.
#[derive(Error, Debug)]
pub enum Error {
    /// Image load error
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),

    /// Configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is an image load error
    pub fn is_image_error(&self) -> bool {
        matches!(self, Error::ImageLoad(_))
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
