//! Error types for the mask overlay pipeline.

use thiserror::Error;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type for overlay operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    // === Precondition Errors ===
    #[error("Malformed raster {width}x{height}: expected {expected} bytes, got {actual}")]
    MalformedRaster {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Field dimensions {field_width}x{field_height} do not match output canvas {output_width}x{output_height}"
    )]
    DimensionMismatch {
        field_width: u32,
        field_height: u32,
        output_width: u32,
        output_height: u32,
    },

    // === Resource Errors ===
    #[error("Failed to load resource '{key}': {message}")]
    ResourceLoadFailure { key: String, message: String },

    // === Configuration Errors ===
    #[error("Invalid color ramp: {0}")]
    InvalidRamp(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Output Errors ===
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Overlay computation failed: {0}")]
    Compute(String),
}

impl OverlayError {
    /// Whether the viewer can carry on without an overlay for this frame.
    ///
    /// Load failures only cost the current frame its overlay; everything
    /// else points at a broken precondition or configuration.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, OverlayError::ResourceLoadFailure { .. })
    }

    pub fn load_failure(key: impl Into<String>, message: impl ToString) -> Self {
        OverlayError::ResourceLoadFailure {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for OverlayError {
    fn from(err: serde_yaml::Error) -> Self {
        OverlayError::InvalidConfig(format!("YAML error: {}", err))
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::InvalidConfig(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_load_failures_are_recoverable() {
        assert!(OverlayError::load_failure("overlay_3", "404").is_recoverable());
        assert!(!OverlayError::MalformedRaster {
            width: 2,
            height: 2,
            expected: 16,
            actual: 12,
        }
        .is_recoverable());
        assert!(!OverlayError::InvalidRamp("empty".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = OverlayError::DimensionMismatch {
            field_width: 512,
            field_height: 512,
            output_width: 320,
            output_height: 320,
        };
        assert_eq!(
            err.to_string(),
            "Field dimensions 512x512 do not match output canvas 320x320"
        );
    }
}
