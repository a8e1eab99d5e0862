//! Error types for question extraction.
//!
//! This module defines all error types that can occur while decoding inputs,
//! segmenting pages, and exporting the resulting crops.

/// Result type alias for question extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during question extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input file type is neither a supported image nor a PDF
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Input file contains no bytes
    #[error("Empty input file: {0}")]
    EmptyInput(String),

    /// Raster or PDF decoding failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Page raster has a zero dimension
    #[error("Page image has zero dimension ({width}x{height})")]
    EmptyImage {
        /// Width of the rejected raster
        width: u32,
        /// Height of the rejected raster
        height: u32,
    },

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid extractor configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Archive writing error
    #[error("Archive error: {0}")]
    Archive(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(e) => Error::Decode(e.to_string()),
            image::ImageError::Unsupported(e) => Error::UnsupportedInput(e.to_string()),
            other => Error::Image(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Archive(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_error() {
        let err = Error::EmptyImage {
            width: 0,
            height: 40,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("zero dimension"));
        assert!(msg.contains("0x40"));
    }

    #[test]
    fn test_unsupported_input_error() {
        let err = Error::UnsupportedInput("notes.txt".to_string());
        assert!(format!("{}", err).contains("notes.txt"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
