use thiserror::Error;

/// Errors that can occur while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read or write settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from canvas import and export
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Result type for canvas operations
pub type CanvasResult<T> = Result<T, CanvasError>;
