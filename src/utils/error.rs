use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Failed to load font {path}: {message}")]
    FontLoad { path: PathBuf, message: String },

    #[error("Failed to encode image")]
    EncodeFailed {
        #[source]
        source: image::ImageError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse config file")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
