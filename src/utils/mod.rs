pub mod config;
pub mod error;
pub mod image_utils;

pub use config::AppConfig;
pub use error::{ConfigError, ImageError};
