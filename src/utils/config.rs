//! Application configuration module.
//!
//! Configuration is loaded from a JSON file. Every field except the core
//! server settings has a default, so a config file only needs to name what it
//! changes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::invoice::annotate::DEFAULT_FONT_SCALE;
use crate::invoice::labels::DEFAULT_ITEMS_OF_INTEREST;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/app_config.json";

/// Global configuration instance
static CONFIG_INSTANCE: OnceCell<AppConfig> = OnceCell::new();

/// Application configuration structure.
///
/// String fields use `Box<str>` since they are set once and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum allowed upload size in bytes
    pub max_file_size: u64,

    /// Directory holding the model, tokenizer and model config files
    pub model_directory: Box<str>,

    /// Address the server binds to
    pub host_url: Box<str>,

    /// ONNX export of the fine-tuned LayoutLMv3 token classifier
    #[serde(default = "default_model_file")]
    pub model_file: Box<str>,

    /// Tokenizer matching the model
    #[serde(default = "default_tokenizer_file")]
    pub tokenizer_file: Box<str>,

    /// Model `config.json` holding the `id2label` table
    #[serde(default = "default_model_config_file")]
    pub model_config_file: Box<str>,

    /// Font file replacing the embedded caption font
    #[serde(default)]
    pub font_path: Option<Box<str>>,

    /// Caption height in pixels
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,

    /// Token limit of the model input
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,

    /// Tesseract language codes used when OCR runs
    #[serde(default = "default_ocr_language")]
    pub ocr_language: Box<str>,

    /// Raw labels extracted by default
    #[serde(default = "default_items_of_interest")]
    pub items_of_interest: Vec<String>,

    /// Extra or replacement label colors (name or `#RRGGBB`)
    #[serde(default)]
    pub label_colors: HashMap<String, String>,
}

fn default_model_file() -> Box<str> {
    "onnx/layoutlmv3_invoice.onnx".into()
}

fn default_tokenizer_file() -> Box<str> {
    "tokenizer/layoutlmv3/tokenizer.json".into()
}

fn default_model_config_file() -> Box<str> {
    "onnx/layoutlmv3_invoice_config.json".into()
}

fn default_font_scale() -> f32 {
    DEFAULT_FONT_SCALE
}

fn default_max_sequence_length() -> usize {
    512
}

fn default_ocr_language() -> Box<str> {
    "eng".into()
}

fn default_items_of_interest() -> Vec<String> {
    DEFAULT_ITEMS_OF_INTEREST
        .iter()
        .map(|label| label.to_string())
        .collect()
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from `config/app_config.json`.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file(DEFAULT_CONFIG_PATH)
    }

    /// Initialize the global configuration instance from the default path.
    ///
    /// This should be called once at application startup. If not called,
    /// `get()` will initialize with default values.
    pub fn init() -> Result<&'static Self, ConfigError> {
        CONFIG_INSTANCE.get_or_try_init(Self::load_default)
    }

    /// Initialize the global configuration instance from `path`.
    ///
    /// Without a path the default file is used when it exists, otherwise the
    /// built-in defaults.
    pub fn init_from(path: Option<&Path>) -> Result<&'static Self, ConfigError> {
        match path {
            Some(path) => CONFIG_INSTANCE.get_or_try_init(|| Self::from_file(path)),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::init(),
            None => Ok(Self::get()),
        }
    }

    /// Get the global configuration instance.
    ///
    /// If the configuration hasn't been initialized, returns default values.
    #[must_use]
    pub fn get() -> &'static Self {
        CONFIG_INSTANCE.get_or_init(Self::default)
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            model_directory: "models".into(),
            host_url: "0.0.0.0:3000".into(),
            model_file: default_model_file(),
            tokenizer_file: default_tokenizer_file(),
            model_config_file: default_model_config_file(),
            font_path: None,
            font_scale: default_font_scale(),
            max_sequence_length: default_max_sequence_length(),
            ocr_language: default_ocr_language(),
            items_of_interest: default_items_of_interest(),
            label_colors: HashMap::new(),
        }
    }

    /// Get the path to a model file within the model directory.
    ///
    /// # Arguments
    ///
    /// * `relative_path` - The relative path to the model file (e.g., "onnx/layoutlmv3_invoice.onnx")
    #[must_use]
    pub fn model_path(&self, relative_path: &str) -> String {
        format!("{}/{}", self.model_directory, relative_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
