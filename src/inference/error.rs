use std::path::PathBuf;

use ort::Error as OrtError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("ONNX Runtime error: {source}")]
    Ort {
        #[from]
        source: OrtError,
    },

    #[error("Failed to load model file: {path}")]
    ModelFileLoadError {
        path: PathBuf,
        #[source]
        source: OrtError,
    },

    #[error("Failed to read model config: {path}")]
    ModelConfigLoadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model config {path}: {message}")]
    ModelConfigParseError { path: PathBuf, message: String },

    #[error("Tokenizer failed: {operation}: {message}")]
    TokenizerError { operation: String, message: String },

    #[error("Model execution failed: {operation}")]
    ModelExecutionError {
        operation: String,
        #[source]
        source: OrtError,
    },

    #[error("Input preprocessing failed: {operation}: {message}")]
    PreprocessingError { operation: String, message: String },

    #[error("Prediction processing failed: {operation}: {message}")]
    PredictionError { operation: String, message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}
