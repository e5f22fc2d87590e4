pub mod encoding;
pub mod error;
pub mod layoutlmv3;

pub use encoding::{TokenClassifier, TokenEncoding};
pub use error::InferenceError;
pub use layoutlmv3::{argmax_rows, encode_words, Id2Label, LayoutLmv3};
