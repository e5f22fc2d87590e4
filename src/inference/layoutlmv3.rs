//! LayoutLMv3 token classification on ONNX Runtime.
//!
//! The model takes the page words (as a pre-tokenized sequence), one box per
//! token on the 0-1000 grid, and a 224x224 rendition of the page, and
//! returns label logits for every token.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{imageops, RgbImage};
use ndarray::Array4;
use once_cell::sync::OnceCell;
use ort::{inputs, session::Session, value::Value};
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

use crate::inference::encoding::{TokenClassifier, TokenEncoding};
use crate::inference::error::InferenceError;
use crate::invoice::bbox::BoundingBox;
use crate::ocr::OcrWord;
use crate::utils::config::AppConfig;
use crate::utils::image_utils;

static LAYOUTLMV3_INSTANCE: OnceCell<Mutex<LayoutLmv3>> = OnceCell::new();

/// Tokenizes `words` as a pre-tokenized sequence for a `width` x `height` page.
///
/// Every token gets the box of the word it came from, normalized to the
/// 0-1000 grid, truncated and clamped. Special tokens get `[0, 0, 0, 0]`.
/// Offsets stay relative to their word. The result carries no pixel data.
pub fn encode_words(
    tokenizer: &Tokenizer,
    width: u32,
    height: u32,
    words: &[OcrWord],
) -> Result<TokenEncoding, InferenceError> {
    if width == 0 || height == 0 {
        return Err(InferenceError::PreprocessingError {
            operation: "encode page".to_string(),
            message: format!("image has zero dimension ({width}x{height})"),
        });
    }

    let texts: Vec<&str> = words.iter().map(|word| word.text.as_str()).collect();
    let encoding = tokenizer
        .encode(texts, true)
        .map_err(|e| InferenceError::TokenizerError {
            operation: "encode words".to_string(),
            message: e.to_string(),
        })?;

    let word_boxes: Vec<BoundingBox> = words
        .iter()
        .map(|word| {
            word.bbox
                .normalize(width as f32, height as f32)
                .truncate()
                .clamp_normalized()
        })
        .collect();

    let boxes = encoding
        .get_word_ids()
        .iter()
        .map(|word_id| {
            word_id
                .and_then(|id| word_boxes.get(id as usize).copied())
                .unwrap_or_default()
        })
        .collect();

    Ok(TokenEncoding {
        input_ids: encoding.get_ids().to_vec(),
        attention_mask: encoding.get_attention_mask().to_vec(),
        offsets: encoding.get_offsets().to_vec(),
        boxes,
        pixel_values: Array4::zeros((1, 3, 0, 0)),
    })
}

/// Fixed label table of a fine-tuned token classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id2Label {
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

impl Id2Label {
    /// Builds the table from labels ordered by id.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads the `id2label` map from a model `config.json`.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|source| InferenceError::ModelConfigLoadError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_config_str(&content).map_err(|message| InferenceError::ModelConfigParseError {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses the `id2label` map out of a model config JSON document.
    ///
    /// Ids must be the contiguous range `0..n`.
    pub fn from_config_str(json: &str) -> Result<Self, String> {
        let config: ModelConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;

        let mut entries = Vec::with_capacity(config.id2label.len());
        for (id, label) in config.id2label {
            let id: usize = id
                .trim()
                .parse()
                .map_err(|_| format!("label id '{id}' is not an integer"))?;
            entries.push((id, label));
        }
        entries.sort_by_key(|(id, _)| *id);

        for (expected, (id, _)) in entries.iter().enumerate() {
            if *id != expected {
                return Err(format!("label ids are not contiguous: missing id {expected}"));
            }
        }

        Ok(Self::new(entries.into_iter().map(|(_, label)| label)))
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Index of the largest logit in each row of a row-major `[rows, num_labels]` buffer.
///
/// A trailing partial row is ignored.
pub fn argmax_rows(logits: &[f32], num_labels: usize) -> Vec<usize> {
    if num_labels == 0 {
        return Vec::new();
    }

    logits
        .chunks_exact(num_labels)
        .map(|row| {
            // ties resolve to the lowest index
            let mut best = 0;
            for (index, value) in row.iter().enumerate().skip(1) {
                if *value > row[best] {
                    best = index;
                }
            }
            best
        })
        .collect()
}

fn preprocessing_error(operation: &str, source: ort::Error) -> InferenceError {
    InferenceError::PreprocessingError {
        operation: operation.to_string(),
        message: source.to_string(),
    }
}

pub struct LayoutLmv3 {
    session: Session,
    tokenizer: Tokenizer,
    id2label: Id2Label,
}

impl LayoutLmv3 {
    const IMAGE_SIZE: u32 = 224;
    const MEAN_VALUES: [f32; 3] = [127.5, 127.5, 127.5];
    const NORM_VALUES: [f32; 3] = [1.0 / 127.5, 1.0 / 127.5, 1.0 / 127.5];
    const NUM_THREADS: usize = 4;

    pub fn new(config: &AppConfig) -> Result<Self, InferenceError> {
        let model_path = PathBuf::from(config.model_path(&config.model_file));
        let tokenizer_path = PathBuf::from(config.model_path(&config.tokenizer_file));
        let config_path = PathBuf::from(config.model_path(&config.model_config_file));

        let session = Session::builder()
            .map_err(|source| InferenceError::ModelFileLoadError {
                path: model_path.clone(),
                source,
            })?
            .with_intra_threads(Self::NUM_THREADS)?
            .commit_from_file(&model_path)
            .map_err(|source| InferenceError::ModelFileLoadError {
                path: model_path.clone(),
                source,
            })?;

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| InferenceError::TokenizerError {
                operation: "load tokenizer".to_string(),
                message: format!("{}: {e}", tokenizer_path.display()),
            })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_sequence_length,
                strategy: TruncationStrategy::LongestFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| InferenceError::TokenizerError {
                operation: "configure truncation".to_string(),
                message: e.to_string(),
            })?;
        tokenizer.with_padding(None);

        let id2label = Id2Label::from_config_file(&config_path)?;

        tracing::info!(
            model = %model_path.display(),
            labels = id2label.len(),
            "Loaded LayoutLMv3 token classifier"
        );

        Ok(Self {
            session,
            tokenizer,
            id2label,
        })
    }

    pub fn get_or_init() -> Result<(), InferenceError> {
        LAYOUTLMV3_INSTANCE.get_or_try_init(|| Self::new(AppConfig::get()).map(Mutex::new))?;
        Ok(())
    }

    /// Runs `f` with exclusive access to the shared model instance.
    pub fn with_instance<F, R, E>(f: F) -> Result<R, E>
    where
        F: FnOnce(&mut LayoutLmv3) -> Result<R, E>,
        E: From<InferenceError>,
    {
        let instance = LAYOUTLMV3_INSTANCE
            .get_or_try_init(|| Self::new(AppConfig::get()).map(Mutex::new))?;

        let mut model = instance.lock().map_err(|e| InferenceError::ProcessingError {
            message: format!("Failed to lock LayoutLMv3 instance: {e}"),
        })?;

        f(&mut model)
    }

    pub fn id2label(&self) -> &Id2Label {
        &self.id2label
    }

    /// Resizes the page to the model resolution and scales pixels to `[-1, 1]`.
    pub fn preprocess_image(image: &RgbImage) -> Array4<f32> {
        let resized = imageops::resize(
            image,
            Self::IMAGE_SIZE,
            Self::IMAGE_SIZE,
            imageops::FilterType::Triangle,
        );
        image_utils::subtract_mean_normalize(&resized, &Self::MEAN_VALUES, &Self::NORM_VALUES)
    }
}

impl TokenClassifier for LayoutLmv3 {
    fn encode(&self, image: &RgbImage, words: &[OcrWord]) -> Result<TokenEncoding, InferenceError> {
        let (width, height) = image.dimensions();
        let encoding = encode_words(&self.tokenizer, width, height, words)?;
        Ok(encoding.with_pixel_values(Self::preprocess_image(image)))
    }

    fn classify(&mut self, encoding: &TokenEncoding) -> Result<Vec<String>, InferenceError> {
        let seq_len = encoding.len();
        if seq_len == 0 {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = encoding.input_ids.iter().map(|&id| i64::from(id)).collect();
        let mask: Vec<i64> = encoding
            .attention_mask
            .iter()
            .map(|&m| i64::from(m))
            .collect();
        let boxes: Vec<i64> = encoding
            .boxes
            .iter()
            .flat_map(BoundingBox::to_model_coords)
            .collect();

        let pixel_shape = encoding.pixel_values.shape().to_vec();
        let (pixel_data, _offset) = encoding.pixel_values.clone().into_raw_vec_and_offset();

        let input_ids = Value::from_array(([1usize, seq_len], ids))
            .map_err(|e| preprocessing_error("create input_ids", e))?;
        let attention_mask = Value::from_array(([1usize, seq_len], mask))
            .map_err(|e| preprocessing_error("create attention_mask", e))?;
        let bbox = Value::from_array(([1usize, seq_len, 4], boxes))
            .map_err(|e| preprocessing_error("create bbox", e))?;
        let pixel_values = Value::from_array((pixel_shape.as_slice(), pixel_data))
            .map_err(|e| preprocessing_error("create pixel_values", e))?;

        let outputs = self
            .session
            .run(inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "bbox" => bbox,
                "pixel_values" => pixel_values,
            ])
            .map_err(|source| InferenceError::ModelExecutionError {
                operation: "LayoutLMv3 forward pass".to_string(),
                source,
            })?;

        let (_shape, logits) = outputs
            .get("logits")
            .ok_or_else(|| InferenceError::PredictionError {
                operation: "get model outputs".to_string(),
                message: "Output 'logits' not found".to_string(),
            })?
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::PredictionError {
                operation: "extract logits".to_string(),
                message: e.to_string(),
            })?;

        if logits.len() % seq_len != 0 {
            return Err(InferenceError::PredictionError {
                operation: "interpret logits".to_string(),
                message: format!("{} logits do not split into {seq_len} tokens", logits.len()),
            });
        }
        let num_labels = logits.len() / seq_len;

        argmax_rows(logits, num_labels)
            .into_iter()
            .map(|id| {
                self.id2label
                    .get(id)
                    .map(str::to_string)
                    .ok_or_else(|| InferenceError::PredictionError {
                        operation: "resolve label".to_string(),
                        message: format!("label id {id} is not in id2label"),
                    })
            })
            .collect()
    }

    fn decode(&self, ids: &[u32]) -> Result<String, InferenceError> {
        self.tokenizer
            .decode(ids, false)
            .map_err(|e| InferenceError::TokenizerError {
                operation: "decode tokens".to_string(),
                message: e.to_string(),
            })
    }
}
