use std::str::FromStr;

use image::{Rgb, RgbImage};
use invoicexpert::inference::{
    argmax_rows, encode_words, Id2Label, InferenceError, LayoutLmv3, TokenEncoding,
};
use invoicexpert::invoice::{word_start_indices, BoundingBox};
use invoicexpert::ocr::OcrWord;
use tokenizers::Tokenizer;

/// WordPiece tokenizer that wraps sequences in `[CLS]` .. `[SEP]`.
fn wordpiece_tokenizer() -> Tokenizer {
    let json = r###"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "WhitespaceSplit"},
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", 2],
            "cls": ["[CLS]", 1]
        },
        "decoder": null,
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": {
                "[UNK]": 0,
                "[CLS]": 1,
                "[SEP]": 2,
                "INV": 3,
                "##-": 4,
                "##001": 5,
                "Total": 6,
                "$": 7,
                "##5": 8
            }
        }
    }"###;
    Tokenizer::from_str(json).unwrap()
}

#[test]
fn test_id2label_from_model_config() {
    let json = r#"{
        "model_type": "layoutlmv3",
        "id2label": {"2": "B-TOTAL", "0": "O", "1": "B-INVOICE_DATE"}
    }"#;

    let table = Id2Label::from_config_str(json).unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.get(0), Some("O"));
    assert_eq!(table.get(1), Some("B-INVOICE_DATE"));
    assert_eq!(table.get(2), Some("B-TOTAL"));
    assert_eq!(table.get(3), None);
}

#[test]
fn test_id2label_orders_ids_numerically() {
    let labels: Vec<String> = (0..12).map(|i| format!("L{i}")).collect();
    let entries: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("\"{i}\": \"{label}\""))
        .collect();
    let json = format!("{{\"id2label\": {{{}}}}}", entries.join(", "));

    let table = Id2Label::from_config_str(&json).unwrap();

    assert_eq!(table.get(10), Some("L10"));
    assert_eq!(table.get(2), Some("L2"));
}

#[test]
fn test_id2label_rejects_gaps_and_bad_ids() {
    assert!(Id2Label::from_config_str(r#"{"id2label": {"0": "O", "2": "B-TOTAL"}}"#).is_err());
    assert!(Id2Label::from_config_str(r#"{"id2label": {"zero": "O"}}"#).is_err());
    assert!(Id2Label::from_config_str(r#"{"labels": []}"#).is_err());
}

#[test]
fn test_id2label_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(Id2Label::from_config_file(dir.path().join("config.json")).is_err());
}

#[test]
fn test_argmax_rows() {
    let logits = [0.1, 0.7, 0.2, 3.0, -1.0, 2.0];

    assert_eq!(argmax_rows(&logits, 3), vec![1, 0]);
    assert_eq!(argmax_rows(&logits, 2), vec![1, 1, 1]);
}

#[test]
fn test_argmax_rows_ties_pick_first() {
    assert_eq!(argmax_rows(&[0.5, 0.5, 0.1], 3), vec![0]);
}

#[test]
fn test_argmax_rows_degenerate_inputs() {
    assert!(argmax_rows(&[], 3).is_empty());
    assert!(argmax_rows(&[1.0, 2.0], 0).is_empty());
}

#[test]
fn test_preprocess_image_resizes_and_scales() {
    let img = RgbImage::from_pixel(50, 80, Rgb([255, 0, 255]));

    let pixels = LayoutLmv3::preprocess_image(&img);

    assert_eq!(pixels.shape(), &[1, 3, 224, 224]);
    assert!((pixels[[0, 0, 100, 100]] - 1.0).abs() < 1e-5);
    assert!((pixels[[0, 1, 100, 100]] + 1.0).abs() < 1e-5);
}

#[test]
fn test_token_encoding_defaults() {
    let encoding = TokenEncoding::new(
        vec![0, 10, 2],
        vec![(0, 0), (0, 3), (0, 0)],
        vec![BoundingBox::default(); 3],
    );

    assert_eq!(encoding.len(), 3);
    assert!(!encoding.is_empty());
    assert_eq!(encoding.attention_mask, vec![1, 1, 1]);
}

#[test]
fn test_encode_words_maps_word_boxes_to_tokens() {
    let tokenizer = wordpiece_tokenizer();
    let words = vec![
        OcrWord::new("INV-001", BoundingBox::new(201.0, 100.0, 400.0, 200.0)),
        OcrWord::new("$5", BoundingBox::new(-100.0, 300.0, 1000.0, 500.0)),
    ];

    let encoding = encode_words(&tokenizer, 800, 400, &words).unwrap();

    assert_eq!(encoding.input_ids, [1, 3, 4, 5, 7, 8, 2]);
    assert_eq!(encoding.attention_mask, [1; 7]);
    assert_eq!(
        encoding.offsets,
        [(0, 0), (0, 3), (3, 4), (4, 7), (0, 1), (1, 2), (0, 0)]
    );

    let invoice_number = BoundingBox::new(251.0, 250.0, 500.0, 500.0);
    let amount = BoundingBox::new(0.0, 750.0, 1000.0, 1000.0);
    let special = BoundingBox::default();
    assert_eq!(
        encoding.boxes,
        [
            special,
            invoice_number,
            invoice_number,
            invoice_number,
            amount,
            amount,
            special
        ]
    );
    assert_eq!(encoding.pixel_values.dim(), (1, 3, 0, 0));
}

#[test]
fn test_encode_words_starts_each_word_at_offset_zero() {
    let tokenizer = wordpiece_tokenizer();
    let words = vec![
        OcrWord::new("Total", BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
        OcrWord::new("INV-001", BoundingBox::new(20.0, 0.0, 40.0, 10.0)),
        OcrWord::new("$5", BoundingBox::new(50.0, 0.0, 60.0, 10.0)),
    ];

    let encoding = encode_words(&tokenizer, 100, 100, &words).unwrap();

    // Both special tokens count as starts, closing the last real word.
    assert_eq!(word_start_indices(&encoding.offsets), [0, 1, 2, 5, 7]);
    assert_eq!(
        tokenizer.decode(&encoding.input_ids[2..5], false).unwrap(),
        "INV ##- ##001"
    );
}

#[test]
fn test_encode_words_rejects_zero_dimension_page() {
    let tokenizer = wordpiece_tokenizer();
    let words = vec![OcrWord::new("Total", BoundingBox::new(0.0, 0.0, 10.0, 10.0))];

    let result = encode_words(&tokenizer, 0, 100, &words);

    assert!(matches!(
        result,
        Err(InferenceError::PreprocessingError { .. })
    ));
}
