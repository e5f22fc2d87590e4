use invoicexpert::invoice::{ExtractionOptions, DEFAULT_FONT_SCALE};
use invoicexpert::utils::config::AppConfig;
use invoicexpert::utils::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_parse_minimal_config_uses_defaults() {
    let json = r#"{
        "max_file_size": 52428800,
        "model_directory": "models",
        "host_url": "127.0.0.1:8080"
    }"#;

    let config: AppConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.max_file_size, 52428800);
    assert_eq!(&*config.model_directory, "models");
    assert_eq!(&*config.host_url, "127.0.0.1:8080");
    assert_eq!(&*config.model_file, "onnx/layoutlmv3_invoice.onnx");
    assert_eq!(config.max_sequence_length, 512);
    assert_eq!(&*config.ocr_language, "eng");
    assert!(config.font_path.is_none());
    assert_eq!(config.font_scale, DEFAULT_FONT_SCALE);
    assert!(config.label_colors.is_empty());
    assert_eq!(
        config.items_of_interest,
        ["B-INVOICE_DATE", "B-INVOICE_NUMBER", "B-TOTAL"]
    );
}

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let json = r##"{
        "max_file_size": 104857600,
        "model_directory": "/opt/models",
        "host_url": "0.0.0.0:3000",
        "items_of_interest": ["B-TOTAL", "B-GST"],
        "label_colors": {"B-GST": "#ff0000"},
        "max_sequence_length": 256
    }"##;
    temp_file.write_all(json.as_bytes()).unwrap();

    let config = AppConfig::from_file(temp_file.path()).unwrap();

    assert_eq!(config.max_file_size, 104857600);
    assert_eq!(config.items_of_interest, ["B-TOTAL", "B-GST"]);
    assert_eq!(config.label_colors["B-GST"], "#ff0000");
    assert_eq!(config.max_sequence_length, 256);
    assert_eq!(
        config.model_path(&config.tokenizer_file),
        "/opt/models/tokenizer/layoutlmv3/tokenizer.json"
    );
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.max_file_size, 50 * 1024 * 1024);
    assert_eq!(&*config.model_directory, "models");
    assert_eq!(&*config.host_url, "0.0.0.0:3000");
    assert_eq!(
        config.model_path("onnx/layoutlmv3_invoice.onnx"),
        "models/onnx/layoutlmv3_invoice.onnx"
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = AppConfig::from_file(dir.path().join("nope.json"));

    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_malformed_file_is_json_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"{ not json").unwrap();

    let result = AppConfig::from_file(temp_file.path());

    assert!(matches!(result, Err(ConfigError::Json { .. })));
}

#[test]
fn test_extraction_options_from_config() {
    let mut config = AppConfig::default();
    config.items_of_interest = vec!["B-GST".to_string()];
    config
        .label_colors
        .insert("B-GST".to_string(), "red".to_string());

    let options = ExtractionOptions::from_config(&config).unwrap();

    assert!(options.items_of_interest.contains("B-GST"));
    assert!(!options.items_of_interest.contains("B-TOTAL"));
    assert_eq!(
        options.annotator.palette().color_for("B-GST"),
        image::Rgb([255, 0, 0])
    );
}

#[test]
fn test_extraction_options_reject_bad_color() {
    let mut config = AppConfig::default();
    config
        .label_colors
        .insert("B-GST".to_string(), "sparkly".to_string());

    assert!(ExtractionOptions::from_config(&config).is_err());
}

#[test]
fn test_unreadable_font_keeps_embedded_font() {
    let mut config = AppConfig::default();
    config.font_path = Some("/definitely/not/here.ttf".into());

    let options = ExtractionOptions::from_config(&config).unwrap();

    assert!(options.annotator.has_font());
}

#[test]
fn test_default_config_draws_captions() {
    let options = ExtractionOptions::from_config(&AppConfig::default()).unwrap();

    assert!(options.annotator.has_font());
    assert_eq!(options.annotator.font_scale(), DEFAULT_FONT_SCALE);
}

#[test]
fn test_font_scale_from_config() {
    let json = r#"{
        "max_file_size": 1024,
        "model_directory": "models",
        "host_url": "127.0.0.1:8080",
        "font_scale": 18.5
    }"#;
    let config: AppConfig = serde_json::from_str(json).unwrap();

    let options = ExtractionOptions::from_config(&config).unwrap();

    assert_eq!(options.annotator.font_scale(), 18.5);
}
