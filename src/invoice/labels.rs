//! Label tables for invoice token classification.
//!
//! This module holds the two fixed lookup tables that drive field extraction:
//! the [`LabelPalette`] that assigns a display color to each raw model label,
//! and the [`ItemsOfInterest`] set that decides which labels are surfaced.
//! Both are immutable once built and are passed in explicitly, so callers can
//! override the defaults per request.

use std::collections::{HashMap, HashSet};

use image::Rgb;

use super::error::ExtractionError;

/// Labels extracted when no explicit set is configured.
pub const DEFAULT_ITEMS_OF_INTEREST: [&str; 3] = ["B-INVOICE_DATE", "B-INVOICE_NUMBER", "B-TOTAL"];

/// Color used for labels that have no palette entry.
pub const NEUTRAL_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

/// Default label to color-name table of the invoice model.
const DEFAULT_LABEL_COLORS: [(&str, &str); 12] = [
    ("B-ABN", "blue"),
    ("B-BILLER", "blue"),
    ("B-BILLER_ADDRESS", "green"),
    ("B-BILLER_POST_CODE", "orange"),
    ("B-DUE_DATE", "blue"),
    ("B-GST", "green"),
    ("B-INVOICE_DATE", "violet"),
    ("B-INVOICE_NUMBER", "orange"),
    ("B-SUBTOTAL", "green"),
    ("B-TOTAL", "blue"),
    ("I-BILLER_ADDRESS", "blue"),
    ("O", "orange"),
];

/// Strips the two-character tagging prefix (`B-`, `I-`) from a raw label.
///
/// Labels with nothing left after the prefix (the outside tag `O`) become
/// `"other"`.
///
/// ```
/// use invoicexpert::invoice::parse_label;
///
/// assert_eq!(parse_label("B-INVOICE_NUMBER"), "INVOICE_NUMBER");
/// assert_eq!(parse_label("O"), "other");
/// ```
pub fn parse_label(label: &str) -> String {
    let stripped: String = label.chars().skip(2).collect();
    if stripped.is_empty() {
        "other".to_string()
    } else {
        stripped
    }
}

/// Resolves a color name or `#RRGGBB` hex string to an RGB value.
///
/// Named colors follow the usual web/X11 values. Matching is
/// case-insensitive. Returns `None` for anything unrecognized.
pub fn parse_color(name: &str) -> Option<Rgb<u8>> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        return Some(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]));
    }

    let rgb = match name.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "violet" => [238, 130, 238],
        "purple" => [128, 0, 128],
        "magenta" | "fuchsia" => [255, 0, 255],
        "cyan" | "aqua" => [0, 255, 255],
        "gray" | "grey" => [128, 128, 128],
        "brown" => [165, 42, 42],
        "pink" => [255, 192, 203],
        _ => return None,
    };
    Some(Rgb(rgb))
}

/// Immutable mapping from raw model label to display color.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPalette {
    colors: HashMap<String, Rgb<u8>>,
}

impl LabelPalette {
    /// Creates an empty palette. Every label resolves to [`NEUTRAL_COLOR`].
    pub fn empty() -> Self {
        Self {
            colors: HashMap::new(),
        }
    }

    /// Builds a palette from label to color-name pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidColor`] if a color name cannot be resolved.
    pub fn from_names<I, K, V>(entries: I) -> Result<Self, ExtractionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self::empty().with_names(entries)
    }

    /// Returns a copy of this palette with the given entries added or replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidColor`] if a color name cannot be resolved.
    pub fn with_names<I, K, V>(mut self, entries: I) -> Result<Self, ExtractionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (label, color_name) in entries {
            let label = label.into();
            let color = parse_color(color_name.as_ref()).ok_or_else(|| {
                ExtractionError::InvalidColor {
                    label: label.clone(),
                    color: color_name.as_ref().to_string(),
                }
            })?;
            self.colors.insert(label, color);
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_color(mut self, label: impl Into<String>, color: Rgb<u8>) -> Self {
        self.colors.insert(label.into(), color);
        self
    }

    pub fn get(&self, label: &str) -> Option<Rgb<u8>> {
        self.colors.get(label).copied()
    }

    /// Color for `label`, falling back to [`NEUTRAL_COLOR`] when unmapped.
    pub fn color_for(&self, label: &str) -> Rgb<u8> {
        self.get(label).unwrap_or(NEUTRAL_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for LabelPalette {
    fn default() -> Self {
        let colors = DEFAULT_LABEL_COLORS
            .iter()
            .filter_map(|(label, name)| parse_color(name).map(|color| (label.to_string(), color)))
            .collect();
        Self { colors }
    }
}

/// The set of raw labels that are extracted and drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsOfInterest {
    labels: HashSet<String>,
}

impl ItemsOfInterest {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for ItemsOfInterest {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_OF_INTEREST)
    }
}
