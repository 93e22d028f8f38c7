// Core structs: RawListing, ParsedQuantity, NormalizedRecord
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Retail site a listing was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Amazon,
    Target,
    Walmart,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Amazon, Source::Target, Source::Walmart];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Amazon => "Amazon",
            Source::Target => "Target",
            Source::Walmart => "Walmart",
        }
    }

    /// Infers the source from a dataset file name, e.g. `amazon_toilet_paper.json`.
    pub fn from_filename(name: &str) -> Result<Self, ExtractError> {
        let lower = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| lower.contains(&s.as_str().to_lowercase()))
            .ok_or_else(|| ExtractError::UnknownSource(name.to_string()))
    }
}

impl FromStr for Source {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|src| src.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExtractError::UnknownSource(s.to_string()))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price field as handed over by the extraction layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceValue {
    Number(f64),
    /// A non-numeric value that slipped through from a malformed upstream field.
    Untyped(String),
}

impl PriceValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PriceValue::Number(n) => Some(*n),
            PriceValue::Untyped(_) => None,
        }
    }
}

/// Listing mapped from a source-specific schema into the common shape.
#[derive(Debug, Clone)]
pub struct RawListing {
    pub title: String,
    pub price: Option<PriceValue>,
    pub unit_text: Option<String>,
    pub source: Source,
    pub url: Option<String>,
}

/// A size description reduced to a quantity and a unit tag.
///
/// `unit` is one of the canonical tags (`ml`, `g`, `unit`) when the raw token
/// was found in the conversion table, otherwise the raw token verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuantity {
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PricePerUnitStatus {
    MissingPrice,
    MissingOrZeroQty,
    InvalidPriceType,
    Ok,
}

impl PricePerUnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricePerUnitStatus::MissingPrice => "missing_price",
            PricePerUnitStatus::MissingOrZeroQty => "missing_or_zero_qty",
            PricePerUnitStatus::InvalidPriceType => "invalid_price_type",
            PricePerUnitStatus::Ok => "ok",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "missing_price" => Some(PricePerUnitStatus::MissingPrice),
            "missing_or_zero_qty" => Some(PricePerUnitStatus::MissingOrZeroQty),
            "invalid_price_type" => Some(PricePerUnitStatus::InvalidPriceType),
            "ok" => Some(PricePerUnitStatus::Ok),
            _ => None,
        }
    }
}

impl fmt::Display for PricePerUnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a price-per-unit computation.
///
/// `price_per_unit` is `Some` exactly when `status` is `Ok`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPrice {
    pub price_per_unit: Option<f64>,
    pub status: PricePerUnitStatus,
}

#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub id: String,
    pub title: String,
    pub price: Option<f64>,
    pub unit_text: Option<String>,
    pub normalized_unit_qty: Option<f64>,
    pub normalized_unit: Option<String>,
    pub price_per_unit: Option<f64>,
    pub price_per_unit_status: PricePerUnitStatus,
    pub source: String,
    pub url: Option<String>,
    pub normalized_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unknown source: {0}")]
    UnknownSource(String),
    #[error("dataset is not a JSON array: {0}")]
    NotAnArray(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}
