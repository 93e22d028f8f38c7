use crate::model::{
    NormalizedRecord, ParsedQuantity, PricePerUnitStatus, PriceValue, RawListing, UnitPrice,
};
use crate::parser::UnitParser;
use crate::utils::round_to;
use chrono::Utc;
use uuid::Uuid;

pub struct PriceNormalizer;

impl PriceNormalizer {
    /// Classifies the inputs and, when possible, computes price per unit.
    ///
    /// Checks run in a fixed order: missing price, then missing or zero
    /// quantity, then a price that is not a real number.
    pub fn compute(price: Option<&PriceValue>, parsed: Option<&ParsedQuantity>) -> UnitPrice {
        let Some(price) = price else {
            return UnitPrice::failed(PricePerUnitStatus::MissingPrice);
        };

        let quantity = match parsed {
            Some(p) if p.quantity != 0.0 && p.quantity.is_finite() => p.quantity,
            _ => return UnitPrice::failed(PricePerUnitStatus::MissingOrZeroQty),
        };

        let per_unit = price
            .as_number()
            .filter(|p| p.is_finite())
            .map(|p| round_to(p / quantity, 3))
            .filter(|ppu| ppu.is_finite());

        match per_unit {
            Some(ppu) => UnitPrice {
                price_per_unit: Some(ppu),
                status: PricePerUnitStatus::Ok,
            },
            None => UnitPrice::failed(PricePerUnitStatus::InvalidPriceType),
        }
    }
}

impl UnitPrice {
    fn failed(status: PricePerUnitStatus) -> Self {
        Self {
            price_per_unit: None,
            status,
        }
    }
}

pub fn normalize_all(listings: &[RawListing], parser: &UnitParser) -> Vec<NormalizedRecord> {
    listings
        .iter()
        .map(|listing| normalize_record(listing, parser))
        .collect()
}

pub fn normalize_record(listing: &RawListing, parser: &UnitParser) -> NormalizedRecord {
    let parsed = parser.parse(listing.unit_text.as_deref());
    let unit_price = PriceNormalizer::compute(listing.price.as_ref(), parsed.as_ref());

    NormalizedRecord {
        id: Uuid::new_v4().to_string(),
        title: listing.title.clone(),
        price: listing.price.as_ref().and_then(PriceValue::as_number),
        unit_text: listing.unit_text.clone(),
        normalized_unit_qty: parsed.as_ref().map(|p| p.quantity),
        normalized_unit: parsed.map(|p| p.unit),
        price_per_unit: unit_price.price_per_unit,
        price_per_unit_status: unit_price.status,
        source: listing.source.as_str().to_string(),
        url: listing.url.clone(),
        normalized_at: Utc::now(),
    }
}
