// Free-text package size parsing
use crate::model::ParsedQuantity;
use crate::parser::patterns::{default_patterns, QuantityPattern, RawQuantity};
use crate::parser::units;
use crate::utils::round_to;
use tracing::debug;

/// Turns size descriptions such as "24 x 2 oz" into a canonical quantity.
///
/// The input must be original listing text. Canonical output strings carry no
/// number, and re-parsing "1419.53 ml" is a factor-1 conversion, so a value
/// already normalized is never converted twice.
pub struct UnitParser {
    patterns: Vec<Box<dyn QuantityPattern>>,
}

impl UnitParser {
    pub fn new() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }

    /// Uses the given matchers, in order, instead of the built-in ones.
    pub fn with_patterns(patterns: Vec<Box<dyn QuantityPattern>>) -> Self {
        Self { patterns }
    }

    /// Returns `None` for missing, empty or unrecognized text.
    pub fn parse(&self, text: Option<&str>) -> Option<ParsedQuantity> {
        let text = text?.trim();
        if text.is_empty() {
            return None;
        }
        let lower = text.to_lowercase();

        let (pattern, raw) = self
            .patterns
            .iter()
            .find_map(|p| p.try_match(&lower).map(|raw| (p.name(), raw)))?;

        debug!("Matched {} pattern: {} {}", pattern, raw.quantity, raw.unit);
        convert(raw)
    }
}

impl Default for UnitParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the conversion table; unknown tokens pass through unchanged.
/// Quantities that are not finite after conversion are dropped.
fn convert(raw: RawQuantity) -> Option<ParsedQuantity> {
    let parsed = match units::lookup(&raw.unit) {
        Some((canonical, factor)) => ParsedQuantity {
            quantity: round_to(raw.quantity * factor, 2),
            unit: canonical.to_string(),
        },
        None => ParsedQuantity {
            quantity: raw.quantity,
            unit: raw.unit,
        },
    };
    parsed.quantity.is_finite().then_some(parsed)
}
