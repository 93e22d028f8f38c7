// Size-phrase matchers, tried in priority order by UnitParser
use crate::parser::units::token_alternation;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Quantity and token as they appear in the text, before unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuantity {
    pub quantity: f64,
    pub unit: String,
}

/// One phrasing of a package size. Implementations see lower-cased text.
pub trait QuantityPattern: Send + Sync {
    fn name(&self) -> &'static str;
    fn try_match(&self, text: &str) -> Option<RawQuantity>;
}

/// Decimal number with optional thousands separators: `1,000`, `16.9`, `.5`.
const NUMBER: &str = r"(\d+(?:,\d{3})*(?:\.\d+)?|\.\d+)";

/// Whole-number multiplier; must not continue a decimal or grouped number.
const OUTER: &str = r"(?:^|[^\d.,])(\d+)";

lazy_static! {
    static ref MULTIPLICATIVE_RE: Regex = Regex::new(&format!(
        r"{OUTER}\s*[x×]\s*{NUMBER}\s*({})\b",
        token_alternation()
    ))
    .expect("multiplicative pattern is valid");

    static ref PACK_RE: Regex = Regex::new(&format!(
        r"{OUTER}\s*packs?\s+(?:of\s+)?{NUMBER}\s*({})\b",
        token_alternation()
    ))
    .expect("pack pattern is valid");

    static ref SINGLE_RE: Regex = Regex::new(&format!(
        r"{NUMBER}\s*,?\s*({})\b",
        token_alternation()
    ))
    .expect("single pattern is valid");
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite())
}

fn normalize_token(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `<outer> … <inner> <unit>` captures, multiplied together.
fn outer_times_inner(caps: &Captures) -> Option<RawQuantity> {
    let outer = parse_number(caps.get(1)?.as_str())?;
    let inner = parse_number(caps.get(2)?.as_str())?;
    let quantity = Some(outer * inner).filter(|q| q.is_finite())?;
    Some(RawQuantity {
        quantity,
        unit: normalize_token(caps.get(3)?.as_str()),
    })
}

/// "24 x 2 oz", "12x500ml"
pub struct MultiplicativePattern;

impl QuantityPattern for MultiplicativePattern {
    fn name(&self) -> &'static str {
        "multiplicative"
    }

    fn try_match(&self, text: &str) -> Option<RawQuantity> {
        outer_times_inner(&MULTIPLICATIVE_RE.captures(text)?)
    }
}

/// "40 pack of 16.9 oz", "5 packs 6 rolls"
pub struct PackPattern;

impl QuantityPattern for PackPattern {
    fn name(&self) -> &'static str {
        "pack"
    }

    fn try_match(&self, text: &str) -> Option<RawQuantity> {
        outer_times_inner(&PACK_RE.captures(text)?)
    }
}

/// "12 rolls", "16.9 oz", "1,000 sheets"
pub struct SinglePattern;

impl QuantityPattern for SinglePattern {
    fn name(&self) -> &'static str {
        "single"
    }

    fn try_match(&self, text: &str) -> Option<RawQuantity> {
        let caps = SINGLE_RE.captures(text)?;
        Some(RawQuantity {
            quantity: parse_number(caps.get(1)?.as_str())?,
            unit: normalize_token(caps.get(2)?.as_str()),
        })
    }
}

/// Multiplicative, then pack, then single.
pub fn default_patterns() -> Vec<Box<dyn QuantityPattern>> {
    vec![
        Box::new(MultiplicativePattern),
        Box::new(PackPattern),
        Box::new(SinglePattern),
    ]
}
