// Unit conversion table: raw tokens from listing titles onto ml, g and unit

pub const ML: &str = "ml";
pub const G: &str = "g";
pub const UNIT: &str = "unit";

/// Milliliters per (fluid) ounce. Listings use "oz" for both.
pub const ML_PER_OZ: f64 = 29.5735;

/// Raw token, canonical unit, multiplicative factor.
pub static UNIT_TABLE: &[(&str, &str, f64)] = &[
    ("oz", ML, ML_PER_OZ),
    ("fl oz", ML, ML_PER_OZ),
    ("g", G, 1.0),
    ("kg", G, 1000.0),
    ("ml", ML, 1.0),
    ("l", ML, 1000.0),
    ("count", UNIT, 1.0),
    ("ct", UNIT, 1.0),
    ("bars", UNIT, 1.0),
    ("packs", UNIT, 1.0),
    ("tablets", UNIT, 1.0),
    ("sheets", UNIT, 1.0),
    ("rolls", UNIT, 1.0),
];

/// Looks up a raw token, returning `(canonical_unit, factor)`.
pub fn lookup(token: &str) -> Option<(&'static str, f64)> {
    UNIT_TABLE
        .iter()
        .find(|(raw, _, _)| *raw == token)
        .map(|(_, canonical, factor)| (*canonical, *factor))
}

/// Regex alternation over every recognized token, longest first so that
/// "fl oz" wins over "oz" and "kg" over "g".
pub fn token_alternation() -> String {
    let mut tokens: Vec<&str> = UNIT_TABLE.iter().map(|(raw, _, _)| *raw).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    tokens
        .iter()
        .map(|t| regex::escape(t).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}
