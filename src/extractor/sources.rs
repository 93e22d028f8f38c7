// Per-site field mapping into RawListing
use crate::model::{PriceValue, RawListing, Source};
use serde_json::Value;

/// Maps one raw scraped item of the given source into the common shape.
pub fn extract(source: Source, item: &Value) -> RawListing {
    match source {
        Source::Amazon => extract_amazon(item),
        Source::Target => extract_target(item),
        Source::Walmart => extract_walmart(item),
    }
}

fn extract_amazon(item: &Value) -> RawListing {
    let title = text_field(item, "title");
    RawListing {
        price: price_value(item.get("price").and_then(|p| p.get("value"))),
        unit_text: non_empty(&title),
        title,
        source: Source::Amazon,
        url: optional_text(item.get("url")),
    }
}

fn extract_target(item: &Value) -> RawListing {
    let title = text_field(item, "title");
    RawListing {
        price: price_value(item.get("price").and_then(|p| p.get("current_retail"))),
        unit_text: non_empty(&title),
        title,
        source: Source::Target,
        url: optional_text(item.get("buy_url")),
    }
}

fn extract_walmart(item: &Value) -> RawListing {
    let title = text_field(item, "name");
    RawListing {
        price: price_value(item.get("priceInfo").and_then(|p| p.get("price"))),
        unit_text: non_empty(&title),
        title,
        source: Source::Walmart,
        url: None,
    }
}

fn text_field(item: &Value, key: &str) -> String {
    optional_text(item.get(key)).unwrap_or_default()
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(|s| s.trim().to_string())
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Numbers stay numbers, price strings like "$1,299.00" are parsed,
/// anything else is kept as an untyped value.
fn price_value(value: Option<&Value>) -> Option<PriceValue> {
    match value? {
        Value::Null => None,
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) => PriceValue::Number(f),
            None => PriceValue::Untyped(n.to_string()),
        }),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(parse_price_text(s)),
        other => Some(PriceValue::Untyped(other.to_string())),
    }
}

fn parse_price_text(s: &str) -> PriceValue {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    match cleaned.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => PriceValue::Number(f),
        _ => PriceValue::Untyped(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_amazon_fields() {
        let item = json!({
            "title": "Charmin Ultra Soft, 24 Rolls",
            "price": { "value": 29.99, "currency": "$" },
            "url": "https://www.amazon.com/dp/B0"
        });
        let listing = extract(Source::Amazon, &item);
        assert_eq!(listing.title, "Charmin Ultra Soft, 24 Rolls");
        assert_eq!(listing.price, Some(PriceValue::Number(29.99)));
        assert_eq!(listing.unit_text.as_deref(), Some("Charmin Ultra Soft, 24 Rolls"));
        assert_eq!(listing.url.as_deref(), Some("https://www.amazon.com/dp/B0"));
        assert_eq!(listing.source, Source::Amazon);
    }

    #[test]
    fn amazon_null_price_object_is_missing() {
        let item = json!({ "title": "Bars 12 ct", "price": null });
        assert_eq!(extract(Source::Amazon, &item).price, None);
    }

    #[test]
    fn maps_target_fields() {
        let item = json!({
            "title": "Bounty Paper Towels - 6 Double Rolls",
            "price": { "current_retail": 12.49 },
            "buy_url": "https://www.target.com/p/-/A-1"
        });
        let listing = extract(Source::Target, &item);
        assert_eq!(listing.price, Some(PriceValue::Number(12.49)));
        assert_eq!(listing.url.as_deref(), Some("https://www.target.com/p/-/A-1"));
    }

    #[test]
    fn maps_walmart_fields_and_price_text() {
        let item = json!({
            "name": "Great Value Purified Water, 40 pack of 16.9 oz",
            "priceInfo": { "price": "$1,299.00" }
        });
        let listing = extract(Source::Walmart, &item);
        assert_eq!(listing.title, "Great Value Purified Water, 40 pack of 16.9 oz");
        assert_eq!(listing.price, Some(PriceValue::Number(1299.0)));
        assert_eq!(listing.url, None);
    }

    #[test]
    fn walmart_missing_price_info() {
        let item = json!({ "name": "Protein Bar 12 ct" });
        assert_eq!(extract(Source::Walmart, &item).price, None);
    }

    #[test]
    fn malformed_prices_are_untyped() {
        let item = json!({ "title": "x", "price": { "value": "call for price" } });
        assert_eq!(
            extract(Source::Amazon, &item).price,
            Some(PriceValue::Untyped("call for price".into()))
        );

        let item = json!({ "title": "x", "price": { "current_retail": [1, 2] } });
        assert_eq!(
            extract(Source::Target, &item).price,
            Some(PriceValue::Untyped("[1,2]".into()))
        );
    }

    #[test]
    fn missing_title_has_no_unit_text() {
        let listing = extract(Source::Target, &json!({}));
        assert_eq!(listing.title, "");
        assert_eq!(listing.unit_text, None);
        assert_eq!(listing.price, None);
    }
}
