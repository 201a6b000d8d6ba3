use scraper::{Html, Selector};
use serde_json::Value;
use super::price::{parse_amount, PriceMatcher};
use super::{dedupe, html, scan, ExtractError, ExtractedPrice, Extractor};
use crate::data::types::{Currency, Money};

/// The Wave Bristol book-now page.
///
/// Ticketing lives on another domain, so the page itself only carries
/// whatever schema.org offers it embeds as JSON-LD. Without those, the
/// session descriptions are scanned as text.
pub struct TheWaveExtractor;

impl Extractor for TheWaveExtractor {
    fn name(&self) -> &'static str {
        "the_wave"
    }

    fn extract(&self, content: &str) -> Result<Vec<ExtractedPrice>, ExtractError> {
        let matcher = PriceMatcher::new()?;
        let ld_json = Selector::parse(r#"script[type="application/ld+json"]"#)
            .map_err(|e| ExtractError::Selector(format!("{:?}", e)))?;
        let doc = Html::parse_document(content);

        let mut offers = Vec::new();
        for script in doc.select(&ld_json) {
            let raw = script.text().collect::<String>();
            // Broken JSON-LD is common and not our problem; skip the block.
            let Ok(value) = serde_json::from_str::<Value>(&raw) else {
                tracing::debug!("Skipping unparseable JSON-LD block");
                continue;
            };
            collect_offers(&value, None, &mut offers);
        }
        let offers = dedupe(offers);

        if !offers.is_empty() {
            return Ok(offers);
        }
        Ok(scan::scan_lines(&html::visible_lines(&doc), &matcher))
    }
}

/// Walk a JSON-LD tree and pick up every object carrying `price` and
/// `priceCurrency`. An offer without its own `name` takes its parent's.
fn collect_offers(value: &Value, inherited_name: Option<&str>, out: &mut Vec<ExtractedPrice>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_offers(item, inherited_name, out);
            }
        }
        Value::Object(map) => {
            let name = map.get("name").and_then(Value::as_str).or(inherited_name);

            if let (Some(price), Some(code)) = (map.get("price"), map.get("priceCurrency")) {
                let amount = match price {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => parse_amount(s),
                    _ => None,
                };
                let currency = match code.as_str() {
                    Some("USD") => Some(Currency::Usd),
                    Some("GBP") => Some(Currency::Gbp),
                    Some("EUR") => Some(Currency::Eur),
                    _ => None,
                };
                if let (Some(amount), Some(currency)) = (amount, currency) {
                    if amount > 0.0 {
                        out.push(ExtractedPrice::labelled(Money { amount, currency }, name.unwrap_or("")));
                    }
                }
            }

            for child in map.values() {
                if child.is_object() || child.is_array() {
                    collect_offers(child, name, out);
                }
            }
        }
        _ => {}
    }
}
