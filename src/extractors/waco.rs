use regex::Regex;
use scraper::Html;
use super::price::PriceMatcher;
use super::{dedupe, html, scan, session, ExtractError, ExtractedPrice, Extractor};

/// Waco Surf's WordPress surf-center page (PerfectSwell).
///
/// Sessions are `h2` headings inside expandable cards, priced as
/// "Starts at $129 for 1 hour". Only headings that name a level count.
pub struct WacoSurfExtractor;

impl Extractor for WacoSurfExtractor {
    fn name(&self) -> &'static str {
        "waco_surf"
    }

    fn extract(&self, content: &str) -> Result<Vec<ExtractedPrice>, ExtractError> {
        let matcher = PriceMatcher::new()?;
        let starts_at = Regex::new(r"(?i)\bstarts?\s+(?:at|from)\s+([$£€]\s*\d[\d.,]*)")?;
        let doc = Html::parse_document(content);

        let mut found = Vec::new();
        for section in html::sections(&doc, "h2") {
            if session::categorize(&section.title).is_none() {
                continue;
            }
            let text = section.lines.join(" ");
            for cap in starts_at.captures_iter(&text) {
                if let Some(money) = matcher.find_first(&cap[1]) {
                    found.push(ExtractedPrice::labelled(money, &section.title));
                }
            }
        }
        let found = dedupe(found);

        if found.len() < 2 {
            let scanned = scan::scan_lines(&html::visible_lines(&doc), &matcher);
            if !scanned.is_empty() {
                return Ok(scanned);
            }
        }

        Ok(found)
    }
}
