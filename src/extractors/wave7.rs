use scraper::Html;
use super::price::PriceMatcher;
use super::{dedupe, html, scan, session, ExtractError, ExtractedPrice, Extractor};

/// Wave7 booking stores (Atlantic Park, Lost Shore).
///
/// The catalog is a list of product cards, each titled by an `h3` with the
/// price in bold somewhere below it ("$ 103.00", "£ 60.00"). Every distinct
/// price in a card is kept; session lengths are often sold side by side.
/// Falls back to the text scan when fewer than two card prices turn up.
pub struct Wave7Extractor;

impl Extractor for Wave7Extractor {
    fn name(&self) -> &'static str {
        "wave7"
    }

    fn extract(&self, content: &str) -> Result<Vec<ExtractedPrice>, ExtractError> {
        let matcher = PriceMatcher::new()?;
        let doc = Html::parse_document(content);

        let mut cards = Vec::new();
        for section in html::sections(&doc, "h3") {
            if section.title.is_empty() || session::is_non_session(&section.title) {
                continue;
            }
            for money in matcher.find_all(&section.text()) {
                if money.amount > 0.0 {
                    cards.push(ExtractedPrice::labelled(money, &section.title));
                }
            }
        }
        let cards = dedupe(cards);

        if cards.len() < 2 {
            let scanned = scan::scan_lines(&html::visible_lines(&doc), &matcher);
            if !scanned.is_empty() {
                return Ok(scanned);
            }
        }

        Ok(cards)
    }
}
