use scraper::Html;
use super::price::PriceMatcher;
use super::{dedupe, html, session, ExtractError, ExtractedPrice, Extractor};

/// Prices outside this open interval are headline noise (season passes,
/// deposits, "save $5") rather than a single session.
const PLAUSIBLE_MIN: f64 = 10.0;
const PLAUSIBLE_MAX: f64 = 500.0;

/// Lines looked at after a session line (itself included), and before it
/// when nothing follows.
const WINDOW_AFTER: usize = 5;
const WINDOW_BEFORE: usize = 1;

pub fn is_plausible(amount: f64) -> bool {
    amount > PLAUSIBLE_MIN && amount < PLAUSIBLE_MAX
}

/// For every line naming a session level, take the first plausible price
/// on that line or the few after it, else on the line just before it.
pub fn scan_lines(lines: &[String], matcher: &PriceMatcher) -> Vec<ExtractedPrice> {
    let mut found = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if session::categorize(line).is_none() {
            continue;
        }

        let end = (i + WINDOW_AFTER).min(lines.len());
        let before = &lines[i.saturating_sub(WINDOW_BEFORE)..i];
        let first_plausible = |window: &[String]| {
            matcher
                .find_all(&window.join(" "))
                .into_iter()
                .find(|m| is_plausible(m.amount))
        };

        if let Some(money) = first_plausible(&lines[i..end]).or_else(|| first_plausible(before)) {
            found.push(ExtractedPrice::labelled(money, line));
        }
    }

    dedupe(found)
}

/// Generic full-page scan for sites without a dedicated structure
/// (Surf Loch, SwellMFG + UNIT, Endless Surf, PerfectSwell resorts).
pub struct PriceScanExtractor;

impl Extractor for PriceScanExtractor {
    fn name(&self) -> &'static str {
        "price_scan"
    }

    fn extract(&self, content: &str) -> Result<Vec<ExtractedPrice>, ExtractError> {
        let matcher = PriceMatcher::new()?;
        let doc = Html::parse_document(content);
        Ok(scan_lines(&html::visible_lines(&doc), &matcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{Currency, SessionLevel};

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_window_pairs_level_with_price() {
        let matcher = PriceMatcher::new().unwrap();
        let found = scan_lines(
            &lines(&[
                "Beginner Waves",
                "60 minutes",
                "from $89",
                "Advanced Reef",
                "$139 per session",
            ]),
            &matcher,
        );

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].money.amount, 89.0);
        assert_eq!(found[0].level, Some(SessionLevel::Beginner));
        assert_eq!(found[0].label.as_deref(), Some("Beginner Waves"));
        assert_eq!(found[1].money.amount, 139.0);
        assert_eq!(found[1].level, Some(SessionLevel::Advanced));
    }

    #[test]
    fn test_price_on_line_before() {
        let matcher = PriceMatcher::new().unwrap();
        let found = scan_lines(&lines(&["£45", "Improver session", "Book now"]), &matcher);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].money.amount, 45.0);
        assert_eq!(found[0].money.currency, Currency::Gbp);
    }

    #[test]
    fn test_implausible_prices_skipped() {
        let matcher = PriceMatcher::new().unwrap();
        let found = scan_lines(&lines(&["Intermediate", "Save $5", "€1.200,00 season", "€65"]), &matcher);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].money.amount, 65.0);
        assert_eq!(found[0].money.currency, Currency::Eur);
    }

    #[test]
    fn test_turns_count_then_euro_price() {
        let found = PriceScanExtractor.extract("<p>Expert Turns 2</p><p>€79,90</p>").unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].money.amount, 79.90);
        assert_eq!(found[0].money.currency, Currency::Eur);
        assert_eq!(found[0].level, Some(SessionLevel::Advanced));
    }

    #[test]
    fn test_page_without_sessions_is_empty() {
        let page = "<html><body><h1>Welcome</h1><p>Tickets from $49</p></body></html>";
        assert!(PriceScanExtractor.extract(page).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_does_not_fail() {
        let found = PriceScanExtractor.extract("<<<\u{0}>>> $$$ £ € </div></div>").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_endless_surf_page() {
        let page = r#"
            <html><body>
              <section><h2>Surf Sessions</h2>
                <div><p>Beginner</p><p>39,90 €</p></div>
                <div><p>Intermediate Turns</p><p>€ 59,90</p></div>
                <div><p>Expert</p><p>€79,90</p></div>
              </section>
            </body></html>
        "#;

        let found = PriceScanExtractor.extract(page).unwrap();
        let amounts: Vec<f64> = found.iter().map(|p| p.money.amount).collect();
        assert_eq!(amounts, vec![39.90, 59.90, 79.90]);
        assert!(found.iter().all(|p| p.money.currency == Currency::Eur));
    }
}
