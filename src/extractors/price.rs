use regex::Regex;
use std::ops::Range;
use crate::data::types::{Currency, Money};

/// Finds currency-tagged amounts in free text.
///
/// Recognized forms: `$49.99`, `£ 45`, `€39,90`, `39,90 €`, `EUR 39.90`.
/// Bare numbers are never treated as prices.
pub struct PriceMatcher {
    prefixed: Regex,
    suffixed: Regex,
}

impl PriceMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        let prefixed = Regex::new(
            r"(?x)
            (?P<sym>[$£€])\s*(?P<sym_num>\d[\d.,]*)
            | \b(?P<code>USD|GBP|EUR)\s*(?P<code_num>\d[\d.,]*)
            ",
        )?;
        let suffixed = Regex::new(r"(?P<num>\d[\d.,]*)\s*(?:€|\bEUR\b)")?;
        Ok(Self { prefixed, suffixed })
    }

    /// All prices in `text`, in order of appearance.
    ///
    /// Prefixed forms win. A trailing `€` only counts when no amount follows
    /// it, so in "Turns 2 €59,90" the price is 59,90 and not 2.
    pub fn find_all(&self, text: &str) -> Vec<Money> {
        let mut found: Vec<(Range<usize>, Money)> = self
            .prefixed
            .captures_iter(text)
            .filter_map(|cap| {
                let (currency, raw) = if let (Some(sym), Some(num)) = (cap.name("sym"), cap.name("sym_num")) {
                    (currency_from_symbol(sym.as_str())?, num.as_str())
                } else {
                    (currency_from_code(cap.name("code")?.as_str())?, cap.name("code_num")?.as_str())
                };
                let amount = parse_amount(raw)?;
                Some((cap.get(0)?.range(), Money { amount, currency }))
            })
            .collect();

        for cap in self.suffixed.captures_iter(text) {
            let (Some(whole), Some(num)) = (cap.get(0), cap.name("num")) else {
                continue;
            };
            let span = whole.range();
            if text[span.end..].trim_start().starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            if found.iter().any(|(r, _)| r.start < span.end && span.start < r.end) {
                continue;
            }
            if let Some(amount) = parse_amount(num.as_str()) {
                found.push((span, Money { amount, currency: Currency::Eur }));
            }
        }

        found.sort_by_key(|(span, _)| span.start);
        found.into_iter().map(|(_, money)| money).collect()
    }

    pub fn find_first(&self, text: &str) -> Option<Money> {
        self.find_all(text).into_iter().next()
    }
}

fn currency_from_symbol(symbol: &str) -> Option<Currency> {
    match symbol {
        "$" => Some(Currency::Usd),
        "£" => Some(Currency::Gbp),
        "€" => Some(Currency::Eur),
        _ => None,
    }
}

fn currency_from_code(code: &str) -> Option<Currency> {
    match code {
        "USD" => Some(Currency::Usd),
        "GBP" => Some(Currency::Gbp),
        "EUR" => Some(Currency::Eur),
        _ => None,
    }
}

/// Parse a number written with either `,` or `.` as the decimal mark.
///
/// With both marks present the later one is the decimal mark. With a single
/// mark, one occurrence followed by one or two digits is decimal, anything
/// else is a thousands separator and must split the digits into groups of 3.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches(['.', ',']);
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');

    let (int_part, frac_part, thousands) = match (last_comma, last_dot) {
        (None, None) => (s, "", None),
        (Some(c), Some(d)) => {
            let (dec, thou) = if c > d { (c, '.') } else { (d, ',') };
            (&s[..dec], &s[dec + 1..], Some(thou))
        }
        (Some(i), None) | (None, Some(i)) => {
            let mark = s.as_bytes()[i] as char;
            let occurrences = s.matches(mark).count();
            let tail = &s[i + 1..];
            if occurrences == 1 && (1..=2).contains(&tail.len()) {
                (&s[..i], tail, None)
            } else {
                (s, "", Some(mark))
            }
        }
    };

    if frac_part.contains([',', '.']) {
        return None;
    }

    let digits = match thousands {
        Some(sep) => {
            let groups: Vec<&str> = int_part.split(sep).collect();
            let first_ok = !groups[0].is_empty() && groups[0].len() <= 3;
            let rest_ok = groups[1..].iter().all(|g| g.len() == 3);
            if !first_ok || !rest_ok || groups.iter().any(|g| g.contains([',', '.'])) {
                return None;
            }
            groups.concat()
        }
        None => {
            if int_part.contains([',', '.']) {
                return None;
            }
            int_part.to_string()
        }
    };

    let number = if frac_part.is_empty() {
        digits
    } else {
        format!("{}.{}", digits, frac_part)
    };
    number.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PriceMatcher {
        PriceMatcher::new().unwrap()
    }

    #[test]
    fn test_supported_formats() {
        let m = matcher();
        let cases = [
            ("$49.99", 49.99, Currency::Usd),
            ("£45", 45.0, Currency::Gbp),
            ("€39,90", 39.90, Currency::Eur),
            ("$ 103.00", 103.0, Currency::Usd),
            ("$1,299.00", 1299.0, Currency::Usd),
            ("€1.299,00", 1299.0, Currency::Eur),
            ("39,90 €", 39.90, Currency::Eur),
            ("EUR 89", 89.0, Currency::Eur),
            ("Starts at $129 for 1 hour", 129.0, Currency::Usd),
        ];

        for (text, amount, currency) in cases {
            let money = m.find_first(text).unwrap_or_else(|| panic!("no price in {:?}", text));
            assert!((money.amount - amount).abs() < 1e-9, "{:?} -> {}", text, money.amount);
            assert_eq!(money.currency, currency, "{:?}", text);
        }
    }

    #[test]
    fn test_noise_yields_nothing() {
        let m = matcher();
        for text in ["from", "per session", "$", "€ ,", "Book now!", "60-min session", "", "1,2,3"] {
            assert!(m.find_all(text).is_empty(), "{:?}", text);
        }
    }

    #[test]
    fn test_sentence_punctuation() {
        let m = matcher();
        let prices = m.find_all("Sessions from $59. Premium $79, peak £60.");
        let amounts: Vec<f64> = prices.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![59.0, 79.0, 60.0]);
    }

    #[test]
    fn test_count_before_euro_amount_is_not_a_price() {
        let m = matcher();
        assert_eq!(
            m.find_all("Turns 2 €59,90"),
            vec![Money { amount: 59.90, currency: Currency::Eur }]
        );

        let prices = m.find_all("Beginner 39,90 € Turns 2 € 59,90 Expert 79 EUR");
        let amounts: Vec<f64> = prices.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![39.90, 59.90, 79.0]);
    }

    #[test]
    fn test_parse_amount_rejects_bad_grouping() {
        assert_eq!(parse_amount("1,2,3"), None);
        assert_eq!(parse_amount("12,34,567"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("1.234.567"), Some(1_234_567.0));
        assert_eq!(parse_amount("1,234"), Some(1234.0));
        assert_eq!(parse_amount("12.5"), Some(12.5));
    }
}
