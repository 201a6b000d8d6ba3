use scraper::{ElementRef, Html};
use scraper::node::Element;

const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Page text under one heading: the heading's own card, or for a bare
/// heading the siblings up to the next heading of the same tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_named(element: Option<&Element>, names: &[&str]) -> bool {
    element.map_or(false, |e| names.contains(&e.name()))
}

fn heading_count(element: ElementRef<'_>, tag: &str) -> usize {
    element
        .descendants()
        .filter(|n| is_named(n.value().as_element(), &[tag]))
        .count()
}

pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_ws(&element.text().collect::<Vec<_>>().join(" "))
}

/// Non-blank text nodes under `element`, skipping anything inside `skip` tags.
fn text_lines(element: ElementRef<'_>, skip: &[&str]) -> Vec<String> {
    element
        .descendants()
        .filter_map(|n| {
            let text = n.value().as_text()?;
            if n.ancestors().any(|a| is_named(a.value().as_element(), skip)) {
                return None;
            }
            let line = normalize_ws(text);
            (!line.is_empty()).then_some(line)
        })
        .collect()
}

/// Visible text of the document, one line per non-blank text node.
pub fn visible_lines(doc: &Html) -> Vec<String> {
    text_lines(doc.root_element(), INVISIBLE_TAGS)
}

/// Widest ancestor of `heading` that holds no other `tag` heading.
fn card_of<'a>(heading: ElementRef<'a>, tag: &str) -> ElementRef<'a> {
    let mut card = heading;
    while let Some(parent) = card.parent().and_then(ElementRef::wrap) {
        if heading_count(parent, tag) > 1 {
            break;
        }
        card = parent;
    }
    card
}

/// One section per `tag` heading (e.g. `h3`). Text outside every card,
/// such as headers and footers, belongs to no section.
pub fn sections(doc: &Html, tag: &str) -> Vec<Section> {
    let skip: Vec<&str> = INVISIBLE_TAGS.iter().copied().chain([tag]).collect();

    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == tag)
        .map(|heading| {
            let card = card_of(heading, tag);
            let lines = if card.id() != heading.id() {
                text_lines(card, &skip)
            } else {
                heading
                    .next_siblings()
                    .take_while(|n| {
                        !n.descendants().any(|d| is_named(d.value().as_element(), &[tag]))
                    })
                    .flat_map(|n| match ElementRef::wrap(n) {
                        Some(element) => text_lines(element, &skip),
                        None => n
                            .value()
                            .as_text()
                            .map(|t| normalize_ws(t))
                            .filter(|line| !line.is_empty())
                            .into_iter()
                            .collect(),
                    })
                    .collect()
            };
            Section {
                title: element_text(heading),
                lines,
            }
        })
        .collect()
}
