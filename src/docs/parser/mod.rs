#[cfg(test)]
mod tests;

use scraper::{ElementRef, Html, Node, Selector};

/// A block of page text grouped under the heading that precedes it
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Heading text, empty for content before the first heading
    pub heading: String,
    /// Text content of the block, one line per element
    pub text: String,
}

/// Parsed representation of a documentation page
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    /// The page title
    pub title: String,
    /// Full visible text of the page, for whole-page fallback chunks
    pub full_text: String,
    /// Content sections in document order
    pub sections: Vec<Section>,
}

/// Heading tags that open a new section. The ChimeraX manual does not use h6.
const HEADING_TAGS: [&str; 5] = ["h1", "h2", "h3", "h4", "h5"];

/// Parse a documentation page into its title, full visible text, and
/// heading-delimited sections.
#[inline]
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").expect("valid selector");
    let title = document
        .select(&title_selector)
        .next()
        .map(|element| element_text(element, ""))
        .unwrap_or_default();

    let body_selector = Selector::parse("body").expect("valid selector");
    let body = document.select(&body_selector).next();

    let full_text = body.map_or_else(
        || element_text(document.root_element(), "\n"),
        |element| element_text(element, "\n"),
    );

    let sections = body.map(split_by_headings).unwrap_or_default();

    ParsedPage {
        title,
        full_text,
        sections,
    }
}

/// Join the trimmed text fragments of an element's descendants
fn element_text(element: ElementRef, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Walk the direct children of the body, starting a new section at each
/// heading. Content before the first heading lands in a section with an
/// empty heading.
fn split_by_headings(body: ElementRef) -> Vec<Section> {
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    let mut current_heading = String::new();
    let mut current_texts: Vec<String> = Vec::new();

    for child in body.children() {
        if let Some(element) = ElementRef::wrap(child) {
            if HEADING_TAGS.contains(&element.value().name()) {
                if !current_texts.is_empty() {
                    sections.push((current_heading.clone(), std::mem::take(&mut current_texts)));
                }
                current_heading = element_text(element, "");
            } else {
                let text = element_text(element, " ");
                if !text.is_empty() {
                    current_texts.push(text);
                }
            }
        } else if let Node::Text(text) = child.value() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                current_texts.push(trimmed.to_string());
            }
        }
    }

    if !current_texts.is_empty() {
        sections.push((current_heading, current_texts));
    }

    sections
        .into_iter()
        .map(|(heading, texts)| Section {
            heading,
            text: texts.join("\n"),
        })
        .collect()
}
