use super::*;

#[test]
fn parse_simple_page() {
    let html = r#"
            <html>
                <head><title>Command: color, rainbow</title></head>
                <body>
                    <h1>color</h1>
                    <p>Color atoms, ribbons, and surfaces.</p>
                </body>
            </html>
        "#;

    let page = parse_page(html);

    assert_eq!(page.title, "Command: color, rainbow");
    assert!(page.full_text.contains("Color atoms, ribbons, and surfaces."));
    assert_eq!(page.sections.len(), 1);
    assert_eq!(page.sections[0].heading, "color");
    assert_eq!(page.sections[0].text, "Color atoms, ribbons, and surfaces.");
}

#[test]
fn sections_split_at_headings() {
    let html = r#"
            <html>
                <head><title>Command: open</title></head>
                <body>
                    <h1>open</h1>
                    <p>Open structures from files or fetch them by identifier.</p>
                    <h2>File Formats</h2>
                    <p>Supported formats include PDB and mmCIF.</p>
                    <p>Format is inferred from the file suffix.</p>
                    <h3>Fetching</h3>
                    <p>Structures can be fetched from the RCSB by ID.</p>
                </body>
            </html>
        "#;

    let page = parse_page(html);

    let headings: Vec<&str> = page
        .sections
        .iter()
        .map(|section| section.heading.as_str())
        .collect();
    assert_eq!(headings, vec!["open", "File Formats", "Fetching"]);
    assert_eq!(
        page.sections[1].text,
        "Supported formats include PDB and mmCIF.\nFormat is inferred from the file suffix."
    );
}

#[test]
fn content_before_first_heading() {
    let html = r#"
            <html>
                <head><title>ChimeraX User Guide</title></head>
                <body>
                    <p>Introductory text appearing before any heading.</p>
                    <h2>Getting Started</h2>
                    <p>Start by opening a structure.</p>
                </body>
            </html>
        "#;

    let page = parse_page(html);

    assert_eq!(page.sections.len(), 2);
    assert_eq!(page.sections[0].heading, "");
    assert_eq!(
        page.sections[0].text,
        "Introductory text appearing before any heading."
    );
    assert_eq!(page.sections[1].heading, "Getting Started");
}

#[test]
fn heading_with_no_content_is_dropped() {
    let html = r#"
            <html>
                <head><title>Empty Sections</title></head>
                <body>
                    <h2>First</h2>
                    <h2>Second</h2>
                    <p>Only the second heading has content.</p>
                </body>
            </html>
        "#;

    let page = parse_page(html);

    assert_eq!(page.sections.len(), 1);
    assert_eq!(page.sections[0].heading, "Second");
}

#[test]
fn nested_markup_joined_with_spaces() {
    let html = r#"
            <html>
                <head><title>Markup</title></head>
                <body>
                    <h2>Usage</h2>
                    <p>Use <b>color</b> <i>spec</i> to recolor a selection.</p>
                </body>
            </html>
        "#;

    let page = parse_page(html);

    assert_eq!(
        page.sections[0].text,
        "Use color spec to recolor a selection."
    );
}

#[test]
fn html_entities_decoded() {
    let html = r#"
            <html>
                <head><title>Entities &amp; Escapes</title></head>
                <body>
                    <p>Distances &lt; 5 &Aring; are considered contacts.</p>
                </body>
            </html>
        "#;

    let page = parse_page(html);

    assert_eq!(page.title, "Entities & Escapes");
    assert!(page.full_text.contains("Distances < 5 \u{c5} are considered contacts."));
}

#[test]
fn bare_text_in_body() {
    let html = r#"
            <html>
                <head><title>Bare Text</title></head>
                <body>
                    Loose text directly in the body.
                    <h2>Heading</h2>
                    <p>Paragraph text.</p>
                </body>
            </html>
        "#;

    let page = parse_page(html);

    assert_eq!(page.sections[0].heading, "");
    assert_eq!(page.sections[0].text, "Loose text directly in the body.");
}

#[test]
fn empty_page() {
    let page = parse_page("<html><head><title>Empty</title></head><body></body></html>");

    assert_eq!(page.title, "Empty");
    assert!(page.full_text.is_empty());
    assert!(page.sections.is_empty());
}

#[test]
fn missing_title() {
    let page = parse_page("<html><body><p>No title on this page.</p></body></html>");

    assert_eq!(page.title, "");
    assert_eq!(page.sections.len(), 1);
}

#[test]
fn malformed_html() {
    let html = r#"
            <html>
                <head><title>Broken Page</title>
                <body>
                    <h1>Unclosed heading
                    <p>Paragraph without closing tag
                </body>
            </html>
        "#;

    let page = parse_page(html);

    // Should handle malformed HTML gracefully
    assert_eq!(page.title, "Broken Page");
    assert!(!page.full_text.is_empty());
}
