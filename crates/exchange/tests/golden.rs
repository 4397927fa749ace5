//! Real-world export shapes, checked against their expected outlines

use bookmark_exchange::{
    detect_layout, flatten, parse, serialize, BookmarkItem, DocumentLayout, Outline,
};
use bookmark_dom::parse_html;

const CHROME: &str = include_str!("fixtures/chrome.html");
const FIREFOX: &str = include_str!("fixtures/firefox.html");
const SAFARI: &str = include_str!("fixtures/safari.html");

fn assert_outline(html: &str, expected: &str) -> Vec<BookmarkItem> {
    let items = parse(html).unwrap();
    assert_eq!(Outline(&items).to_string(), expected);
    items
}

#[test]
fn test_chrome_export() {
    let items = assert_outline(CHROME, include_str!("fixtures/chrome.txt"));
    assert_eq!(items.iter().map(BookmarkItem::bookmark_count).sum::<usize>(), 3);
}

#[test]
fn test_firefox_export() {
    let items = assert_outline(FIREFOX, include_str!("fixtures/firefox.txt"));

    // Separators and descriptions never surface as entries
    assert_eq!(flatten(&items).len(), 3);
}

#[test]
fn test_safari_export() {
    let document = parse_html(SAFARI).unwrap();
    assert_eq!(detect_layout(&document), DocumentLayout::NestedUnderBody);

    assert_outline(SAFARI, include_str!("fixtures/safari.txt"));
}

#[test]
fn test_exports_survive_reserialization() {
    for html in [CHROME, FIREFOX, SAFARI] {
        let items = parse(html).unwrap();
        let exported = serialize(&items);

        assert_eq!(parse(&exported).unwrap(), items);
        assert_eq!(serialize(&parse(&exported).unwrap()), exported);
    }
}
