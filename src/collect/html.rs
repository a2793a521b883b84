// src/collect/html.rs
//! Markup helpers shared by the page extractors: find the first element of a
//! given tag carrying a set of classes, flatten its text, and turn price text
//! such as `S$1,234.50` into a number.

use once_cell::sync::OnceCell;
use regex::Regex;

fn re_open_tag() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<([a-z][a-z0-9-]*)\b([^>]*)>").unwrap())
}

fn re_class_attr() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r#"(?is)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap())
}

fn re_any_tag() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(/?)([a-z][a-z0-9-]*)\b[^>]*>").unwrap())
}

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap())
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Text of the first `<tag>` whose class list contains every class in `classes`
/// (whitespace separated, any order). Returns `None` when no element matches.
pub fn find_text_by_class(doc: &str, tag: &str, classes: &str) -> Option<String> {
    let wanted: Vec<&str> = classes.split_whitespace().collect();

    for cap in re_open_tag().captures_iter(doc) {
        if !cap[1].eq_ignore_ascii_case(tag) {
            continue;
        }
        let Some(class_list) = class_attr(&cap[2]) else {
            continue;
        };
        if !wanted
            .iter()
            .all(|w| class_list.split_whitespace().any(|c| c == *w))
        {
            continue;
        }

        let body_start = cap.get(0)?.end();
        let rest = &doc[body_start..];
        let body_end = matching_close(rest, tag).unwrap_or(rest.len());
        return Some(flatten_text(&rest[..body_end]));
    }
    None
}

/// Offset in `body` of the close tag that pairs with an already consumed
/// `<tag>`, skipping nested elements of the same name.
fn matching_close(body: &str, tag: &str) -> Option<usize> {
    let mut depth = 1usize;
    for m in re_any_tag().captures_iter(body) {
        if !m[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        let whole = m.get(0)?;
        if m[1].is_empty() {
            if !whole.as_str().ends_with("/>") {
                depth += 1;
            }
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(whole.start());
            }
        }
    }
    None
}

fn class_attr(attrs: &str) -> Option<String> {
    let cap = re_class_attr().captures(attrs)?;
    cap.get(1)
        .or_else(|| cap.get(2))
        .map(|m| m.as_str().to_string())
}

/// Strip nested tags, decode entities, collapse whitespace.
pub fn flatten_text(fragment: &str) -> String {
    let no_tags = re_tags().replace_all(fragment, " ");
    let decoded = html_escape::decode_html_entities(&no_tags);
    re_ws().replace_all(&decoded, " ").trim().to_string()
}

/// Parse price text after removing currency tokens, thousands separators and
/// whitespace. Non-numeric, non-finite and negative values yield `None`.
pub fn parse_price_text(text: &str, strip: &[&str]) -> Option<f64> {
    let mut s = html_escape::decode_html_entities(text).to_string();
    for token in strip {
        s = s.replace(token, "");
    }
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_matching_span_regardless_of_class_order() {
        let doc = r#"
            <div><span class="other">9</span>
            <span data-x='1' class="bd73d13072 fcab3ed991">S$&nbsp;<b>1,204</b></span>
            <span class="fcab3ed991 bd73d13072">77</span></div>"#;
        let txt = find_text_by_class(doc, "span", "fcab3ed991 bd73d13072").unwrap();
        assert_eq!(txt, "S$ 1,204");
    }

    #[test]
    fn nested_same_tag_keeps_the_whole_element() {
        let doc = r#"<div><span class="PropertyPriceBreakdown__PriceValue"><span>S$</span>1,215</span>
            <span>per night</span></div>"#;
        assert_eq!(
            find_text_by_class(doc, "span", "PropertyPriceBreakdown__PriceValue").as_deref(),
            Some("S$ 1,215")
        );

        let deep = r#"<SPAN class="p"><span><span>S$</span></span> 88</SPAN><span>9</span>"#;
        assert_eq!(find_text_by_class(deep, "span", "p").as_deref(), Some("S$ 88"));
    }

    #[test]
    fn unclosed_element_runs_to_end_of_document() {
        let doc = r#"<span class="p">S$<span>42"#;
        assert_eq!(find_text_by_class(doc, "span", "p").as_deref(), Some("S$ 42"));
    }

    #[test]
    fn data_attributes_are_not_the_class() {
        let doc = r#"<span data-class="price">1</span><span class='price'>2</span>"#;
        assert_eq!(find_text_by_class(doc, "span", "price").as_deref(), Some("2"));
    }

    #[test]
    fn tag_name_must_match() {
        let doc = r#"<div class="price">10</div><span class="price">12</span>"#;
        assert_eq!(find_text_by_class(doc, "span", "price").as_deref(), Some("12"));
        assert_eq!(find_text_by_class(doc, "p", "price"), None);
    }

    #[test]
    fn price_text_strips_currency_and_separators() {
        assert_eq!(parse_price_text("S$1,234.50", &["S$"]), Some(1234.5));
        assert_eq!(parse_price_text(" SGD 2 010 ", &["S$", "SGD"]), Some(2010.0));
        assert_eq!(parse_price_text("S$&nbsp;99", &["S$"]), Some(99.0));
    }

    #[test]
    fn unparseable_price_text_is_none() {
        assert_eq!(parse_price_text("Sold out", &["S$"]), None);
        assert_eq!(parse_price_text("S$", &["S$"]), None);
        assert_eq!(parse_price_text("-5", &[]), None);
        assert_eq!(parse_price_text("inf", &[]), None);
    }
}
