//! Minimal structural editing of fetched HTML fragments
//!
//! Templates are trusted, well-formed fragments, so element boundaries are
//! found by matching open/close tags of the same name with a depth counter.
//! This is enough for heading substitution, placeholder removal and panel
//! swaps; it is not a general HTML parser.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// Attribute patterns are anchored on whitespace so `data-id` never reads as `id`
static OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)((?:\s[^>]*)?)>").expect("valid regex"));
static ID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)id\s*=\s*["']([^"']*)["']"#).expect("valid regex"));
static NAME_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)name\s*=\s*["']([^"']*)["']"#).expect("valid regex"));
static TYPE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)type\s*=\s*["']([^"']*)["']"#).expect("valid regex"));
static PLACEHOLDER_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)data-placeholder(?:\s|=|/|$)").expect("valid regex"));
static SCRIPT_OR_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>").expect("valid regex"));
static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(br\s*/?|/p|/div|/h[1-6]|/li|/section|/tr|/header|/article)>").expect("valid regex")
});
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\f]+").expect("valid regex"));

const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr"];

/// Byte offsets of one element inside a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ElementSpan {
    start: usize,
    inner_start: usize,
    inner_end: usize,
    end: usize,
}

/// An HTML fragment as fetched from the template source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    /// Replace the text of the first `<h1>` with `text` (escaped). Returns false if there is none.
    pub fn replace_heading(&mut self, text: &str) -> bool {
        match find_element(&self.0, 0, |tag, _| tag.eq_ignore_ascii_case("h1")) {
            Some(span) => {
                self.0.replace_range(span.inner_start..span.inner_end, &escape(text));
                true
            }
            None => false,
        }
    }

    /// Remove every element marked `data-placeholder`, returning how many were removed
    pub fn strip_placeholders(&mut self) -> usize {
        let mut removed = 0;
        let mut from = 0;
        while let Some(span) = find_element(&self.0, from, |_, attrs| PLACEHOLDER_ATTR.is_match(attrs)) {
            self.0.replace_range(span.start..span.end, "");
            from = span.start;
            removed += 1;
        }
        removed
    }

    /// Inner HTML of the element with the given `id`
    pub fn element_inner(&self, id: &str) -> Option<&str> {
        find_by_id(&self.0, id).map(|span| &self.0[span.inner_start..span.inner_end])
    }

    /// Replace the inner HTML of the element with the given `id`. Returns false if absent.
    pub fn set_element_inner(&mut self, id: &str, html: &str) -> bool {
        match find_by_id(&self.0, id) {
            Some(span) => {
                self.0.replace_range(span.inner_start..span.inner_end, html);
                true
            }
            None => false,
        }
    }

    pub fn has_element(&self, id: &str) -> bool {
        find_by_id(&self.0, id).is_some()
    }

    /// `id` (or `name`) of the first text-entry control, used for auto-focus
    pub fn first_text_input(&self) -> Option<String> {
        for caps in OPEN_TAG.captures_iter(&self.0) {
            let tag = caps[1].to_ascii_lowercase();
            let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let is_text = match tag.as_str() {
                "textarea" => true,
                "input" => {
                    let kind = TYPE_ATTR
                        .captures(attrs)
                        .map(|c| c[1].to_ascii_lowercase())
                        .unwrap_or_else(|| "text".to_string());
                    matches!(kind.as_str(), "text" | "email" | "number" | "search" | "url" | "tel" | "date")
                }
                _ => false,
            };
            if is_text {
                let ident = ID_ATTR.captures(attrs).or_else(|| NAME_ATTR.captures(attrs));
                if let Some(ident) = ident {
                    return Some(ident[1].to_string());
                }
            }
        }
        None
    }

    /// Plain-text projection for terminal display
    pub fn to_text(&self) -> String {
        let without_code = SCRIPT_OR_STYLE.replace_all(&self.0, "");
        let with_breaks = BLOCK_BREAK.replace_all(&without_code, "\n");
        let stripped = ANY_TAG.replace_all(&with_breaks, "");
        let decoded = unescape(&stripped);
        let collapsed = SPACES.replace_all(&decoded, " ");

        let mut lines: Vec<&str> = Vec::new();
        for line in collapsed.lines().map(str::trim) {
            if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
                continue;
            }
            lines.push(line);
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Markup {
    fn from(html: &str) -> Self {
        Markup::new(html)
    }
}

impl From<String> for Markup {
    fn from(html: String) -> Self {
        Markup::new(html)
    }
}

/// Escape text for inclusion in HTML
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn find_by_id(html: &str, id: &str) -> Option<ElementSpan> {
    find_element(html, 0, |_, attrs| {
        ID_ATTR.captures(attrs).is_some_and(|c| &c[1] == id)
    })
}

/// First element at or after `from` whose open tag satisfies `matches(tag, attrs)`
fn find_element(html: &str, from: usize, matches: impl Fn(&str, &str) -> bool) -> Option<ElementSpan> {
    for caps in OPEN_TAG.captures_iter(&html[from..]) {
        let whole = caps.get(0)?;
        let tag = &caps[1];
        let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if !matches(tag, attrs) {
            continue;
        }

        let start = from + whole.start();
        let inner_start = from + whole.end();
        let self_closing = attrs.trim_end().ends_with('/');
        if self_closing || VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str()) {
            return Some(ElementSpan { start, inner_start, inner_end: inner_start, end: inner_start });
        }

        return match_close(html, tag, inner_start)
            .map(|(inner_end, end)| ElementSpan { start, inner_start, inner_end, end });
    }
    None
}

/// Find the close tag balancing an open `tag` whose content starts at `from`
fn match_close(html: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let pattern = format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag));
    let re = Regex::new(&pattern).ok()?;
    let mut depth = 1usize;
    for caps in re.captures_iter(&html[from..]) {
        let whole = caps.get(0)?;
        if whole.as_str().ends_with("/>") {
            continue;
        }
        if caps[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some((from + whole.start(), from + whole.end()));
            }
        }
    }
    log::warn!("Unbalanced <{}> in template fragment", tag);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUB: &str = r#"<div id="screen-course-hub">
  <h1 class="title">CS 101: Sample Course</h1>
  <div class="tabs"><button id="tab-btn-overview">Overview</button></div>
  <section data-placeholder="past-lectures"><h2>Past Lectures</h2><div><div>Lecture 1</div></div></section>
  <div id="lectures-upcoming"></div>
  <section class="proposals" data-placeholder><h2>Project Proposals</h2></section>
</div>"#;

    #[test]
    fn test_replace_heading_escapes_text() {
        let mut markup = Markup::new(HUB);
        assert!(markup.replace_heading("CS 240: Data <Structures>"));
        assert!(markup.contains("<h1 class=\"title\">CS 240: Data &lt;Structures&gt;</h1>"));
        assert!(!markup.contains("Sample Course"));
    }

    #[test]
    fn test_replace_heading_without_h1() {
        let mut markup = Markup::new("<div><h2>Only h2</h2></div>");
        assert!(!markup.replace_heading("x"));
        assert_eq!(markup.as_str(), "<div><h2>Only h2</h2></div>");
    }

    #[test]
    fn test_strip_placeholders_handles_nesting() {
        let mut markup = Markup::new(HUB);
        assert_eq!(markup.strip_placeholders(), 2);
        assert!(!markup.contains("Past Lectures"));
        assert!(!markup.contains("Project Proposals"));
        assert!(!markup.contains("Lecture 1"));
        assert!(markup.has_element("lectures-upcoming"));
        assert!(markup.as_str().trim_end().ends_with("</div>"));
    }

    #[test]
    fn test_element_inner_round_trip() {
        let mut markup = Markup::new(r#"<div id="a"><div id="panel"><p>one</p><div>two</div></div><p>after</p></div>"#);
        assert_eq!(markup.element_inner("panel"), Some("<p>one</p><div>two</div>"));
        assert!(markup.set_element_inner("panel", "<p>only</p>"));
        assert_eq!(markup.as_str(), r#"<div id="a"><div id="panel"><p>only</p></div><p>after</p></div>"#);
        assert!(!markup.set_element_inner("missing", "x"));
    }

    #[test]
    fn test_prefixed_attributes_are_not_ids() {
        let mut markup = Markup::new(
            r#"<ul><li data-id="panel">row</li><li data-placeholder-note="x">keep</li></ul><div id="panel">real</div>"#,
        );
        assert_eq!(markup.element_inner("panel"), Some("real"));
        assert!(markup.set_element_inner("panel", "swapped"));
        assert!(markup.contains(r#"<li data-id="panel">row</li>"#));
        assert_eq!(markup.strip_placeholders(), 0);
        assert!(markup.contains("keep"));
    }

    #[test]
    fn test_first_text_input_skips_non_text_controls() {
        let markup = Markup::new(r#"<form><input type="hidden" id="token"><input type="file" id="f">
            <input id="class-code" type="text"><textarea id="desc"></textarea></form>"#);
        assert_eq!(markup.first_text_input().as_deref(), Some("class-code"));

        let markup = Markup::new(r#"<textarea name="feedback"></textarea>"#);
        assert_eq!(markup.first_text_input().as_deref(), Some("feedback"));

        assert_eq!(Markup::new("<p>no inputs</p>").first_text_input(), None);
    }

    #[test]
    fn test_to_text_projection() {
        let markup = Markup::new("<h1>Title &amp; more</h1><style>.x{}</style><p>First</p>\n\n\n<ul><li>a</li><li>b</li></ul>");
        assert_eq!(markup.to_text(), "Title & more\nFirst\n\na\nb");
    }
}
