//! Selector synthesis: map an element snapshot to a CSS selector string.

mod parse;

pub use parse::{parse, CompoundSelector, SelectorParseError};

/// Everything `synthesize` needs to know about an element.
///
/// `same_tag_index` is the 1-based position of the element among siblings
/// that share its tag name; `same_tag_count` is how many such siblings exist
/// under the parent (including the element itself).
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    pub tag_name: String,
    pub id: Option<String>,
    pub class_attr: Option<String>,
    pub same_tag_index: usize,
    pub same_tag_count: usize,
}

impl ElementDescriptor {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            id: None,
            class_attr: None,
            same_tag_index: 1,
            same_tag_count: 1,
        }
    }
}

/// Generate a selector for an element.
///
/// Priority order: `#id` when the element has a non-empty id (terminal),
/// otherwise lowercase tag name plus at most the first two class tokens,
/// with an `:nth-of-type(k)` tiebreak when same-tag siblings exist. The
/// result is not verified for uniqueness; a bare tag name is an accepted
/// outcome for anonymous elements.
pub fn synthesize(element: &ElementDescriptor) -> String {
    if let Some(id) = element.id.as_deref().filter(|id| !id.is_empty()) {
        return format!("#{}", escape_css(id));
    }

    let mut selector = element.tag_name.to_lowercase();

    if let Some(class_attr) = element.class_attr.as_deref() {
        for class in class_attr.split_whitespace().take(2) {
            selector.push('.');
            selector.push_str(&escape_css(class));
        }
    }

    if element.same_tag_count > 1 {
        selector.push_str(&format!(":nth-of-type({})", element.same_tag_index));
    }

    selector
}

/// Serialize a string as a CSS identifier, per the CSSOM `CSS.escape`
/// algorithm.
pub fn escape_css(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;

        if c == '\u{0}' {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code) || code == 0x7F {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && c.is_ascii_digit() {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 1 && c.is_ascii_digit() && chars[0] == '-' {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(tag: &str) -> ElementDescriptor {
        ElementDescriptor::new(tag)
    }

    #[test]
    fn id_wins_over_everything() {
        let mut el = descriptor("div");
        el.id = Some("sidebar".to_string());
        el.class_attr = Some("a b c".to_string());
        el.same_tag_index = 3;
        el.same_tag_count = 5;

        assert_eq!(synthesize(&el), "#sidebar");
    }

    #[test]
    fn empty_id_is_ignored() {
        let mut el = descriptor("div");
        el.id = Some(String::new());

        assert_eq!(synthesize(&el), "div");
    }

    #[test]
    fn bare_tag_for_anonymous_singleton() {
        let el = descriptor("DIV");
        assert_eq!(synthesize(&el), "div");
    }

    #[test]
    fn at_most_two_classes_in_source_order() {
        let mut el = descriptor("span");
        el.class_attr = Some("  first   second third ".to_string());

        assert_eq!(synthesize(&el), "span.first.second");
    }

    #[test]
    fn nth_of_type_tiebreak_with_siblings() {
        let mut el = descriptor("li");
        el.same_tag_index = 2;
        el.same_tag_count = 4;

        assert_eq!(synthesize(&el), "li:nth-of-type(2)");
    }

    #[test]
    fn classes_and_nth_combine() {
        let mut el = descriptor("p");
        el.class_attr = Some("note".to_string());
        el.same_tag_index = 1;
        el.same_tag_count = 2;

        assert_eq!(synthesize(&el), "p.note:nth-of-type(1)");
    }

    #[test]
    fn id_with_special_characters_is_escaped() {
        let mut el = descriptor("div");
        el.id = Some("a:b.c".to_string());

        assert_eq!(synthesize(&el), "#a\\:b\\.c");
    }

    #[test]
    fn escape_leading_digit() {
        assert_eq!(escape_css("1abc"), "\\31 abc");
    }

    #[test]
    fn escape_digit_after_leading_dash() {
        assert_eq!(escape_css("-1a"), "-\\31 a");
    }

    #[test]
    fn escape_sole_dash() {
        assert_eq!(escape_css("-"), "\\-");
    }

    #[test]
    fn escape_nul_becomes_replacement() {
        assert_eq!(escape_css("a\u{0}b"), "a\u{FFFD}b");
    }

    #[test]
    fn escape_passes_safe_characters_through() {
        assert_eq!(escape_css("foo-bar_Baz9"), "foo-bar_Baz9");
        assert_eq!(escape_css("日本語"), "日本語");
    }
}
