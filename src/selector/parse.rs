//! Parser for the simple-selector grammar the synthesizer emits.
//!
//! The grammar covers compound selectors only: an optional tag name (or
//! `*`), `#id` and `.class` parts with backslash escapes, and a trailing
//! `:nth-of-type(k)`. Combinators, attribute selectors, and anything else
//! are parse errors; callers that resolve selectors treat a parse error as
//! "no match" rather than a failure.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector at offset {offset}: {message}")]
pub struct SelectorParseError {
    pub offset: usize,
    pub message: String,
}

/// A parsed compound selector. All present parts must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Lowercased tag name; `None` matches any tag.
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    /// 1-based position among same-tag siblings.
    pub nth_of_type: Option<usize>,
}

impl CompoundSelector {
    /// Check this selector against one element's data. `same_tag_index` is
    /// the element's 1-based position among same-tag siblings.
    pub fn matches(
        &self,
        tag_name: &str,
        id_attr: Option<&str>,
        class_attr: Option<&str>,
        same_tag_index: usize,
    ) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(tag_name) {
                return false;
            }
        }

        for want in &self.ids {
            if id_attr != Some(want.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let have: Vec<&str> = class_attr
                .map(|c| c.split_whitespace().collect())
                .unwrap_or_default();
            for want in &self.classes {
                if !have.contains(&want.as_str()) {
                    return false;
                }
            }
        }

        if let Some(k) = self.nth_of_type {
            if same_tag_index != k {
                return false;
            }
        }

        true
    }
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, message: impl Into<String>) -> SelectorParseError {
        SelectorParseError {
            offset: self.pos,
            message: message.into(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || (c as u32) >= 0x80
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '\\' || (c as u32) >= 0x80
}

/// Parse a selector string. Empty input, unknown syntax, and trailing
/// garbage are all errors.
pub fn parse(input: &str) -> Result<CompoundSelector, SelectorParseError> {
    let trimmed = input.trim();
    let mut cur = Cursor::new(trimmed);

    if trimmed.is_empty() {
        return Err(cur.error("empty selector"));
    }

    let mut selector = CompoundSelector::default();

    match cur.peek() {
        Some('*') => {
            cur.bump();
        }
        Some(c) if is_ident_start(c) => {
            selector.tag = Some(parse_ident(&mut cur)?.to_lowercase());
        }
        _ => {}
    }

    while let Some(c) = cur.peek() {
        match c {
            '#' => {
                cur.bump();
                selector.ids.push(parse_ident(&mut cur)?);
            }
            '.' => {
                cur.bump();
                selector.classes.push(parse_ident(&mut cur)?);
            }
            ':' => {
                selector.nth_of_type = Some(parse_nth_of_type(&mut cur)?);
                if cur.peek().is_some() {
                    return Err(cur.error("trailing input after :nth-of-type()"));
                }
            }
            _ => {
                return Err(cur.error(format!("unsupported selector syntax '{}'", c)));
            }
        }
    }

    if selector.tag.is_none()
        && selector.ids.is_empty()
        && selector.classes.is_empty()
        && selector.nth_of_type.is_none()
        && !trimmed.starts_with('*')
    {
        return Err(cur.error("selector has no recognizable parts"));
    }

    Ok(selector)
}

fn parse_ident(cur: &mut Cursor) -> Result<String, SelectorParseError> {
    let mut out = String::new();

    loop {
        match cur.peek() {
            Some('\\') => {
                cur.bump();
                out.push(parse_escape(cur)?);
            }
            Some(c) if is_ident_char(c) => {
                cur.bump();
                out.push(c);
            }
            _ => break,
        }
    }

    if out.is_empty() {
        return Err(cur.error("expected identifier"));
    }

    Ok(out)
}

/// Backslash escapes: 1-6 hex digits (with an optional single whitespace
/// terminator) decode as a code point; any other character is literal.
fn parse_escape(cur: &mut Cursor) -> Result<char, SelectorParseError> {
    let mut hex = String::new();

    while hex.len() < 6 {
        match cur.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                cur.bump();
                hex.push(c);
            }
            _ => break,
        }
    }

    if !hex.is_empty() {
        if let Some(' ') | Some('\t') | Some('\n') = cur.peek() {
            cur.bump();
        }
        let value = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
        return Ok(char::from_u32(value).unwrap_or('\u{FFFD}'));
    }

    cur.bump().ok_or_else(|| cur.error("dangling escape"))
}

fn parse_nth_of_type(cur: &mut Cursor) -> Result<usize, SelectorParseError> {
    const PSEUDO: &str = ":nth-of-type(";

    for expected in PSEUDO.chars() {
        match cur.bump() {
            Some(c) if c.eq_ignore_ascii_case(&expected) => {}
            _ => return Err(cur.error("only :nth-of-type(k) is supported")),
        }
    }

    let mut digits = String::new();
    while let Some(c) = cur.peek() {
        if c.is_ascii_digit() {
            cur.bump();
            digits.push(c);
        } else {
            break;
        }
    }

    if cur.bump() != Some(')') {
        return Err(cur.error("expected ')'"));
    }

    let k: usize = digits
        .parse()
        .map_err(|_| cur.error("expected an index in :nth-of-type()"))?;
    if k == 0 {
        return Err(cur.error(":nth-of-type() index is 1-based"));
    }

    Ok(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_selector() {
        let sel = parse("#sidebar").unwrap();
        assert_eq!(sel.ids, vec!["sidebar"]);
        assert!(sel.tag.is_none());
    }

    #[test]
    fn parses_tag_classes_and_nth() {
        let sel = parse("div.ad.banner:nth-of-type(3)").unwrap();
        assert_eq!(sel.tag.as_deref(), Some("div"));
        assert_eq!(sel.classes, vec!["ad", "banner"]);
        assert_eq!(sel.nth_of_type, Some(3));
    }

    #[test]
    fn tag_is_lowercased() {
        let sel = parse("DIV").unwrap();
        assert_eq!(sel.tag.as_deref(), Some("div"));
    }

    #[test]
    fn parses_escaped_identifier() {
        let sel = parse("#a\\:b\\.c").unwrap();
        assert_eq!(sel.ids, vec!["a:b.c"]);
    }

    #[test]
    fn parses_hex_escape_with_terminator() {
        let sel = parse("#\\31 abc").unwrap();
        assert_eq!(sel.ids, vec!["1abc"]);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn rejects_combinators() {
        assert!(parse("div > span").is_err());
        assert!(parse("div span").is_err());
        assert!(parse("div + p").is_err());
    }

    #[test]
    fn rejects_attribute_selectors() {
        assert!(parse("[data-x=1]").is_err());
    }

    #[test]
    fn rejects_other_pseudo_classes() {
        assert!(parse("div:hover").is_err());
        assert!(parse("li:nth-child(2)").is_err());
    }

    #[test]
    fn rejects_zero_index() {
        assert!(parse("li:nth-of-type(0)").is_err());
    }

    #[test]
    fn round_trips_synthesized_selectors() {
        use crate::selector::{synthesize, ElementDescriptor};

        let mut el = ElementDescriptor::new("li");
        el.class_attr = Some("item active extra".to_string());
        el.same_tag_index = 2;
        el.same_tag_count = 3;

        let sel = parse(&synthesize(&el)).unwrap();
        assert_eq!(sel.tag.as_deref(), Some("li"));
        assert_eq!(sel.classes, vec!["item", "active"]);
        assert_eq!(sel.nth_of_type, Some(2));
    }

    #[test]
    fn matches_respects_all_parts() {
        let sel = parse("div.ad:nth-of-type(2)").unwrap();
        assert!(sel.matches("div", None, Some("ad box"), 2));
        assert!(!sel.matches("div", None, Some("ad box"), 1));
        assert!(!sel.matches("span", None, Some("ad"), 2));
        assert!(!sel.matches("div", None, Some("box"), 2));
        assert!(!sel.matches("div", None, None, 2));
    }
}
