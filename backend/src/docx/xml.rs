//! Minimal WordprocessingML scanning helpers.
//!
//! The document part is never parsed into a DOM. Elements are located by
//! their tags and sliced out of the original text, so every byte outside the
//! paragraphs we rewrite is kept exactly as the template had it.

use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z_][\w.:-]*)((?:\s+[^>]*?)?)(/?)>"#).expect("invalid tag regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w.:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("invalid attribute regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    Open,
    Close,
    Empty,
}

#[derive(Debug, Clone)]
pub(crate) struct Tag<'a> {
    pub range: Range<usize>,
    pub name: &'a str,
    pub kind: TagKind,
    attributes: &'a str,
}

impl<'a> Tag<'a> {
    /// Unescaped value of attribute `name`, e.g. `w:val`.
    pub fn attribute(&self, name: &str) -> Option<Cow<'a, str>> {
        ATTRIBUTE.captures_iter(self.attributes).find_map(|caps| {
            if &caps[1] != name {
                return None;
            }
            caps.get(2)
                .or_else(|| caps.get(3))
                .map(|value| unescape(value.as_str()))
        })
    }
}

/// All element tags in `xml`, in document order. Declarations, comments and
/// processing instructions are skipped.
pub(crate) fn tags(xml: &str) -> impl Iterator<Item = Tag<'_>> {
    TAG.captures_iter(xml).filter_map(|caps| {
        let whole = caps.get(0)?;
        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty();
        let kind = match (closing, self_closing) {
            (true, _) => TagKind::Close,
            (false, true) => TagKind::Empty,
            (false, false) => TagKind::Open,
        };
        Some(Tag {
            range: whole.range(),
            name: caps.get(2)?.as_str(),
            kind,
            attributes: caps.get(3).map_or("", |m| m.as_str()),
        })
    })
}

/// Byte ranges of the outermost `name` elements in `xml`, tags included.
pub(crate) fn element_ranges(xml: &str, name: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for tag in tags(xml).filter(|tag| tag.name == name) {
        match tag.kind {
            TagKind::Empty if depth == 0 => ranges.push(tag.range),
            TagKind::Empty => {}
            TagKind::Open => {
                if depth == 0 {
                    start = tag.range.start;
                }
                depth += 1;
            }
            TagKind::Close if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    ranges.push(start..tag.range.end);
                }
            }
            TagKind::Close => {}
        }
    }
    ranges
}

/// Decodes the five predefined entities and numeric character references.
pub(crate) fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Escapes text for element content and attribute values.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_classified() {
        let xml = r#"<?xml version="1.0"?><w:p w:rsidR="00A1"><w:r><w:tab/></w:r></w:p>"#;
        let found: Vec<(&str, TagKind)> = tags(xml).map(|t| (t.name, t.kind)).collect();
        assert_eq!(
            found,
            vec![
                ("w:p", TagKind::Open),
                ("w:r", TagKind::Open),
                ("w:tab", TagKind::Empty),
                ("w:r", TagKind::Close),
                ("w:p", TagKind::Close),
            ]
        );
    }

    #[test]
    fn attribute_values_are_unescaped() {
        let xml = r#"<w:rFonts w:ascii="Times &amp; Co" w:hAnsi='Arial'/>"#;
        let tag = tags(xml).next().unwrap();
        assert_eq!(tag.kind, TagKind::Empty);
        assert_eq!(tag.attribute("w:ascii").as_deref(), Some("Times & Co"));
        assert_eq!(tag.attribute("w:hAnsi").as_deref(), Some("Arial"));
        assert_eq!(tag.attribute("w:eastAsia"), None);
    }

    #[test]
    fn element_ranges_skip_similar_names_and_nesting() {
        let xml = "<w:pPr/><w:p>a<w:p>b</w:p></w:p><w:p/>";
        let ranges = element_ranges(xml, "w:p");
        let slices: Vec<&str> = ranges.iter().map(|r| &xml[r.clone()]).collect();
        assert_eq!(slices, vec!["<w:p>a<w:p>b</w:p></w:p>", "<w:p/>"]);
    }

    #[test]
    fn entities_round_trip() {
        assert_eq!(unescape("a &amp; b &lt;c&gt; &#65;&#x42;"), "a & b <c> AB");
        assert_eq!(unescape("AT&T; &bogus;"), "AT&T; &bogus;");
        assert_eq!(escape("\"Tom\" & <Jerry>"), "&quot;Tom&quot; &amp; &lt;Jerry&gt;");
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
    }
}
