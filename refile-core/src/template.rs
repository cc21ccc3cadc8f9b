//! Replacement templates.
//!
//! Mapping tables in the wild were written against `$1`-style references
//! where a reference ends at the first non-digit, so `$1_G1` means "group 1
//! followed by `_G1`". The `regex` crate's own expansion would read that as a
//! group named `1_G1`, so templates are compiled here instead.
//!
//! Supported tokens:
//!
//! - `$$` a literal dollar sign
//! - `$&` the whole match
//! - `` $` `` / `$'` the text before / after the match
//! - `$n`, `$nn` capture group 1..=99; a two-digit reference past the group
//!   count falls back to one digit plus a literal digit
//! - `$<name>` a named group (only when the expression defines named groups)
//!
//! Anything else after `$` is kept verbatim.

use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group(usize),
    Named(String),
    Whole,
    Before,
    After,
}

/// A replacement string compiled against a specific expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(template: &str, regex: &Regex) -> Self {
        let group_count = regex.captures_len().saturating_sub(1);
        let has_named = regex.capture_names().flatten().next().is_some();

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(dollar) = rest.find('$') {
            literal.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];

            match parse_reference(after, group_count, has_named) {
                Reference::Escaped => {
                    literal.push('$');
                    rest = &after[1..];
                },
                Reference::Segment(segment, consumed) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    rest = &after[consumed..];
                },
                Reference::Verbatim => {
                    literal.push('$');
                    rest = after;
                },
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Append the expansion for one match to `dst`.
    pub fn expand(&self, caps: &Captures<'_>, haystack: &str, dst: &mut String) {
        let whole = caps.get(0);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => dst.push_str(text),
                Segment::Group(index) => {
                    if let Some(m) = caps.get(*index) {
                        dst.push_str(m.as_str());
                    }
                },
                Segment::Named(name) => {
                    if let Some(m) = caps.name(name) {
                        dst.push_str(m.as_str());
                    }
                },
                Segment::Whole => {
                    if let Some(m) = whole {
                        dst.push_str(m.as_str());
                    }
                },
                Segment::Before => {
                    if let Some(m) = whole {
                        dst.push_str(&haystack[..m.start()]);
                    }
                },
                Segment::After => {
                    if let Some(m) = whole {
                        dst.push_str(&haystack[m.end()..]);
                    }
                },
            }
        }
    }
}

enum Reference {
    /// `$$`
    Escaped,
    /// A real reference and how many bytes after the `$` it spans.
    Segment(Segment, usize),
    /// Not a reference; the `$` is literal text.
    Verbatim,
}

fn parse_reference(after: &str, group_count: usize, has_named: bool) -> Reference {
    let bytes = after.as_bytes();

    match bytes.first() {
        Some(b'$') => Reference::Escaped,
        Some(b'&') => Reference::Segment(Segment::Whole, 1),
        Some(b'`') => Reference::Segment(Segment::Before, 1),
        Some(b'\'') => Reference::Segment(Segment::After, 1),
        Some(first) if first.is_ascii_digit() => {
            let one = usize::from(first - b'0');

            if let Some(second) = bytes.get(1).filter(|b| b.is_ascii_digit()) {
                let two = one * 10 + usize::from(second - b'0');
                if (1..=group_count).contains(&two) {
                    return Reference::Segment(Segment::Group(two), 2);
                }
            }

            if (1..=group_count).contains(&one) {
                Reference::Segment(Segment::Group(one), 1)
            } else {
                Reference::Verbatim
            }
        },
        Some(b'<') if has_named => match after[1..].find('>') {
            Some(end) => {
                let name = after[1..=end].to_string();
                Reference::Segment(Segment::Named(name), end + 2)
            },
            None => Reference::Verbatim,
        },
        _ => Reference::Verbatim,
    }
}
