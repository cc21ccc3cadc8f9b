use crate::error::{RefileError, Result};
use crate::template::Template;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A match expression paired with its replacement template.
///
/// Patterns are immutable values. Matching always covers every occurrence
/// and carries no position state between calls, so the same value can be
/// tested against content and then paths without any reset.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    replacement: String,
    template: Template,
}

/// The uncompiled form of a pattern, as it appears in a mapping table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSource {
    #[serde(rename = "match")]
    pub pattern: String,
    pub replacement: String,
}

impl Pattern {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| RefileError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let template = Template::compile(replacement, &regex);

        Ok(Self {
            regex,
            replacement: replacement.to_string(),
            template,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn source(&self) -> PatternSource {
        PatternSource {
            pattern: self.as_str().to_string(),
            replacement: self.replacement.clone(),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace every occurrence in `text`.
    pub fn replace_all<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.replace_all_counted(text).0
    }

    /// Replace every occurrence in `text`, also returning how many matches
    /// were replaced. Borrowed output means nothing matched.
    pub fn replace_all_counted<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let mut output = String::new();
        let mut last = 0;
        let mut count = 0;

        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if count == 0 {
                output.reserve(text.len());
            }
            count += 1;

            output.push_str(&text[last..whole.start()]);
            self.template.expand(&caps, text, &mut output);
            last = whole.end();
        }

        if count == 0 {
            return (Cow::Borrowed(text), 0);
        }

        output.push_str(&text[last..]);
        (Cow::Owned(output), count)
    }
}

impl TryFrom<&PatternSource> for Pattern {
    type Error = RefileError;

    fn try_from(source: &PatternSource) -> Result<Self> {
        Self::new(&source.pattern, &source.replacement)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.as_str(), self.replacement)
    }
}
