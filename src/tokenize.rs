//! Turning raw text into word tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How raw text is normalized before counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct NormalizationOptions {
    /// Lowercase every token.
    pub case_fold: bool,
    /// Drop apostrophes and split at any other punctuation.
    pub strip_punctuation: bool,
}

impl Default for NormalizationOptions {
    fn default() -> Self {
        NormalizationOptions {
            case_fold: true,
            strip_punctuation: true,
        }
    }
}

impl fmt::Display for NormalizationOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "case_fold={}, strip_punctuation={}",
            self.case_fold, self.strip_punctuation
        )
    }
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

fn is_separator(c: char, options: &NormalizationOptions) -> bool {
    c.is_whitespace() || (options.strip_punctuation && !c.is_alphanumeric() && !is_apostrophe(c))
}

/// Split `text` into tokens.
///
/// The result only depends on `text` and `options`.
pub fn tokenize(text: &str, options: &NormalizationOptions) -> Vec<String> {
    text.split(|c| is_separator(c, options))
        .filter_map(|t| normalize_token(t, options))
        .collect()
}

/// Normalize one piece of text between separators; `None` if nothing is left.
fn normalize_token(token: &str, options: &NormalizationOptions) -> Option<String> {
    let mut t: String = if options.strip_punctuation {
        token.chars().filter(|&c| !is_apostrophe(c)).collect()
    } else {
        token.to_owned()
    };
    if options.case_fold {
        t = t.to_lowercase();
    }
    if t.is_empty() { None } else { Some(t) }
}
