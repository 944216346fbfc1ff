use crate::associations;
use crate::errors::{self, Result};
use crate::frequency::WordFrequencyTable;
use crate::metadata::Metadata;
use crate::tokenize::{self, NormalizationOptions};
use std::collections::HashSet;
use xxhash_rust::xxh3::xxh3_64;

/// One text together with its metadata.
///
/// Documents are immutable; a corpus and all of its filtered subsets share
/// them read-only.
#[derive(Debug, PartialEq, Eq)]
pub struct Document {
    id: String,
    text: String,
    metadata: Metadata,
    checksum: u64,
}

impl Document {
    pub fn new(id: &str, text: String, metadata: Metadata) -> Document {
        let checksum = xxh3_64(text.as_bytes());
        Document {
            id: id.to_owned(),
            text,
            metadata,
            checksum,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// XXH3 checksum of the raw text.
    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    pub fn tokens(&self, options: &NormalizationOptions) -> Vec<String> {
        tokenize::tokenize(&self.text, options)
    }

    pub fn word_frequencies(&self, options: &NormalizationOptions) -> WordFrequencyTable {
        WordFrequencyTable::from_tokens(self.tokens(options))
    }

    /// Words that follow any of `targets`, or that are within `window`
    /// tokens of them if a window is given.
    pub fn words_associated(
        &self,
        targets: &HashSet<String>,
        window: Option<usize>,
        options: &NormalizationOptions,
    ) -> WordFrequencyTable {
        let tokens = self.tokens(options);
        match window {
            None => associations::associated_words(&tokens, targets),
            Some(w) => associations::window_words(&tokens, targets, w),
        }
    }
}

/// Normalize search terms with the options used for the text.
///
/// Every term must tokenize to exactly one word.
pub fn normalize_targets<S: AsRef<str>>(
    words: &[S],
    options: &NormalizationOptions,
) -> Result<HashSet<String>> {
    let mut targets = HashSet::new();
    for w in words {
        let w = w.as_ref();
        match <[String; 1]>::try_from(tokenize::tokenize(w, options)) {
            Ok([t]) => {
                targets.insert(t);
            }
            Err(tokens) => {
                return Err(errors::invalid_argument(format!(
                    "focus word '{w}' is {} tokens with {options}",
                    tokens.len()
                )));
            }
        }
    }
    Ok(targets)
}
