//! Main entry point for comparing two parts of a corpus.

use crate::cache::FrequencyCache;
use crate::categories::{self, Category};
use crate::corpus::Corpus;
use crate::document;
use crate::dunning::{self, DunningOptions};
use crate::errors::{self, Result};
use crate::frequency::WordFrequencyTable;
use crate::output::Output;
use crate::tokenize::NormalizationOptions;
use itertools::Itertools;
use log::{debug, info};

/// What to compare?
pub struct DriverArgs<'a> {
    /// Document-level restriction for side A.
    /// A key-value pair that refers to [crate::metadata::Metadata], or `None` to use the
    /// whole corpus.
    pub restrict_a: Category<'a>,

    /// Document-level restriction for side B.
    pub restrict_b: Category<'a>,

    /// Focus words for side A.
    /// If specified, side A counts the words associated with these words instead of all words.
    pub focus_a: Option<Vec<&'a str>>,

    /// Focus words for side B.
    /// Defaults to [DriverArgs::focus_a].
    pub focus_b: Option<Vec<&'a str>>,

    /// Association window.
    /// If `None`, a focus word is associated with the word that follows it.
    /// Otherwise it is associated with all words at most this many tokens away.
    pub window: Option<usize>,

    pub normalization: NormalizationOptions,

    pub dunning: DunningOptions,

    /// Display name of side A; derived from the restriction and focus words if `None`.
    pub label_a: Option<&'a str>,

    /// Display name of side B.
    pub label_b: Option<&'a str>,
}

impl Default for DriverArgs<'_> {
    fn default() -> Self {
        DriverArgs {
            restrict_a: None,
            restrict_b: None,
            focus_a: None,
            focus_b: None,
            window: None,
            normalization: NormalizationOptions::default(),
            dunning: DunningOptions::default(),
            label_a: None,
            label_b: None,
        }
    }
}

struct Side {
    label: String,
    documents: usize,
    table: WordFrequencyTable,
}

fn side_label(restrict: Category, focus: &Option<Vec<&str>>) -> String {
    match (restrict, focus) {
        (None, None) => categories::pretty(None),
        (Some(_), None) => categories::pretty(restrict),
        (None, Some(words)) => words.join(", "),
        (Some(_), Some(words)) => format!(
            "{}: {}",
            categories::pretty(restrict),
            words.join(", ")
        ),
    }
}

fn build_side(
    args: &DriverArgs,
    corpus: &Corpus,
    restrict: Category,
    focus: &Option<Vec<&str>>,
    label_override: Option<&str>,
    cache: Option<&FrequencyCache>,
) -> Result<Side> {
    let part = corpus.restrict(restrict);
    if part.is_empty() {
        return Err(errors::invalid_input(format!(
            "no documents with {}",
            categories::pretty(restrict)
        )));
    }
    let table = match focus {
        None => match cache {
            Some(cache) => part.word_frequencies_cached(&args.normalization, cache)?,
            None => part.word_frequencies(&args.normalization),
        },
        Some(words) => {
            let targets = document::normalize_targets(words, &args.normalization)?;
            if targets.is_empty() {
                return Err(errors::invalid_argument(format!(
                    "no usable focus words in '{}'",
                    words.join(",")
                )));
            }
            part.words_associated(&targets, args.window, &args.normalization)
        }
    };
    let label = match label_override {
        Some(l) => l.to_owned(),
        None => side_label(restrict, focus),
    };
    debug!(
        target: "gender_analysis",
        "{}: {} documents, {} tokens, {} distinct words",
        label,
        part.len(),
        table.total(),
        table.len()
    );
    Ok(Side {
        label,
        documents: part.len(),
        table,
    })
}

fn owned_words(focus: &Option<Vec<&str>>) -> Option<Vec<String>> {
    focus
        .as_ref()
        .map(|words| words.iter().map(|w| w.to_string()).collect_vec())
}

/// Compare side A with side B.
///
/// This is the main entry point for the library.
pub fn calc(args: &DriverArgs, corpus: &Corpus, cache: Option<&FrequencyCache>) -> Result<Output> {
    let focus_b = match (&args.focus_a, &args.focus_b) {
        (None, Some(_)) => {
            return Err(errors::invalid_argument(
                "focus words for B require focus words for A".to_owned(),
            ));
        }
        (_, Some(_)) => &args.focus_b,
        (_, None) => &args.focus_a,
    };
    if args.window.is_some() && args.focus_a.is_none() {
        return Err(errors::invalid_argument(
            "a window requires focus words".to_owned(),
        ));
    }
    let a = build_side(args, corpus, args.restrict_a, &args.focus_a, args.label_a, cache)?;
    let b = build_side(args, corpus, args.restrict_b, focus_b, args.label_b, cache)?;
    let result = dunning::dunning(&a.table, &b.table, &args.dunning)?;
    let rows = result.rows();
    info!(
        target: "gender_analysis",
        "{} vs. {}: {} words scored",
        a.label,
        b.label,
        rows.len()
    );
    Ok(Output {
        corpus: corpus.name().to_owned(),
        label_a: a.label,
        label_b: b.label,
        restrict_a: categories::owned_cat(args.restrict_a),
        restrict_b: categories::owned_cat(args.restrict_b),
        focus_a: owned_words(&args.focus_a),
        focus_b: owned_words(focus_b),
        window: args.window,
        normalization: args.normalization,
        dunning: args.dunning,
        documents_a: a.documents,
        documents_b: b.documents,
        total_a: result.total_a(),
        total_b: result.total_b(),
        rows,
    })
}
