//! Dunning log-likelihood comparison of two word frequency tables.
//!
//! For a word with count `a` in corpus A and `b` in corpus B, where the
//! corpora have `c` and `d` tokens in total, the expected counts under the
//! hypothesis of equal rates are `e1 = c (a + b) / (c + d)` and
//! `e2 = d (a + b) / (c + d)`, and the statistic is
//! `G2 = 2 (a ln(a / e1) + b ln(b / e2))`, where a term with a zero count is
//! zero. The result is signed: positive if the word is relatively more
//! frequent in A, negative if it is relatively more frequent in B.

use crate::errors::{self, Result};
use crate::frequency::WordFrequencyTable;
use crate::output::SignificanceRow;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Which words to score.
///
/// With the defaults, every word that occurs in either table is scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DunningOptions {
    /// Skip words whose combined count is below this.
    pub min_count: u64,
    /// Skip words that are missing from one of the tables.
    pub shared_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct WordSignificance {
    pub count_a: u64,
    pub count_b: u64,
    /// Signed log-likelihood statistic.
    pub dunning: f64,
}

/// Signed statistics for every scored word.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SignificanceResult {
    total_a: u64,
    total_b: u64,
    words: BTreeMap<String, WordSignificance>,
}

fn term(count: u64, expected: f64) -> f64 {
    if count == 0 {
        0.0
    } else {
        let count = count as f64;
        count * (count / expected).ln()
    }
}

fn signed_statistic(total_a: u64, total_b: u64, a: u64, b: u64) -> f64 {
    let c = total_a as f64;
    let d = total_b as f64;
    let ab = (a + b) as f64;
    let e1 = c * ab / (c + d);
    let e2 = d * ab / (c + d);
    let g2 = 2.0 * (term(a, e1) + term(b, e2));
    // a / total_a vs. b / total_b, compared exactly
    let rate_a = a as u128 * total_b as u128;
    let rate_b = b as u128 * total_a as u128;
    match rate_a.cmp(&rate_b) {
        Ordering::Greater => g2,
        Ordering::Less => -g2,
        Ordering::Equal => 0.0,
    }
}

fn check_totals(total_a: u64, total_b: u64) -> Result<()> {
    if total_a == 0 {
        return Err(errors::empty_corpus("corpus A has no tokens".to_owned()));
    }
    if total_b == 0 {
        return Err(errors::empty_corpus("corpus B has no tokens".to_owned()));
    }
    Ok(())
}

/// Signed statistic for a single word.
pub fn log_likelihood(total_a: u64, total_b: u64, a: u64, b: u64) -> Result<f64> {
    check_totals(total_a, total_b)?;
    Ok(signed_statistic(total_a, total_b, a, b))
}

/// Compare two tables word by word.
pub fn dunning(
    a: &WordFrequencyTable,
    b: &WordFrequencyTable,
    options: &DunningOptions,
) -> Result<SignificanceResult> {
    let total_a = a.total();
    let total_b = b.total();
    check_totals(total_a, total_b)?;
    let mut words = BTreeMap::new();
    for word in a.words().merge(b.words()).dedup() {
        let count_a = a.get(word);
        let count_b = b.get(word);
        if options.shared_only && (count_a == 0 || count_b == 0) {
            continue;
        }
        if count_a + count_b < options.min_count {
            continue;
        }
        let dunning = signed_statistic(total_a, total_b, count_a, count_b);
        words.insert(
            word.clone(),
            WordSignificance {
                count_a,
                count_b,
                dunning,
            },
        );
    }
    debug!(
        target: "gender_analysis",
        "dunning: {} vs. {} tokens, {} words scored",
        total_a,
        total_b,
        words.len()
    );
    Ok(SignificanceResult {
        total_a,
        total_b,
        words,
    })
}

fn by_magnitude(x: &(&str, &WordSignificance), y: &(&str, &WordSignificance)) -> Ordering {
    y.1.dunning
        .abs()
        .total_cmp(&x.1.dunning.abs())
        .then(x.0.cmp(y.0))
}

impl SignificanceResult {
    pub fn total_a(&self) -> u64 {
        self.total_a
    }

    pub fn total_b(&self) -> u64 {
        self.total_b
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&WordSignificance> {
        self.words.get(word)
    }

    /// Words in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordSignificance)> {
        self.words.iter().map(|(w, s)| (w.as_str(), s))
    }

    /// Most distinctive words first.
    pub fn ranked(&self) -> Vec<(&str, &WordSignificance)> {
        self.iter().sorted_by(by_magnitude).collect_vec()
    }

    /// The `n` words most characteristic of corpus A.
    pub fn top_a(&self, n: usize) -> Vec<(&str, &WordSignificance)> {
        self.iter()
            .filter(|(_, s)| s.dunning > 0.0)
            .sorted_by(by_magnitude)
            .take(n)
            .collect_vec()
    }

    /// The `n` words most characteristic of corpus B.
    pub fn top_b(&self, n: usize) -> Vec<(&str, &WordSignificance)> {
        self.iter()
            .filter(|(_, s)| s.dunning < 0.0)
            .sorted_by(by_magnitude)
            .take(n)
            .collect_vec()
    }

    pub fn row(&self, word: &str, s: &WordSignificance) -> SignificanceRow {
        let count_total = s.count_a + s.count_b;
        SignificanceRow {
            word: word.to_owned(),
            dunning: s.dunning,
            count_total,
            count_a: s.count_a,
            count_b: s.count_b,
            freq_total: count_total as f64 / (self.total_a + self.total_b) as f64,
            freq_a: s.count_a as f64 / self.total_a as f64,
            freq_b: s.count_b as f64 / self.total_b as f64,
        }
    }

    /// One row per word, most distinctive first.
    pub fn rows(&self) -> Vec<SignificanceRow> {
        self.ranked()
            .into_iter()
            .map(|(w, s)| self.row(w, s))
            .collect_vec()
    }
}
