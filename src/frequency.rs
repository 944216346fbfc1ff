//! Word frequency tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Mapping from word to number of occurrences.
///
/// Only words with a positive count are stored, and `total` is always the
/// sum of all counts. Deserialization rejects tables that break this.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "StoredTable")]
pub struct WordFrequencyTable {
    counts: BTreeMap<String, u64>,
    total: u64,
}

#[derive(Deserialize)]
struct StoredTable {
    counts: BTreeMap<String, u64>,
    total: u64,
}

impl TryFrom<StoredTable> for WordFrequencyTable {
    type Error = String;

    fn try_from(stored: StoredTable) -> Result<Self, Self::Error> {
        if let Some((w, _)) = stored.counts.iter().find(|(_, c)| **c == 0) {
            return Err(format!("zero count for '{w}'"));
        }
        let sum = stored
            .counts
            .values()
            .try_fold(0u64, |acc, &c| acc.checked_add(c))
            .ok_or_else(|| "counts overflow".to_owned())?;
        if sum != stored.total {
            return Err(format!("total is {}, counts add up to {sum}", stored.total));
        }
        Ok(WordFrequencyTable {
            counts: stored.counts,
            total: stored.total,
        })
    }
}

impl WordFrequencyTable {
    pub fn new() -> WordFrequencyTable {
        WordFrequencyTable::default()
    }

    pub fn from_tokens<I, S>(tokens: I) -> WordFrequencyTable
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = WordFrequencyTable::new();
        for t in tokens {
            table.add(t.as_ref(), 1);
        }
        table
    }

    pub fn add(&mut self, word: &str, count: u64) {
        if count == 0 {
            return;
        }
        match self.counts.get_mut(word) {
            Some(c) => *c += count,
            None => {
                self.counts.insert(word.to_owned(), count);
            }
        }
        self.total += count;
    }

    /// Add all counts of `other` to this table.
    pub fn merge(&mut self, other: &WordFrequencyTable) {
        for (w, &c) in &other.counts {
            self.add(w, c);
        }
    }

    /// Count of `word`, zero if absent.
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Number of tokens counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Words in sorted order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(w, &c)| (w.as_str(), c))
    }

    pub fn words(&self) -> btree_map::Keys<'_, String, u64> {
        self.counts.keys()
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordFrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        WordFrequencyTable::from_tokens(iter)
    }
}
