//! Words that occur next to a set of target words.

use crate::frequency::WordFrequencyTable;
use std::collections::HashSet;

/// Count the token that immediately follows each occurrence of a target.
///
/// Targets must already be normalized the same way as `tokens`.
pub fn associated_words<S: AsRef<str>>(
    tokens: &[S],
    targets: &HashSet<String>,
) -> WordFrequencyTable {
    let mut table = WordFrequencyTable::new();
    for pair in tokens.windows(2) {
        if targets.contains(pair[0].as_ref()) {
            table.add(pair[1].as_ref(), 1);
        }
    }
    table
}

/// Count tokens at most `window` positions before or after each target.
///
/// The target occurrence itself is not counted, but other target words
/// inside the window are.
pub fn window_words<S: AsRef<str>>(
    tokens: &[S],
    targets: &HashSet<String>,
    window: usize,
) -> WordFrequencyTable {
    let mut table = WordFrequencyTable::new();
    for (i, t) in tokens.iter().enumerate() {
        if !targets.contains(t.as_ref()) {
            continue;
        }
        let from = i.saturating_sub(window);
        let to = (i + window + 1).min(tokens.len());
        for (j, w) in tokens[from..to].iter().enumerate() {
            if from + j != i {
                table.add(w.as_ref(), 1);
            }
        }
    }
    table
}

#[cfg(test)]
mod test {
    use super::*;

    fn targets(words: &[&str]) -> HashSet<String> {
        words.iter().map(|&w| w.to_owned()).collect()
    }

    fn tokens(s: &str) -> Vec<&str> {
        s.split(' ').collect()
    }

    #[test]
    fn following_word() {
        let t = tokens("she walked and she said he said she");
        let r = associated_words(&t, &targets(&["she"]));
        assert_eq!(r.get("walked"), 1);
        assert_eq!(r.get("said"), 1);
        assert_eq!(r.total(), 2);
    }

    #[test]
    fn several_targets() {
        let t = tokens("he ran she ran they sat");
        let r = associated_words(&t, &targets(&["he", "she"]));
        assert_eq!(r.get("ran"), 2);
        assert_eq!(r.total(), 2);
    }

    #[test]
    fn window_bounds() {
        let t = tokens("money is the root of all money");
        let r = window_words(&t, &targets(&["money"]), 2);
        assert_eq!(r.get("is"), 1);
        assert_eq!(r.get("the"), 1);
        assert_eq!(r.get("of"), 1);
        assert_eq!(r.get("all"), 1);
        assert_eq!(r.get("root"), 0);
        assert_eq!(r.get("money"), 0);
        assert_eq!(r.total(), 4);
    }

    #[test]
    fn window_includes_other_targets() {
        let t = tokens("he she");
        let r = window_words(&t, &targets(&["he", "she"]), 1);
        assert_eq!(r.get("he"), 1);
        assert_eq!(r.get("she"), 1);
    }

    #[test]
    fn window_zero_is_empty() {
        let t = tokens("he said");
        assert!(window_words(&t, &targets(&["he"]), 0).is_empty());
    }
}
