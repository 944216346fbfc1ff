use crate::corpus::Corpus;
use crate::frequency::WordFrequencyTable;
use crate::tokenize::NormalizationOptions;
use itertools::Itertools;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// Documents, tokens and distinct words of (a part of) a corpus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stat {
    pub documents: usize,
    pub tokens: u64,
    pub types: usize,
}

impl Stat {
    pub fn new(corpus: &Corpus, table: &WordFrequencyTable) -> Stat {
        Stat {
            documents: corpus.len(),
            tokens: table.total(),
            types: table.len(),
        }
    }
}

fn explain_metadata_one(k: &str, vv: &BTreeSet<String>) -> String {
    format!("{} = {}", k, vv.iter().join(", "))
}

/// Keys and values of document metadata, e.g. `author_gender = female, male`.
pub fn explain_metadata(corpus: &Corpus) -> String {
    let mut metadata: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for d in corpus {
        for (k, v) in d.metadata().pairs() {
            metadata.entry(k).or_default().insert(v);
        }
    }
    metadata
        .iter()
        .map(|(k, vv)| explain_metadata_one(k, vv))
        .join("; ")
}

/// Log an overview of the corpus.
pub fn statistics(corpus: &Corpus, options: &NormalizationOptions) -> Stat {
    let stat = Stat::new(corpus, &corpus.word_frequencies(options));
    info!(target: "gender_analysis", "{}: documents: {}", corpus.name(), stat.documents);
    info!(target: "gender_analysis", "{}: tokens: {}", corpus.name(), stat.tokens);
    info!(target: "gender_analysis", "{}: distinct words: {}", corpus.name(), stat.types);
    info!(
        target: "gender_analysis",
        "document metadata categories: {}",
        explain_metadata(corpus)
    );
    stat
}

/// [Stat] for each value of a metadata key, sorted by value.
pub fn by_value(corpus: &Corpus, key: &str, options: &NormalizationOptions) -> Vec<(String, Stat)> {
    corpus
        .metadata_values(key)
        .into_iter()
        .map(|v| {
            let part = corpus.restrict(Some((key, v.as_str())));
            let stat = Stat::new(&part, &part.word_frequencies(options));
            (v, stat)
        })
        .collect_vec()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::Document;
    use crate::metadata::{Gender, Metadata, MetadataSchema};

    fn corpus() -> Corpus {
        let md = |g, d| Metadata {
            author_gender: Some(g),
            date: Some(d),
            ..Metadata::default()
        };
        Corpus::new(
            "test",
            MetadataSchema::default(),
            vec![
                Document::new("a", "she said she".to_owned(), md(Gender::Female, 1850)),
                Document::new("b", "he said".to_owned(), md(Gender::Male, 1860)),
                Document::new("c", "he".to_owned(), md(Gender::Male, 1860)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn explain() {
        assert_eq!(
            explain_metadata(&corpus()),
            "author_gender = female, male; date = 1850, 1860"
        );
    }

    #[test]
    fn overall() {
        let s = statistics(&corpus(), &NormalizationOptions::default());
        assert_eq!(
            s,
            Stat {
                documents: 3,
                tokens: 6,
                types: 3
            }
        );
    }

    #[test]
    fn per_value() {
        let r = by_value(&corpus(), "author_gender", &NormalizationOptions::default());
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].0, "female");
        assert_eq!(r[0].1.tokens, 3);
        assert_eq!(r[1].0, "male");
        assert_eq!(
            r[1].1,
            Stat {
                documents: 2,
                tokens: 3,
                types: 2
            }
        );
    }
}
