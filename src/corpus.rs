//! Collections of documents.

use crate::cache::FrequencyCache;
use crate::categories::{self, Category};
use crate::document::Document;
use crate::errors::{self, Result, load_error};
use crate::frequency::WordFrequencyTable;
use crate::metadata::{Gender, Metadata, MetadataSchema, RawRecord};
use crate::parallelism;
use crate::tokenize::NormalizationOptions;
use itertools::Itertools;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::slice;
use std::sync::Arc;

/// What to do with a text file that has no metadata record, or a record
/// that has no text file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    /// Report an error.
    Fail,
    /// Leave the entry out and log a warning.
    Skip,
}

/// How to load a corpus.
///
/// Has no `Default`: callers must choose the unmatched-entry policy.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Corpus name; defaults to the name of the text directory.
    pub name: Option<String>,
    /// Recognized metadata keys.
    pub schema: MetadataSchema,
    pub unmatched: UnmatchedPolicy,
}

impl LoadOptions {
    pub fn new(unmatched: UnmatchedPolicy) -> LoadOptions {
        LoadOptions {
            name: None,
            schema: MetadataSchema::default(),
            unmatched,
        }
    }
}

/// A named collection of documents with a shared metadata schema.
///
/// Documents are kept sorted by identifier. Filtering produces a new corpus
/// that shares the same documents.
#[derive(Clone, Debug)]
pub struct Corpus {
    name: String,
    schema: Arc<MetadataSchema>,
    documents: Vec<Arc<Document>>,
    index: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus from documents that are already in memory.
    pub fn new(name: &str, schema: MetadataSchema, documents: Vec<Document>) -> Result<Corpus> {
        let mut seen = HashSet::new();
        for d in &documents {
            if !seen.insert(d.id()) {
                return Err(load_error(format!("duplicate document identifier '{}'", d.id())));
            }
            schema
                .check(d.metadata())
                .map_err(|e| load_error(format!("{}: {e}", d.id())))?;
        }
        let documents = documents
            .into_iter()
            .sorted_by(|a, b| a.id().cmp(b.id()))
            .map(Arc::new)
            .collect_vec();
        Ok(Corpus::from_shared(name.to_owned(), Arc::new(schema), documents))
    }

    fn from_shared(
        name: String,
        schema: Arc<MetadataSchema>,
        documents: Vec<Arc<Document>>,
    ) -> Corpus {
        let index = documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id().to_owned(), i))
            .collect();
        Corpus {
            name,
            schema,
            documents,
            index,
        }
    }

    /// Read all `*.txt` files in `texts_dir` and pair them with the records
    /// of the JSON metadata file.
    pub fn load(texts_dir: &Path, metadata_file: &Path, options: &LoadOptions) -> Result<Corpus> {
        info!(target: "gender_analysis", "read: {}", metadata_file.display());
        let records = read_records(metadata_file, &options.schema)?;
        info!(target: "gender_analysis", "read: {}", texts_dir.display());
        let mut texts = list_texts(texts_dir)?;

        let mut documents = vec![];
        for (filename, metadata) in records {
            match texts.remove(&filename) {
                Some(path) => {
                    let text = read_text(&path)?;
                    let id = file_stem(&path)?;
                    debug!(target: "gender_analysis", "loaded {id}: {} bytes", text.len());
                    documents.push(Document::new(&id, text, metadata));
                }
                None => unmatched(
                    options.unmatched,
                    format!("metadata record for '{filename}' has no text file"),
                )?,
            }
        }
        for filename in texts.keys() {
            unmatched(
                options.unmatched,
                format!("text file '{filename}' has no metadata record"),
            )?;
        }

        let name = match &options.name {
            Some(name) => name.clone(),
            None => texts_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "corpus".to_owned()),
        };
        let corpus = Corpus::new(&name, options.schema.clone(), documents)?;
        info!(target: "gender_analysis", "corpus {}: {} documents", corpus.name, corpus.len());
        Ok(corpus)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &MetadataSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Arc<Document>> {
        self.documents.iter()
    }

    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn get_document(&self, id: &str) -> Result<&Arc<Document>> {
        match self.index.get(id) {
            Some(&i) => Ok(&self.documents[i]),
            None => Err(errors::not_found(id)),
        }
    }

    /// Documents that satisfy `predicate`, as a new corpus.
    pub fn filter<P>(&self, predicate: P) -> Corpus
    where
        P: Fn(&Document) -> bool,
    {
        let documents = self
            .documents
            .iter()
            .filter(|d| predicate(d))
            .cloned()
            .collect_vec();
        Corpus::from_shared(self.name.clone(), self.schema.clone(), documents)
    }

    /// Documents whose metadata matches `category`.
    pub fn restrict(&self, category: Category) -> Corpus {
        self.filter(|d| categories::matches(category, d.metadata()))
    }

    pub fn filter_by_gender(&self, gender: Gender) -> Result<Corpus> {
        if !self.schema.contains("author_gender") {
            return Err(errors::missing_metadata(format!(
                "corpus {} has no author_gender metadata",
                self.name
            )));
        }
        Ok(self.filter(|d| d.metadata().author_gender == Some(gender)))
    }

    /// Distinct values of a metadata key, sorted.
    pub fn metadata_values(&self, key: &str) -> Vec<String> {
        self.documents
            .iter()
            .filter_map(|d| d.metadata().get(key))
            .sorted()
            .dedup()
            .collect_vec()
    }

    pub fn word_frequencies(&self, options: &NormalizationOptions) -> WordFrequencyTable {
        let documents = &self.documents;
        parallelism::compute_parallel(
            WordFrequencyTable::new,
            |job, table| table.merge(&documents[job].word_frequencies(options)),
            documents.len(),
        )
    }

    /// Like [Corpus::word_frequencies], but reuse cached per-document tables
    /// where they are still valid.
    pub fn word_frequencies_cached(
        &self,
        options: &NormalizationOptions,
        cache: &FrequencyCache,
    ) -> Result<WordFrequencyTable> {
        let mut table = WordFrequencyTable::new();
        for d in &self.documents {
            table.merge(&cache.get_or_compute(d, options)?);
        }
        Ok(table)
    }

    /// Merged [Document::words_associated] over all documents.
    pub fn words_associated(
        &self,
        targets: &HashSet<String>,
        window: Option<usize>,
        options: &NormalizationOptions,
    ) -> WordFrequencyTable {
        let documents = &self.documents;
        parallelism::compute_parallel(
            WordFrequencyTable::new,
            |job, table| table.merge(&documents[job].words_associated(targets, window, options)),
            documents.len(),
        )
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Arc<Document>;
    type IntoIter = slice::Iter<'a, Arc<Document>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn unmatched(policy: UnmatchedPolicy, msg: String) -> Result<()> {
    match policy {
        UnmatchedPolicy::Fail => Err(load_error(msg)),
        UnmatchedPolicy::Skip => {
            warn!(target: "gender_analysis", "skipped: {msg}");
            Ok(())
        }
    }
}

fn read_records(path: &Path, schema: &MetadataSchema) -> Result<BTreeMap<String, Metadata>> {
    let data = fs::read_to_string(path)
        .map_err(|e| load_error(format!("cannot read {}: {e}", path.display())))?;
    let raw: Vec<RawRecord> = serde_json::from_str(&data)
        .map_err(|e| load_error(format!("cannot parse {}: {e}", path.display())))?;
    let mut records = BTreeMap::new();
    for (i, record) in raw.iter().enumerate() {
        let (filename, metadata) = schema
            .parse_record(record)
            .map_err(|e| load_error(format!("record {i}: {e}")))?;
        let Some(filename) = filename else {
            return Err(load_error(format!("record {i} has no filename")));
        };
        if records.insert(filename.clone(), metadata).is_some() {
            return Err(load_error(format!("duplicate record for '{filename}'")));
        }
    }
    Ok(records)
}

fn list_texts(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| load_error(format!("cannot read {}: {e}", dir.display())))?;
    let mut texts = BTreeMap::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "txt") {
            if let Some(name) = path.file_name() {
                texts.insert(name.to_string_lossy().into_owned(), path);
            }
        }
    }
    Ok(texts)
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .map_err(|e| load_error(format!("cannot read {}: {e}", path.display())))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| load_error(format!("{} is not valid UTF-8", path.display())))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(t) => t.to_owned(),
        None => text,
    })
}

fn file_stem(path: &Path) -> Result<String> {
    match path.file_stem() {
        Some(s) => Ok(s.to_string_lossy().into_owned()),
        None => Err(load_error(format!("bad file name {}", path.display()))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::{LoadError, MissingMetadata, NotFound, is};
    use serde_json::json;

    fn doc(id: &str, gender: Gender, text: &str) -> Document {
        let md = Metadata {
            author_gender: Some(gender),
            ..Metadata::default()
        };
        Document::new(id, text.to_owned(), md)
    }

    fn corpus() -> Corpus {
        Corpus::new(
            "test",
            MetadataSchema::default(),
            vec![
                doc("b", Gender::Male, "He said that he would go."),
                doc("a", Gender::Female, "She said that she would stay."),
                doc("c", Gender::Female, "She went. He stayed."),
            ],
        )
        .unwrap()
    }

    fn write_corpus(
        dir: &Path,
        texts: &[(&str, &str)],
        records: serde_json::Value,
    ) -> (PathBuf, PathBuf) {
        let texts_dir = dir.join("texts");
        fs::create_dir(&texts_dir).unwrap();
        for (name, text) in texts {
            fs::write(texts_dir.join(name), text).unwrap();
        }
        let metadata = dir.join("metadata.json");
        fs::write(&metadata, records.to_string()).unwrap();
        (texts_dir, metadata)
    }

    #[test]
    fn sorted_by_id() {
        let c = corpus();
        assert_eq!(c.iter().map(|d| d.id()).collect_vec(), ["a", "b", "c"]);
    }

    #[test]
    fn duplicate_ids() {
        let e = Corpus::new(
            "test",
            MetadataSchema::default(),
            vec![doc("a", Gender::Male, ""), doc("a", Gender::Female, "")],
        )
        .unwrap_err();
        assert!(is::<LoadError>(&*e));
    }

    #[test]
    fn unknown_extra_key() {
        let mut md = Metadata::default();
        md.extra.insert("publisher".to_owned(), "Murray".to_owned());
        let e = Corpus::new(
            "test",
            MetadataSchema::default(),
            vec![Document::new("a", String::new(), md)],
        )
        .unwrap_err();
        assert!(is::<LoadError>(&*e));
    }

    #[test]
    fn filter_subset() {
        let c = corpus();
        let f = c.filter(|d| d.metadata().author_gender == Some(Gender::Female));
        assert_eq!(f.iter().map(|d| d.id()).collect_vec(), ["a", "c"]);
        assert_eq!(c.len(), 3);
        assert!(Arc::ptr_eq(
            f.get_document("a").unwrap(),
            c.get_document("a").unwrap()
        ));
    }

    #[test]
    fn filter_all_and_none() {
        let c = corpus();
        let all = c.filter(|_| true);
        assert_eq!(all.documents(), c.documents());
        let none = c.filter(|_| false);
        assert!(none.is_empty());
        assert!(is::<NotFound>(&*none.get_document("a").unwrap_err()));
    }

    #[test]
    fn by_gender() {
        let c = corpus();
        assert_eq!(c.filter_by_gender(Gender::Male).unwrap().len(), 1);
        assert_eq!(c.restrict(Some(("author_gender", "female"))).len(), 2);
    }

    #[test]
    fn by_gender_without_schema_key() {
        let c = Corpus::new("test", MetadataSchema::new(&["author", "title"]), vec![]).unwrap();
        let e = c.filter_by_gender(Gender::Male).unwrap_err();
        assert!(is::<MissingMetadata>(&*e));
    }

    #[test]
    fn frequencies_match_documents() {
        let c = corpus();
        let o = NormalizationOptions::default();
        let f = c.word_frequencies(&o);
        let expected: u64 = c.iter().map(|d| d.tokens(&o).len() as u64).sum();
        assert_eq!(f.total(), expected);
        assert_eq!(f.get("she"), 3);
        assert_eq!(f.get("he"), 3);
        assert_eq!(f, c.word_frequencies(&o));
    }

    #[test]
    fn associated_over_corpus() {
        let c = corpus();
        let o = NormalizationOptions::default();
        let targets = crate::document::normalize_targets(&["she"], &o).unwrap();
        let f = c.words_associated(&targets, None, &o);
        assert_eq!(f.get("said"), 1);
        assert_eq!(f.get("would"), 1);
        assert_eq!(f.get("went"), 1);
        assert_eq!(f.total(), 3);
    }

    #[test]
    fn metadata_values_sorted() {
        let c = corpus();
        assert_eq!(c.metadata_values("author_gender"), ["female", "male"]);
        assert!(c.metadata_values("title").is_empty());
    }

    #[test]
    fn load_matched() {
        let dir = tempfile::tempdir().unwrap();
        let (texts, md) = write_corpus(
            dir.path(),
            &[
                ("austen.txt", "\u{feff}It is a truth."),
                ("dickens.txt", "It was the best."),
            ],
            json!([
                {
                    "filename": "dickens.txt",
                    "author": "Dickens, Charles",
                    "author_gender": "male",
                    "date": 1859
                },
                {
                    "filename": "austen.txt",
                    "author": "Austen, Jane",
                    "author_gender": "female",
                    "date": 1813
                },
            ]),
        );
        let c = Corpus::load(&texts, &md, &LoadOptions::new(UnmatchedPolicy::Fail))
            .unwrap();
        assert_eq!(c.name(), "texts");
        assert_eq!(c.len(), 2);
        let a = c.get_document("austen").unwrap();
        assert_eq!(a.text(), "It is a truth.");
        assert_eq!(a.metadata().date, Some(1813));
    }

    #[test]
    fn load_unmatched_fail_and_skip() {
        let dir = tempfile::tempdir().unwrap();
        let (texts, md) = write_corpus(
            dir.path(),
            &[("a.txt", "one"), ("b.txt", "two")],
            json!([
                {"filename": "a.txt", "author_gender": "male"},
                {"filename": "c.txt", "author_gender": "female"},
            ]),
        );
        let e = Corpus::load(&texts, &md, &LoadOptions::new(UnmatchedPolicy::Fail))
            .unwrap_err();
        assert!(is::<LoadError>(&*e));
        let c = Corpus::load(&texts, &md, &LoadOptions::new(UnmatchedPolicy::Skip))
            .unwrap();
        assert_eq!(c.iter().map(|d| d.id()).collect_vec(), ["a"]);
    }

    #[test]
    fn load_bad_records() {
        let dir = tempfile::tempdir().unwrap();
        let (texts, md) = write_corpus(
            dir.path(),
            &[("a.txt", "one")],
            json!([{"filename": "a.txt", "publisher": "Murray"}]),
        );
        let options = LoadOptions::new(UnmatchedPolicy::Skip);
        assert!(is::<LoadError>(&*Corpus::load(&texts, &md, &options).unwrap_err()));

        let options = LoadOptions {
            schema: MetadataSchema::with_extra_keys(&["publisher"]),
            ..options
        };
        let c = Corpus::load(&texts, &md, &options).unwrap();
        let a = c.get_document("a").unwrap();
        assert_eq!(a.metadata().get("publisher").as_deref(), Some("Murray"));
    }

    #[test]
    fn filtered_records_reload_with_extra_keys() {
        let dir = tempfile::tempdir().unwrap();
        let (texts, md) = write_corpus(
            dir.path(),
            &[("a.txt", "one"), ("b.txt", "two")],
            json!([
                {"filename": "a.txt", "publisher": "Murray", "date": 1816},
                {"filename": "b.txt", "publisher": "Smith"},
            ]),
        );
        let options = LoadOptions {
            schema: MetadataSchema::with_extra_keys(&["publisher"]),
            ..LoadOptions::new(UnmatchedPolicy::Skip)
        };
        let c = Corpus::load(&texts, &md, &options).unwrap();
        let part = c.restrict(Some(("publisher", "Murray")));
        let records = part
            .iter()
            .map(|d| d.metadata().to_record(&format!("{}.txt", d.id())))
            .collect_vec();
        let reduced = dir.path().join("reduced.json");
        fs::write(&reduced, serde_json::to_string(&records).unwrap()).unwrap();

        let again = Corpus::load(&texts, &reduced, &options).unwrap();
        assert_eq!(again.iter().map(|d| d.id()).collect_vec(), ["a"]);
        let a = again.get_document("a").unwrap();
        assert_eq!(a.metadata(), c.get_document("a").unwrap().metadata());
    }

    #[test]
    fn load_record_without_filename() {
        let dir = tempfile::tempdir().unwrap();
        let (texts, md) = write_corpus(dir.path(), &[], json!([{"author": "Anon"}]));
        let e = Corpus::load(&texts, &md, &LoadOptions::new(UnmatchedPolicy::Skip))
            .unwrap_err();
        assert!(is::<LoadError>(&*e));
    }

    #[test]
    fn load_malformed_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let texts = dir.path().join("texts");
        fs::create_dir(&texts).unwrap();
        let md = dir.path().join("metadata.json");
        fs::write(&md, "{ not json").unwrap();
        let e = Corpus::load(&texts, &md, &LoadOptions::new(UnmatchedPolicy::Skip))
            .unwrap_err();
        assert!(is::<LoadError>(&*e));
    }
}
