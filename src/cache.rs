//! On-disk cache of per-document word frequency tables.
//!
//! The cache is a derived artifact: there is one entry per document and set
//! of normalization options. Each entry also records the options and the
//! checksum of the text it was computed from, and it is only used if both
//! match the request. Anything else is recomputed from the raw text.

use crate::document::Document;
use crate::errors::{self, Result};
use crate::frequency::WordFrequencyTable;
use crate::tokenize::NormalizationOptions;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Deserialize, Serialize)]
struct CacheEntry {
    id: String,
    options: NormalizationOptions,
    checksum: String,
    table: WordFrequencyTable,
}

fn checksum_string(doc: &Document) -> String {
    format!("{:016x}", doc.checksum())
}

fn all_options() -> impl Iterator<Item = NormalizationOptions> {
    [false, true].into_iter().flat_map(|case_fold| {
        [false, true].into_iter().map(move |strip_punctuation| NormalizationOptions {
            case_fold,
            strip_punctuation,
        })
    })
}

/// A directory of cached tables, one entry per document.
#[derive(Debug)]
pub struct FrequencyCache {
    dir: PathBuf,
}

impl FrequencyCache {
    /// Use `dir` as the cache directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<FrequencyCache> {
        fs::create_dir_all(dir)?;
        Ok(FrequencyCache {
            dir: dir.to_owned(),
        })
    }

    fn entry_path(&self, id: &str, options: &NormalizationOptions) -> PathBuf {
        let safe: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!(
            "{safe}-{:016x}-cf{}-sp{}.json",
            xxh3_64(id.as_bytes()),
            u8::from(options.case_fold),
            u8::from(options.strip_punctuation)
        ))
    }

    /// The cached table for `doc`, if there is one.
    ///
    /// Fails with [errors::NormalizationOptionsMismatch] if the entry was
    /// computed with other options, and with [errors::StaleCache] if the text
    /// has changed or the entry is unreadable.
    pub fn load(
        &self,
        doc: &Document,
        options: &NormalizationOptions,
    ) -> Result<Option<WordFrequencyTable>> {
        let path = self.entry_path(doc.id(), options);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: CacheEntry = serde_json::from_str(&data)
            .map_err(|e| errors::stale_cache(format!("{}: {e}", path.display())))?;
        if entry.id != doc.id() {
            return Err(errors::stale_cache(format!(
                "{}: entry belongs to '{}'",
                path.display(),
                entry.id
            )));
        }
        if entry.options != *options {
            return Err(errors::options_mismatch(format!(
                "{}: cached with {}, requested {}",
                doc.id(),
                entry.options,
                options
            )));
        }
        if entry.checksum != checksum_string(doc) {
            return Err(errors::stale_cache(format!("{}: text has changed", doc.id())));
        }
        Ok(Some(entry.table))
    }

    pub fn store(
        &self,
        doc: &Document,
        options: &NormalizationOptions,
        table: &WordFrequencyTable,
    ) -> Result<()> {
        let entry = CacheEntry {
            id: doc.id().to_owned(),
            options: *options,
            checksum: checksum_string(doc),
            table: table.clone(),
        };
        let file = fs::File::create(self.entry_path(doc.id(), options))?;
        serde_json::to_writer(BufWriter::new(file), &entry)?;
        Ok(())
    }

    /// The cached table if it is valid, otherwise recompute and store it.
    pub fn get_or_compute(
        &self,
        doc: &Document,
        options: &NormalizationOptions,
    ) -> Result<WordFrequencyTable> {
        match self.load(doc, options) {
            Ok(Some(table)) => {
                debug!(target: "gender_analysis", "cache hit: {}", doc.id());
                return Ok(table);
            }
            Ok(None) => {
                debug!(target: "gender_analysis", "cache miss: {}", doc.id());
            }
            Err(e)
                if errors::is::<errors::NormalizationOptionsMismatch>(&*e)
                    || errors::is::<errors::StaleCache>(&*e) =>
            {
                warn!(target: "gender_analysis", "recomputing: {e}");
            }
            Err(e) => return Err(e),
        }
        let table = doc.word_frequencies(options);
        self.store(doc, options, &table)?;
        Ok(table)
    }

    /// Remove the entries of one document for all options. Returns `true`
    /// if there were any.
    pub fn invalidate(&self, id: &str) -> Result<bool> {
        let mut removed = false;
        for options in all_options() {
            match fs::remove_file(self.entry_path(id, &options)) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == io::ErrorKind::NotFound => (),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    /// Remove all entries. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                fs::remove_file(path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
