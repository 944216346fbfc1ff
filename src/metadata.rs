//! Typed document metadata and the schema of recognized keys.

use crate::errors::{self, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Keys recognized by the default schema.
pub const DEFAULT_KEYS: [&str; 7] = [
    "author",
    "author_gender",
    "date",
    "title",
    "country_publication",
    "subject",
    "notes",
];

/// Pairs a metadata record with its text file; not part of [Metadata].
pub const FILENAME_KEY: &str = "filename";

/// One metadata record as it appears in the metadata file.
pub type RawRecord = BTreeMap<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Both,
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "female"),
            Gender::Male => write!(f, "male"),
            Gender::Both => write!(f, "both"),
            Gender::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Gender {
    type Err = Box<dyn std::error::Error>;

    fn from_str(s: &str) -> Result<Gender> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            "both" => Ok(Gender::Both),
            "unknown" => Ok(Gender::Unknown),
            _ => Err(errors::load_error(format!(
                "author_gender should be one of female, male, both, unknown; got '{s}'"
            ))),
        }
    }
}

/// Metadata of one document.
///
/// Every field is optional. Keys outside [DEFAULT_KEYS] end up in
/// [Metadata::extra], which is only allowed to hold keys that the corpus
/// schema was extended with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metadata {
    pub author: Option<String>,
    pub author_gender: Option<Gender>,
    pub date: Option<i32>,
    pub title: Option<String>,
    pub country_publication: Option<String>,
    pub subject: Option<String>,
    pub notes: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Value of any key as a string, `None` if missing.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "author" => self.author.clone(),
            "author_gender" => self.author_gender.map(|g| g.to_string()),
            "date" => self.date.map(|d| d.to_string()),
            "title" => self.title.clone(),
            "country_publication" => self.country_publication.clone(),
            "subject" => self.subject.clone(),
            "notes" => self.notes.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// All present key-value pairs, sorted by key.
    pub fn pairs(&self) -> Vec<(String, String)> {
        DEFAULT_KEYS
            .iter()
            .filter_map(|&k| self.get(k).map(|v| (k.to_owned(), v)))
            .chain(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())))
            .sorted()
            .collect_vec()
    }

    /// Convert back to the on-disk representation.
    pub fn to_record(&self, filename: &str) -> RawRecord {
        let mut record = RawRecord::new();
        record.insert(FILENAME_KEY.to_owned(), Value::String(filename.to_owned()));
        for (k, v) in self.pairs() {
            let v = match (k.as_str(), self.date) {
                ("date", Some(d)) => Value::from(d),
                _ => Value::String(v),
            };
            record.insert(k, v);
        }
        record
    }
}

/// The set of metadata keys that documents of a corpus may carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataSchema {
    keys: BTreeSet<String>,
}

impl Default for MetadataSchema {
    fn default() -> Self {
        MetadataSchema {
            keys: DEFAULT_KEYS.iter().map(|&k| k.to_owned()).collect(),
        }
    }
}

impl MetadataSchema {
    /// A schema that recognizes exactly `keys`.
    pub fn new<S: AsRef<str>>(keys: &[S]) -> MetadataSchema {
        MetadataSchema {
            keys: keys.iter().map(|k| k.as_ref().to_owned()).collect(),
        }
    }

    /// Default keys plus the given ones.
    pub fn with_extra_keys<S: AsRef<str>>(extra: &[S]) -> MetadataSchema {
        let mut schema = MetadataSchema::default();
        for k in extra {
            schema.keys.insert(k.as_ref().to_owned());
        }
        schema
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.as_str())
    }

    /// Check that `metadata` only uses keys of this schema.
    pub fn check(&self, metadata: &Metadata) -> Result<()> {
        match metadata.pairs().into_iter().find(|(k, _)| !self.contains(k)) {
            None => Ok(()),
            Some((k, _)) => Err(errors::load_error(format!("unknown metadata key '{k}'"))),
        }
    }

    /// Parse one record of the metadata file.
    ///
    /// Returns the file name that the record refers to (if any) and the typed metadata.
    pub fn parse_record(&self, record: &RawRecord) -> Result<(Option<String>, Metadata)> {
        let mut filename = None;
        let mut metadata = Metadata::default();
        for (key, value) in record {
            let value = value_string(key, value)?;
            if key == FILENAME_KEY {
                filename = value;
                continue;
            }
            if !self.contains(key) {
                return Err(errors::load_error(format!("unknown metadata key '{key}'")));
            }
            let Some(value) = value else {
                continue;
            };
            match key.as_str() {
                "author" => metadata.author = Some(value),
                "author_gender" => metadata.author_gender = Some(value.parse()?),
                "date" => metadata.date = Some(parse_date(&value)?),
                "title" => metadata.title = Some(value),
                "country_publication" => metadata.country_publication = Some(value),
                "subject" => metadata.subject = Some(value),
                "notes" => metadata.notes = Some(value),
                _ => {
                    metadata.extra.insert(key.clone(), value);
                }
            }
        }
        Ok((filename, metadata))
    }
}

fn value_string(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => {
            let s = s.trim();
            Ok(if s.is_empty() { None } else { Some(s.to_owned()) })
        }
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(errors::load_error(format!(
            "metadata value for '{key}' should be a string or a number"
        ))),
    }
}

fn parse_date(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| errors::load_error(format!("date should be a year, got '{s}'")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::{LoadError, is};
    use serde_json::json;

    fn record(v: Value) -> RawRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn gender_parse() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(" male ".parse::<Gender>().unwrap(), Gender::Male);
        assert!(is::<LoadError>(&*"woman".parse::<Gender>().unwrap_err()));
    }

    #[test]
    fn parse_record_basic() {
        let schema = MetadataSchema::default();
        let r = record(json!({
            "filename": "austen_persuasion.txt",
            "author": "Austen, Jane",
            "author_gender": "female",
            "date": 1818,
            "title": "Persuasion",
            "notes": "",
        }));
        let (filename, md) = schema.parse_record(&r).unwrap();
        assert_eq!(filename.as_deref(), Some("austen_persuasion.txt"));
        assert_eq!(md.author.as_deref(), Some("Austen, Jane"));
        assert_eq!(md.author_gender, Some(Gender::Female));
        assert_eq!(md.date, Some(1818));
        assert_eq!(md.notes, None);
        assert_eq!(md.get("date").as_deref(), Some("1818"));
    }

    #[test]
    fn date_as_string() {
        let schema = MetadataSchema::default();
        let (_, md) = schema
            .parse_record(&record(json!({"date": "1900"})))
            .unwrap();
        assert_eq!(md.date, Some(1900));
        let e = schema
            .parse_record(&record(json!({"date": "c. 1900"})))
            .unwrap_err();
        assert!(is::<LoadError>(&*e));
    }

    #[test]
    fn unknown_key_rejected() {
        let schema = MetadataSchema::default();
        let e = schema
            .parse_record(&record(json!({"filename": "a.txt", "publisher": "Murray"})))
            .unwrap_err();
        assert!(is::<LoadError>(&*e));
    }

    #[test]
    fn extended_schema() {
        let schema = MetadataSchema::with_extra_keys(&["publisher"]);
        let (_, md) = schema
            .parse_record(&record(json!({"publisher": "Murray"})))
            .unwrap();
        assert_eq!(md.get("publisher").as_deref(), Some("Murray"));
        assert!(schema.check(&md).is_ok());
        assert!(MetadataSchema::default().check(&md).is_err());
    }

    #[test]
    fn narrow_schema() {
        let schema = MetadataSchema::new(&["author", "title"]);
        assert!(!schema.contains("author_gender"));
        let e = schema
            .parse_record(&record(json!({"author_gender": "male"})))
            .unwrap_err();
        assert!(is::<LoadError>(&*e));
        let md = Metadata {
            date: Some(1900),
            ..Metadata::default()
        };
        assert!(schema.check(&md).is_err());
    }

    #[test]
    fn to_record_keeps_values() {
        let schema = MetadataSchema::default();
        let r = record(json!({
            "filename": "a.txt",
            "author": "Eliot, George",
            "author_gender": "female",
            "date": 1871,
        }));
        let (_, md) = schema.parse_record(&r).unwrap();
        assert_eq!(md.to_record("a.txt"), r);
    }
}
