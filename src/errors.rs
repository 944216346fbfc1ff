//! Errors and error-related utilities.

use std::{error, fmt, result};

/// The result type used throughout this library.
pub type Result<T> = result::Result<T, Box<dyn error::Error>>;

/// Text files and metadata records could not be turned into a corpus.
#[derive(Debug)]
pub struct LoadError(pub String);

/// Unknown document identifier.
#[derive(Debug)]
pub struct NotFound(pub String);

/// A corpus with zero tokens was passed to the comparator.
#[derive(Debug)]
pub struct EmptyCorpus(pub String);

/// A cached table was computed with different normalization options.
#[derive(Debug)]
pub struct NormalizationOptionsMismatch(pub String);

/// A cached table was computed from a different version of the text.
#[derive(Debug)]
pub struct StaleCache(pub String);

/// The corpus schema lacks a metadata key that the analysis needs.
#[derive(Debug)]
pub struct MissingMetadata(pub String);

/// Invalid input.
#[derive(Debug)]
pub struct InvalidInput(pub String);

/// Invalid command line argument.
#[derive(Debug)]
pub struct InvalidArgument(pub String);

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "load error: {}", self.0)
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "document not found: {}", self.0)
    }
}

impl fmt::Display for EmptyCorpus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "empty corpus: {}", self.0)
    }
}

impl fmt::Display for NormalizationOptionsMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "normalization options mismatch: {}", self.0)
    }
}

impl fmt::Display for StaleCache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "stale cache entry: {}", self.0)
    }
}

impl fmt::Display for MissingMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "missing metadata: {}", self.0)
    }
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid input: {}", self.0)
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid argument: {}", self.0)
    }
}

impl error::Error for LoadError {}

impl error::Error for NotFound {}

impl error::Error for EmptyCorpus {}

impl error::Error for NormalizationOptionsMismatch {}

impl error::Error for StaleCache {}

impl error::Error for MissingMetadata {}

impl error::Error for InvalidInput {}

impl error::Error for InvalidArgument {}

/// A helper for constructing [LoadError].
pub fn load_error(s: String) -> Box<dyn error::Error> {
    LoadError(s).into()
}

/// A helper for constructing [NotFound].
pub fn not_found(s: &str) -> Box<dyn error::Error> {
    NotFound(s.to_owned()).into()
}

/// A helper for constructing [EmptyCorpus].
pub fn empty_corpus(s: String) -> Box<dyn error::Error> {
    EmptyCorpus(s).into()
}

/// A helper for constructing [NormalizationOptionsMismatch].
pub fn options_mismatch(s: String) -> Box<dyn error::Error> {
    NormalizationOptionsMismatch(s).into()
}

/// A helper for constructing [StaleCache].
pub fn stale_cache(s: String) -> Box<dyn error::Error> {
    StaleCache(s).into()
}

/// A helper for constructing [MissingMetadata].
pub fn missing_metadata(s: String) -> Box<dyn error::Error> {
    MissingMetadata(s).into()
}

/// A helper for constructing [InvalidInput].
pub fn invalid_input(s: String) -> Box<dyn error::Error> {
    InvalidInput(s).into()
}

/// A helper for constructing [InvalidArgument].
pub fn invalid_argument(s: String) -> Box<dyn error::Error> {
    InvalidArgument(s).into()
}

/// True if `e` is an error of kind `T`.
pub fn is<T: error::Error + 'static>(e: &(dyn error::Error + 'static)) -> bool {
    e.downcast_ref::<T>().is_some()
}
