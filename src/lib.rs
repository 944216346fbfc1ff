pub mod associations;
pub mod cache;
pub mod categories;
pub mod corpus;
pub mod document;
pub mod driver;
pub mod dunning;
pub mod errors;
pub mod frequency;
pub mod information;
pub mod metadata;
pub mod output;
mod parallelism;
pub mod tokenize;
