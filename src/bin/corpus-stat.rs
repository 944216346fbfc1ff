use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use gender_analysis::corpus::{Corpus, LoadOptions, UnmatchedPolicy};
use gender_analysis::errors::{self, Result};
use gender_analysis::information::{self, Stat};
use gender_analysis::metadata::MetadataSchema;
use gender_analysis::tokenize::NormalizationOptions;
use log::error;
use std::path::Path;
use std::process;

#[derive(Clone, Copy, ValueEnum)]
enum Unmatched {
    /// Leave out texts without metadata and metadata without texts
    Skip,
    /// Stop with an error
    Fail,
}

/// Corpus statistics, overall and by metadata value
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory of text files (*.txt)
    texts: String,
    /// Metadata file (JSON)
    metadata: String,
    /// Texts without metadata records and records without texts
    #[arg(long, value_enum)]
    unmatched: Unmatched,
    /// Additional metadata keys
    #[arg(long, value_delimiter = ',')]
    extra_keys: Vec<String>,
    /// Metadata keys to break the statistics down by
    #[arg(long, value_delimiter = ',', default_value = "author_gender")]
    keys: Vec<String>,
    /// Do not lowercase words
    #[arg(long)]
    keep_case: bool,
    /// Do not strip punctuation
    #[arg(long)]
    keep_punctuation: bool,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn print_stat(indent: &str, stat: &Stat) {
    println!("{indent}- documents: {}", stat.documents);
    println!("{indent}- tokens: {}", stat.tokens);
    println!("{indent}- types: {}", stat.types);
}

fn process(args: &Args) -> Result<()> {
    let schema = MetadataSchema::with_extra_keys(&args.extra_keys);
    for key in &args.keys {
        if !schema.contains(key) {
            return Err(errors::invalid_argument(format!("unknown metadata key '{key}'")));
        }
    }
    let options = LoadOptions {
        name: None,
        schema,
        unmatched: match args.unmatched {
            Unmatched::Skip => UnmatchedPolicy::Skip,
            Unmatched::Fail => UnmatchedPolicy::Fail,
        },
    };
    let corpus = Corpus::load(Path::new(&args.texts), Path::new(&args.metadata), &options)?;
    let normalization = NormalizationOptions {
        case_fold: !args.keep_case,
        strip_punctuation: !args.keep_punctuation,
    };
    let overall = information::statistics(&corpus, &normalization);
    println!("corpus: {}", corpus.name());
    print_stat("", &overall);
    for key in &args.keys {
        for (value, stat) in information::by_value(&corpus, key, &normalization) {
            println!("  {key} = {value}:");
            print_stat("  ", &stat);
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    match process(&args) {
        Ok(()) => (),
        Err(e) => {
            error!(target: "gender_analysis", "{e}");
            process::exit(1);
        }
    }
}
