use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use gender_analysis::cache::FrequencyCache;
use gender_analysis::categories;
use gender_analysis::corpus::{Corpus, LoadOptions, UnmatchedPolicy};
use gender_analysis::driver::{self, DriverArgs};
use gender_analysis::dunning::DunningOptions;
use gender_analysis::errors::Result;
use gender_analysis::information;
use gender_analysis::metadata::MetadataSchema;
use gender_analysis::output::{self, OError};
use gender_analysis::tokenize::NormalizationOptions;
use itertools::Itertools;
use log::{error, info};
use std::path::Path;
use std::{error, fs, io, process};

#[derive(Clone, Copy, ValueEnum)]
enum Unmatched {
    /// Leave out texts without metadata and metadata without texts
    Skip,
    /// Stop with an error
    Fail,
}

/// Compare word usage in two parts of a corpus with Dunning log-likelihood
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory of text files (*.txt)
    texts: String,
    /// Metadata file (JSON)
    metadata: String,
    /// Output file (JSON, or XLSX if the name ends with .xlsx)
    outfile: String,
    /// Texts without metadata records and records without texts
    #[arg(long, value_enum)]
    unmatched: Unmatched,
    /// Corpus name
    #[arg(long)]
    name: Option<String>,
    /// Additional metadata keys
    #[arg(long, value_delimiter = ',')]
    extra_keys: Vec<String>,
    /// Restrict side A to documents with key=value
    #[arg(long)]
    side_a: Option<String>,
    /// Restrict side B to documents with key=value
    #[arg(long)]
    side_b: Option<String>,
    /// Count words associated with these words on side A
    #[arg(long, value_delimiter = ',')]
    focus_a: Option<Vec<String>>,
    /// Count words associated with these words on side B
    #[arg(long, value_delimiter = ',')]
    focus_b: Option<Vec<String>>,
    /// Associate focus words with all words this close
    #[arg(long)]
    window: Option<usize>,
    /// Display name of side A
    #[arg(long)]
    label_a: Option<String>,
    /// Display name of side B
    #[arg(long)]
    label_b: Option<String>,
    /// Do not lowercase words
    #[arg(long)]
    keep_case: bool,
    /// Do not strip punctuation
    #[arg(long)]
    keep_punctuation: bool,
    /// Only score words with at least this many occurrences in total
    #[arg(long, default_value_t = 0)]
    min_count: u64,
    /// Only score words that occur on both sides
    #[arg(long)]
    shared_only: bool,
    /// Cache directory for word frequencies
    #[arg(long)]
    cache: Option<String>,
    /// Number of words to show for each side
    #[arg(long, default_value_t = 20)]
    top: usize,
    /// Report errors as a JSON file
    #[arg(long)]
    error_file: Option<String>,
    /// Produce compact JSON files
    #[arg(long)]
    compact: bool,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn focus_words(focus: &Option<Vec<String>>) -> Option<Vec<&str>> {
    focus
        .as_ref()
        .map(|words| words.iter().map(|w| w.as_str()).collect_vec())
}

fn process(args: &Args) -> Result<()> {
    let options = LoadOptions {
        name: args.name.clone(),
        schema: MetadataSchema::with_extra_keys(&args.extra_keys),
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
    information::statistics(&corpus, &normalization);
    let cache = match &args.cache {
        Some(dir) => Some(FrequencyCache::open(Path::new(dir))?),
        None => None,
    };
    let driver_args = DriverArgs {
        restrict_a: categories::parse_restriction(&args.side_a)?,
        restrict_b: categories::parse_restriction(&args.side_b)?,
        focus_a: focus_words(&args.focus_a),
        focus_b: focus_words(&args.focus_b),
        window: args.window,
        normalization,
        dunning: DunningOptions {
            min_count: args.min_count,
            shared_only: args.shared_only,
        },
        label_a: args.label_a.as_deref(),
        label_b: args.label_b.as_deref(),
    };
    let output = driver::calc(&driver_args, &corpus, cache.as_ref())?;
    if args.top > 0 {
        println!("{}", output::display_table(&output, args.top));
    }
    if args.outfile.ends_with(".xlsx") {
        output::write_xlsx(&output, Path::new(&args.outfile))?;
    } else {
        let file = fs::File::create(&args.outfile)?;
        let writer = io::BufWriter::new(file);
        if args.compact {
            serde_json::to_writer(writer, &output)?;
        } else {
            serde_json::to_writer_pretty(writer, &output)?;
        }
    }
    info!(target: "gender_analysis", "wrote: {}", args.outfile);
    Ok(())
}

fn store_error(error_file: &str, e: &dyn error::Error) -> Result<()> {
    let error = OError {
        error: format!("{e}"),
    };
    let file = fs::File::create(error_file)?;
    let writer = io::BufWriter::new(file);
    serde_json::to_writer(writer, &error)?;
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
            match args.error_file {
                Some(filename) => match store_error(&filename, &*e) {
                    Ok(()) => {
                        info!(target: "gender_analysis", "error reported: {e}");
                    }
                    Err(e2) => {
                        error!(target: "gender_analysis", "{e}");
                        error!(target: "gender_analysis", "{e2}");
                    }
                },
                None => error!(target: "gender_analysis", "{e}"),
            }
            process::exit(1);
        }
    }
}
