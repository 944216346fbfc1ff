use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cliclack::log;
use gender_analysis::corpus::{Corpus, LoadOptions, UnmatchedPolicy};
use gender_analysis::document::Document;
use gender_analysis::metadata::{MetadataSchema, RawRecord};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::Path;
use std::{fs, io};

/// Select a subcorpus interactively and write its metadata file
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Directory of text files (*.txt)
    texts: String,
    /// Metadata file (JSON)
    metadata: String,
    /// Output metadata file (JSON)
    outfile: String,
    /// Additional metadata keys
    #[arg(long, value_delimiter = ',')]
    extra_keys: Vec<String>,
}

#[derive(Clone, PartialEq, Eq)]
enum How {
    Remove,
    Keep,
}

#[derive(Clone, PartialEq, Eq)]
enum Action {
    Undo,
    Restrict(How),
    Save,
    Quit,
}

struct CategorySelection {
    key: String,
    values: Vec<String>,
}

fn select_documents(corpus: &Corpus) -> Result<Option<CategorySelection>> {
    let ndocs = corpus.len();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for d in corpus {
        for (key, _) in d.metadata().pairs() {
            *counts.entry(key).or_default() += 1;
        }
    }
    loop {
        let mut items = vec![];
        items.push((None, "Oops, go back".to_owned(), ""));
        for (key, count) in &counts {
            items.push((
                Some(key.clone()),
                format!("{key} ({count}/{ndocs} documents)"),
                "",
            ));
        }
        let choice = cliclack::select("Select from which category?")
            .items(&items)
            .interact()?;
        match choice {
            None => return Ok(None),
            Some(key) => {
                let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                for d in corpus {
                    if let Some(val) = d.metadata().get(&key) {
                        *counts.entry(val).or_default() += 1;
                    }
                }
                let mut items = vec![];
                for (val, count) in &counts {
                    items.push((
                        val.clone(),
                        format!("{val} ({count}/{ndocs} documents)"),
                        "",
                    ));
                }
                let choices = cliclack::multiselect("Select which values (or none to go back)?")
                    .items(&items)
                    .required(false)
                    .interact()?;
                if !choices.is_empty() {
                    return Ok(Some(CategorySelection { key, values: choices }));
                }
            }
        }
    }
}

fn summarize(corpus: &Corpus) -> String {
    format!("{} documents", corpus.len())
}

fn matches(cs: &CategorySelection, d: &Document) -> bool {
    match d.metadata().get(&cs.key) {
        None => false,
        Some(val) => cs.values.contains(&val),
    }
}

fn restrict(how: &How, cs: &CategorySelection, corpus: &Corpus) -> Corpus {
    corpus.filter(|d| {
        let m = matches(cs, d);
        match how {
            How::Keep => m,
            How::Remove => !m,
        }
    })
}

fn records(corpus: &Corpus) -> Vec<RawRecord> {
    corpus
        .iter()
        .map(|d| d.metadata().to_record(&format!("{}.txt", d.id())))
        .collect_vec()
}

fn main() -> Result<()> {
    let args = Args::parse();
    cliclack::intro("corpus-filter")?;
    let unmatched = cliclack::select("Texts without metadata records, or records without texts?")
        .items(&[
            (UnmatchedPolicy::Skip, "Skip them", ""),
            (UnmatchedPolicy::Fail, "Stop with an error", ""),
        ])
        .interact()?;
    log::info(format!("Reading {}...", args.texts))?;
    let options = LoadOptions {
        name: None,
        schema: MetadataSchema::with_extra_keys(&args.extra_keys),
        unmatched,
    };
    let input = Corpus::load(Path::new(&args.texts), Path::new(&args.metadata), &options)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("cannot load {} with {}", args.texts, args.metadata))?;
    let mut restrictions: Vec<(How, CategorySelection)> = vec![];
    loop {
        let mut corpus = input.clone();
        let mut stack = vec![];
        let options = textwrap::Options::new(70).subsequent_indent(" ");
        stack.push(format!("{} ← input", summarize(&corpus)));
        for (how, cs) in &restrictions {
            corpus = restrict(how, cs, &corpus);
            let line = format!(
                "{} ← {} documents where '{}' is {}",
                summarize(&corpus),
                match how {
                    How::Keep => "keep",
                    How::Remove => "remove",
                },
                cs.key,
                cs.values.iter().map(|x| format!("'{x}'")).join(" or "),
            );
            stack.push(textwrap::fill(&line, &options));
        }

        cliclack::note("Restrictions", stack.join("\n"))?;

        let mut items = vec![];
        if !restrictions.is_empty() {
            items.push((Action::Undo, "Remove last restriction", ""));
        }
        items.push((
            Action::Restrict(How::Remove),
            "Select which documents to remove",
            "",
        ));
        items.push((
            Action::Restrict(How::Keep),
            "Select which documents to keep",
            "",
        ));
        items.push((
            Action::Save,
            "Write current restrictions to the output file",
            "",
        ));
        items.push((Action::Quit, "Quit", ""));
        let choice = cliclack::select("Action?").items(&items).interact()?;
        match choice {
            Action::Quit => break,
            Action::Undo => {
                restrictions.pop();
            }
            Action::Save => {
                let filename: String = cliclack::input("file name")
                    .default_input(&args.outfile)
                    .interact()?;
                let file = fs::File::create(&filename)?;
                let writer = io::BufWriter::new(file);
                serde_json::to_writer_pretty(writer, &records(&corpus))?;
                log::info(format!("Wrote to {}", filename))?;
            }
            Action::Restrict(how) => match select_documents(&corpus)? {
                None => (),
                Some(cs) => restrictions.push((how, cs)),
            },
        }
    }
    cliclack::outro("Bye!")?;
    Ok(())
}
