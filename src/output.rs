//! Data structures for representing the output.

use crate::categories::OCategory;
use crate::dunning::DunningOptions;
use crate::errors::Result;
use crate::tokenize::NormalizationOptions;
use itertools::Itertools;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One word of a comparison.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SignificanceRow {
    pub word: String,
    pub dunning: f64,
    pub count_total: u64,
    pub count_a: u64,
    pub count_b: u64,
    pub freq_total: f64,
    pub freq_a: f64,
    pub freq_b: f64,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct Output {
    pub corpus: String,
    pub label_a: String,
    pub label_b: String,
    pub restrict_a: OCategory,
    pub restrict_b: OCategory,
    pub focus_a: Option<Vec<String>>,
    pub focus_b: Option<Vec<String>>,
    pub window: Option<usize>,
    pub normalization: NormalizationOptions,
    pub dunning: DunningOptions,
    pub documents_a: usize,
    pub documents_b: usize,
    pub total_a: u64,
    pub total_b: u64,
    /// Most distinctive words first.
    pub rows: Vec<SignificanceRow>,
}

#[derive(Serialize)]
pub struct OError {
    pub error: String,
}

const HEADINGS: [&str; 8] = [
    "term",
    "dunning",
    "count_total",
    "count_a",
    "count_b",
    "freq_total",
    "freq_a",
    "freq_b",
];

fn heading(h: &str, label_a: &str, label_b: &str) -> String {
    match h {
        "count_a" => format!("count {label_a}"),
        "count_b" => format!("count {label_b}"),
        "freq_a" => format!("freq {label_a}"),
        "freq_b" => format!("freq {label_b}"),
        _ => h.to_owned(),
    }
}

pub fn freq_string(f: f64) -> String {
    format!("{:.4}%", f * 100.0)
}

fn table_line(row: &SignificanceRow) -> String {
    format!(
        "| {:<18} | {:>16.2} | {:>16} | {:>16} | {:>16} | {:>16} | {:>16} | {:>16} |",
        row.word,
        row.dunning,
        row.count_total,
        row.count_a,
        row.count_b,
        freq_string(row.freq_total),
        freq_string(row.freq_a),
        freq_string(row.freq_b),
    )
}

fn table<'a>(
    title: &str,
    output: &Output,
    rows: impl Iterator<Item = &'a SignificanceRow>,
) -> String {
    let header = HEADINGS
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = heading(h, &output.label_a, &output.label_b);
            if i == 0 {
                format!(" {h:<18} ")
            } else {
                format!(" {h:>16} ")
            }
        })
        .join("|");
    let header = format!("|{header}|");
    let mut lines = vec![
        format!("Dunning log-likelihood results for {title}"),
        header.clone(),
        "-".repeat(header.chars().count()),
    ];
    lines.extend(rows.map(table_line));
    lines.join("\n")
}

/// The `n` most distinctive words of each side as plain-text tables.
pub fn display_table(output: &Output, n: usize) -> String {
    let a = output.rows.iter().filter(|r| r.dunning > 0.0).take(n);
    let b = output.rows.iter().filter(|r| r.dunning < 0.0).take(n);
    [
        table(&output.label_a, output, a),
        table(&output.label_b, output, b),
    ]
    .join("\n\n")
}

/// Write all rows to a single worksheet.
pub fn write_xlsx(output: &Output, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("dunning")?;
    for (col, h) in HEADINGS.iter().enumerate() {
        let h = heading(h, &output.label_a, &output.label_b);
        sheet.write_string_with_format(0, col as u16, &h, &bold)?;
    }
    for (i, row) in output.rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.word)?;
        sheet.write_number(r, 1, row.dunning)?;
        sheet.write_number(r, 2, row.count_total as f64)?;
        sheet.write_number(r, 3, row.count_a as f64)?;
        sheet.write_number(r, 4, row.count_b as f64)?;
        sheet.write_number(r, 5, row.freq_total)?;
        sheet.write_number(r, 6, row.freq_a)?;
        sheet.write_number(r, 7, row.freq_b)?;
    }
    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(word: &str, dunning: f64) -> SignificanceRow {
        SignificanceRow {
            word: word.to_owned(),
            dunning,
            count_total: 3,
            count_a: 2,
            count_b: 1,
            freq_total: 0.001,
            freq_a: 0.002,
            freq_b: 0.0005,
        }
    }

    fn output() -> Output {
        Output {
            corpus: "test".to_owned(),
            label_a: "she".to_owned(),
            label_b: "he".to_owned(),
            restrict_a: None,
            restrict_b: None,
            focus_a: Some(vec!["she".to_owned()]),
            focus_b: Some(vec!["he".to_owned()]),
            window: None,
            normalization: NormalizationOptions::default(),
            dunning: DunningOptions::default(),
            documents_a: 1,
            documents_b: 1,
            total_a: 1000,
            total_b: 2000,
            rows: vec![row("wept", 12.5), row("laughed", -8.25), row("sat", 1.0)],
        }
    }

    #[test]
    fn freq_string_basic() {
        assert_eq!(freq_string(0.0025), "0.2500%");
    }

    #[test]
    fn display_both_sides() {
        let s = display_table(&output(), 1);
        assert!(s.contains("Dunning log-likelihood results for she"));
        assert!(s.contains("Dunning log-likelihood results for he"));
        assert!(s.contains("count she"));
        assert!(s.contains("wept"));
        assert!(s.contains("laughed"));
        assert!(s.contains("-8.25"));
        assert!(!s.contains("sat"));
    }

    #[test]
    fn xlsx_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_xlsx(&output(), &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
