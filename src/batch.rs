// Offline batch analysis: pull comments out of txt/csv/pdf files, analyze
// them in parallel and aggregate the results into a report.
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;

use crate::analyzer::Analyzer;

const ALLOWED_EXTS: [&str; 3] = ["txt", "csv", "pdf"];
const COMMENT_HEADERS: [&str; 4] = ["comment", "text", "feedback", "suggestion"];
pub const ERROR_LABEL: &str = "Error";

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentReport {
    pub filename: String,
    pub text: String,
    pub sentiment: String,
    pub confidence: f32,
    pub summary: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub sentiment_counts: BTreeMap<String, usize>,
    pub dominant_sentiment: String,
    pub top_keyword: String,
    pub comments: Vec<CommentReport>,
}

fn is_allowed(p: &Path) -> bool {
    p.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ALLOWED_EXTS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expands directories and keeps only supported file types.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| is_allowed(e.path()))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            files.extend(found);
        } else if is_allowed(path) {
            files.push(path.clone());
        } else {
            warn!("skipping unsupported file {}", path.display());
        }
    }
    files
}

fn read_text_file(p: &Path) -> Result<String> {
    let mut s = String::new();
    let mut f = File::open(p)?;
    f.read_to_string(&mut s)?;
    Ok(s)
}

pub fn read_file_content(p: &Path) -> Result<String> {
    let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
    if ext.eq_ignore_ascii_case("pdf") {
        pdf_extract::extract_text(p).map_err(|e| anyhow!("PDF extraction failed: {}", e))
    } else {
        read_text_file(p)
    }
}

/// CSV files yield one comment per row; text and PDF files are one comment.
pub fn extract_comments(p: &Path) -> Result<Vec<String>> {
    let content =
        read_file_content(p).with_context(|| format!("could not extract text from {}", p.display()))?;
    let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
    let comments = if ext.eq_ignore_ascii_case("csv") {
        parse_csv_comments(&content)
    } else {
        vec![content]
    };
    Ok(comments
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .collect())
}

/// Picks the comment column from the header row, falling back to the first
/// column, and returns its non-empty cells.
pub fn parse_csv_comments(content: &str) -> Vec<String> {
    let rows: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();
    let Some((header, data_rows)) = rows.split_first() else {
        return Vec::new();
    };

    let columns: Vec<String> = header
        .to_lowercase()
        .split(',')
        .map(|h| h.trim().replace('"', ""))
        .collect();
    let comment_index = COMMENT_HEADERS
        .iter()
        .find_map(|wanted| columns.iter().position(|col| col.contains(wanted)))
        .unwrap_or(0);

    data_rows
        .iter()
        .filter_map(|row| {
            split_csv_row(row)
                .into_iter()
                .nth(comment_index)
                .map(|cell| cell.trim().trim_matches('"').to_string())
        })
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Splits on commas that are not inside double quotes. Quotes are kept.
fn split_csv_row(row: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in row.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(&row[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    cells.push(&row[start..]);
    cells
}

pub fn load_comments(files: &[PathBuf]) -> Vec<Comment> {
    let mut comments = Vec::new();
    for file in files {
        let filename = file
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file.to_string_lossy().to_string());
        match extract_comments(file) {
            Ok(texts) => comments.extend(texts.into_iter().map(|text| Comment {
                filename: filename.clone(),
                text,
            })),
            Err(e) => warn!("{:#}", e),
        }
    }
    comments
}

pub fn analyze_comments(analyzer: &Analyzer, comments: &[Comment], pb: &ProgressBar) -> BatchReport {
    let rows: Vec<CommentReport> = comments
        .par_iter()
        .map(|comment| {
            let row = match analyzer.analyze(&comment.text) {
                Ok(analysis) => CommentReport {
                    filename: comment.filename.clone(),
                    text: comment.text.clone(),
                    sentiment: analysis.sentiment,
                    confidence: analysis.confidence,
                    summary: analysis.summary,
                    keywords: analysis.keywords,
                },
                Err(e) => {
                    warn!("failed to process comment from {}: {:#}", comment.filename, e);
                    CommentReport {
                        filename: comment.filename.clone(),
                        text: comment.text.clone(),
                        sentiment: ERROR_LABEL.to_string(),
                        confidence: 0.0,
                        summary: "Failed to analyze.".to_string(),
                        keywords: Vec::new(),
                    }
                }
            };
            pb.inc(1);
            row
        })
        .collect();

    aggregate(rows)
}

pub fn aggregate(rows: Vec<CommentReport>) -> BatchReport {
    let mut sentiment_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut keyword_counts: HashMap<String, usize> = HashMap::new();
    let mut keyword_order: Vec<String> = Vec::new();

    for row in &rows {
        *sentiment_counts.entry(row.sentiment.clone()).or_insert(0) += 1;
        for keyword in &row.keywords {
            let k = keyword.to_lowercase();
            let count = keyword_counts.entry(k.clone()).or_insert(0);
            if *count == 0 {
                keyword_order.push(k);
            }
            *count += 1;
        }
    }

    let dominant_sentiment = dominant_label(&sentiment_counts);

    let mut top_keyword = String::from("N/A");
    let mut best = 0;
    // Ties go to the keyword seen last.
    for k in keyword_order {
        let count = keyword_counts[&k];
        if count >= best {
            best = count;
            top_keyword = k;
        }
    }

    BatchReport {
        total: rows.len(),
        sentiment_counts,
        dominant_sentiment,
        top_keyword,
        comments: rows,
    }
}

/// Most frequent label other than errors; a tie or no results is "Neutral".
fn dominant_label(counts: &BTreeMap<String, usize>) -> String {
    let mut ranked: Vec<(&String, &usize)> =
        counts.iter().filter(|(label, _)| *label != ERROR_LABEL).collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    match ranked.as_slice() {
        [] => "Neutral".to_string(),
        [(_, a), (_, b), ..] if a == b => "Neutral".to_string(),
        [(label, _), ..] => label.to_string(),
    }
}

pub fn run_batch(analyzer: &Analyzer, paths: &[PathBuf], out: Option<&Path>) -> Result<BatchReport> {
    let files = collect_files(paths);
    let comments = load_comments(&files);
    if comments.is_empty() {
        return Err(anyhow!("No valid comments found in the given files."));
    }
    info!("analyzing {} comments from {} files", comments.len(), files.len());

    let pb = ProgressBar::new(comments.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    let report = analyze_comments(analyzer, &comments, &pb);
    pb.finish_with_message("comments analyzed");

    if let Some(out) = out {
        let fout = File::create(out)?;
        serde_json::to_writer_pretty(fout, &report)?;
        println!("Wrote report to {}", out.display());
    }
    Ok(report)
}

fn label_color(label: &str) -> Option<Color> {
    let upper = label.to_uppercase();
    if upper.starts_with("POS") {
        Some(Color::Green)
    } else if upper.starts_with("NEG") {
        Some(Color::Red)
    } else if label == ERROR_LABEL {
        Some(Color::Yellow)
    } else {
        None
    }
}

pub fn print_summary(report: &BatchReport) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    writeln!(stdout, "Total comments: {}", report.total)?;
    for (label, count) in &report.sentiment_counts {
        stdout.set_color(ColorSpec::new().set_fg(label_color(label)))?;
        write!(stdout, "  {}", label)?;
        stdout.reset()?;
        writeln!(stdout, ": {}", count)?;
    }

    write!(stdout, "Overall sentiment: ")?;
    stdout.set_color(
        ColorSpec::new()
            .set_fg(label_color(&report.dominant_sentiment))
            .set_bold(true),
    )?;
    writeln!(stdout, "{}", report.dominant_sentiment)?;
    stdout.reset()?;
    writeln!(stdout, "Top keyword: {}", report.top_keyword)?;
    Ok(())
}
