// src/sampler.rs

//! Caps a URL corpus to a few URLs per host.

use clap::ValueEnum;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use strum::Display;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("error opening file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error creating file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("error encoding JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("error writing output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum SampleFormat {
    #[default]
    Txt,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum SortMode {
    Alphabetical,
    Random,
}

#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub per_host: usize,
    pub needle: Option<String>,
    pub sort: Option<SortMode>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self { per_host: 1, needle: None, sort: None }
    }
}

#[derive(Debug, Serialize)]
struct UrlEntry<'a> {
    #[serde(rename = "URL")]
    url: &'a str,
}

fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw).ok()?.host_str().map(str::to_string)
}

/// Keeps at most `per_host` URLs per host, hosts in first-seen order.
pub fn select_urls(raw: &str, opts: &SampleOptions) -> Vec<String> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<String>> = Vec::new();

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(needle) = opts.needle.as_deref() {
            if !line.contains(needle) {
                continue;
            }
        }
        let Some(host) = host_of(line) else {
            debug!(line, "Skipping line without a host.");
            continue;
        };
        let slot = *index.entry(host).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        if groups[slot].len() < opts.per_host {
            groups[slot].push(line.to_string());
        }
    }

    let mut selected: Vec<String> = groups.into_iter().flatten().collect();
    match opts.sort {
        Some(SortMode::Alphabetical) => selected.sort(),
        Some(SortMode::Random) => selected.shuffle(&mut rand::rng()),
        None => {}
    }
    info!(hosts = index.len(), selected = selected.len(), "URLs selected.");
    selected
}

pub fn read_input(path: &Path) -> Result<String, SampleError> {
    std::fs::read_to_string(path).map_err(|source| SampleError::Read { path: path.to_path_buf(), source })
}

pub fn write_urls(path: &Path, format: SampleFormat, urls: &[String]) -> Result<(), SampleError> {
    let file = File::create(path).map_err(|source| SampleError::Create { path: path.to_path_buf(), source })?;
    let mut out = BufWriter::new(file);

    match format {
        SampleFormat::Txt => {
            for url in urls {
                writeln!(out, "{url}")?;
            }
        }
        SampleFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            writer.write_record(["URL"])?;
            for url in urls {
                writer.write_record([url])?;
            }
            writer.flush()?;
        }
        SampleFormat::Json => {
            let entries: Vec<UrlEntry> = urls.iter().map(|url| UrlEntry { url }).collect();
            serde_json::to_writer_pretty(&mut out, &entries)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    debug!(path = %path.display(), %format, count = urls.len(), "Sample written.");
    Ok(())
}
