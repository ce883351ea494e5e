// src/bin/urlsample.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::path::PathBuf;

use cname_hunter::logging;
use cname_hunter::sampler::{self, SampleFormat, SampleOptions, SortMode};

#[derive(Debug, Parser)]
#[command(name = "urlsample", version)]
#[command(about = "Select a limited number of URLs per domain from a file")]
struct Args {
    /// Input file path
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output file path
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Number of URLs per domain
    #[arg(short = 'n', long = "num", default_value_t = 1)]
    num: usize,

    /// Search string to filter URLs
    #[arg(short = 's', long = "string")]
    string: Option<String>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = SampleFormat::Txt)]
    format: SampleFormat,

    /// Output sorting mode
    #[arg(short = 't', long = "sort", value_enum)]
    sort: Option<SortMode>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Err(e) = logging::initialize_logging(env!("CARGO_BIN_NAME")) {
        eprintln!("Logging disabled: {e}");
    }

    let raw = sampler::read_input(&args.input).wrap_err("could not read URL list")?;
    let opts = SampleOptions {
        per_host: args.num,
        needle: args.string.filter(|s| !s.is_empty()),
        sort: args.sort,
    };
    let selected = sampler::select_urls(&raw, &opts);
    sampler::write_urls(&args.output, args.format, &selected).wrap_err("could not write output")?;

    println!("Selected {} URLs saved to '{}'.", selected.len(), args.output.display());
    Ok(())
}
