// src/app.rs

use crate::core::errors::InputError;
use crate::core::knowledge_base::DEFAULT_FEED_URL;
use crate::report::sink::OutputFormat;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(name = "cname-hunter", version)]
#[command(about = "Probe subdomains for dangling CNAME records pointing at claimable services.")]
pub struct Cli {
    /// Test a single domain
    #[arg(short = 'u', long = "url", value_name = "DOMAIN", conflicts_with = "list", required_unless_present = "list")]
    pub url: Option<String>,

    /// File with one subdomain per line
    #[arg(short = 'l', long = "list", value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Maximum number of probes in flight
    #[arg(short = 't', long = "threads", default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    pub threads: u32,

    /// Per-request timeout in seconds
    #[arg(long = "time", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Output file; a .json suffix writes a JSON array, anything else plain text
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Accept invalid TLS certificates
    #[arg(long = "ssl")]
    pub ssl: bool,

    /// Probe over HTTPS instead of HTTP
    #[arg(long = "https")]
    pub https: bool,

    /// Skip the CNAME gate and probe every target (probing is already unconditional)
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Annotate results with whether a CNAME record was present
    #[arg(short = 'm', long = "dead-records")]
    pub dead_records: bool,

    /// Hide healthy subdomains from the console and the output file
    #[arg(long = "hide")]
    pub hide: bool,

    /// Print the full CNAME chain and the fingerprint that matched
    #[arg(long = "cname")]
    pub cname: bool,

    /// Hide transport errors and failed requests
    #[arg(long = "error")]
    pub error: bool,

    /// Fingerprint feed to merge into the built-in table
    #[arg(long = "fingerprints", value_name = "URL", default_value = DEFAULT_FEED_URL)]
    pub fingerprints: String,

    /// Do not fetch the fingerprint feed
    #[arg(long = "no-remote")]
    pub no_remote: bool,
}

/// Where the targets come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    Single(String),
    List(PathBuf),
}

/// Every user-tunable setting for one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: TargetSource,
    pub use_https: bool,
    pub concurrency: usize,
    pub timeout: Duration,
    pub output: Option<PathBuf>,
    pub skip_tls_verify: bool,
    pub probe_all: bool,
    pub annotate_dead_records: bool,
    pub hide_healthy: bool,
    pub verbose_cname: bool,
    pub hide_errors: bool,
    pub feed_url: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: TargetSource::List(PathBuf::new()),
            use_https: false,
            concurrency: 100,
            timeout: Duration::from_secs(30),
            output: None,
            skip_tls_verify: false,
            probe_all: false,
            annotate_dead_records: false,
            hide_healthy: false,
            verbose_cname: false,
            hide_errors: false,
            feed_url: None,
        }
    }
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        let source = match (cli.url, cli.list) {
            (Some(url), _) => TargetSource::Single(url),
            (None, Some(list)) => TargetSource::List(list),
            // clap enforces one of the two.
            (None, None) => TargetSource::Single(String::new()),
        };
        Self {
            source,
            use_https: cli.https,
            concurrency: cli.threads as usize,
            timeout: Duration::from_secs(cli.timeout),
            output: cli.output,
            skip_tls_verify: cli.ssl,
            probe_all: cli.all,
            annotate_dead_records: cli.dead_records,
            hide_healthy: cli.hide,
            verbose_cname: cli.cname,
            hide_errors: cli.error,
            feed_url: (!cli.no_remote).then_some(cli.fingerprints),
        }
    }
}

impl RunConfig {
    pub fn scheme(&self) -> &'static str {
        if self.use_https { "https" } else { "http" }
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output.as_deref().map(OutputFormat::from_path)
    }

    /// Materializes the full target list.
    ///
    /// An empty list is not an error: the run still finalizes its output, so a
    /// JSON sink ends up holding `[]`.
    pub fn load_targets(&self) -> Result<Vec<String>, InputError> {
        let targets = match &self.source {
            TargetSource::Single(target) => parse_targets(target),
            TargetSource::List(path) => read_targets(path)?,
        };
        if targets.is_empty() {
            warn!(source = ?self.source, "No targets to probe.");
        }
        info!(count = targets.len(), "Targets loaded.");
        Ok(targets)
    }
}

/// Trims every line and drops the empty ones.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn read_targets(path: &Path) -> Result<Vec<String>, InputError> {
    debug!(path = %path.display(), "Reading target list.");
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::ReadTargets {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_targets(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_cli_defaults() {
        let cfg = RunConfig::from(Cli::parse_from(["cname-hunter", "-u", "a.example.com"]));
        assert_eq!(cfg.source, TargetSource::Single("a.example.com".into()));
        assert_eq!(cfg.concurrency, 100);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.scheme(), "http");
        assert_eq!(cfg.feed_url.as_deref(), Some(DEFAULT_FEED_URL));
        assert!(cfg.output_format().is_none());
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::parse_from([
            "cname-hunter", "-l", "subs.txt", "-t", "5", "--time", "3", "-o", "out.JSON",
            "--ssl", "--https", "-a", "-m", "--hide", "--cname", "--error", "--no-remote",
        ]);
        let cfg = RunConfig::from(cli);
        assert_eq!(cfg.source, TargetSource::List("subs.txt".into()));
        assert_eq!(cfg.concurrency, 5);
        assert_eq!(cfg.timeout, Duration::from_secs(3));
        assert_eq!(cfg.scheme(), "https");
        assert_eq!(cfg.output_format(), Some(OutputFormat::Json));
        assert!(cfg.skip_tls_verify && cfg.probe_all && cfg.annotate_dead_records);
        assert!(cfg.hide_healthy && cfg.verbose_cname && cfg.hide_errors);
        assert!(cfg.feed_url.is_none());
    }

    #[test]
    fn url_and_list_are_exclusive_and_one_is_required() {
        assert!(Cli::try_parse_from(["cname-hunter"]).is_err());
        assert!(Cli::try_parse_from(["cname-hunter", "-u", "a", "-l", "b"]).is_err());
        assert!(Cli::try_parse_from(["cname-hunter", "-u", "a", "-t", "0"]).is_err());
    }

    #[test]
    fn list_lines_are_trimmed_and_blank_lines_dropped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  a.example.com  \n\n\tb.example.com\n   ").unwrap();
        let cfg = RunConfig { source: TargetSource::List(file.path().to_path_buf()), ..RunConfig::default() };
        assert_eq!(cfg.load_targets().unwrap(), vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn missing_list_is_fatal() {
        let cfg = RunConfig {
            source: TargetSource::List("/definitely/not/here.txt".into()),
            ..RunConfig::default()
        };
        assert!(matches!(cfg.load_targets(), Err(InputError::ReadTargets { .. })));
    }

    #[test]
    fn blank_target_sources_give_an_empty_batch() {
        let cfg = RunConfig { source: TargetSource::Single("   ".into()), ..RunConfig::default() };
        assert!(cfg.load_targets().unwrap().is_empty());

        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = RunConfig { source: TargetSource::List(file.path().to_path_buf()), ..RunConfig::default() };
        assert!(cfg.load_targets().unwrap().is_empty());
    }
}
