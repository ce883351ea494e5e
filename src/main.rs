// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{info, warn};

use cname_hunter::app::{Cli, RunConfig};
use cname_hunter::core::knowledge_base::{FingerprintRegistry, feed_client};
use cname_hunter::core::scanner::dns_scanner::SystemCnameResolver;
use cname_hunter::core::scanner::http_scanner::HttpProber;
use cname_hunter::core::scanner::{ProbeContext, run_batch};
use cname_hunter::logging;
use cname_hunter::report::Reporter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = RunConfig::from(Cli::parse());

    if let Err(e) = logging::initialize_logging(env!("CARGO_BIN_NAME")) {
        eprintln!("Logging disabled: {e}");
    }
    info!(?config, "Starting run.");

    // Input problems abort before anything touches the network.
    let targets = config.load_targets().wrap_err("could not load targets")?;
    let mut reporter =
        Reporter::from_config(&config, std::io::stdout().is_terminal()).wrap_err("could not open output")?;

    let prober = HttpProber::new(&config).wrap_err("could not build HTTP client")?;

    // The registry is complete before the first probe and read-only afterwards.
    let mut registry = FingerprintRegistry::builtin();
    if let Some(url) = config.feed_url.as_deref() {
        let client = feed_client(config.timeout).wrap_err("could not build HTTP client")?;
        if let Err(e) = registry.load(&client, url).await {
            warn!(error = %e, "Continuing with built-in fingerprints.");
            reporter.notice(&format!("{e} (using {} built-in fingerprints)", registry.len()))?;
        }
    }

    let config = Arc::new(config);
    let ctx = Arc::new(ProbeContext {
        resolver: Arc::new(SystemCnameResolver::new(config.timeout)),
        registry: Arc::new(registry),
        prober,
        config,
    });

    let summary = run_batch(ctx, targets, reporter).await.wrap_err("could not write results")?;
    info!(?summary, "Run finished.");
    Ok(())
}
