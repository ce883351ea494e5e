// src/core/scanner/mod.rs

pub mod dns_scanner;
pub mod http_scanner;

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::app::RunConfig;
use crate::core::classifier::classify;
use crate::core::errors::InputError;
use crate::core::knowledge_base::FingerprintRegistry;
use crate::core::models::{Classification, ProbeEvent, ReportSummary};
use crate::report::Reporter;
use self::dns_scanner::CnameResolver;
use self::http_scanner::HttpProber;

/// Everything a probe task needs, built once before the batch starts.
pub struct ProbeContext {
    pub config: Arc<RunConfig>,
    pub registry: Arc<FingerprintRegistry>,
    pub resolver: Arc<dyn CnameResolver>,
    pub prober: HttpProber,
}

/// Probes every target and streams the results through `reporter`.
///
/// One task is spawned per target, but only after a slot of the admission gate
/// (sized to `concurrency`) has been acquired, so at most `concurrency` tasks
/// are in their network phase at any time. The slot is released as soon as the
/// DNS and HTTP work is done; classification and reporting happen outside it.
///
/// The reporter is the single consumer of the result channel, which keeps
/// each result's console block and sink entry together.
///
/// # Returns
/// The reporter's summary once every task has finished and the channel has drained.
pub async fn run_batch(
    ctx: Arc<ProbeContext>,
    targets: Vec<String>,
    reporter: Reporter,
) -> Result<ReportSummary, InputError> {
    let total = targets.len();
    info!(targets = total, concurrency = ctx.config.concurrency, "Starting batch.");
    if ctx.config.probe_all {
        debug!("--all given; every target is probed regardless.");
    }

    let (tx, rx) = mpsc::channel::<ProbeEvent>(total.max(1));
    let gate = Arc::new(Semaphore::new(ctx.config.concurrency.max(1)));

    let producer = async move {
        let mut tasks = JoinSet::new();
        for target in targets {
            let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
                break;
            };
            let ctx = Arc::clone(&ctx);
            let tx = tx.clone();
            tasks.spawn(async move {
                if let Some(event) = probe_target(&ctx, &target, permit).await {
                    // The reporter only goes away early on a write error.
                    let _ = tx.send(event).await;
                }
            });
        }
        drop(tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Probe task failed.");
            }
        }
        debug!("All probe tasks finished.");
    };

    let (summary, ()) = tokio::join!(reporter.run(rx), producer);
    summary
}

/// Resolves, probes and classifies one target.
///
/// Returns `None` when the result is suppressed.
async fn probe_target(ctx: &ProbeContext, target: &str, permit: OwnedSemaphorePermit) -> Option<ProbeEvent> {
    let (cname, outcome) = tokio::join!(ctx.resolver.resolve_cname(target), ctx.prober.probe(target));
    drop(permit);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            return Some(ProbeEvent::Failure {
                subdomain: target.to_string(),
                error: e.to_string(),
            });
        }
    };

    let result = classify(target, outcome, cname, &ctx.registry, &ctx.config);
    if result.classification == Classification::Suppressed {
        debug!(subdomain = target, "Healthy result suppressed.");
        return None;
    }
    Some(ProbeEvent::Finding(result))
}
