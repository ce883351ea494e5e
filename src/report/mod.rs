// src/report/mod.rs

//! Rendering of probe results: a colorized console block per result and an
//! optional output file, both fed from the same result stream.

pub mod console;
pub mod sink;

use std::io::{self, Write};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info};

use crate::app::RunConfig;
use crate::core::errors::InputError;
use crate::core::models::{Classification, ProbeEvent, ReportSummary};
use self::console::ConsoleStyle;
use self::sink::OutputSink;

/// The single consumer of probe events.
///
/// Because only the reporter writes, a result's console block and its sink
/// entry are never interleaved with another result's.
pub struct Reporter {
    console: Box<dyn Write + Send>,
    sink: Option<OutputSink>,
    style: ConsoleStyle,
}

impl Reporter {
    pub fn new(console: Box<dyn Write + Send>, sink: Option<OutputSink>, style: ConsoleStyle) -> Self {
        Self { console, sink, style }
    }

    /// A reporter on stdout, with the output file from `cfg` if one was given.
    pub fn from_config(cfg: &RunConfig, color: bool) -> Result<Self, InputError> {
        let sink = cfg.output.as_deref().map(OutputSink::create).transpose()?;
        Ok(Self::new(Box::new(io::stdout()), sink, ConsoleStyle::from_config(cfg, color)))
    }

    /// Prints a one-off notice, e.g. a degraded fingerprint feed.
    pub fn notice(&mut self, message: &str) -> Result<(), InputError> {
        console::write_notice(&mut *self.console, message, &self.style)?;
        Ok(())
    }

    /// Drains the channel until every sender is gone, then finalizes the sink.
    pub async fn run(mut self, mut rx: Receiver<ProbeEvent>) -> Result<ReportSummary, InputError> {
        let mut summary = ReportSummary::default();
        while let Some(event) = rx.recv().await {
            self.emit(event, &mut summary)?;
        }
        debug!("Result stream closed.");
        self.finalize(summary)
    }

    fn emit(&mut self, event: ProbeEvent, summary: &mut ReportSummary) -> Result<(), InputError> {
        match event {
            ProbeEvent::Finding(result) => {
                match result.classification {
                    Classification::TakeoverCandidate => summary.takeovers += 1,
                    _ => summary.healthy += 1,
                }
                console::write_block(&mut *self.console, &result, &self.style)?;
                if let Some(sink) = self.sink.as_mut() {
                    sink.write(&result)?;
                    summary.written = sink.written();
                }
            }
            ProbeEvent::Failure { subdomain, error } => {
                summary.errors += 1;
                if !self.style.hide_errors {
                    console::write_error(&mut *self.console, &subdomain, &error, &self.style)?;
                }
            }
        }
        Ok(())
    }

    fn finalize(mut self, mut summary: ReportSummary) -> Result<ReportSummary, InputError> {
        if let Some(sink) = self.sink.take() {
            summary.written = sink.finish()?;
        }
        console::write_summary(&mut *self.console, &summary, &self.style)?;
        self.console.flush()?;
        info!(
            takeovers = summary.takeovers,
            healthy = summary.healthy,
            errors = summary.errors,
            written = summary.written,
            "Report finalized."
        );
        Ok(summary)
    }
}
