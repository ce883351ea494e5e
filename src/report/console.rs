// src/report/console.rs

use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

use crate::app::RunConfig;
use crate::core::models::{Classification, ProbeResult, ReportSummary};

const RULE: &str = "--------------------------------------------------";

/// How result blocks are rendered on the console.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleStyle {
    pub color: bool,
    pub annotate_dead_records: bool,
    pub verbose_cname: bool,
    pub hide_errors: bool,
}

impl ConsoleStyle {
    pub fn from_config(cfg: &RunConfig, color: bool) -> Self {
        Self {
            color,
            annotate_dead_records: cfg.annotate_dead_records,
            verbose_cname: cfg.verbose_cname,
            hide_errors: cfg.hide_errors,
        }
    }

    fn paint(&self, out: &mut dyn Write, color: Color, line: &str) -> io::Result<()> {
        if self.color {
            writeln!(out, "{}", line.with(color))
        } else {
            writeln!(out, "{line}")
        }
    }
}

/// The lines of one result block, without the surrounding rules.
pub fn block_lines(result: &ProbeResult, style: &ConsoleStyle) -> Vec<String> {
    let mut lines = vec![
        format!("Subdomain: {}", result.subdomain),
        format!("URL:       {}", result.outcome.url),
        format!("Status:    {}", result.outcome.status_line()),
        format!("CNAME:     {}", result.cname_display()),
        format!("Service:   {}", result.service),
    ];

    if style.annotate_dead_records {
        let note = match (result.classification, result.has_cname()) {
            (Classification::TakeoverCandidate, true) => "dead record with live CNAME",
            (Classification::TakeoverCandidate, false) => "dead record, no CNAME",
            (_, true) => "live record with CNAME",
            (_, false) => "live record, no CNAME",
        };
        lines.push(format!("Record:    {note}"));
    }

    if style.verbose_cname {
        let chain = match &result.cname {
            Some(record) => std::iter::once(result.subdomain.as_str())
                .chain(record.chain.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" -> "),
            None => "none".to_string(),
        };
        lines.push(format!("Chain:     {chain}"));
        lines.push(format!("Matched:   {}", result.matched_key.as_deref().unwrap_or("no fingerprint")));
    }
    lines
}

/// Writes one result as a block: red for takeover candidates, green otherwise.
pub fn write_block(out: &mut dyn Write, result: &ProbeResult, style: &ConsoleStyle) -> io::Result<()> {
    let color = match result.classification {
        Classification::TakeoverCandidate => Color::Red,
        _ => Color::Green,
    };
    style.paint(out, color, RULE)?;
    for line in block_lines(result, style) {
        style.paint(out, color, &line)?;
    }
    style.paint(out, color, RULE)
}

pub fn write_error(out: &mut dyn Write, subdomain: &str, error: &str, style: &ConsoleStyle) -> io::Result<()> {
    style.paint(out, Color::Red, &format!("[ERROR] {subdomain} - {error}"))
}

pub fn write_notice(out: &mut dyn Write, message: &str, style: &ConsoleStyle) -> io::Result<()> {
    style.paint(out, Color::Yellow, message)
}

pub fn write_summary(out: &mut dyn Write, summary: &ReportSummary, style: &ConsoleStyle) -> io::Result<()> {
    let line = format!(
        "Done: {} potential takeover(s), {} healthy, {} error(s), {} written to output.",
        summary.takeovers, summary.healthy, summary.errors, summary.written
    );
    style.paint(out, Color::Cyan, &line)
}
