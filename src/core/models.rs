// src/core/models.rs

use serde::{Deserialize, Serialize};
use strum::Display;

/// Display value used when a subdomain has no CNAME record.
pub const NO_CNAME: &str = "No CNAME record found";

/// Service label used when no fingerprint matches.
pub const UNKNOWN_SERVICE: &str = "Unknown";

// --- DNS resolution ---

/// The CNAME chain found for a hostname, in resolution order.
///
/// The last element is the canonical target. Trailing dots are already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnameRecord {
    pub chain: Vec<String>,
}

impl CnameRecord {
    pub fn new(chain: Vec<String>) -> Option<Self> {
        let chain: Vec<String> = chain
            .into_iter()
            .map(|name| name.trim_end_matches('.').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if chain.is_empty() { None } else { Some(Self { chain }) }
    }

    /// The final name the chain resolves to.
    pub fn target(&self) -> &str {
        // `new` never builds an empty chain.
        self.chain.last().map(String::as_str).unwrap_or_default()
    }
}

// --- HTTP outcome ---

/// What came back from the single GET issued for a subdomain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    pub url: String,
    pub status: u16,
    pub reason: Option<String>,
}

impl HttpOutcome {
    /// "404 Not Found", or just "599" for codes without a canonical reason.
    pub fn status_line(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }
}

// --- Classification ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Classification {
    #[strum(to_string = "Takeover Candidate")]
    TakeoverCandidate,
    Healthy,
    Suppressed,
}

/// A classified probe, immutable once built by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub subdomain: String,
    pub outcome: HttpOutcome,
    pub cname: Option<CnameRecord>,
    pub service: String,
    /// Fingerprint key that produced `service`, if any.
    pub matched_key: Option<String>,
    pub classification: Classification,
}

impl ProbeResult {
    pub fn http_status(&self) -> u16 {
        self.outcome.status
    }

    pub fn has_cname(&self) -> bool {
        self.cname.is_some()
    }

    /// "source -> target", or the no-record sentinel.
    pub fn cname_display(&self) -> String {
        match &self.cname {
            Some(record) => format!("{} -> {}", self.subdomain, record.target()),
            None => NO_CNAME.to_string(),
        }
    }

    /// The summary written to output sinks.
    ///
    /// Takeover candidates read `Potential Takeover - <service>`, everything
    /// else `<code> <reason> - <service>`. Both carry the service so a text
    /// sink line is useful on its own.
    pub fn status_summary(&self) -> String {
        match self.classification {
            Classification::TakeoverCandidate => format!("Potential Takeover - {}", self.service),
            _ => format!("{} - {}", self.outcome.status_line(), self.service),
        }
    }

    pub fn to_record(&self) -> OutputRecord {
        OutputRecord {
            subdomain: self.subdomain.clone(),
            status: self.status_summary(),
            cname: self.cname.as_ref().map(|_| self.cname_display()),
        }
    }
}

/// Shape of one entry in the JSON output array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputRecord {
    pub subdomain: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cname: Option<String>,
}

// --- Events sent to the reporter ---

/// Everything a probe task can hand to the reporter.
#[derive(Debug)]
pub enum ProbeEvent {
    Finding(ProbeResult),
    Failure { subdomain: String, error: String },
}

/// Counters returned once the reporter has drained the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub takeovers: usize,
    pub healthy: usize,
    pub errors: usize,
    pub written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: u16, cname: Option<CnameRecord>, classification: Classification) -> ProbeResult {
        ProbeResult {
            subdomain: "a.example.com".into(),
            outcome: HttpOutcome {
                url: "http://a.example.com".into(),
                status,
                reason: reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map(String::from),
            },
            cname,
            service: "GitHub Pages".into(),
            matched_key: None,
            classification,
        }
    }

    #[test]
    fn cname_record_strips_trailing_dots() {
        let record = CnameRecord::new(vec!["x.herokudns.com.".into(), "ghost.github.io.".into()]).unwrap();
        assert_eq!(record.target(), "ghost.github.io");
        assert!(CnameRecord::new(vec![".".into()]).is_none());
    }

    #[test]
    fn summary_embeds_code_and_service() {
        let r = result(200, None, Classification::Healthy);
        assert_eq!(r.status_summary(), "200 OK - GitHub Pages");
        assert_eq!(r.cname_display(), NO_CNAME);
        assert_eq!(r.to_record().cname, None);
    }

    #[test]
    fn classification_labels() {
        let labels: Vec<String> = [Classification::TakeoverCandidate, Classification::Healthy, Classification::Suppressed]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, vec!["Takeover Candidate", "Healthy", "Suppressed"]);
    }

    #[test]
    fn takeover_record_keeps_cname() {
        let cname = CnameRecord::new(vec!["ghost-project.github.io.".into()]);
        let r = result(404, cname, Classification::TakeoverCandidate);
        let record = r.to_record();
        assert_eq!(record.status, "Potential Takeover - GitHub Pages");
        assert_eq!(record.cname.as_deref(), Some("a.example.com -> ghost-project.github.io"));
    }
}
