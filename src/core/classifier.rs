// src/core/classifier.rs

use crate::app::RunConfig;
use crate::core::knowledge_base::FingerprintRegistry;
use crate::core::models::{Classification, CnameRecord, HttpOutcome, ProbeResult, UNKNOWN_SERVICE};
use tracing::debug;

/// The status code that marks a subdomain as a takeover candidate.
pub const TAKEOVER_STATUS: u16 = 404;

/// Decides the primary classification from the HTTP status alone.
///
/// A 404 is always a takeover candidate, whether or not a CNAME exists.
/// Any other status is healthy, or suppressed when healthy results are hidden.
pub fn classify_status(status: u16, hide_healthy: bool) -> Classification {
    if status == TAKEOVER_STATUS {
        Classification::TakeoverCandidate
    } else if hide_healthy {
        Classification::Suppressed
    } else {
        Classification::Healthy
    }
}

/// Builds the `ProbeResult` for one subdomain.
///
/// The service is looked up against the CNAME target when there is one,
/// otherwise against the subdomain itself.
pub fn classify(
    subdomain: &str,
    outcome: HttpOutcome,
    cname: Option<CnameRecord>,
    registry: &FingerprintRegistry,
    cfg: &RunConfig,
) -> ProbeResult {
    let lookup_on = cname.as_ref().map(CnameRecord::target).unwrap_or(subdomain);
    let (matched_key, service) = match registry.lookup_match(lookup_on) {
        Some((key, service)) => (Some(key.to_string()), service.to_string()),
        None => (None, UNKNOWN_SERVICE.to_string()),
    };
    let classification = classify_status(outcome.status, cfg.hide_healthy);
    debug!(subdomain, status = outcome.status, %classification, service = %service, "Classified.");

    ProbeResult {
        subdomain: subdomain.to_string(),
        outcome,
        cname,
        service,
        matched_key,
        classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::NO_CNAME;

    fn outcome(status: u16) -> HttpOutcome {
        HttpOutcome { url: "http://a.example.com".into(), status, reason: None }
    }

    fn cname(target: &str) -> Option<CnameRecord> {
        CnameRecord::new(vec![target.to_string()])
    }

    #[test]
    fn not_found_is_always_a_candidate() {
        let registry = FingerprintRegistry::builtin();
        for hide in [false, true] {
            let cfg = RunConfig { hide_healthy: hide, ..RunConfig::default() };
            for record in [None, cname("ghost.github.io."), cname("unmatched.example.net")] {
                let r = classify("a.example.com", outcome(404), record, &registry, &cfg);
                assert_eq!(r.classification, Classification::TakeoverCandidate);
            }
        }
    }

    #[test]
    fn other_statuses_follow_hide_flag() {
        assert_eq!(classify_status(200, false), Classification::Healthy);
        assert_eq!(classify_status(500, false), Classification::Healthy);
        assert_eq!(classify_status(200, true), Classification::Suppressed);
        assert_eq!(classify_status(301, true), Classification::Suppressed);
    }

    #[test]
    fn service_comes_from_cname_target() {
        let registry = FingerprintRegistry::builtin();
        let cfg = RunConfig::default();
        let r = classify("a.example.com", outcome(404), cname("ghost-project.github.io."), &registry, &cfg);
        assert_eq!(r.service, "GitHub Pages");
        assert_eq!(r.matched_key.as_deref(), Some("github.io"));
    }

    #[test]
    fn service_comes_from_the_last_hop() {
        let registry = FingerprintRegistry::builtin();
        let chain = CnameRecord::new(vec!["x.herokudns.com".into(), "ghost-project.github.io".into()]);
        let r = classify("a.example.com", outcome(404), chain, &registry, &RunConfig::default());
        assert_eq!(r.service, "GitHub Pages");
        assert_eq!(r.cname_display(), "a.example.com -> ghost-project.github.io");
    }

    #[test]
    fn service_falls_back_to_hostname() {
        let registry = FingerprintRegistry::builtin();
        let cfg = RunConfig::default();
        let r = classify("shop.myapp.herokuapp.com", outcome(200), None, &registry, &cfg);
        assert_eq!(r.service, "Heroku");

        let r = classify("b.example.com", outcome(200), None, &registry, &cfg);
        assert_eq!(r.service, UNKNOWN_SERVICE);
        assert_eq!(r.cname_display(), NO_CNAME);
        assert_eq!(r.classification, Classification::Healthy);
    }
}
