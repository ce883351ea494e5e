// src/lib.rs

//! Subdomain takeover probing.
//!
//! Each target is resolved for a CNAME and fetched once over HTTP. A 404 from a
//! subdomain marks it as a takeover candidate, and the CNAME target is matched
//! against a fingerprint table to name the service it points at.

pub mod app;
pub mod core;
pub mod logging;
pub mod report;
pub mod sampler;
