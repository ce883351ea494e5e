// src/core/mod.rs

/// Data structures passed between the resolver, prober, classifier and reporter.
pub mod models;

/// Typed errors for per-target failures, fatal input errors and the fingerprint feed.
pub mod errors;

/// The fingerprint table mapping CNAME targets to hosting services.
pub mod knowledge_base;

/// Turns an HTTP outcome and CNAME into a classified result.
pub mod classifier;

/// DNS and HTTP probing plus the bounded batch scheduler.
pub mod scanner;
