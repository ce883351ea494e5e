// src/core/scanner/dns_scanner.rs

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::system_conf::read_system_conf;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::models::CnameRecord;

/// Longest CNAME chain followed before giving up.
pub const MAX_CNAME_HOPS: usize = 8;

/// Anything that can answer "what does this hostname CNAME to?".
///
/// Resolution failures are never errors here: NXDOMAIN, a missing record or a
/// timeout all mean "no CNAME".
#[async_trait]
pub trait CnameResolver: Send + Sync {
    async fn resolve_cname(&self, hostname: &str) -> Option<CnameRecord>;
}

/// CNAME lookups through the host's resolver configuration.
pub struct SystemCnameResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl SystemCnameResolver {
    /// Builds a resolver from the system configuration, bounded by `timeout`.
    ///
    /// Falls back to hickory's default upstreams if the system configuration
    /// cannot be read.
    pub fn new(timeout: Duration) -> Self {
        let (config, opts) = match read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!(error = %e, "Could not read system resolver configuration, using defaults.");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self::with_config(config, opts, timeout)
    }

    /// Builds a resolver against explicit upstreams.
    ///
    /// `timeout` bounds each query and the whole chain walk.
    pub fn with_config(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> Self {
        opts.timeout = timeout;
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    /// One CNAME query. hickory does not chase CNAMEs for CNAME queries, so
    /// this returns a single hop.
    async fn next_hop(&self, name: String) -> Option<String> {
        match self.resolver.lookup(name.as_str(), RecordType::CNAME).await {
            Ok(lookup) => lookup.iter().find_map(|rdata| match rdata {
                RData::CNAME(cname) => Some(cname.0.to_utf8()),
                _ => None,
            }),
            Err(e) => {
                debug!(name = %name, error = %e, "No CNAME record.");
                None
            }
        }
    }
}

#[async_trait]
impl CnameResolver for SystemCnameResolver {
    async fn resolve_cname(&self, hostname: &str) -> Option<CnameRecord> {
        let host = dns_name(hostname);
        debug!(host, "Looking up CNAME chain.");

        // The resolver retries per upstream and the walk takes several queries,
        // so bound the whole thing as well.
        let chain = match tokio::time::timeout(self.timeout, follow_chain(host, |name| self.next_hop(name))).await {
            Ok(chain) => chain,
            Err(_) => {
                warn!(host, timeout = ?self.timeout, "CNAME lookup timed out.");
                return None;
            }
        };

        let record = CnameRecord::new(chain);
        debug!(
            host,
            hops = record.as_ref().map_or(0, |r| r.chain.len()),
            cname = ?record.as_ref().map(CnameRecord::target),
            "CNAME lookup finished."
        );
        record
    }
}

/// Walks CNAME hops starting at `host`.
///
/// Stops at the first name without a CNAME, on a name already seen, or after
/// `MAX_CNAME_HOPS` hops. Returned names are lowercase without trailing dots.
async fn follow_chain<F, Fut>(host: &str, mut next_hop: F) -> Vec<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let origin = host.trim_end_matches('.').to_ascii_lowercase();
    let mut chain: Vec<String> = Vec::new();
    let mut current = origin.clone();

    while chain.len() < MAX_CNAME_HOPS {
        let Some(next) = next_hop(current).await else {
            break;
        };
        let next = next.trim_end_matches('.').to_ascii_lowercase();
        if next.is_empty() || next == origin || chain.contains(&next) {
            warn!(host, cname = %next, "CNAME loop detected.");
            break;
        }
        chain.push(next.clone());
        current = next;
    }
    if chain.len() == MAX_CNAME_HOPS {
        debug!(host, "CNAME chain truncated.");
    }
    chain
}

/// The DNS name part of a target, without any `:port` suffix.
pub fn dns_name(hostname: &str) -> &str {
    match hostname.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => host,
        _ => hostname,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::config::NameServerConfigGroup;
    use hickory_resolver::proto::op::{Message, MessageType, OpCode};
    use hickory_resolver::proto::rr::rdata::CNAME;
    use hickory_resolver::proto::rr::{Name, Record};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::time::Instant;
    use tokio::net::UdpSocket;

    /// A UDP name server that answers CNAME queries from `records` and
    /// returns an empty answer for every other name.
    async fn spawn_name_server(records: &'static [(&'static str, &'static str)]) -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                let Ok(query) = Message::from_vec(&buf[..len]) else {
                    continue;
                };
                let mut reply = Message::new();
                reply
                    .set_id(query.id())
                    .set_message_type(MessageType::Response)
                    .set_op_code(OpCode::Query)
                    .set_recursion_desired(query.recursion_desired())
                    .set_recursion_available(true)
                    .add_queries(query.queries().to_vec());
                for q in query.queries() {
                    let asked = q.name().to_utf8();
                    let asked = asked.trim_end_matches('.');
                    if let Some((_, target)) = records.iter().find(|(name, _)| asked.eq_ignore_ascii_case(name)) {
                        let rdata = RData::CNAME(CNAME(Name::from_ascii(target).unwrap()));
                        reply.add_answer(Record::from_rdata(q.name().clone(), 60, rdata));
                    }
                }
                let _ = socket.send_to(&reply.to_vec().unwrap(), peer).await;
            }
        });
        addr
    }

    fn resolver_for(addr: SocketAddr, timeout: Duration) -> SystemCnameResolver {
        let config =
            ResolverConfig::from_parts(None, vec![], NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true));
        let mut opts = ResolverOpts::default();
        opts.attempts = 1;
        SystemCnameResolver::with_config(config, opts, timeout)
    }

    #[test]
    fn dns_name_drops_port() {
        assert_eq!(dns_name("a.example.com:8080"), "a.example.com");
        assert_eq!(dns_name("a.example.com"), "a.example.com");
        assert_eq!(dns_name("a.example.com:http"), "a.example.com:http");
    }

    #[tokio::test]
    async fn chain_walk_stops_on_loops_and_hop_cap() {
        let table: HashMap<&str, &str> =
            [("a.example.com", "b.example.com."), ("b.example.com", "A.example.com.")].into_iter().collect();
        let chain = follow_chain("a.example.com", |name: String| {
            let hop = table.get(name.as_str()).map(|t| t.to_string());
            async move { hop }
        })
        .await;
        assert_eq!(chain, vec!["b.example.com"]);

        let chain = follow_chain("h0.example.com", |name: String| {
            let n: usize = name[1..name.find('.').unwrap()].parse().unwrap();
            async move { Some(format!("h{}.example.com", n + 1)) }
        })
        .await;
        assert_eq!(chain.len(), MAX_CNAME_HOPS);
        assert_eq!(chain.last().map(String::as_str), Some("h8.example.com"));
    }

    #[tokio::test]
    async fn follows_every_hop_to_the_canonical_target() {
        static RECORDS: &[(&str, &str)] = &[
            ("a.example.com", "x.herokudns.com."),
            ("x.herokudns.com", "ghost-project.github.io."),
        ];
        let addr = spawn_name_server(RECORDS).await;
        let resolver = resolver_for(addr, Duration::from_secs(2));

        let record = resolver.resolve_cname("a.example.com:8080").await.unwrap();
        assert_eq!(record.chain, vec!["x.herokudns.com", "ghost-project.github.io"]);
        assert_eq!(record.target(), "ghost-project.github.io");

        assert!(resolver.resolve_cname("plain.example.com").await.is_none());
    }

    #[tokio::test]
    async fn silent_upstream_is_bounded_by_the_timeout() {
        // Bound but never read, so every query goes unanswered.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let resolver = resolver_for(silent.local_addr().unwrap(), Duration::from_millis(300));

        let started = Instant::now();
        assert!(resolver.resolve_cname("slow.example.com").await.is_none());
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }
}
