// src/core/knowledge_base.rs

//! The fingerprint knowledge base.
//! A compiled-in table maps CNAME target substrings to the hosting service behind
//! them. At startup it can be extended with the community feed published by
//! can-i-take-over-xyz. After loading, the registry is only ever read.

use crate::core::errors::FeedError;
use crate::core::models::UNKNOWN_SERVICE;
use crate::core::scanner::http_scanner::USER_AGENT;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Community-maintained takeover fingerprints.
pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/EdOverflow/can-i-take-over-xyz/master/fingerprints.json";

/// A single compiled-in fingerprint.
pub struct Fingerprint {
    /// Lowercase substring searched for in the CNAME target.
    pub key: &'static str,
    /// Human-readable name of the service.
    pub service: &'static str,
}

const fn fp(key: &'static str, service: &'static str) -> Fingerprint {
    Fingerprint { key, service }
}

/// The static fingerprint table.
static FINGERPRINTS: &[Fingerprint] = &[
    // --- Static hosting & PaaS ---
    fp("github.io", "GitHub Pages"),
    fp("herokuapp.com", "Heroku"),
    fp("herokudns.com", "Heroku DNS"),
    fp("s3.amazonaws.com", "AWS S3"),
    fp("netlify.app", "Netlify"),
    fp("execute-api", "API Gateway"),
    fp("appspot.com", "Google App Engine"),
    fp("wordpress.com", "WordPress"),
    fp("wordpressvip.com", "WordPress VIP"),
    fp("bitbucket.io", "Bitbucket Pages"),
    fp("surge.sh", "Surge.sh"),
    fp("infinityfreeapp.com", "InfinityFree"),
    fp("onrender.com", "Render"),
    fp("web.app", "Firebase Hosting"),
    fp("firebaseapp.com", "Firebase Hosting"),
    fp("gitbook.io", "GitBook"),
    fp("expo.dev", "Expo"),
    fp("glideapp.io", "GlideApps"),
    fp("divshot.io", "Divshot"),
    fp("beanstalkapp.com", "Beanstalk"),
    fp("pages.dev", "Cloudflare Pages"),
    fp("pantheonsite.io", "Pantheon"),
    fp("fly.dev", "Fly.io"),
    fp("azurewebsites.net", "Azure Websites"),
    fp("azurefd.net", "Azure Front Door"),
    fp("streamlitapp.com", "Streamlit"),
    fp("repl.co", "Replit"),
    fp("glitch.me", "Glitch"),
    fp("codesandbox.io", "CodeSandbox"),
    fp("cloudwaysapps.com", "Cloudways"),
    fp("liara.run", "Liara"),
    fp("carrd.co", "Carrd"),
    fp("scalingo.com", "Scalingo"),
    fp("c9users.io", "Cloud9"),
    fp("000webhostapp.com", "000Webhost"),
    fp("deta.dev", "Deta"),
    fp("nexcess.net", "Nexcess"),
    fp("koyeb.app", "Koyeb"),
    fp("vercel.app", "Vercel"),
    // --- Object storage ---
    fp("backblazeb2.com", "Backblaze B2"),
    fp("wasabisys.com", "Wasabi Cloud Storage"),
    fp("scw.cloud", "Scaleway Object Storage"),
    fp("myqcloud.com", "Tencent Cloud COS"),
    fp("cloud-object-storage.appdomain.cloud", "IBM Cloud Object Storage"),
    fp("rackcdn.com", "Rackspace Cloud Files"),
    // --- Site builders & publishing ---
    fp("ghost.io", "Ghost"),
    fp("ghost.org", "Ghost"),
    fp("nationbuilder.com", "NationBuilder"),
    fp("cargocollective.com", "Cargo Collective"),
    fp("format.com", "Format"),
    fp("smugmug.com", "SmugMug"),
    fp("weebly.com", "Weebly"),
    fp("yolasite.com", "Yola"),
    fp("squarespace.com", "Squarespace"),
    fp("websitebuilder.online", "1&1 IONOS"),
    fp("docsify.io", "Docsify"),
    fp("mkdocs.org", "MkDocs"),
    fp("hexo.io", "Hexo"),
    fp("bookstackapp.com", "BookStack"),
    fp("tumblr.com", "Tumblr"),
    fp("basekit.com", "BaseKit"),
    fp("wixsite.com", "Wix"),
    fp("blogspot.com", "Blogger"),
    fp("jimdo.com", "Jimdo"),
    fp("site123.me", "SITE123"),
    fp("webnode.com", "Webnode"),
    fp("ucraft.com", "Ucraft"),
    fp("duda.co", "Duda"),
    fp("strikingly.com", "Strikingly"),
    fp("webflow.io", "Webflow"),
    fp("readymag.com", "Readymag"),
    // --- Support, marketing & SaaS ---
    fp("freshservice.com", "Freshservice"),
    fp("freshdesk.com", "Freshdesk"),
    fp("groovehq.com", "GrooveHQ"),
    fp("kayako.com", "Kayako"),
    fp("livechatinc.com", "LiveChat"),
    fp("ticksy.com", "Ticksy"),
    fp("uservoice.com", "UserVoice"),
    fp("tenderapp.com", "TenderApp"),
    fp("launchrock.com", "LaunchRock"),
    fp("surveymonkey.com", "SurveyMonkey"),
    fp("surveygizmo.com", "SurveyGizmo"),
    fp("formstack.com", "FormStack"),
    fp("jotform.com", "JotForm"),
    fp("formsite.com", "Formsite"),
    fp("trello.com", "Trello"),
    fp("clubhouse.io", "Clubhouse.io"),
    fp("asana.com", "Asana"),
    fp("basecamphq.com", "Basecamp"),
    fp("smartsheet.com", "Smartsheet"),
    fp("monday.com", "Monday.com"),
    fp("unbounce.com", "Unbounce"),
    fp("unbouncepages.com", "Unbounce Page"),
    fp("hubspot.net", "HubSpot"),
    fp("marketo.com", "Marketo"),
    fp("clickfunnels.com", "ClickFunnels"),
    fp("instapage.com", "Instapage"),
    fp("optimizely.com", "Optimizely"),
    fp("hotjar.com", "Hotjar"),
    fp("gitkraken.com", "GitKraken"),
    fp("disqus.com", "Disqus"),
    fp("vanillaforums.com", "Vanilla Forums"),
    fp("muut.com", "Muut"),
    fp("xenforo.com", "XenForo"),
    fp("ecwid.com", "Ecwid"),
    fp("gumroad.com", "Gumroad"),
    fp("lemonstand.com", "LemonStand"),
    fp("payhip.com", "Payhip"),
    fp("mailgun.org", "Mailgun ORG"),
    fp("atlassian.net", "Atlassian"),
    fp("zendesk.com", "Zendesk"),
    fp("helpscoutdocs.com", "HelpScout"),
    fp("intercom.io", "Intercom"),
    fp("statuspage.io", "StatusPage"),
    fp("loggly.com", "Loggly"),
    fp("papertrailapp.com", "Papertrail"),
    fp("datadoghq.com", "Datadog"),
    fp("newrelic.com", "New Relic"),
    fp("rollbar.com", "Rollbar"),
    fp("sentry.io", "Sentry"),
    fp("bugsnag.com", "Bugsnag"),
    fp("raygun.io", "Raygun"),
    fp("zapier.com", "Zapier"),
    fp("slack.com", "Slack"),
    fp("discord.com", "Discord"),
    fp("codepen.io", "CodePen"),
    fp("jsfiddle.net", "JSFiddle"),
    fp("cloudinary.com", "Cloudinary"),
    fp("imgur.com", "Imgur"),
    fp("zoho.com", "Zoho"),
    // --- CDN & edge ---
    fp("cloudfront.net", "Amazon CloudFront"),
    fp("fastly.net", "Fastly CDN"),
    fp("incapdns.net", "Imperva Incapsula"),
    fp("cloudflare.net", "Cloudflare"),
    fp("akamai.net", "Akamai"),
    fp("akamaihd.net", "Akamai HD"),
    fp("edgesuite.net", "Akamai Edge"),
    fp("llnwd.net", "Limelight Networks"),
    fp("netdna-cdn.com", "NetDNA CDN"),
    fp("stackpathdns.com", "StackPath"),
    fp("stackpathcdn.com", "StackPath CDN"),
    fp("cdn77.com", "CDN77"),
    fp("cachefly.net", "CacheFly"),
    fp("edgecastcdn.net", "EdgeCast"),
    fp("maxcdn.com", "MaxCDN"),
    fp("cdn.jsdelivr.net", "jsDelivr"),
    fp("unpkg.com", "unpkg"),
    fp("keycdn.com", "KeyCDN"),
    fp("cotcdn.net", "Cotendo CDN"),
];

/// One record of the remote feed. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRecord {
    #[serde(default)]
    pub cname: Vec<String>,
    #[serde(default)]
    pub service: String,
}

/// Lowercases a CNAME key and strips its trailing dot.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().trim_end_matches('.').to_lowercase()
}

/// Mapping from CNAME substring to service name.
///
/// Keys are unique; inserting an existing key replaces its service.
#[derive(Debug, Clone)]
pub struct FingerprintRegistry {
    entries: HashMap<String, String>,
}

impl Default for FingerprintRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FingerprintRegistry {
    /// A registry holding only the compiled-in table.
    pub fn builtin() -> Self {
        let entries = FINGERPRINTS
            .iter()
            .map(|f| (f.key.to_string(), f.service.to_string()))
            .collect();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts one fingerprint. Empty keys or services are ignored.
    pub fn insert(&mut self, key: &str, service: &str) -> bool {
        let key = normalize_key(key);
        let service = service.trim();
        if key.is_empty() || service.is_empty() {
            return false;
        }
        self.entries.insert(key, service.to_string());
        true
    }

    /// Merges feed records, overwriting existing keys. Returns how many keys were written.
    pub fn merge(&mut self, records: &[FeedRecord]) -> usize {
        let mut merged = 0;
        for record in records {
            for cname in &record.cname {
                if self.insert(cname, &record.service) {
                    merged += 1;
                }
            }
        }
        merged
    }

    /// Fetches the remote feed and merges it.
    ///
    /// Any failure is logged and leaves the registry exactly as it was.
    pub async fn load(&mut self, client: &reqwest::Client, url: &str) -> Result<usize, FeedError> {
        info!(url, "Loading external fingerprints.");
        let records = match fetch_feed(client, url).await {
            Ok(records) => records,
            Err(e) => {
                warn!(url, error = %e, "Fingerprint feed unavailable, using built-in table only.");
                return Err(e);
            }
        };
        let merged = self.merge(&records);
        info!(records = records.len(), merged, total = self.len(), "External fingerprints merged.");
        Ok(merged)
    }

    /// Service name for a CNAME target or hostname, or "Unknown".
    pub fn lookup(&self, candidate: &str) -> &str {
        self.lookup_match(candidate)
            .map(|(_, service)| service)
            .unwrap_or(UNKNOWN_SERVICE)
    }

    /// The matching key together with its service.
    ///
    /// Matching is a case-insensitive substring test. When several keys match,
    /// the longest key wins, ties broken by key order.
    pub fn lookup_match(&self, candidate: &str) -> Option<(&str, &str)> {
        let candidate = candidate.trim_end_matches('.').to_lowercase();
        let found = self
            .entries
            .iter()
            .filter(|(key, _)| candidate.contains(key.as_str()))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(key, service)| (key.as_str(), service.as_str()));
        debug!(candidate = %candidate, matched = ?found.map(|(k, _)| k), "Fingerprint lookup.");
        found
    }
}

/// The client used to download the feed.
///
/// Certificates are always verified here; `--ssl` only applies to probes.
pub fn feed_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    feed_client_builder(timeout).build()
}

fn feed_client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder().user_agent(USER_AGENT).timeout(timeout)
}

async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<FeedRecord>, FeedError> {
    let response = client.get(url).send().await.map_err(FeedError::Fetch)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }
    response.json::<Vec<FeedRecord>>().await.map_err(FeedError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keys_are_normalized() {
        for f in FINGERPRINTS {
            assert_eq!(f.key, normalize_key(f.key), "key {} is not normalized", f.key);
        }
    }

    #[test]
    fn feed_client_verifies_certificates() {
        let builder = format!("{:?}", feed_client_builder(Duration::from_secs(5)));
        assert!(!builder.contains("danger_accept_invalid_certs"));
        assert!(feed_client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = FingerprintRegistry::builtin();
        assert_eq!(registry.lookup("FOO.GITHUB.IO"), registry.lookup("foo.github.io"));
        assert_eq!(registry.lookup("foo.github.io"), "GitHub Pages");
    }

    #[test]
    fn unmatched_candidate_is_unknown() {
        let registry = FingerprintRegistry::builtin();
        assert_eq!(registry.lookup("intranet.example.org"), UNKNOWN_SERVICE);
        assert!(registry.lookup_match("intranet.example.org").is_none());
    }

    #[test]
    fn longest_key_wins() {
        let registry = FingerprintRegistry::builtin();
        // "github.io" and "herokudns.com" both occur in the target.
        assert_eq!(
            registry.lookup_match("docs.github.io.herokudns.com"),
            Some(("herokudns.com", "Heroku DNS"))
        );

        let mut registry = FingerprintRegistry::empty();
        registry.insert("pages.example", "Short");
        registry.insert("static.pages.example", "Long");
        registry.insert("aaaa.example", "First");
        registry.insert("bbbb.example", "Second");
        assert_eq!(registry.lookup("x.static.pages.example"), "Long");
        assert_eq!(registry.lookup("aaaa.example.bbbb.example"), "First");
    }

    #[test]
    fn merge_overwrites_static_entries() {
        let mut registry = FingerprintRegistry::builtin();
        let before = registry.len();
        let merged = registry.merge(&[FeedRecord {
            cname: vec!["HerokuApp.com.".into(), "".into(), "newhost.example".into()],
            service: "Heroku (feed)".into(),
        }]);
        assert_eq!(merged, 2);
        assert_eq!(registry.len(), before + 1);
        assert_eq!(registry.lookup("app.herokuapp.com"), "Heroku (feed)");
        assert_eq!(registry.lookup("x.newhost.example"), "Heroku (feed)");
    }

    #[test]
    fn records_without_service_are_skipped() {
        let mut registry = FingerprintRegistry::empty();
        let merged = registry.merge(&[FeedRecord { cname: vec!["a.example".into()], service: " ".into() }]);
        assert_eq!(merged, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn feed_record_ignores_extra_fields() {
        let raw = r#"[{"cicd_pass": true, "cname": ["github.io"], "fingerprint": "There isn't a GitHub Pages site here.", "service": "Github", "status": "Edge case", "vulnerable": false}, {"service": "Agile CRM", "nxdomain": false}]"#;
        let records: Vec<FeedRecord> = serde_json::from_str(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cname, vec!["github.io".to_string()]);
        assert!(records[1].cname.is_empty());
    }
}
