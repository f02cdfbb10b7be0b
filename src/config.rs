//! Probe endpoint configuration.
//!
//! The live endpoint is deliberately not baked in: the upstream contract is
//! undocumented and may move, so everything needed to impersonate the
//! official web client comes from the environment, with browser-consistent
//! defaults derived from the endpoint URL.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::token::SpliceRecipe;

/// User-agent sent with every probe, matching a current desktop browser.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Header name the official client uses for the derived token.
const DEFAULT_TOKEN_HEADER: &str = "Token";

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Everything one probe needs to reach and impersonate the live service.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub endpoint: String,
    pub origin: String,
    pub referer: String,
    pub token_header: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub recipe: SpliceRecipe,
}

impl ProbeConfig {
    /// Builds a config for `endpoint` with defaults derived from its URL:
    /// `Origin` is the endpoint's scheme://host[:port] and `Referer` is the
    /// origin root, matching what a browser sends from the official site.
    pub fn for_endpoint(endpoint: &str) -> Result<Self> {
        let url: reqwest::Url = endpoint
            .parse()
            .with_context(|| format!("invalid endpoint URL '{endpoint}'"))?;
        let host = url
            .host_str()
            .with_context(|| format!("endpoint URL '{endpoint}' has no host"))?;

        let mut origin = format!("{}://{}", url.scheme(), host);
        if let Some(port) = url.port() {
            origin.push_str(&format!(":{port}"));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            referer: format!("{origin}/"),
            origin,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            recipe: SpliceRecipe::default(),
        })
    }

    /// Reads the config from the environment. `BUS_API_ENDPOINT` is
    /// required; the remaining variables override the derived defaults.
    pub fn from_env() -> Result<Self> {
        let endpoint =
            std::env::var("BUS_API_ENDPOINT").context("BUS_API_ENDPOINT must be set")?;
        let mut cfg = Self::for_endpoint(&endpoint)?;

        if let Ok(origin) = std::env::var("BUS_API_ORIGIN") {
            cfg.origin = origin;
        }
        if let Ok(referer) = std::env::var("BUS_API_REFERER") {
            cfg.referer = referer;
        }
        if let Ok(header) = std::env::var("BUS_API_TOKEN_HEADER") {
            cfg.token_header = header;
        }
        if let Ok(agent) = std::env::var("BUS_API_USER_AGENT") {
            cfg.user_agent = agent;
        }
        if let Ok(secs) = std::env::var("BUS_API_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .context("BUS_API_TIMEOUT_SECS must be a whole number of seconds")?;
            cfg.timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }
}
