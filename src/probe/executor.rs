//! Single-probe execution: derive a token, send one signed request, and
//! record whatever happened.

use anyhow::Result;
use chrono::{DateTime, Local};
use reqwest::Request;
use reqwest::header::{CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use serde::Serialize;
use tracing::{debug, warn};

use crate::canonical::{KeyOrder, ParameterSet, canonical_query};
use crate::config::ProbeConfig;
use crate::probe::HttpClient;
use crate::response::{BodyVerdict, classify_body};
use crate::token::derive_token;

/// Outcome of one probe. Append-only: one record per executed variant,
/// never an unhandled fault.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub label: String,
    pub order: KeyOrder,
    /// Raw hash input, kept for manual comparison across variants.
    pub canonical: String,
    pub token: String,
    /// HTTP status, absent when the request never completed.
    pub status: Option<u16>,
    pub success: bool,
    /// First stop/route entry from an accepted response, compact JSON.
    pub sample: Option<String>,
    pub error: Option<String>,
}

impl ProbeResult {
    fn new(label: &str, order: KeyOrder, canonical: String, token: String) -> Self {
        Self {
            label: label.to_string(),
            order,
            canonical,
            token,
            status: None,
            success: false,
            sample: None,
            error: None,
        }
    }

    fn with_error(mut self, status: Option<u16>, error: String) -> Self {
        self.status = status;
        self.error = Some(error);
        self
    }
}

/// Runs one probe: token derived from `now` (the probe's single wall-clock
/// reading, injected by the caller), request signed and sent, outcome
/// recorded. Success means HTTP 200 with the expected data record and a
/// non-empty stop/route list; everything else is a non-success result with
/// a descriptive reason.
pub async fn run_probe<C: HttpClient>(
    client: &C,
    cfg: &ProbeConfig,
    label: &str,
    params: &ParameterSet,
    order: KeyOrder,
    now: DateTime<Local>,
) -> ProbeResult {
    let canonical = canonical_query(params, order);
    let token = derive_token(&canonical, now, &cfg.recipe);
    debug!(label, canonical = %canonical, token = %token, "Probe prepared");

    let result = ProbeResult::new(label, order, canonical, token.clone());

    let req = match build_request(cfg, params, &token) {
        Ok(req) => req,
        Err(e) => {
            warn!(label, error = %e, "Probe request could not be built");
            return result.with_error(None, format!("request build failed: {e}"));
        }
    };

    let resp = match client.execute(req).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(label, error = %e, "Probe transport failed");
            return result.with_error(None, e.to_string());
        }
    };

    let status = resp.status().as_u16();
    let body = match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            return result.with_error(Some(status), format!("body read failed: {e}"));
        }
    };

    if status != 200 {
        return result.with_error(
            Some(status),
            format!("HTTP {status}: {}", body.chars().take(120).collect::<String>()),
        );
    }

    match classify_body(&body) {
        BodyVerdict::Accepted { sample } => {
            let mut result = result;
            result.status = Some(status);
            result.success = true;
            result.sample = Some(sample);
            result
        }
        BodyVerdict::UnexpectedShape { raw } => {
            result.with_error(Some(status), format!("unexpected response shape: {raw}"))
        }
        BodyVerdict::NotJson { raw } => {
            result.with_error(Some(status), format!("non-JSON response: {raw}"))
        }
    }
}

/// Builds the signed POST. The body is a percent-encoded form built from
/// the ParameterSet, independent of the raw canonical hash input.
fn build_request(cfg: &ProbeConfig, params: &ParameterSet, token: &str) -> Result<Request> {
    let form: Vec<(&str, &str)> = params
        .pairs()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let req = reqwest::Client::new()
        .post(&cfg.endpoint)
        .form(&form)
        // .form() sets the bare mime type; the official client sends the
        // charset suffix, so override after.
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=UTF-8")
        .header(cfg.token_header.as_str(), token)
        .header(USER_AGENT, cfg.user_agent.as_str())
        .header(ORIGIN, cfg.origin.as_str())
        .header(REFERER, cfg.referer.as_str())
        .timeout(cfg.timeout)
        .build()?;

    Ok(req)
}
