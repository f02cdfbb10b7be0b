//! The experiment matrix: a fixed, explicit list of named parameter
//! variants, driven strictly in sequence through the probe executor.
//!
//! The true contract (field ordering, whether `request_id` or a particular
//! device tag is required) is unknown; no variant is privileged as
//! "correct", no variant is retried, and no outcome gates later variants.

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::info;

use crate::canonical::{KeyOrder, ParameterSet};
use crate::config::ProbeConfig;
use crate::probe::{HttpClient, ProbeResult, run_probe};

/// Base parameters of one route lookup.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub route_name: String,
    pub direction: String,
    pub language: String,
    pub device: String,
}

impl RouteQuery {
    pub fn new(route_name: &str, direction: &str) -> Self {
        Self {
            route_name: route_name.to_string(),
            direction: direction.to_string(),
            language: "zh-tw".to_string(),
            device: "web".to_string(),
        }
    }

    /// The base ParameterSet in the order the official client sends it.
    pub fn to_params(&self) -> Result<ParameterSet> {
        ParameterSet::from_pairs(&[
            ("routeName", &self.route_name),
            ("dir", &self.direction),
            ("lang", &self.language),
            ("device", &self.device),
        ])
    }
}

/// One named experiment: a parameter set under an ordering mode.
#[derive(Debug, Clone)]
pub struct Variant {
    pub label: String,
    pub params: ParameterSet,
    pub order: KeyOrder,
}

impl Variant {
    fn new(label: &str, params: ParameterSet, order: KeyOrder) -> Self {
        Self {
            label: label.to_string(),
            params,
            order,
        }
    }
}

/// The standard hypothesis set for `query`:
/// base parameters in insertion order, the same sorted, base plus a
/// `request_id` from full-precision local time, and an alternate device
/// flag. `now` feeds only the request_id value; each probe still takes its
/// own wall-clock reading when it runs.
pub fn default_variants(query: &RouteQuery, now: DateTime<Local>) -> Result<Vec<Variant>> {
    let base = query.to_params()?;

    let mut with_request_id = base.clone();
    with_request_id.push("request_id", &now.format("%Y%m%d%H%M%S%3f").to_string())?;

    let alt_device = RouteQuery {
        device: "app".to_string(),
        ..query.clone()
    };

    Ok(vec![
        Variant::new("base-insertion", base.clone(), KeyOrder::Insertion),
        Variant::new("base-sorted", base, KeyOrder::Sorted),
        Variant::new("with-request-id", with_request_id, KeyOrder::Insertion),
        Variant::new("device-app", alt_device.to_params()?, KeyOrder::Insertion),
    ])
}

/// Drives every variant through the executor, one at a time.
///
/// The network call is the only suspension point; probe N+1 never starts
/// before probe N has resolved. `clock` supplies the single wall-clock
/// reading for each probe, so runs are reproducible under test. Always
/// returns exactly one result per variant, in variant order.
pub async fn run_matrix<C, F>(
    client: &C,
    cfg: &ProbeConfig,
    variants: Vec<Variant>,
    mut clock: F,
) -> Vec<ProbeResult>
where
    C: HttpClient,
    F: FnMut() -> DateTime<Local>,
{
    let mut results = Vec::with_capacity(variants.len());

    for variant in variants {
        info!(label = %variant.label, order = ?variant.order, "Running probe");
        let now = clock();
        let result = run_probe(
            client,
            cfg,
            &variant.label,
            &variant.params,
            variant.order,
            now,
        )
        .await;
        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 8, 7, 12, 34, 56).unwrap()
    }

    #[test]
    fn test_default_variants_cover_the_hypothesis_set() {
        let query = RouteQuery::new("33", "0");
        let variants = default_variants(&query, fixed_now()).unwrap();

        let labels: Vec<&str> = variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(
            labels,
            ["base-insertion", "base-sorted", "with-request-id", "device-app"]
        );
    }

    #[test]
    fn test_request_id_uses_full_precision_local_time() {
        let query = RouteQuery::new("33", "0");
        let variants = default_variants(&query, fixed_now()).unwrap();

        let with_id = &variants[2];
        let (key, value) = with_id.params.pairs().last().unwrap();
        assert_eq!(key, "request_id");
        assert!(value.starts_with("20250807123456"));
        assert_eq!(value.len(), "20250807123456".len() + 3);
    }

    #[test]
    fn test_alternate_device_variant_swaps_flag_only() {
        let query = RouteQuery::new("33", "0");
        let variants = default_variants(&query, fixed_now()).unwrap();

        let device = variants[3]
            .params
            .pairs()
            .iter()
            .find(|(k, _)| k == "device")
            .map(|(_, v)| v.as_str());
        assert_eq!(device, Some("app"));

        let route = variants[3]
            .params
            .pairs()
            .iter()
            .find(|(k, _)| k == "routeName")
            .map(|(_, v)| v.as_str());
        assert_eq!(route, Some("33"));
    }
}
