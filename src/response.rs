//! Response shape checks, separated from transport so probe outcomes can
//! be classified offline.
//!
//! The upstream contract is undocumented, so bodies are probed as generic
//! JSON rather than deserialized into fixed structs: a response counts as
//! accepted when its top-level data record carries a route identifier and
//! a non-empty stop/route list.

use serde_json::Value;

/// Keys under which the server has been observed to return the route id.
const ROUTE_ID_KEYS: [&str; 2] = ["routeName", "routeId"];

/// Keys under which the nested stop/route list may appear.
const LIST_KEYS: [&str; 2] = ["stops", "routes"];

/// Raw payloads kept on non-success outcomes are capped at this many
/// characters so the CSV log stays readable.
const RAW_SNIPPET_LEN: usize = 512;

/// What one probe observed in the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyVerdict {
    /// Expected data record with a non-empty stop/route list; `sample` is
    /// the first entry as compact JSON.
    Accepted { sample: String },
    /// Valid JSON, but the expected fields are absent.
    UnexpectedShape { raw: String },
    /// The body did not parse as JSON at all.
    NotJson { raw: String },
}

/// Classifies a response body against the expected success shape.
pub fn classify_body(body: &str) -> BodyVerdict {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return BodyVerdict::NotJson {
            raw: snippet(body),
        };
    };

    let data = &json["data"];
    if !data.is_object() {
        return BodyVerdict::UnexpectedShape {
            raw: snippet(body),
        };
    }

    let has_route_id = ROUTE_ID_KEYS
        .iter()
        .any(|key| data[key].is_string() || data[key].is_number());

    let entries = LIST_KEYS
        .iter()
        .find_map(|key| data[key].as_array())
        .filter(|list| !list.is_empty());

    match (has_route_id, entries) {
        (true, Some(list)) => BodyVerdict::Accepted {
            sample: list[0].to_string(),
        },
        _ => BodyVerdict::UnexpectedShape {
            raw: snippet(body),
        },
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(RAW_SNIPPET_LEN).collect()
}
