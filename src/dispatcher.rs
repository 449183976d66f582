//! Endpoint dispatch.
//!
//! Selects the endpoint a request is served by, then applies the endpoint's
//! auth, delay and status policy.

use crate::config::{EndpointDefinition, HttpMethod, Project, ResponseType, MAX_DELAY_MS};
use crate::error::MockError;
use crate::matcher::{PathParams, PathTemplate};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Status codes an endpoint may respond with.
pub const KNOWN_STATUSES: &[u16] = &[
    200, 201, 202, 204, 400, 401, 403, 404, 409, 422, 429, 500, 502, 503,
];

pub fn is_known_status(status: u16) -> bool {
    KNOWN_STATUSES.contains(&status)
}

/// Parse a stored status code.
pub fn parse_status(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}

/// The endpoint chosen for a request.
#[derive(Debug)]
pub struct Selection<'a> {
    pub endpoint: &'a EndpointDefinition,
    pub params: PathParams,
}

/// Pattern for the single-item route of an endpoint: its path joined with
/// its parameter path. A root path leaves just the bare parameter.
fn item_pattern(endpoint: &EndpointDefinition) -> Option<PathTemplate> {
    if endpoint.response_type != ResponseType::Single {
        return None;
    }
    let param = endpoint.parameter_path.as_deref()?;
    let base = endpoint.path.trim_end_matches('/');
    if base.ends_with(&format!("/{}", param)) {
        // Path already spells out the parameter; the full match covers it.
        return None;
    }
    Some(PathTemplate::parse(&format!("{}/{}", base, param)))
}

/// Select the endpoint serving `method` + `path`.
///
/// Candidates are tried in enumeration order. For each, the single-item
/// route is tried before the endpoint's own path. The first match wins.
pub fn select<'a>(
    method: HttpMethod,
    path: &str,
    endpoints: &'a [EndpointDefinition],
) -> Option<Selection<'a>> {
    for endpoint in endpoints.iter().filter(|e| e.method == method) {
        if let Some(params) = item_pattern(endpoint).and_then(|t| t.matches(path)) {
            return Some(Selection { endpoint, params });
        }
        if let Some(params) = PathTemplate::parse(&endpoint.path).matches(path) {
            return Some(Selection { endpoint, params });
        }
    }
    None
}

/// Check the API key when the endpoint requires one.
///
/// Keys of both the endpoint and its project are accepted. Header names are
/// compared case-insensitively.
pub fn authorize(
    endpoint: &EndpointDefinition,
    project: &Project,
    headers: &HashMap<String, String>,
    header_name: &str,
) -> Result<(), MockError> {
    if !endpoint.require_auth {
        return Ok(());
    }

    let key = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(header_name))
        .map(|(_, v)| v.as_str())
        .ok_or_else(|| MockError::Unauthorized(format!("missing {} header", header_name)))?;

    let accepted = endpoint
        .api_keys
        .iter()
        .chain(project.api_keys.iter())
        .any(|k| k == key);

    if accepted {
        Ok(())
    } else {
        Err(MockError::Unauthorized("invalid API key".to_string()))
    }
}

/// Wait out the endpoint's configured delay.
///
/// The wait is a timer, not a blocked thread; dropping the future abandons it.
pub async fn apply_delay(endpoint: &EndpointDefinition) {
    let delay_ms = endpoint.delay.min(MAX_DELAY_MS);
    if delay_ms > 0 {
        debug!(path = %endpoint.path, delay_ms, "Applying delay");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// The endpoint's response status, if it is one we serve.
pub fn response_status(endpoint: &EndpointDefinition) -> Result<u16, MockError> {
    parse_status(&endpoint.response_http_status)
        .filter(|s| is_known_status(*s))
        .ok_or_else(|| MockError::MisconfiguredStatusCode {
            path: endpoint.path.clone(),
            status: endpoint.response_http_status.clone(),
        })
}
