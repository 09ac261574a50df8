/// Overpass Client Module
///
/// This module handles all interactions with the Overpass API, the read-only
/// query interface to OpenStreetMap data. It renders Overpass QL for a
/// bounding box and a set of tag filters, submits it, and decodes the JSON
/// result set.
use reqwest::StatusCode;
use std::fmt::Write as _;
use std::time::Duration;

use crate::config::{BoundingBox, OverpassConfig, TagFilter};
use crate::models::OverpassResponse;

/// Errors raised by the Overpass API
#[derive(Debug, thiserror::Error)]
pub enum OverpassError {
    #[error("Overpass rejected the query: {0}")]
    BadRequest(String),

    #[error("Overpass rate limit reached (too many requests)")]
    TooManyRequests,

    #[error("Overpass gateway timeout, server is probably too busy")]
    GatewayTimeout,

    #[error("Unexpected Overpass response status: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("Overpass runtime error: {0}")]
    Runtime(String),

    #[error("HTTP request to Overpass failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode Overpass response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A node query over one bounding box, unioned across tag filters
#[derive(Debug, Clone)]
pub struct OverpassQuery {
    pub bbox: BoundingBox,
    pub filters: Vec<TagFilter>,
}

impl OverpassQuery {
    pub fn new(bbox: BoundingBox, filters: Vec<TagFilter>) -> Self {
        Self { bbox, filters }
    }

    /// Render as Overpass QL with JSON output and full tag bodies
    pub fn to_ql(&self) -> String {
        let bbox = format!("({:?},{:?},{:?},{:?})", self.bbox.south, self.bbox.west, self.bbox.north, self.bbox.east);

        let mut ql = String::from("[out:json];\n(\n");
        for filter in &self.filters {
            // Writing to a String cannot fail
            let _ = writeln!(ql, "  node[\"{}\"=\"{}\"]{};", filter.key, filter.value, bbox);
        }
        ql.push_str(");\nout body;\n");
        ql
    }
}

pub struct OverpassClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OverpassClient {
    /// Create a new client for the configured interpreter endpoint
    pub fn new(config: &OverpassConfig) -> anyhow::Result<Self> {
        Self::with_timeout(config.url.clone(), config.timeout)
    }

    fn with_timeout(endpoint: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Get the endpoint URL this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit a query and return the decoded result set
    pub async fn fetch(&self, query: &OverpassQuery) -> Result<OverpassResponse, OverpassError> {
        let ql = query.to_ql();
        tracing::debug!("Submitting Overpass query to {}:\n{}", self.endpoint, ql);

        let response = self.client.post(&self.endpoint).body(ql).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let response = parse_response(status, &body)?;
        tracing::info!("Overpass returned {} elements", response.elements.len());
        Ok(response)
    }
}

/// Map an HTTP status and body to a result set or a typed error
pub fn parse_response(status: StatusCode, body: &str) -> Result<OverpassResponse, OverpassError> {
    match status {
        StatusCode::OK => {}
        StatusCode::BAD_REQUEST => return Err(OverpassError::BadRequest(body.trim().to_string())),
        StatusCode::TOO_MANY_REQUESTS => return Err(OverpassError::TooManyRequests),
        StatusCode::GATEWAY_TIMEOUT => return Err(OverpassError::GatewayTimeout),
        other => return Err(OverpassError::UnexpectedStatus(other)),
    }

    let response: OverpassResponse = serde_json::from_str(body)?;

    if let Some(remark) = &response.remark {
        if remark.contains("runtime error") {
            return Err(OverpassError::Runtime(remark.clone()));
        }
        tracing::warn!("Overpass remark: {}", remark);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_tag_filters;

    #[test]
    fn test_query_rendering() {
        let query = OverpassQuery::new(BoundingBox::default(), default_tag_filters());

        let expected = "[out:json];\n(\n  node[\"leisure\"=\"playground\"](46.5,9.0,47.0,10.0);\n  node[\"amenity\"=\"museum\"](46.5,9.0,47.0,10.0);\n  node[\"amenity\"=\"library\"](46.5,9.0,47.0,10.0);\n  node[\"leisure\"=\"swimming_pool\"](46.5,9.0,47.0,10.0);\n);\nout body;\n";
        assert_eq!(query.to_ql(), expected);
    }

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{"elements":[{"type":"node","id":1,"lat":46.8,"lon":9.5,"tags":{"amenity":"library"}}]}"#;

        let response = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(response.elements.len(), 1);
    }

    #[test]
    fn test_parse_error_statuses() {
        assert!(matches!(
            parse_response(StatusCode::BAD_REQUEST, "parse error: line 1\n"),
            Err(OverpassError::BadRequest(msg)) if msg == "parse error: line 1"
        ));
        assert!(matches!(parse_response(StatusCode::TOO_MANY_REQUESTS, ""), Err(OverpassError::TooManyRequests)));
        assert!(matches!(parse_response(StatusCode::GATEWAY_TIMEOUT, ""), Err(OverpassError::GatewayTimeout)));
        assert!(matches!(
            parse_response(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Err(OverpassError::UnexpectedStatus(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[test]
    fn test_runtime_remark_is_an_error() {
        let body = r#"{"elements":[],"remark":"runtime error: Query timed out in \"query\" at line 3 after 181 seconds."}"#;

        assert!(matches!(parse_response(StatusCode::OK, body), Err(OverpassError::Runtime(_))));
    }

    #[test]
    fn test_other_remark_is_tolerated() {
        let body = r#"{"elements":[],"remark":"area data outdated"}"#;

        let response = parse_response(StatusCode::OK, body).unwrap();
        assert!(response.elements.is_empty());
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(parse_response(StatusCode::OK, "<html>"), Err(OverpassError::Decode(_))));
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let client = OverpassClient::with_timeout("http://localhost:12345/api/interpreter".into(), Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:12345/api/interpreter");
    }
}
