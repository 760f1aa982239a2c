//! media_fetch tool implementation.
//!
//! Issues a request the way a page would: through the interceptor when one
//! is active, otherwise straight to the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thisday_client::fetch::parse_request_url;
use thisday_client::header::{self, HeaderValue};
use thisday_client::{FetchOptions, Interception, MediaRequest, Method};
use thisday_core::Error;
use thisday_core::cache::hash::body_digest;

use super::json_result;
use crate::state::AppState;

/// Input parameters for media_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaFetchParams {
    /// Absolute URL, or a path relative to the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Optional Range header value, e.g. "bytes=0-1023".
    #[serde(default)]
    pub range: Option<String>,

    /// Optional Accept header value.
    #[serde(default)]
    pub accept: Option<String>,
}

/// Output structure for media_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaFetchOutput {
    pub url: String,
    pub status: u16,
    /// "hit", "miss" or "error" when intercepted, "network" otherwise.
    pub source: String,
    pub content_type: Option<String>,
    pub size: usize,
    /// SHA-256 of the body, hex encoded.
    pub digest: String,
    pub fetch_ms: u64,
}

fn build_request(state: &AppState, params: &MediaFetchParams) -> Result<MediaRequest, Error> {
    let url = parse_request_url(&params.url, state.origin.as_ref()).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    let method = match params.method.as_deref() {
        None => Method::GET,
        Some(m) => Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {m}")))?,
    };

    let mut request = MediaRequest::new(method, url);
    for (name, value) in [(header::RANGE, &params.range), (header::ACCEPT, &params.accept)] {
        if let Some(value) = value {
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::InvalidInput(format!("invalid {name} header: {value}")))?;
            request = request.with_header(name, value);
        }
    }

    Ok(request)
}

/// Implementation of the media_fetch tool.
pub async fn fetch_impl(state: &AppState, params: MediaFetchParams) -> Result<CallToolResult, McpError> {
    let request = build_request(state, &params)?;

    let intercepted = match &state.interceptor {
        Some(interceptor) => interceptor.handle_fetch(&request).await,
        None => Interception::Passthrough,
    };

    let (source, response) = match intercepted {
        Interception::Responded { status, result } => (status.as_str(), result?),
        Interception::Passthrough => ("network", state.fetcher.fetch(&request, FetchOptions::default()).await?),
    };

    let output = MediaFetchOutput {
        url: response.url.to_string(),
        status: response.status.as_u16(),
        source: source.to_string(),
        content_type: response.content_type().map(str::to_string),
        size: response.body.len(),
        digest: body_digest(&response.body),
        fetch_ms: response.fetch_ms,
    };

    json_result(&output)
}
