//! Request URL parsing for cache keys.
//!
//! The cache key is the exact URL as the parser serialises it. Nothing is
//! normalised beyond what `url::Url` already does: the query string keeps
//! its order, so `?a=1&b=2` and `?b=2&a=1` are distinct entries.

/// Error type for request URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("relative URL without an origin: {0}")]
    MissingOrigin(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a media request URL.
///
/// Steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve a relative URL (`/api/media/...`) against `origin`
/// 3. Require http or https
/// 4. Remove fragment (#...), which never takes part in matching
pub fn parse_request_url(input: &str, origin: Option<&url::Url>) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = match url::Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = origin.ok_or_else(|| UrlError::MissingOrigin(trimmed.to_string()))?;
            base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
        }
        Err(e) => return Err(UrlError::InvalidUrl(e.to_string())),
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
