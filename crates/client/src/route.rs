//! Eligibility predicate for the media cache.
//!
//! Only full-resolution media is cached. Thumbnails are cheap and numerous
//! and would push full-resolution entries out of the occupancy budget.

use reqwest::{Method, Url};

use crate::fetch::MediaRequest;

/// Path prefix served by the media endpoint.
pub const MEDIA_PATH_PREFIX: &str = "/api/media/immich/";

/// Query parameter selecting the variant.
pub const VARIANT_PARAM: &str = "type";

/// Variant value that is cached.
pub const FULL_VARIANT: &str = "full";

/// Which requests the media cache handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRoute {
    pub path_prefix: String,
    pub variant_param: String,
    pub full_variant: String,
}

impl Default for MediaRoute {
    fn default() -> Self {
        Self {
            path_prefix: MEDIA_PATH_PREFIX.to_string(),
            variant_param: VARIANT_PARAM.to_string(),
            full_variant: FULL_VARIANT.to_string(),
        }
    }
}

impl MediaRoute {
    /// A request is cacheable iff it is a GET without `Range` for a
    /// full-variant URL under the media path.
    pub fn is_eligible(&self, request: &MediaRequest) -> bool {
        request.method == Method::GET && !request.has_range() && self.is_full_media(&request.url)
    }

    /// URL half of the predicate: media path prefix and `type=full`.
    ///
    /// Only the first occurrence of the variant parameter counts.
    pub fn is_full_media(&self, url: &Url) -> bool {
        if !url.path().starts_with(&self.path_prefix) {
            return false;
        }

        url.query_pairs()
            .find(|(key, _)| key == self.variant_param.as_str())
            .is_some_and(|(_, value)| value == self.full_variant.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{self, HeaderValue};

    fn request(url: &str) -> MediaRequest {
        MediaRequest::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_full_media_get_is_eligible() {
        let route = MediaRoute::default();
        assert!(route.is_eligible(&request("https://thisday.example/api/media/immich/abc123?type=full")));
    }

    #[test]
    fn test_thumbnail_is_not_eligible() {
        let route = MediaRoute::default();
        assert!(!route.is_eligible(&request("https://thisday.example/api/media/immich/abc123?type=thumbnail")));
        assert!(!route.is_eligible(&request("https://thisday.example/api/media/immich/abc123")));
    }

    #[test]
    fn test_other_paths_not_eligible() {
        let route = MediaRoute::default();
        assert!(!route.is_eligible(&request("https://thisday.example/api/entries?type=full")));
        assert!(!route.is_eligible(&request("https://thisday.example/api/media/abc123?type=full")));
    }

    #[test]
    fn test_non_get_not_eligible() {
        let route = MediaRoute::default();
        let url = Url::parse("https://thisday.example/api/media/immich/abc123?type=full").unwrap();
        assert!(!route.is_eligible(&MediaRequest::new(Method::HEAD, url.clone())));
        assert!(!route.is_eligible(&MediaRequest::new(Method::POST, url)));
    }

    #[test]
    fn test_ranged_not_eligible() {
        let route = MediaRoute::default();
        let ranged = request("https://thisday.example/api/media/immich/abc123?type=full")
            .with_header(header::RANGE, HeaderValue::from_static("bytes=0-1023"));
        assert!(!route.is_eligible(&ranged));
    }

    #[test]
    fn test_first_variant_param_wins() {
        let route = MediaRoute::default();
        assert!(route.is_eligible(&request("https://thisday.example/api/media/immich/a?type=full&type=thumbnail")));
        assert!(!route.is_eligible(&request("https://thisday.example/api/media/immich/a?type=thumbnail&type=full")));
    }
}
