use crate::UrlError;
use url::Url;

/// Query parameters that only carry tracking information
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a URL into the canonical form used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an http or https scheme and a host
/// 3. Lowercase scheme and host, drop default ports, resolve dot segments
///    (done by the parser)
/// 4. Remove the fragment
/// 5. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`)
/// 6. Sort remaining query parameters by key; drop an empty query
///
/// The path is otherwise kept verbatim, including any trailing slash.
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize_url;
///
/// let url = normalize_url("HTTPS://CC.Gatech.EDU:443/about?b=2&a=1#team").unwrap();
/// assert_eq!(url.as_str(), "https://cc.gatech.edu/about?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&mut url)?;
    Ok(url)
}

/// Normalizes an already parsed URL in place
pub(crate) fn normalize_parsed(url: &mut Url) -> Result<(), UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if params.is_empty() {
            url.set_query(None);
        } else {
            params.sort_by(|a, b| a.0.cmp(&b.0));
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(())
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize_url(s).unwrap().to_string()
    }

    #[test]
    fn test_scheme_and_host_case_folded() {
        assert_eq!(norm("HTTP://CC.GATECH.EDU/People"), "http://cc.gatech.edu/People");
    }

    #[test]
    fn test_http_and_https_stay_distinct() {
        assert_ne!(norm("http://cc.gatech.edu/"), norm("https://cc.gatech.edu/"));
    }

    #[test]
    fn test_bare_host_gets_root_path() {
        assert_eq!(norm("https://cc.gatech.edu"), "https://cc.gatech.edu/");
    }

    #[test]
    fn test_default_port_dropped_custom_port_kept() {
        assert_eq!(norm("https://cc.gatech.edu:443/news"), "https://cc.gatech.edu/news");
        assert_eq!(norm("http://127.0.0.1:8080/news"), "http://127.0.0.1:8080/news");
    }

    #[test]
    fn test_fragment_removed() {
        assert_eq!(norm("https://cc.gatech.edu/about#leadership"), "https://cc.gatech.edu/about");
    }

    #[test]
    fn test_trailing_slash_kept() {
        assert_ne!(norm("https://cc.gatech.edu/news/"), norm("https://cc.gatech.edu/news"));
    }

    #[test]
    fn test_dot_segments_resolved() {
        assert_eq!(norm("https://cc.gatech.edu/a/../b/./c"), "https://cc.gatech.edu/b/c");
    }

    #[test]
    fn test_tracking_params_removed_and_query_sorted() {
        assert_eq!(
            norm("https://cc.gatech.edu/events?page=2&utm_campaign=fall&type=talk&gclid=abc"),
            "https://cc.gatech.edu/events?page=2&type=talk"
        );
        assert_eq!(
            norm("https://cc.gatech.edu/?utm_source=newsletter&mc_eid=1"),
            "https://cc.gatech.edu/"
        );
    }

    #[test]
    fn test_query_order_does_not_matter() {
        assert_eq!(
            norm("https://cc.gatech.edu/search?q=robots&sort=date"),
            norm("https://cc.gatech.edu/search?sort=date&q=robots")
        );
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(matches!(
            normalize_url("mailto:dean@cc.gatech.edu").unwrap_err(),
            UrlError::InvalidScheme(_)
        ));
        assert!(matches!(
            normalize_url("ftp://cc.gatech.edu/file").unwrap_err(),
            UrlError::InvalidScheme(_)
        ));
    }

    #[test]
    fn test_relative_and_garbage_rejected() {
        assert!(matches!(normalize_url("/about").unwrap_err(), UrlError::Parse(_)));
        assert!(matches!(normalize_url("not a url").unwrap_err(), UrlError::Parse(_)));
    }

    #[test]
    fn test_normalize_parsed_in_place() {
        let mut url = Url::parse("https://CC.gatech.edu/x?utm_medium=email#top").unwrap();
        normalize_parsed(&mut url).unwrap();
        assert_eq!(url.as_str(), "https://cc.gatech.edu/x");
    }
}
