use url::Url;

/// Extracts the lower-cased host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::extract_domain;
///
/// let url = Url::parse("https://WWW.CC.Gatech.edu/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.cc.gatech.edu".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a host falls inside any allowed domain
///
/// A host matches when it contains one of the allowed domains as a substring,
/// compared case-insensitively. `www.cc.gatech.edu` therefore matches
/// `cc.gatech.edu`. An empty allowed list matches nothing.
///
/// # Examples
///
/// ```
/// use sitecrawl::url::host_matches;
///
/// let allowed = vec!["cc.gatech.edu".to_string()];
/// assert!(host_matches("www.cc.gatech.edu", &allowed));
/// assert!(!host_matches("gatech.edu", &allowed));
/// ```
pub fn host_matches<S: AsRef<str>>(host: &str, allowed_domains: &[S]) -> bool {
    let host = host.to_lowercase();
    allowed_domains.iter().any(|domain| {
        let domain = domain.as_ref().trim();
        !domain.is_empty() && host.contains(&domain.to_lowercase())
    })
}
