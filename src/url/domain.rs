use url::Url;

/// Extracts the host from a URL, lowercased
///
/// Links without an authority (`mailto:`, `javascript:`, ...) have no host
/// and yield an empty string, which the classifier treats as same-page.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pagescope::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_host(&url), "example.com");
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), "");
/// ```
pub fn extract_host(url: &Url) -> String {
    url.host_str().map(|h| h.to_lowercase()).unwrap_or_default()
}
