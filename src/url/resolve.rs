use crate::PageScopeError;
use url::Url;

/// Resolves an anchor href against the page URL
///
/// Returns None when the href cannot be turned into a URL at all; such
/// links are ignored by the analysis rather than reported.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// Checks a submitted page URL before it is handed to the queue
///
/// Only absolute `http`/`https` URLs with a host are accepted. The URL is
/// returned as submitted (trimmed); the queue keys jobs on that exact string.
pub fn validate_submission(raw: &str) -> Result<String, PageScopeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PageScopeError::InvalidSubmission(
            "URL cannot be empty".to_string(),
        ));
    }

    let parsed = Url::parse(trimmed)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(PageScopeError::InvalidSubmission(format!(
            "unsupported scheme '{}' in {}",
            parsed.scheme(),
            trimmed
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(PageScopeError::InvalidSubmission(format!(
            "missing host in {}",
            trimmed
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/a/page").unwrap()
    }

    #[test]
    fn test_resolve_absolute_path() {
        let link = resolve_href(&base_url(), "/b").unwrap();
        assert_eq!(link.as_str(), "https://example.com/b");
    }

    #[test]
    fn test_resolve_relative_path() {
        let link = resolve_href(&base_url(), "other").unwrap();
        assert_eq!(link.as_str(), "https://example.com/a/other");
    }

    #[test]
    fn test_resolve_protocol_relative() {
        let link = resolve_href(&base_url(), "//cdn.example.net/x.js").unwrap();
        assert_eq!(link.as_str(), "https://cdn.example.net/x.js");
    }

    #[test]
    fn test_resolve_fragment_and_special_schemes() {
        let link = resolve_href(&base_url(), "#top").unwrap();
        assert_eq!(link.as_str(), "https://example.com/a/page#top");

        let link = resolve_href(&base_url(), "mailto:someone@example.com").unwrap();
        assert_eq!(link.scheme(), "mailto");
    }

    #[test]
    fn test_unresolvable_href_skipped() {
        assert!(resolve_href(&base_url(), "http://[::1").is_none());
        assert!(resolve_href(&base_url(), "https://exa mple.com/").is_none());
    }

    #[test]
    fn test_validate_submission() {
        assert_eq!(
            validate_submission("  https://example.com/  ").unwrap(),
            "https://example.com/"
        );
        assert!(validate_submission("http://example.com").is_ok());

        assert!(validate_submission("").is_err());
        assert!(validate_submission("example.com").is_err());
        assert!(validate_submission("ftp://example.com/file").is_err());
        assert!(validate_submission("file:///etc/passwd").is_err());
    }
}
