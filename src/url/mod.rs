//! URL handling module for PageScope
//!
//! This module provides href resolution, host extraction, submission
//! validation and the internal/external link classifier.

mod domain;
mod resolve;

use ::url::Url;

// Re-export main functions
pub use domain::extract_host;
pub use resolve::{resolve_href, validate_submission};

/// Where a link points relative to the page it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Same host as the page, or no host at all
    Internal,
    /// Any other host
    External,
}

impl LinkClass {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Classifies a resolved link against the page's host
///
/// A link is internal when it has no host (e.g. `mailto:` or other
/// same-page references) or when its host equals `base_host`; everything
/// else is external. Ports and schemes are not compared.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pagescope::url::{classify_link, LinkClass};
///
/// let link = Url::parse("https://other.com/d").unwrap();
/// assert_eq!(classify_link(&link, "example.com"), LinkClass::External);
/// ```
pub fn classify_link(link: &Url, base_host: &str) -> LinkClass {
    let host = extract_host(link);
    if host.is_empty() || host.eq_ignore_ascii_case(base_host) {
        LinkClass::Internal
    } else {
        LinkClass::External
    }
}
