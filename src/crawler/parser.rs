//! DOM inspection for the crawl pipeline
//!
//! This module extracts facts from rendered markup:
//! - doctype classification
//! - heading tally (h1..h6)
//! - anchor hrefs in document order
//! - the login-form heuristic
//!
//! Everything here is synchronous. `scraper::Html` is not `Send`, so the DOM
//! never leaves this module; callers get owned `DocumentFacts` back.

use crate::crawler::types::{HeadingCounts, HEADING_TAGS};
use crate::{CrawlError, CrawlOutcome};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Doctype token reported when the page declares none
pub const UNKNOWN_HTML_VERSION: &str = "Unknown";

/// Lowercase phrases that suggest an authentication form
pub const LOGIN_KEYWORDS: &[&str] = &[
    "password",
    "login",
    "log in",
    "sign in",
    "đăng nhập",
    "anmelden",
    "connexion",
    "iniciar sesión",
];

/// Facts gathered from one rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFacts {
    pub headings: HeadingCounts,
    /// Raw href values of every `a[href]`, in document order
    pub hrefs: Vec<String>,
    pub has_login_form: bool,
}

fn doctype_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<!DOCTYPE\s+([^>\s]+)").expect("doctype pattern is a valid regex")
    })
}

/// Extracts the declared doctype token, uppercased
///
/// This reports the name in the declaration and nothing more: both
/// `<!DOCTYPE html>` and a legacy HTML 4.01 declaration report `"HTML"`.
///
/// # Examples
///
/// ```
/// use pagescope::crawler::classify_doctype;
///
/// assert_eq!(classify_doctype("<!doctype HTML>"), "HTML");
/// assert_eq!(classify_doctype(""), "Unknown");
/// ```
pub fn classify_doctype(declaration: &str) -> String {
    doctype_pattern()
        .captures(declaration)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_uppercase())
        .unwrap_or_else(|| UNKNOWN_HTML_VERSION.to_string())
}

/// Parses markup and collects every fact the pipeline needs
///
/// # Errors
///
/// * `CrawlError::Parse` - the markup is empty
/// * `CrawlError::Canceled` - the token fired during the heading tally
pub fn inspect_markup(
    url: &str,
    markup: &str,
    cancel: &CancellationToken,
) -> CrawlOutcome<DocumentFacts> {
    if markup.trim().is_empty() {
        return Err(CrawlError::parse(url, "rendered document is empty"));
    }

    let document = Html::parse_document(markup);

    let headings = count_headings(&document, cancel).ok_or_else(|| CrawlError::canceled(url))?;
    let hrefs = collect_hrefs(&document);
    let has_login_form = detect_login_form(&document, cancel);

    Ok(DocumentFacts {
        headings,
        hrefs,
        has_login_form,
    })
}

/// Counts h1..h6 elements
///
/// Returns None if the token is canceled before a tag is counted.
pub fn count_headings(document: &Html, cancel: &CancellationToken) -> Option<HeadingCounts> {
    let mut headings = HeadingCounts::default();

    for tag in HEADING_TAGS {
        if cancel.is_cancelled() {
            return None;
        }
        if let Ok(selector) = Selector::parse(tag) {
            headings.set(tag, document.select(&selector).count());
        }
    }

    Some(headings)
}

/// Collects the href of every anchor, in document order
pub fn collect_hrefs(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Guesses whether the document contains a login form
///
/// Pass 1 looks at `input` and `label` elements: a password input wins
/// outright, otherwise their text and placeholder are matched against
/// `LOGIN_KEYWORDS`. Pass 2 runs only if pass 1 found nothing and matches
/// the text of `button`, `a`, `span` and `div` elements, plus anchors whose
/// href mentions "login". A canceled token ends the scan with `false`.
pub fn detect_login_form(document: &Html, cancel: &CancellationToken) -> bool {
    if let Ok(selector) = Selector::parse("input, label") {
        for element in document.select(&selector) {
            if cancel.is_cancelled() {
                return false;
            }
            if is_password_input(&element) {
                return true;
            }

            let placeholder = element.value().attr("placeholder").unwrap_or("");
            let text = format!("{} {}", element_text(&element), placeholder);
            if contains_login_keyword(&text) {
                return true;
            }
        }
    }

    if let Ok(selector) = Selector::parse("button, a, span, div") {
        for element in document.select(&selector) {
            if cancel.is_cancelled() {
                return false;
            }
            if contains_login_keyword(&element_text(&element)) {
                return true;
            }
            if element.value().name() == "a" {
                let href = element.value().attr("href").unwrap_or("");
                if href.to_lowercase().contains("login") {
                    return true;
                }
            }
        }
    }

    false
}

fn is_password_input(element: &ElementRef<'_>) -> bool {
    element.value().name() == "input"
        && element
            .value()
            .attr("type")
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("password"))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Lowercases and collapses runs of whitespace to single spaces
fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_login_keyword(text: &str) -> bool {
    let normalized = normalize_text(text);
    LOGIN_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(html: &str) -> bool {
        detect_login_form(&Html::parse_document(html), &CancellationToken::new())
    }

    #[test]
    fn test_doctype_html5() {
        assert_eq!(classify_doctype("<!DOCTYPE html>"), "HTML");
    }

    #[test]
    fn test_doctype_case_insensitive() {
        assert_eq!(classify_doctype("<!doctype HTML>"), "HTML");
        assert_eq!(classify_doctype("<!DocType html>"), "HTML");
    }

    #[test]
    fn test_doctype_legacy_declaration() {
        let declaration = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#;
        assert_eq!(classify_doctype(declaration), "HTML");
    }

    #[test]
    fn test_doctype_missing() {
        assert_eq!(classify_doctype(""), UNKNOWN_HTML_VERSION);
        assert_eq!(classify_doctype("<html><body></body></html>"), "Unknown");
        assert_eq!(classify_doctype("<!DOCTYPE>"), "Unknown");
    }

    #[test]
    fn test_headings_all_zero() {
        let document = Html::parse_document("<html><body><p>No headings</p></body></html>");
        let headings = count_headings(&document, &CancellationToken::new()).unwrap();
        assert_eq!(headings, HeadingCounts::default());
        assert_eq!(headings.iter().count(), 6);
    }

    #[test]
    fn test_headings_counted() {
        let document = Html::parse_document(
            "<h1>A</h1><h2>B</h2><h2>C</h2><section><h3>D</h3><h6>E</h6></section>",
        );
        let headings = count_headings(&document, &CancellationToken::new()).unwrap();
        assert_eq!(headings.h1, 1);
        assert_eq!(headings.h2, 2);
        assert_eq!(headings.h3, 1);
        assert_eq!(headings.h4, 0);
        assert_eq!(headings.h5, 0);
        assert_eq!(headings.h6, 1);
    }

    #[test]
    fn test_headings_canceled() {
        let document = Html::parse_document("<h1>A</h1>");
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(count_headings(&document, &cancel).is_none());
    }

    #[test]
    fn test_collect_hrefs_in_order() {
        let document = Html::parse_document(
            r#"<a href="/b">B</a><a>no href</a><a href="https://other.com/d">D</a>"#,
        );
        assert_eq!(collect_hrefs(&document), vec!["/b", "https://other.com/d"]);
    }

    #[test]
    fn test_password_input_without_keywords() {
        assert!(login(r#"<form><input type="password" name="x"></form>"#));
        assert!(login(r#"<input type="PassWord">"#));
    }

    #[test]
    fn test_no_login_signals() {
        assert!(!login(
            r#"<html><body><h1>Welcome</h1><input type="text" placeholder="Search"><a href="/about">About</a></body></html>"#
        ));
    }

    #[test]
    fn test_placeholder_keyword() {
        assert!(login(r#"<input type="text" placeholder="Enter your   PASSWORD">"#));
    }

    #[test]
    fn test_label_keyword_with_whitespace() {
        assert!(login("<label>Sign\n   In</label>"));
    }

    #[test]
    fn test_button_keyword_in_second_pass() {
        assert!(login("<button>Log In</button>"));
    }

    #[test]
    fn test_non_english_keywords() {
        assert!(login("<span>Đăng nhập</span>"));
        assert!(login("<div>Jetzt anmelden</div>"));
    }

    #[test]
    fn test_anchor_href_login() {
        assert!(login(r#"<a href="/users/LOGIN?next=/">Account</a>"#));
    }

    #[test]
    fn test_href_login_only_counts_for_anchors() {
        assert!(!login(r#"<link href="/login.css"><p>Hello</p>"#));
    }

    #[test]
    fn test_login_scan_canceled() {
        let document = Html::parse_document(r#"<input type="password">"#);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!detect_login_form(&document, &cancel));
    }

    #[test]
    fn test_inspect_markup_empty_is_parse_error() {
        let err = inspect_markup("https://example.com/", "   ", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, CrawlError::Parse { .. }));
    }

    #[test]
    fn test_inspect_markup_canceled_is_canceled_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = inspect_markup("https://example.com/", "<h1>x</h1>", &cancel).unwrap_err();
        assert_eq!(err, CrawlError::canceled("https://example.com/"));
    }

    #[test]
    fn test_inspect_markup_collects_facts() {
        let facts = inspect_markup(
            "https://example.com/",
            r#"<html><body><h1>T</h1><a href="/x">x</a><input type="password"></body></html>"#,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(facts.headings.h1, 1);
        assert_eq!(facts.hrefs, vec!["/x"]);
        assert!(facts.has_login_form);
    }
}
