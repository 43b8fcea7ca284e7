//! Crawler module for page rendering and analysis
//!
//! This module contains the analysis side of a crawl job:
//! - rendering a page through the `Renderer` seam
//! - DOM inspection (doctype, headings, anchors, login heuristic)
//! - concurrent link health probing
//! - the `CrawlPipeline` that combines them into a `CrawlResult`

mod parser;
mod pipeline;
mod probe;
mod renderer;
mod types;

pub use parser::{
    classify_doctype, collect_hrefs, count_headings, detect_login_form, inspect_markup,
    DocumentFacts, LOGIN_KEYWORDS, UNKNOWN_HTML_VERSION,
};
pub use pipeline::{CrawlPipeline, LinkScan, PageAnalyzer};
pub use probe::{LinkProber, ProbeError, ProbeOutcome};
pub use renderer::{build_http_client, snapshot_document, HttpRenderer, RenderedPage, Renderer};
pub use types::{BrokenLink, CrawlResult, HeadingCounts, HEADING_TAGS};
