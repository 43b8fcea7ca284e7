//! Integration tests for PageScope
//!
//! These tests use wiremock to serve pages and link targets and exercise
//! the analysis pipeline and the queue end-to-end.

mod pipeline_tests;
mod queue_tests;
mod support;
