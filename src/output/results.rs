//! Listing of recorded crawl results
//!
//! Records come from `CrawlStore::list_crawls` and are rendered either as a
//! plain-text table or as pretty-printed JSON.

use crate::storage::CrawlRecord;

/// Formats records as a plain-text table, one block per crawl
pub fn format_results(records: &[CrawlRecord]) -> String {
    if records.is_empty() {
        return "No crawls recorded.\n".to_string();
    }

    let mut out = String::new();

    for record in records {
        out.push_str(&format!(
            "#{} [{}] {}\n",
            record.id, record.status, record.url
        ));
        out.push_str(&format!(
            "  recorded: {}\n",
            record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if let Some(message) = &record.error_message {
            out.push_str(&format!("  error: {}\n", message));
        }

        if let Some(result) = record.to_result() {
            out.push_str(&format!("  title: {}\n", result.title));
            out.push_str(&format!("  html version: {}\n", result.html_version));

            let headings: Vec<String> = result
                .headings
                .iter()
                .map(|(tag, count)| format!("{}={}", tag, count))
                .collect();
            out.push_str(&format!("  headings: {}\n", headings.join(" ")));

            out.push_str(&format!(
                "  links: {} internal, {} external, {} broken\n",
                result.internal_links,
                result.external_links,
                result.broken_links.len()
            ));
            for link in &result.broken_links {
                out.push_str(&format!("    {} {}\n", link.status_code, link.url));
            }

            out.push_str(&format!(
                "  login form: {}\n",
                if result.has_login_form { "yes" } else { "no" }
            ));
        }

        out.push('\n');
    }

    out
}

/// Serializes records as a JSON array
pub fn results_to_json(records: &[CrawlRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
