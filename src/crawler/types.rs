//! Result types produced by a page analysis

use serde::{Deserialize, Serialize};

/// Heading tag names in tally order
pub const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Occurrence count of each heading level on a page
///
/// All six levels are always present, serialized as a JSON object with
/// keys `h1`..`h6`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

impl HeadingCounts {
    /// Returns the count for a tag name such as `"h2"`
    pub fn get(&self, tag: &str) -> Option<usize> {
        match tag {
            "h1" => Some(self.h1),
            "h2" => Some(self.h2),
            "h3" => Some(self.h3),
            "h4" => Some(self.h4),
            "h5" => Some(self.h5),
            "h6" => Some(self.h6),
            _ => None,
        }
    }

    fn slot_mut(&mut self, tag: &str) -> Option<&mut usize> {
        match tag {
            "h1" => Some(&mut self.h1),
            "h2" => Some(&mut self.h2),
            "h3" => Some(&mut self.h3),
            "h4" => Some(&mut self.h4),
            "h5" => Some(&mut self.h5),
            "h6" => Some(&mut self.h6),
            _ => None,
        }
    }

    /// Sets the count for a tag; unknown tags are ignored
    pub fn set(&mut self, tag: &str, count: usize) {
        if let Some(slot) = self.slot_mut(tag) {
            *slot = count;
        }
    }

    /// Iterates `(tag, count)` pairs from h1 to h6
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        HEADING_TAGS
            .iter()
            .map(move |tag| (*tag, self.get(tag).unwrap_or(0)))
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, count)| count).sum()
    }
}

/// A link whose existence check failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub url: String,
    /// HTTP status of the failed check; 0 when no response was received
    pub status_code: u16,
}

/// Structured findings for one analyzed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub html_version: String,
    pub title: String,
    pub headings: HeadingCounts,
    pub internal_links: usize,
    pub external_links: usize,
    pub broken_links: Vec<BrokenLink>,
    pub has_login_form: bool,
}
