use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A URL waiting to be fetched, with the number of hops still allowed below it.
///
/// A target whose `depth` is negative is never fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTarget {
    pub url: String,
    pub depth: i32,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, depth: i32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.depth < 0
    }
}

/// What a worker hands back for one target. Empty title and links mean the
/// fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub depth: i32,
    pub title: String,
    pub links: Vec<String>,
}

impl FetchedPage {
    pub fn new(target: CrawlTarget, title: String, links: Vec<String>) -> Self {
        Self {
            url: target.url,
            depth: target.depth,
            title,
            links,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.title.is_empty() && self.links.is_empty()
    }
}

/// A directed reference between two pages.
///
/// Raw edges carry URLs; the edges returned from a crawl carry page titles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Summary of one crawl run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub edges: Vec<Edge>,
    pub pages_fetched: usize,
    pub urls_seen: usize,
    pub raw_edges: usize,
    pub cancelled: bool,
}

/// Drops repeated links, keeping the first occurrence of each.
pub fn unique_links(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(links.len());
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_links_keeps_first_appearance_order() {
        let links = vec![
            "https://wiki.test/B".to_string(),
            "https://wiki.test/C".to_string(),
            "https://wiki.test/B".to_string(),
            "https://wiki.test/A".to_string(),
            "https://wiki.test/C".to_string(),
        ];

        assert_eq!(
            unique_links(links),
            vec![
                "https://wiki.test/B".to_string(),
                "https://wiki.test/C".to_string(),
                "https://wiki.test/A".to_string(),
            ]
        );
    }

    #[test]
    fn test_failed_page_keeps_target_fields() {
        let page = FetchedPage::new(CrawlTarget::new("https://wiki.test/C", 1), String::new(), Vec::new());
        assert_eq!(page.url, "https://wiki.test/C");
        assert_eq!(page.depth, 1);
        assert!(page.is_failed());
    }

    #[test]
    fn test_exhausted_target() {
        assert!(!CrawlTarget::new("https://wiki.test/A", 0).is_exhausted());
        assert!(CrawlTarget::new("https://wiki.test/A", -1).is_exhausted());
    }
}
