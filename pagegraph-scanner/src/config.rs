use crate::error::{Result, ScanError};
use crate::filter::SkipFilter;
use std::num::NonZeroUsize;
use url::Url;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Everything a crawl needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: String,
    pub max_depth: i32,
    pub concurrency: usize,
    pub skip_filter: SkipFilter,
    pub channel_capacity: usize,
}

impl CrawlConfig {
    pub fn new(start_url: &str, max_depth: i32) -> Result<Self> {
        let parsed = Url::parse(start_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", start_url, e)))?;

        Ok(Self {
            start_url: parsed.to_string(),
            max_depth,
            concurrency: default_concurrency(),
            skip_filter: SkipFilter::new(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        })
    }

    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    pub fn with_skip_filter(mut self, filter: SkipFilter) -> Self {
        self.skip_filter = filter;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// Number of workers used when the caller does not pick one.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
