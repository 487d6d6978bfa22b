pub mod config;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod inflight;
mod merge;
pub mod result;
mod stages;
pub mod visited;
mod worker;

#[cfg(test)]
mod testing;

pub use config::CrawlConfig;
pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use fetcher::{Fetcher, HttpFetcher, PageContent};
pub use filter::{SkipFilter, SkipPredicate};
pub use result::{CrawlOutcome, CrawlTarget, Edge, FetchedPage};
pub use visited::{TitleIndex, VisitedSet};
