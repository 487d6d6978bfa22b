pub mod crawl;
pub mod render;
pub mod wiki;

pub use crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
pub use render::GraphFormat;
