pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    OutputOptions, crawl_options_from_matches, create_output, handle_crawl,
    output_options_from_matches, write_output,
};

pub use pagegraph_core::crawl::{CrawlOptions, execute_crawl, extract_url_path};
