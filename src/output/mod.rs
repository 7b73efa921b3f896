//! Output module
//!
//! Builds the final crawl report from the frontier's record map, prints it,
//! and writes the optional sitemap text file.

mod sitemap;
mod stats;

pub use sitemap::{default_sitemap_path, write_sitemap};
pub use stats::{print_report, CrawlReport};
