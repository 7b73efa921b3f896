//! Configuration module for Trailmap
//!
//! This module handles building the crawl configuration from CLI arguments,
//! loading optional TOML configuration files, and validating the result.
//!
//! # Example
//!
//! ```no_run
//! use trailmap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trailmap.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawler.target, config.crawler.max_tasks);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
pub use types::{DEFAULT_MAX_REDIRECT, DEFAULT_MAX_TASKS, DEFAULT_REQUEST_TIMEOUT_SECS};

// Re-export parser and validation functions
pub use parser::load_config;
pub use validation::validate;
