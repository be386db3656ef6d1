//! Configuration module for Folio-Harvest
//!
//! This module handles loading, parsing, and validating the TOML file that
//! declares fetcher settings, the output directory and one profile per source.
//!
//! # Example
//!
//! ```no_run
//! use folio_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sources.toml")).unwrap();
//! for source in &config.sources {
//!     println!("{} ({})", source.name, source.render_mode);
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, Locator, OutputConfig, PaginationRule, RenderMode, SelectorRules,
    SourceProfile,
};

// Re-export parser functions
pub use parser::{
    builtin_config, compute_config_hash, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate_source;
