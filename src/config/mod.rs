//! Configuration module for Promo-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. All site knowledge (URL templates, filters, page caps, usage
//! labels) is carried by the `Config` value, so tests can run crawls against
//! different seed sets in isolation.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, SessionConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
