//! Configuration types for Storey exports.
//!
//! This module provides configuration structures that control how floor
//! plans are read and exported. All types implement [`serde::Deserialize`]
//! for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining reader defaults and export settings.
//! - [`ReaderConfig`] - Fallback dimensions and colors for incomplete documents.
//! - [`ExportConfig`] - Parallelism, texture fetching limits and output metadata.
//!
//! # Example
//!
//! ```
//! # use storey::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.export().parallel());
//! assert_eq!(config.defaults().wall_height(), 300.0);
//! ```

use std::time::Duration;

use serde::Deserialize;

pub use storey_reader::ReaderConfig;

/// Top-level application configuration.
///
/// Groups [`ReaderConfig`] (the `[defaults]` section) and [`ExportConfig`]
/// (the `[export]` section) into a single configuration root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reader fallback section.
    #[serde(default)]
    defaults: ReaderConfig,

    /// Export section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `defaults` - Reader fallback dimensions and colors.
    /// * `export` - Export settings.
    pub fn new(defaults: ReaderConfig, export: ExportConfig) -> Self {
        Self { defaults, export }
    }

    /// Returns the reader defaults.
    pub fn defaults(&self) -> &ReaderConfig {
        &self.defaults
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Settings for scene construction, texture resolution and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Build meshes and resolve materials on the rayon thread pool.
    parallel: bool,

    /// Timeout for a single texture download, in seconds.
    fetch_timeout_secs: u64,

    /// Largest accepted texture payload, in bytes.
    max_texture_bytes: u64,

    /// Value of the output's `asset.generator` field.
    generator: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            fetch_timeout_secs: 30,
            max_texture_bytes: 32 * 1024 * 1024,
            generator: format!("storey {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ExportConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_max_texture_bytes(mut self, max: u64) -> Self {
        self.max_texture_bytes = max;
        self
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn max_texture_bytes(&self) -> u64 {
        self.max_texture_bytes
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }
}
