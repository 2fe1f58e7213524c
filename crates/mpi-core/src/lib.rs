//! Federated patient master index: the end-to-end pipeline.
//!
//! raw batches -> mapping -> exact dedup -> blocking -> comparison ->
//! classification -> duplicate clusters -> [`IntegrationStats`].

pub mod config;
pub mod dedup;
pub mod error;
pub mod pipeline;
pub mod stats;

pub use config::{
    ConfiguredSource, FederationConfig, FederationFile, FederationHeader, SCHEMA_VERSION,
    SourceConfig,
};
pub use dedup::{Deduplicator, dedup};
pub use error::{ConfigError, FederationError};
pub use pipeline::{BatchSummary, FederationOutput, FederationPipeline, run_federation};
pub use stats::IntegrationStats;
