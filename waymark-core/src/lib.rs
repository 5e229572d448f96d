//! Core engine for classifying path-network edges from GPS track datasets.
//!
//! Two point datasets drive the classification: public activity tracks and
//! authoritative right-of-way survey tracks. Each tile of the network graph
//! is processed independently: tracks are cleaned and resampled, snapped to
//! their nearest edges, aggregated into per-edge votes, filtered for density
//! and connectivity, and finally joined across the two datasets into the
//! `public_only` / `both` / `row_only` categories. Per-tile results are
//! persisted as artifacts and merged into region-wide layers.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod denoise;
pub mod error;
pub mod export;
pub mod geo_utils;
pub mod interpolate;
pub mod loading;
pub mod matching;
pub mod model;
pub mod prelude;
pub mod store;
pub mod union_find;
pub mod votes;

pub use analysis::{AnalysisSummary, GraphSource, analyse_batch};
pub use config::{AnalysisConfig, DistanceMetric};
pub use error::{Error, Result};
pub use model::{Category, NetworkGraph};
