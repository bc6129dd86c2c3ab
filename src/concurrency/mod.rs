//! Concurrency primitives for the harvest pipeline
//!
//! This module provides:
//! - `AdmissionGate`: a counting gate bounding in-flight operations of one class
//! - `GatePools`: one gate per operation class (metadata, chapter, file)
//! - `gather_ordered` / `gather_or_default`: concurrent execution with
//!   input-ordered results and per-item failure isolation

mod gate;
mod gather;

pub use gate::{AdmissionGate, GatePermit};
pub use gather::{gather_or_default, gather_ordered};

use crate::config::CrawlerConfig;

/// Independent gates, one per operation class
///
/// Keeping the classes apart means a backlog of slow chapter fetches can
/// never hold up metadata lookups or file writes, and vice versa.
#[derive(Debug, Clone)]
pub struct GatePools {
    /// Detail, listing and catalog pages
    pub metadata: AdmissionGate,

    /// Chapter content pages
    pub chapter: AdmissionGate,

    /// Novel file creation and writes
    pub file: AdmissionGate,
}

impl GatePools {
    pub fn new(metadata: usize, chapter: usize, file: usize) -> Self {
        Self {
            metadata: AdmissionGate::new("metadata", metadata),
            chapter: AdmissionGate::new("chapter", chapter),
            file: AdmissionGate::new("file", file),
        }
    }

    /// Builds the pools from the configured limits
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.metadata_concurrency,
            config.chapter_concurrency,
            config.file_concurrency,
        )
    }
}
