#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`CollectorError`)
//! - [`config`]: Collector configuration (`CollectorConfig`, builder)
//! - [`types`]: Domain types (`Coordinates`, `DependencyRecord`, `ProjectRecord`, `AggregateInventory`)
//! - [`reactor`]: Build-tool collaborator interface (`Module`, `ResolvedNode`, `DependencyGraphResolver`)
//! - [`identity`]: Artifact identity (SHA-1, filename, system path)
//! - [`mapper`]: Resolved node to `DependencyRecord` mapping (`DependencyMapper`)
//! - [`filter`]: Scope and module filters (`ScopeFilter`, `ModuleFilter`)
//! - [`builder`]: Per-module project records (`ProjectTreeBuilder`)
//! - [`aggregate`]: Aggregation strategies and flattening (`Aggregator`)
//! - [`report`]: Update request assembly (`UpdateRequest`, `InventoryReporter`, `OfflineRequestWriter`)
//! - [`manifest`]: JSON reactor manifest (`ReactorManifest`, `ManifestResolver`)
//! - [`collector`]: Main orchestrator (`InventoryCollector`)
//!
//! # Architecture
//!
//! ```text
//! reactor.json --> ReactorManifest --> modules + ManifestResolver
//!                                              |
//!                                     InventoryCollector
//!                                              |
//!              ModuleFilter -> resolve -> ScopeFilter -> DependencyMapper -> identity
//!                                              |
//!                                     Vec<ProjectRecord>
//!                                              |
//!                                         Aggregator
//!                                              |
//!                                    AggregateInventory
//!                                              |
//!                          UpdateRequest --> InventoryReporter
//! ```

pub mod aggregate;
pub mod builder;
pub mod collector;
pub mod config;
pub mod error;
pub mod filter;
pub mod identity;
pub mod manifest;
pub mod mapper;
pub mod reactor;
pub mod report;
pub mod types;

// --- Public API Re-exports ---

// Collector (main orchestrator)
pub use collector::{CollectionResult, InventoryCollector};

// Configuration
pub use config::{CollectorConfig, CollectorConfigBuilder};

// Error
pub use error::CollectorError;

// Types
pub use types::{
    AggregateInventory, AggregationStrategy, Coordinates, DependencyRecord, Exclusion,
    ProjectRecord,
};

// Reactor
pub use reactor::{ArtifactDescriptor, DependencyGraphResolver, Module, ResolvedNode};

// Components
pub use aggregate::{Aggregator, flatten};
pub use builder::{BuildOutcome, ProjectTreeBuilder};
pub use filter::{ModuleFilter, ScopeFilter};
pub use identity::ArtifactIdentity;
pub use mapper::DependencyMapper;

// Manifest
pub use manifest::{ManifestResolver, ReactorManifest};

// Report
pub use report::{InventoryReporter, InventorySummary, OfflineRequestWriter, UpdateRequest};
