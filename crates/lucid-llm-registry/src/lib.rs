//! # lucid-llm-registry
//!
//! Provider selection for the Lucid dream journal.
//!
//! This crate turns operator-managed configuration rows into live adapter
//! instances:
//!
//! - **[`ProviderService`]** is the application-facing entry point. It reads
//!   the active profile for a task kind, builds the matching adapter, and
//!   caches it for a short window, separately for text and image work.
//! - **[`factory::create_analyzer`]** maps a [`ProviderConfig`] plus its
//!   selected [`AiModel`] to a concrete [`lucid_llm::DreamAnalyzer`].
//! - **[`ConfigStore`]** abstracts the persistence backend down to the two
//!   read queries the core needs, so tests run against
//!   [`MemoryConfigStore`].
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use lucid_llm::EnvSecrets;
//! use lucid_llm_registry::{MemoryConfigStore, ProviderService, TaskKind};
//!
//! let store = Arc::new(MemoryConfigStore::new());
//! // ... add_config / add_model, or use a database-backed store ...
//! let service = ProviderService::new(store, Arc::new(EnvSecrets));
//!
//! let analysis = service.analyze_dream(&dream).await?;
//! let report = service.test_connection(TaskKind::Text).await;
//! ```

pub mod config;
pub mod factory;
pub mod service;
pub mod store;

pub use config::{AiModel, ModelCost, ModelTier, ProviderConfig, ProviderType, TaskKind};
pub use service::{ActiveProviderInfo, CACHE_TTL, ConnectionReport, ProviderService};
pub use store::{ConfigStore, MemoryConfigStore};
