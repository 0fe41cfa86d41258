//! Read-only access to the persisted provider configuration.
//!
//! The production store is the managed backend's Postgres; this crate only
//! depends on the two queries below so tests and embedded setups can inject
//! [`MemoryConfigStore`].

use async_trait::async_trait;
use parking_lot::RwLock;

use lucid_llm::Result;

use crate::config::{AiModel, ProviderConfig, TaskKind};

/// The two read-only queries the core depends on.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The profile whose task-appropriate "is active" flag is set, or `None`
    /// when no profile is active. Uniqueness is enforced upstream; when the
    /// store does hold several, the first is returned.
    async fn active_config(&self, task: TaskKind) -> Result<Option<ProviderConfig>>;

    /// Fetch one model row by id.
    async fn model(&self, id: &str) -> Result<Option<AiModel>>;
}

/// In-memory store for tests and embedded setups.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    configs: RwLock<Vec<ProviderConfig>>,
    models: RwLock<Vec<AiModel>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_config(&self, config: ProviderConfig) {
        self.configs.write().push(config);
    }

    pub fn add_model(&self, model: AiModel) {
        self.models.write().push(model);
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn active_config(&self, task: TaskKind) -> Result<Option<ProviderConfig>> {
        Ok(self
            .configs
            .read()
            .iter()
            .find(|c| c.is_active_for(task))
            .cloned())
    }

    async fn model(&self, id: &str) -> Result<Option<AiModel>> {
        Ok(self.models.read().iter().find(|m| m.id == id).cloned())
    }
}
