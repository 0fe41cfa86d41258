//! Caching provider selection.
//!
//! [`ProviderService`] is the one entry point the rest of the application
//! talks to. It resolves the operator's active profile per task kind, builds
//! the adapter through the factory, and keeps it for [`CACHE_TTL`] so a burst
//! of analyses does not hammer the config store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use lucid_llm::{AnalysisResponse, DreamAnalyzer, DreamData, Error, Result, SecretResolver};

use crate::config::{ProviderConfig, ProviderType, TaskKind};
use crate::factory;
use crate::store::ConfigStore;

/// How long a resolved adapter is served before the configuration is
/// re-read.
pub const CACHE_TTL: Duration = Duration::from_secs(60);

struct CacheSlot {
    analyzer: Arc<dyn DreamAnalyzer>,
    config: ProviderConfig,
    created: Instant,
}

/// Outcome of a diagnostic connectivity probe. Always returned, never
/// raised; the admin surface renders it as-is.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
}

/// Read-only snapshot of the active configuration for a task, for display.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveProviderInfo {
    pub provider_type: ProviderType,
    pub name: String,
    pub model_id: Option<String>,
    pub model_name: Option<String>,
}

/// The application-facing selection service.
///
/// Constructed once at the composition root with the stores it should read
/// from; tests construct isolated instances with in-memory fakes.
pub struct ProviderService {
    store: Arc<dyn ConfigStore>,
    secrets: Arc<dyn SecretResolver>,
    text: Mutex<Option<CacheSlot>>,
    image: Mutex<Option<CacheSlot>>,
}

impl std::fmt::Debug for ProviderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderService").finish_non_exhaustive()
    }
}

impl ProviderService {
    pub fn new(store: Arc<dyn ConfigStore>, secrets: Arc<dyn SecretResolver>) -> Self {
        Self {
            store,
            secrets,
            text: Mutex::new(None),
            image: Mutex::new(None),
        }
    }

    fn slot(&self, task: TaskKind) -> &Mutex<Option<CacheSlot>> {
        match task {
            TaskKind::Text => &self.text,
            TaskKind::Image => &self.image,
        }
    }

    /// The adapter currently selected for `task`, building and caching it if
    /// the slot is empty or stale.
    ///
    /// The lock is never held across an await; a concurrent refresh may
    /// build a redundant adapter, which is harmless since the last writer
    /// installs a consistent slot as one unit.
    pub async fn provider(&self, task: TaskKind) -> Result<Arc<dyn DreamAnalyzer>> {
        {
            let slot = self.slot(task).lock();
            if let Some(cached) = slot.as_ref() {
                if cached.created.elapsed() < CACHE_TTL {
                    tracing::debug!(task = %task, provider = %cached.config.name, "serving cached provider");
                    return Ok(Arc::clone(&cached.analyzer));
                }
            }
        }

        let config = self.store.active_config(task).await?.ok_or_else(|| {
            Error::config(format!("no active AI provider is configured for {task} tasks"))
        })?;
        let model_id = config
            .default_model_id(task)
            .ok_or_else(|| {
                Error::config(format!(
                    "provider '{}' has no default model for {task} tasks; configure one first",
                    config.name
                ))
            })?
            .to_string();
        let model = self.store.model(&model_id).await?.ok_or_else(|| {
            Error::config(format!(
                "model '{model_id}' selected for {task} tasks does not exist"
            ))
        })?;

        let analyzer = factory::create_analyzer(&config, &model, self.secrets.as_ref())?;
        tracing::debug!(
            task = %task,
            provider = %config.name,
            model = %model.model_id,
            "provider cache refreshed"
        );
        *self.slot(task).lock() = Some(CacheSlot {
            analyzer: Arc::clone(&analyzer),
            config,
            created: Instant::now(),
        });
        Ok(analyzer)
    }

    /// Analyze a dream with the active text provider.
    ///
    /// Adapter errors pass through unchanged; their messages already name
    /// the provider and failure kind.
    pub async fn analyze_dream(&self, dream: &DreamData) -> Result<AnalysisResponse> {
        self.provider(TaskKind::Text).await?.analyze_dream(dream).await
    }

    /// Generate a dream illustration with the active image provider.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.provider(TaskKind::Image).await?.generate_image(prompt).await
    }

    /// Drop one or both cache slots so the next call re-reads configuration.
    /// Called after an operator edits the active-provider settings.
    pub fn clear_cache(&self, task: Option<TaskKind>) {
        match task {
            Some(task) => *self.slot(task).lock() = None,
            None => {
                *self.text.lock() = None;
                *self.image.lock() = None;
            }
        }
        tracing::debug!(task = ?task, "provider cache cleared");
    }

    /// Diagnostic probe for the admin surface: resolve the provider for
    /// `task` and issue one minimal analyze call with placeholder data.
    pub async fn test_connection(&self, task: TaskKind) -> ConnectionReport {
        let probe = DreamData::new(
            "A short test dream about walking through a quiet morning garden.",
        );
        let outcome = async {
            let provider = self.provider(task).await?;
            provider.analyze_dream(&probe).await?;
            Ok::<_, Error>(provider.provider_name().to_string())
        }
        .await;
        match outcome {
            Ok(name) => ConnectionReport {
                success: true,
                message: format!("{name}: connection OK"),
            },
            Err(err) => ConnectionReport {
                success: false,
                message: err.to_string(),
            },
        }
    }

    /// The active profile and model for `task`, straight from the store.
    /// Bypasses the cache so the admin surface always sees current settings.
    pub async fn active_provider_info(&self, task: TaskKind) -> Result<Option<ActiveProviderInfo>> {
        let Some(config) = self.store.active_config(task).await? else {
            return Ok(None);
        };
        let model = match config.default_model_id(task) {
            Some(id) => self.store.model(id).await?,
            None => None,
        };
        Ok(Some(ActiveProviderInfo {
            provider_type: config.provider_type,
            name: config.name,
            model_id: model.as_ref().map(|m| m.model_id.clone()),
            model_name: model.map(|m| m.name),
        }))
    }
}
