//! Secret resolution for provider API keys.
//!
//! Provider profiles store the *name* of the environment variable holding
//! their key, not the key itself. Adapters receive a resolved key at
//! construction time through a [`SecretResolver`] injected by the
//! composition root, so nothing below the root touches the process
//! environment directly.

use std::collections::HashMap;

/// Resolves a secret by the name configured on the provider profile.
pub trait SecretResolver: Send + Sync {
    /// Returns the secret value, or `None` when unset or empty.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretResolver for EnvSecrets {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// Map-backed resolver for tests and embedded setups.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl SecretResolver for StaticSecrets {
    fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|v| !v.is_empty()).cloned()
    }
}
