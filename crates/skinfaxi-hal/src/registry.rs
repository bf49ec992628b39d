//! Provider registry.
//!
//! Maps a provider name to a [`TargetProvider`] strategy. Providers are
//! added by registration, so supporting a new backend never means editing a
//! dispatch chain.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tracing::debug;

use skinfaxi_types::TypedParams;

use crate::credentials::Credentials;
use crate::error::{HalError, HalResult};
use crate::target::Target;

/// A registered provider strategy.
#[async_trait]
pub trait TargetProvider: Send + Sync {
    /// Provider name (lowercase).
    fn name(&self) -> &str;

    /// Build credentials for this provider from typed parameters.
    ///
    /// The default is no authentication; providers that need credentials
    /// override this and return [`HalError::MissingCredential`] when a
    /// required field is absent.
    fn credentials(&self, params: &TypedParams) -> HalResult<Credentials> {
        let _ = params;
        Ok(Credentials::None)
    }

    /// Resolve a device name to a target.
    ///
    /// Unknown devices yield [`HalError::TargetNotFound`], never a panic.
    async fn resolve(
        &self,
        device: &str,
        credentials: &Credentials,
    ) -> HalResult<Arc<dyn Target>>;
}

/// Registry of target providers.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: FxHashMap<String, Arc<dyn TargetProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name.
    pub fn register(&mut self, provider: Arc<dyn TargetProvider>) {
        let name = provider.name().to_lowercase();
        debug!("Registering target provider: {}", name);
        self.providers.insert(name, provider);
    }

    /// Look up a provider by name, case-insensitively.
    pub fn provider(&self, name: &str) -> Option<&Arc<dyn TargetProvider>> {
        self.providers.get(&name.to_lowercase())
    }

    /// Resolve `(provider, device)` to a target in one step.
    ///
    /// Builds the provider's credentials from `params` first; resolution for
    /// authenticated providers requires that to have succeeded.
    pub async fn resolve(
        &self,
        provider: &str,
        device: &str,
        params: &TypedParams,
    ) -> HalResult<Arc<dyn Target>> {
        let strategy = self
            .provider(provider)
            .ok_or_else(|| HalError::TargetNotFound {
                provider: provider.to_string(),
                device: device.to_string(),
            })?;
        let credentials = strategy.credentials(params)?;
        strategy.resolve(device, &credentials).await
    }

    /// Names of all registered providers, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a provider is registered.
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(&name.to_lowercase())
    }
}
