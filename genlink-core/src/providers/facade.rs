//! Provider facade: the single entry point callers depend on
//!
//! Holds one adapter per configured backend and routes every call to the
//! one selected at construction. There is no fallback between providers.

use crate::config::{ConfigError, GenlinkConfig, ProviderType};
use crate::protocol::GenerationRequest;
use crate::providers::adapter::{AdapterConfig, ProviderAdapter};
use crate::providers::anthropic::AnthropicAdapter;
use crate::providers::error::ProviderResult;
use crate::providers::openai::OpenAIAdapter;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl ProviderType {
    /// Create an adapter of this type
    pub fn create_adapter(
        &self,
        config: AdapterConfig,
    ) -> Result<Arc<dyn ProviderAdapter>, ConfigError> {
        let adapter: Arc<dyn ProviderAdapter> = match self {
            ProviderType::Anthropic => Arc::new(AnthropicAdapter::new(config)?),
            ProviderType::OpenAI => Arc::new(OpenAIAdapter::new(config)?),
        };
        Ok(adapter)
    }
}

/// Routes generation and validation to the configured adapter
#[derive(Clone)]
pub struct ProviderFacade {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    selected_name: String,
    selected: Arc<dyn ProviderAdapter>,
}

impl std::fmt::Debug for ProviderFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFacade")
            .field("providers", &self.providers())
            .field("selected", &self.selected_name)
            .finish()
    }
}

impl ProviderFacade {
    pub fn builder() -> FacadeBuilder {
        FacadeBuilder::new()
    }

    /// Build every enabled provider in `config` and select `config.provider`
    pub fn from_config(config: &GenlinkConfig) -> Result<Self, ConfigError> {
        let mut builder = FacadeBuilder::new().select(config.provider.clone());

        for provider in config.providers.iter().filter(|p| p.enabled) {
            let mut adapter_config = AdapterConfig::new(provider.api_key.clone())
                .with_generation_retry(config.retry.generation_or_default())
                .with_validation_retry(config.retry.validation_or_default());

            if let Some(base_url) = &provider.base_url {
                adapter_config = adapter_config.with_base_url(base_url.clone());
            }
            if let Some(model) = &provider.model {
                adapter_config = adapter_config.with_model(model.clone());
            }
            if let Some(organization) = &provider.organization {
                adapter_config = adapter_config.with_organization(organization.clone());
            }

            debug!(
                provider = %provider.name,
                backend = provider.provider_type.as_str(),
                api_key = %provider.api_key.partial_redact(),
                "building provider adapter"
            );
            let adapter = provider.provider_type.create_adapter(adapter_config)?;
            builder = builder.adapter_named(provider.name.clone(), adapter);
        }

        builder.build()
    }

    /// Registry key of the adapter serving calls
    pub fn selected(&self) -> &str {
        &self.selected_name
    }

    /// Look up a configured adapter by name
    pub fn adapter(&self, name: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(name)
    }

    /// Names of all configured adapters, sorted
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ProviderAdapter for ProviderFacade {
    fn name(&self) -> &str {
        &self.selected_name
    }

    async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> ProviderResult<String> {
        self.selected.generate_with_cancel(request, cancel).await
    }

    async fn validate(&self) -> bool {
        self.selected.validate().await
    }
}

/// Builder for [`ProviderFacade`]
#[derive(Default)]
pub struct FacadeBuilder {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    selected: Option<String>,
}

impl FacadeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name
    pub fn adapter(self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        let name = adapter.name().to_string();
        self.adapter_named(name, adapter)
    }

    /// Register an adapter under an explicit name
    pub fn adapter_named(mut self, name: impl Into<String>, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(name.into(), adapter);
        self
    }

    /// Choose the adapter that serves calls
    pub fn select(mut self, name: impl Into<String>) -> Self {
        self.selected = Some(name.into());
        self
    }

    pub fn build(self) -> Result<ProviderFacade, ConfigError> {
        if self.adapters.is_empty() {
            return Err(ConfigError::Selection {
                message: "at least one provider adapter is required".to_string(),
            });
        }

        let (name, selected) = match self.selected {
            Some(name) => {
                let adapter = self.adapters.get(&name).cloned().ok_or_else(|| {
                    ConfigError::Selection {
                        message: format!("selected provider '{}' is not configured", name),
                    }
                })?;
                (name, adapter)
            }
            None => match (self.adapters.len(), self.adapters.iter().next()) {
                (1, Some((name, adapter))) => (name.clone(), adapter.clone()),
                _ => {
                    return Err(ConfigError::Selection {
                        message: "a provider must be selected when more than one is configured"
                            .to_string(),
                    })
                }
            },
        };

        info!(provider = %name, "provider facade ready");
        Ok(ProviderFacade {
            adapters: self.adapters,
            selected_name: name,
            selected,
        })
    }
}
