//! Configuration-driven provider factory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use paygate_types::{GatewayMode, PaymentApiConfig, PaymentError, PaymentProvider, ProviderKind};

use crate::{AsaasAdapter, CustomGateway};

/// Builds the provider selected by configuration and caches one instance
/// per provider kind.
///
/// Owned by the composition root. Repeated lookups for the same kind return
/// the same `Arc`; [`ProviderRegistry::reset`] drops the cache.
#[derive(Default)]
pub struct ProviderRegistry {
    cache: Mutex<HashMap<ProviderKind, Arc<dyn PaymentProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<ProviderKind, Arc<dyn PaymentProvider>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the provider named by `config.provider`.
    ///
    /// Fails with `Configuration` for an unknown name and with
    /// `CustomGatewayProductionBlocked` for the custom gateway outside test
    /// mode. Neither case instantiates or caches anything.
    pub fn provider(
        &self,
        config: &PaymentApiConfig,
    ) -> Result<Arc<dyn PaymentProvider>, PaymentError> {
        let kind: ProviderKind = config
            .provider
            .parse()
            .map_err(PaymentError::Configuration)?;

        if kind == ProviderKind::Custom && config.custom_gateway_mode == GatewayMode::Production {
            return Err(PaymentError::CustomGatewayProductionBlocked);
        }

        let mut cache = self.cache();
        if let Some(provider) = cache.get(&kind) {
            return Ok(Arc::clone(provider));
        }

        let provider: Arc<dyn PaymentProvider> = match kind {
            ProviderKind::Asaas => Arc::new(AsaasAdapter::new(&config.asaas)?),
            ProviderKind::Custom => Arc::new(CustomGateway::new(config.custom_gateway_mode)?),
        };
        info!(provider = %kind, "Payment provider initialized");

        cache.insert(kind, Arc::clone(&provider));
        Ok(provider)
    }

    /// Drops every cached instance.
    pub fn reset(&self) {
        self.cache().clear();
    }

    #[cfg(test)]
    fn cached_count(&self) -> usize {
        self.cache().len()
    }
}
