//! Provider acquisition contract and the startup-time adapter registry.

use crate::types::AcquisitionResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A strategy for obtaining a real bill from one provider.
///
/// `attempt` never fails in the `Result` sense: every failure mode collapses
/// into an [`AcquisitionResult`] with status `notFound` or `error` and a
/// populated failure reason. It may take arbitrarily long, so callers bound
/// it with their own deadline.
#[async_trait]
pub trait AcquisitionAdapter: Send + Sync {
    /// Short name used in logs, e.g. `"lesco-scraper"`.
    fn name(&self) -> &str;

    async fn attempt(&self, bill_number: &str, customer_reference: Option<&str>)
        -> AcquisitionResult;
}

/// Maps provider ids to their live acquisition adapter.
///
/// Built once at startup. A provider without an entry takes the generic mock
/// path.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn AcquisitionAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` for `provider_id`, replacing any previous entry.
    pub fn register(
        &mut self,
        provider_id: impl Into<String>,
        adapter: Arc<dyn AcquisitionAdapter>,
    ) -> &mut Self {
        self.adapters.insert(provider_id.into(), adapter);
        self
    }

    pub fn with(mut self, provider_id: impl Into<String>, adapter: Arc<dyn AcquisitionAdapter>) -> Self {
        self.register(provider_id, adapter);
        self
    }

    pub fn get(&self, provider_id: &str) -> Option<&Arc<dyn AcquisitionAdapter>> {
        self.adapters.get(provider_id)
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.adapters.contains_key(provider_id)
    }

    /// Registered provider ids, sorted.
    pub fn provider_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
