//! Read-only registry of known billing providers.
//!
//! Seeded once at startup, either from the embedded provider list or from a
//! JSON file of the same shape, and shared read-only afterwards.

use crate::error::CatalogError;
use crate::types::{Category, Provider};
use std::collections::HashMap;

/// Embedded default provider list.
const SEED_JSON: &str = include_str!("../data/providers.json");

/// Immutable provider catalog.
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: Vec<Provider>,
    index: HashMap<String, usize>,
}

impl ProviderCatalog {
    /// Build a catalog from providers in insertion order.
    ///
    /// Rejects empty and duplicate ids.
    pub fn new(providers: Vec<Provider>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(providers.len());
        for (pos, provider) in providers.iter().enumerate() {
            if provider.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(pos));
            }
            if index.insert(provider.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(provider.id.clone()));
            }
        }
        Ok(Self { providers, index })
    }

    /// Parse a JSON array of providers.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let providers: Vec<Provider> = serde_json::from_str(json)?;
        Self::new(providers)
    }

    /// The embedded Pakistani provider list.
    pub fn seeded() -> Result<Self, CatalogError> {
        Self::from_json(SEED_JSON)
    }

    pub fn lookup(&self, id: &str) -> Option<&Provider> {
        self.index.get(id).map(|&pos| &self.providers[pos])
    }

    /// Every provider, active or not, in insertion order.
    pub fn list_all(&self) -> &[Provider] {
        &self.providers
    }

    /// Active providers only, in insertion order.
    pub fn list_active(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter().filter(|p| p.active)
    }

    pub fn list_by_category(&self, category: Category) -> Vec<&Provider> {
        self.providers
            .iter()
            .filter(|p| p.category == category && p.active)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
