//! `FeatureRegistry` — the static feature metadata table.

use std::collections::HashMap;

use super::feature::{default_features, Feature};

/// Immutable, process-lifetime table of known features, keyed by id.
#[derive(Debug)]
pub struct FeatureRegistry {
    features: HashMap<String, Feature>,
}

impl FeatureRegistry {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features: features.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    pub fn default_enabled(&self, id: &str) -> bool {
        self.features.get(id).map(|f| f.default_enabled).unwrap_or(false)
    }

    pub fn all(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Lookup a feature by its canonical `X-Feature-<Name>` header name,
    /// case-insensitively.
    pub fn by_header_name(&self, header: &str) -> Option<&Feature> {
        self.features.values().find(|f| f.header_name.eq_ignore_ascii_case(header))
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new(default_features())
    }
}
