use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field inclusion map applied to result documents.
///
/// `true` includes a field, `false` excludes it. How mixed maps are treated is
/// up to the storage engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection {
    fields: BTreeMap<String, bool>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(self, field: impl Into<String>) -> Self {
        self.with(field, true)
    }

    pub fn exclude(self, field: impl Into<String>) -> Self {
        self.with(field, false)
    }

    pub fn with(mut self, field: impl Into<String>, included: bool) -> Self {
        self.fields.insert(field.into(), included);
        self
    }

    /// Returns the flag for `field`, if the projection mentions it.
    pub fn get(&self, field: &str) -> Option<bool> {
        self.fields.get(field).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, bool)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Projection {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Projection::new(), |p, (field, included)| p.with(field, included))
    }
}
