use serde::{Deserialize, Serialize};

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

/// Ordered sort specification. Earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    keys: Vec<(String, SortOrder)>,
}

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.by(field, SortOrder::Ascending)
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.by(field, SortOrder::Descending)
    }

    /// Adds a key. Re-adding a field replaces its direction in place.
    pub fn by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        let field = field.into();
        match self.keys.iter_mut().find(|(f, _)| *f == field) {
            Some(existing) => existing.1 = order,
            None => self.keys.push((field, order)),
        }
        self
    }

    pub fn keys(&self) -> &[(String, SortOrder)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SortOrder)> for Sort {
    fn from_iter<I: IntoIterator<Item = (S, SortOrder)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Sort::new(), |sort, (field, order)| sort.by(field, order))
    }
}
