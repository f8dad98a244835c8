use crate::collection::StorageError;
use crate::entity::{Document, ID_FIELD};
use crate::query::Projection;

/// How a projection shapes documents once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Include,
    Exclude,
}

/// Validated projection, ready to apply to many documents.
///
/// `_id` is kept unless excluded explicitly. Apart from `_id`, a projection
/// either includes or excludes fields; it cannot do both.
#[derive(Debug, Clone)]
pub(crate) struct Shape<'a> {
    projection: &'a Projection,
    mode: Mode,
    keep_id: bool,
}

impl<'a> Shape<'a> {
    pub(crate) fn new(projection: &'a Projection) -> Result<Self, StorageError> {
        let mut mode = None;
        for (field, included) in projection.fields() {
            if field == ID_FIELD {
                continue;
            }
            let this = if included { Mode::Include } else { Mode::Exclude };
            match mode {
                Some(existing) if existing != this => {
                    return Err(StorageError::InvalidProjection(format!(
                        "cannot mix inclusion and exclusion (field {})",
                        field
                    )));
                }
                _ => mode = Some(this),
            }
        }

        let keep_id = projection.get(ID_FIELD).unwrap_or(true);
        let mode = mode.unwrap_or(if keep_id { Mode::Include } else { Mode::Exclude });

        Ok(Self {
            projection,
            mode,
            keep_id,
        })
    }

    pub(crate) fn apply(&self, doc: &Document) -> Document {
        match self.mode {
            Mode::Include => doc
                .iter()
                .filter(|(key, _)| {
                    if key.as_str() == ID_FIELD {
                        self.keep_id
                    } else {
                        self.projection.get(key) == Some(true)
                    }
                })
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Mode::Exclude => doc
                .iter()
                .filter(|(key, _)| self.projection.get(key) != Some(false))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Validates an optional projection. An empty projection narrows nothing.
pub(crate) fn resolve(projection: Option<&Projection>) -> Result<Option<Shape<'_>>, StorageError> {
    projection.filter(|p| !p.is_empty()).map(Shape::new).transpose()
}

/// Applies an optional projection; `None` returns the document unchanged.
pub(crate) fn project(doc: &Document, shape: Option<&Shape<'_>>) -> Document {
    match shape {
        Some(shape) => shape.apply(doc),
        None => doc.clone(),
    }
}
