use indexmap::IndexMap;

use crate::error::{ConvertError, Result};

/// Class name used by the default category table
pub const DEFAULT_CATEGORY: &str = "Stopsign";

/// Mapping from object class name to its 1-based integer label.
///
/// Labels follow the insertion order of the names, so the first name gets
/// label `1`. The table is built once before conversion starts and handed to
/// the encoder by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    labels: IndexMap<String, i64>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        let mut labels = IndexMap::new();
        labels.insert(DEFAULT_CATEGORY.to_string(), 1);
        Self { labels }
    }
}

impl CategoryMap {
    /// Build a table from an ordered list of class names.
    ///
    /// A name that appears twice is rejected rather than overriding the
    /// earlier label.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels = IndexMap::new();
        for name in names {
            let name = name.into();
            let next_label = labels.len() as i64 + 1;
            if labels.insert(name.clone(), next_label).is_some() {
                return Err(ConvertError::DuplicateCategory(name));
            }
        }
        Ok(Self { labels })
    }

    /// Look up the label of a class name
    pub fn label(&self, name: &str) -> Result<i64> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| ConvertError::UnknownCategory(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over `(name, label)` pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.labels.iter().map(|(name, &label)| (name.as_str(), label))
    }
}
