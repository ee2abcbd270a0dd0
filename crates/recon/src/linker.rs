use std::collections::HashMap;
use std::fmt;

use jdfmerge_core::BatchId;

/// A batch-local reference to an entity: the batch namespace, the local
/// identifier and, for entity types that carry one, the local secondary
/// disambiguator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalKey {
    pub batch: BatchId,
    pub id: String,
    pub secondary: Option<String>,
}

impl LocalKey {
    pub fn new(batch: &BatchId, id: &str) -> Self {
        Self {
            batch: batch.clone(),
            id: id.to_string(),
            secondary: None,
        }
    }

    pub fn with_secondary(batch: &BatchId, id: &str, secondary: &str) -> Self {
        Self {
            batch: batch.clone(),
            id: id.to_string(),
            secondary: Some(secondary.to_string()),
        }
    }

    /// The local identifier without the batch, as shown in reports.
    pub fn describe(&self) -> String {
        match &self.secondary {
            Some(secondary) => format!("{}/{}", self.id, secondary),
            None => self.id.clone(),
        }
    }
}

impl fmt::Display for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.batch, self.describe())
    }
}

/// A lookup that found no canonical entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub entity: &'static str,
    pub key: LocalKey,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unresolved {} {}", self.entity, self.key)
    }
}

/// Maps batch-local references of one entity type to canonical values.
///
/// Built while that entity type is merged; dependent merges only ever get a
/// shared reference to it, so it cannot change once their phase starts.
#[derive(Debug, Clone)]
pub struct Linker<V> {
    entity: &'static str,
    entries: HashMap<LocalKey, V>,
}

impl<V> Linker<V> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            entries: HashMap::new(),
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Insert or overwrite. Returns the previous value for the same key.
    pub fn insert(&mut self, key: LocalKey, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn lookup(&self, key: &LocalKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn resolve(&self, key: &LocalKey) -> Result<&V, Unresolved> {
        self.lookup(key).ok_or_else(|| Unresolved {
            entity: self.entity,
            key: key.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite every value; entries mapped to `None` are removed.
    pub fn map_values<W>(self, mut f: impl FnMut(&V) -> Option<W>) -> Linker<W> {
        Linker {
            entity: self.entity,
            entries: self
                .entries
                .into_iter()
                .filter_map(|(key, value)| f(&value).map(|mapped| (key, mapped)))
                .collect(),
        }
    }
}
