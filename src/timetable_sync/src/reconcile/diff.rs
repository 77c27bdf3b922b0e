//! Bookkeeping shared by every reference class: which natural keys the
//! document wants, which of them already exist, and how source ids map onto
//! the final persisted ids.

use std::{collections::HashMap, hash::Hash};

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    error::{ImportError, ImportResult},
    ids::{SourceId, SourceMap},
};

/// Rows the document asks for, collapsed by natural key.
#[derive(Debug, Clone)]
pub struct Collected<K, R> {
    rows: IndexMap<K, R>,
    sources: Vec<(SourceId, K)>,
}

impl<K, R> Default for Collected<K, R> {
    fn default() -> Self {
        Self {
            rows: IndexMap::new(),
            sources: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + Hash, R> Collected<K, R> {
    /// Records that `source` denotes the row with natural key `key`.
    /// The first row seen for a key is the one that gets inserted.
    pub fn push(&mut self, source: SourceId, key: K, row: R) {
        self.rows.entry(key.clone()).or_insert(row);
        self.sources.push((source, key));
    }

    /// Distinct natural keys, in first-seen order.
    pub fn keys(&self) -> Vec<K> {
        self.rows.keys().cloned().collect()
    }

    /// Number of distinct natural keys.
    pub fn distinct(&self) -> usize {
        self.rows.len()
    }

    /// Number of source ids seen.
    pub fn sources(&self) -> usize {
        self.sources.len()
    }

    /// Row wanted for `key`.
    pub fn row(&self, key: &K) -> Option<&R> {
        self.rows.get(key)
    }

    /// Splits the wanted rows into those already persisted and those to insert.
    pub fn plan<Id: Copy>(self, existing: HashMap<K, Id>) -> Plan<K, R, Id> {
        let mut matched = HashMap::with_capacity(existing.len());
        let mut to_create = Vec::new();
        for (key, row) in self.rows {
            match existing.get(&key) {
                Some(id) => {
                    matched.insert(key, *id);
                }
                None => to_create.push((key, row)),
            }
        }
        Plan {
            matched,
            to_create,
            sources: self.sources,
        }
    }
}

/// Outcome of matching wanted rows against the store.
#[derive(Debug)]
pub struct Plan<K, R, Id> {
    matched: HashMap<K, Id>,
    to_create: Vec<(K, R)>,
    sources: Vec<(SourceId, K)>,
}

impl<K: Eq + Hash, R, Id: Copy> Plan<K, R, Id> {
    /// Rows with no persisted counterpart, in document order.
    pub fn to_create(&self) -> &[(K, R)] {
        &self.to_create
    }

    /// Keys that matched an existing row.
    pub fn matched(&self) -> usize {
        self.matched.len()
    }

    /// Maps every source id to its persisted id, using `created` for the rows
    /// that were just inserted.
    pub fn finish(
        self,
        entity: &'static str,
        created: HashMap<K, Id>,
    ) -> ImportResult<Reconciled<Id>> {
        if created.len() != self.to_create.len() {
            return Err(ImportError::StoreInvariant {
                entity,
                expected: self.to_create.len(),
                returned: created.len(),
            });
        }

        let mut map = SourceMap::default();
        for (source, key) in self.sources {
            let id = self
                .matched
                .get(&key)
                .or_else(|| created.get(&key))
                .copied()
                .ok_or(ImportError::StoreInvariant {
                    entity,
                    expected: self.to_create.len(),
                    returned: created.len(),
                })?;
            map.insert(source, id);
        }

        Ok(Reconciled {
            map,
            count: EntityCount {
                matched: self.matched.len(),
                created: created.len(),
            },
        })
    }
}

/// Matched-existing vs newly-created rows for one entity class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCount {
    /// Distinct natural keys that resolved to an existing row.
    pub matched: usize,
    /// Rows inserted by this run.
    pub created: usize,
}

impl EntityCount {
    /// Distinct rows the run touched.
    pub const fn total(&self) -> usize {
        self.matched + self.created
    }
}

/// Result of reconciling one entity class.
#[derive(Debug, Clone)]
pub struct Reconciled<Id> {
    /// Source id → persisted id, total over the source ids observed.
    pub map: SourceMap<Id>,
    /// Match/create counts.
    pub count: EntityCount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SubjectId;

    #[test]
    fn sources_sharing_a_key_resolve_to_one_row() {
        let mut wanted: Collected<String, &str> = Collected::default();
        wanted.push("S1".into(), "Maths".into(), "MA");
        wanted.push("S2".into(), "Art".into(), "AR");
        wanted.push("S3".into(), "Maths".into(), "MX"); // duplicate key, first row wins
        assert_eq!(wanted.distinct(), 2);
        assert_eq!(wanted.sources(), 3);
        assert_eq!(wanted.row(&"Maths".to_string()), Some(&"MA"));

        let existing = HashMap::from([("Art".to_string(), SubjectId(7))]);
        let plan = wanted.plan(existing);
        assert_eq!(plan.matched(), 1);
        assert_eq!(plan.to_create().len(), 1);
        assert_eq!(plan.to_create()[0].0, "Maths");

        let created = HashMap::from([("Maths".to_string(), SubjectId(9))]);
        let done = plan.finish("subject", created).unwrap();
        assert_eq!(done.map.resolve("S1"), Some(SubjectId(9)));
        assert_eq!(done.map.resolve("S3"), Some(SubjectId(9)));
        assert_eq!(done.map.resolve("S2"), Some(SubjectId(7)));
        assert_eq!(done.count, EntityCount { matched: 1, created: 1 });
    }

    #[test]
    fn missing_created_id_is_a_store_invariant_violation() {
        let mut wanted: Collected<String, ()> = Collected::default();
        wanted.push("S1".into(), "Maths".into(), ());
        let plan = wanted.plan::<SubjectId>(HashMap::new());
        let err = plan.finish("subject", HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::StoreInvariant { entity: "subject", expected: 1, returned: 0 }
        ));
    }
}
