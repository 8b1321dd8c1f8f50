use crate::{mapping::ResultSetMapping, plan::ValuesMapping, row::RowMetadata};
use bindery_core::{Metadata, Result};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

/// Per-shape plan cache: named mappings resolve at most once per distinct
/// column shape, and the resolved plan is shared as an `Arc` across threads.
///
/// Dynamic and anonymous mappings are resolved fresh every time; they have no
/// stable identity to key on.
#[derive(Debug, Default)]
pub struct MappingCache {
    plans: Mutex<HashMap<MappingKey, Arc<ValuesMapping>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MappingKey {
    mapping_id: String,

    /// Column names of the row shape, in order. The same mapping resolved
    /// against a different shape produces a different plan.
    row_fingerprint: Vec<String>,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &self,
        mapping: &ResultSetMapping,
        row: &dyn RowMetadata,
        metadata: &Metadata,
    ) -> Result<Arc<ValuesMapping>> {
        let Some(id) = mapping.id().filter(|_| !mapping.is_dynamic()) else {
            return Ok(Arc::new(mapping.resolve(row, metadata)?));
        };

        let key = MappingKey {
            mapping_id: id.to_string(),
            row_fingerprint: (1..=row.column_count())
                .map(|position| row.column_name(position).to_string())
                .collect(),
        };

        // Resolution is pure in-memory work; holding the lock across it is
        // what guarantees at most one resolution per key under concurrent
        // first use.
        let mut plans = self
            .plans
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(plan) = plans.get(&key) {
            return Ok(plan.clone());
        }

        let plan = Arc::new(mapping.resolve(row, metadata)?);
        plans.insert(key, plan.clone());
        Ok(plan)
    }
}
