use crate::{
    builders::{FetchBuilder, ResultBuilder},
    plan::ValuesMapping,
    resolver::ResolutionState,
    row::RowMetadata,
};
use bindery_core::{Metadata, Result};
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// A declarative result-set mapping: the ordered top-level result builders
/// plus a side table of legacy fetch declarations keyed by owner alias and
/// attribute name.
///
/// `resolve` binds the mapping onto one concrete JDBC column shape; the
/// produced [`ValuesMapping`] is the cacheable per-shape plan.
#[derive(Debug, Clone)]
pub struct ResultSetMapping {
    id: Option<String>,

    /// Runtime-assembled mappings compare by content; statically declared
    /// ones compare by identifier alone.
    dynamic: bool,

    results: Vec<ResultBuilder>,

    legacy_fetches: IndexMap<(String, String), FetchBuilder>,
}

impl ResultSetMapping {
    /// A statically declared mapping, identified by name.
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            dynamic: false,
            results: vec![],
            legacy_fetches: IndexMap::new(),
        }
    }

    /// A runtime-assembled mapping with no stable identity.
    pub fn dynamic() -> Self {
        Self {
            id: None,
            dynamic: true,
            results: vec![],
            legacy_fetches: IndexMap::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn add_result(&mut self, builder: ResultBuilder) {
        self.results.push(builder);
    }

    pub fn add_legacy_fetch(&mut self, builder: FetchBuilder) {
        let key = (builder.owner_alias.clone(), builder.attribute.clone());
        self.legacy_fetches.insert(key, builder);
    }

    /// Binds this mapping onto one JDBC column shape. With no configured
    /// builders, falls back to one implicit scalar result per column, in
    /// column order.
    pub fn resolve(&self, row: &dyn RowMetadata, metadata: &Metadata) -> Result<ValuesMapping> {
        let mut state = ResolutionState::new(row, metadata, &self.legacy_fetches);

        if self.results.is_empty() {
            for position in 1..=row.column_count() {
                state.build_implicit_scalar(position)?;
            }
        } else {
            for builder in &self.results {
                state.build_result(builder)?;
            }
        }

        Ok(state.finish())
    }
}

/// Non-dynamic mappings with the same identifier are equal without content
/// comparison; dynamic mappings compare deeply. Hashing uses only the
/// identifier and the dynamic flag, consistent with either branch.
impl PartialEq for ResultSetMapping {
    fn eq(&self, other: &Self) -> bool {
        if !self.dynamic && !other.dynamic {
            return self.id == other.id;
        }

        self.dynamic == other.dynamic
            && self.id == other.id
            && self.results == other.results
            && self.legacy_fetches == other.legacy_fetches
    }
}

impl Eq for ResultSetMapping {}

impl Hash for ResultSetMapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.dynamic.hash(state);
    }
}
