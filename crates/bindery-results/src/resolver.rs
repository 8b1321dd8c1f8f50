//! Resolution state shared by all builders of one mapping while it binds
//! onto one JDBC column shape.

use crate::{
    builders::{
        EntityResultBuilder, FetchBuilder, InstantiationResultBuilder, ResultBuilder,
        ScalarColumn, ScalarResultBuilder,
    },
    plan::{DomainResult, Fetch, SqlSelection, ValuesMapping},
    row::RowMetadata,
};
use bindery_core::{
    schema::{
        binding::{AttributeBinding, EntityBinding, RelationalValueBinding},
        relational::Value,
    },
    types::ScalarType,
    Error, Metadata, Result,
};
use indexmap::IndexMap;
use std::collections::HashSet;

/// How a selection was requested; the registry key that makes repeated
/// consumption of the same column converge on one selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SelectionKey {
    Alias(String),
    /// 1-based ordinal.
    Position(usize),
}

/// The fetch-builder sources tried in priority order for each fetchable
/// association.
enum FetchResolver<'b> {
    /// Fetch builders pushed by the result builder currently being resolved.
    Explicit(&'b IndexMap<String, FetchBuilder>),
    /// The mapping-level `(owner alias, attribute)` lookup table populated
    /// from older-style fetch declarations.
    Legacy,
}

pub(crate) struct ResolutionState<'a> {
    row: &'a dyn RowMetadata,

    metadata: &'a Metadata,

    legacy_fetches: &'a IndexMap<(String, String), FetchBuilder>,

    selections: Vec<SqlSelection>,

    registry: IndexMap<SelectionKey, usize>,

    /// Flipped permanently once a non-scalar result is seen; join-fetch
    /// expansion can insert columns at arbitrary positions, making ordinal
    /// access unsafe from then on.
    positional_locked: bool,

    /// Aliases that legitimately appear more than once in the row because
    /// they name the same entity's key across several of its own tables.
    known_duplicates: HashSet<String>,

    /// Entities currently being resolved, outermost first. A fetch target
    /// already on this path is circular.
    fetch_path: Vec<String>,

    resolving_circular_fetch: bool,

    /// Entity whose foreign-key side is being substituted while a circular
    /// fetch is broken.
    foreign_key_side: Option<String>,

    results: Vec<DomainResult>,
}

impl<'a> ResolutionState<'a> {
    pub(crate) fn new(
        row: &'a dyn RowMetadata,
        metadata: &'a Metadata,
        legacy_fetches: &'a IndexMap<(String, String), FetchBuilder>,
    ) -> Self {
        Self {
            row,
            metadata,
            legacy_fetches,
            selections: vec![],
            registry: IndexMap::new(),
            positional_locked: false,
            known_duplicates: HashSet::new(),
            fetch_path: vec![],
            resolving_circular_fetch: false,
            foreign_key_side: None,
            results: vec![],
        }
    }

    pub(crate) fn finish(self) -> ValuesMapping {
        ValuesMapping {
            selections: self.selections,
            results: self.results,
        }
    }

    pub(crate) fn build_result(&mut self, builder: &ResultBuilder) -> Result<()> {
        let result = match builder {
            ResultBuilder::Scalar(scalar) => self.build_scalar(scalar)?,
            ResultBuilder::ConvertedScalar {
                column,
                relational_type,
                domain_class,
            } => {
                let selection = self.register_column(column, Some(*relational_type))?;
                DomainResult::Converted {
                    selection,
                    relational_type: *relational_type,
                    domain_class: domain_class.clone(),
                }
            }
            ResultBuilder::Entity(entity) => self.build_entity(entity)?,
            ResultBuilder::Instantiation(instantiation) => {
                self.build_instantiation(instantiation)?
            }
        };
        self.results.push(result);
        Ok(())
    }

    /// One implicit scalar result for the column at a 1-based position; the
    /// fallback for completely unmapped queries.
    pub(crate) fn build_implicit_scalar(&mut self, position: usize) -> Result<()> {
        let sql_type = self.row.sql_type(position);
        let selection = self.register_position(position, None)?;
        self.results.push(DomainResult::Scalar {
            selection,
            sql_type,
        });
        Ok(())
    }

    fn build_scalar(&mut self, builder: &ScalarResultBuilder) -> Result<DomainResult> {
        let selection = self.register_column(&builder.column, builder.explicit_type)?;
        Ok(DomainResult::Scalar {
            selection,
            sql_type: self.selections[selection].sql_type,
        })
    }

    fn build_instantiation(
        &mut self,
        builder: &InstantiationResultBuilder,
    ) -> Result<DomainResult> {
        let mut arguments = Vec::with_capacity(builder.arguments.len());
        for argument in &builder.arguments {
            arguments.push(self.build_scalar(argument)?);
        }
        Ok(DomainResult::Instantiation {
            target: builder.target.clone(),
            arguments,
        })
    }

    fn build_entity(&mut self, builder: &EntityResultBuilder) -> Result<DomainResult> {
        // Entities may carry lazily fetched associations whose join-fetch
        // expansion shifts column positions.
        self.positional_locked = true;

        let metadata = self.metadata;
        let binding = metadata
            .entity_binding(&builder.entity_name)
            .ok_or_else(|| {
                Error::mapping(format!(
                    "result mapping references unknown entity `{}`",
                    builder.entity_name
                ))
            })?;

        self.excuse_entity_key_duplicates(binding);

        self.fetch_path.push(builder.entity_name.clone());
        let resolved = self.resolve_entity_parts(
            binding,
            &builder.table_alias,
            Some(&builder.attribute_aliases),
            Some(&builder.fetches),
        );
        self.fetch_path.pop();
        let (key_selections, fetches) = resolved?;

        Ok(DomainResult::Entity {
            entity: builder.entity_name.clone(),
            key_selections,
            fetches,
        })
    }

    /// Key selections plus fetches for one entity, shared between top-level
    /// entity results and eager entity fetches.
    fn resolve_entity_parts(
        &mut self,
        binding: &EntityBinding,
        table_alias: &str,
        attribute_aliases: Option<&IndexMap<String, String>>,
        explicit_fetches: Option<&IndexMap<String, FetchBuilder>>,
    ) -> Result<(Vec<usize>, Vec<Fetch>)> {
        let metadata = self.metadata;
        let Some(hierarchy) = metadata.hierarchy_details(&binding.entity.name) else {
            return Err(Error::mapping(format!(
                "entity `{}` has no bound identifier",
                binding.entity.name
            )));
        };

        let identifier = &hierarchy.identifier;
        let id_alias = attribute_aliases
            .and_then(|aliases| aliases.get(&identifier.attribute.name))
            .cloned();

        let mut key_selections = Vec::with_capacity(identifier.values.len());
        for value in &identifier.values {
            let column_name = metadata
                .database
                .table(value.value.table)
                .column(value.value)
                .name
                .clone();
            // An explicit identifier alias only makes sense for a
            // single-column key.
            let alias = match (&id_alias, identifier.values.len()) {
                (Some(alias), 1) => alias.clone(),
                _ => column_name,
            };
            key_selections.push(self.register_alias(&alias, None)?);
        }

        let mut fetches = vec![];
        for (name, attribute) in &binding.attributes {
            self.resolve_attribute_fetches(
                name,
                attribute,
                table_alias,
                attribute_aliases,
                explicit_fetches,
                &mut fetches,
            )?;
        }

        Ok((key_selections, fetches))
    }

    fn resolve_attribute_fetches(
        &mut self,
        path: &str,
        attribute: &AttributeBinding,
        owner_alias: &str,
        attribute_aliases: Option<&IndexMap<String, String>>,
        explicit_fetches: Option<&IndexMap<String, FetchBuilder>>,
        fetches: &mut Vec<Fetch>,
    ) -> Result<()> {
        match attribute {
            AttributeBinding::Basic(basic) => {
                let alias = attribute_aliases.and_then(|aliases| aliases.get(path));
                for value in &basic.values {
                    let Some(column_name) = self.value_column_name(value) else {
                        // Formula output has no stable discoverable alias.
                        continue;
                    };
                    let alias = match (alias, basic.values.len()) {
                        (Some(alias), 1) => alias.clone(),
                        _ => column_name,
                    };
                    let selection = self.register_alias(&alias, None)?;
                    fetches.push(Fetch::Basic {
                        attribute: path.to_string(),
                        selection,
                    });
                }
            }
            AttributeBinding::Composite(composite) => {
                for (name, sub) in &composite.attributes {
                    let sub_path = format!("{path}.{name}");
                    self.resolve_attribute_fetches(
                        &sub_path,
                        sub,
                        owner_alias,
                        attribute_aliases,
                        explicit_fetches,
                        fetches,
                    )?;
                }
            }
            AttributeBinding::ManyToOne(many_to_one) => {
                let fetch_builder = self
                    .find_fetch_builder(explicit_fetches, owner_alias, path)
                    .cloned();
                let fetch = match fetch_builder {
                    Some(fetch_builder) => {
                        self.build_eager_fetch(path, &many_to_one.referenced_entity, &fetch_builder)?
                    }
                    // No builder covers the association; materialize the
                    // foreign key only rather than resolving the target.
                    None => self.build_key_only_fetch(
                        path,
                        &many_to_one.referenced_entity,
                        &many_to_one.values,
                    )?,
                };
                fetches.push(fetch);
            }
            // Collection loading is the loader's job; the result mapping
            // covers only the owning row.
            AttributeBinding::Plural(_) => {}
        }
        Ok(())
    }

    fn find_fetch_builder<'b>(
        &'b self,
        explicit: Option<&'b IndexMap<String, FetchBuilder>>,
        owner_alias: &str,
        attribute: &str,
    ) -> Option<&'b FetchBuilder> {
        let chain = [explicit.map(FetchResolver::Explicit), Some(FetchResolver::Legacy)];
        for resolver in chain.into_iter().flatten() {
            let found = match resolver {
                FetchResolver::Explicit(builders) => builders.get(attribute),
                FetchResolver::Legacy => self
                    .legacy_fetches
                    .get(&(owner_alias.to_string(), attribute.to_string())),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn build_eager_fetch(
        &mut self,
        attribute: &str,
        target_entity: &str,
        fetch_builder: &FetchBuilder,
    ) -> Result<Fetch> {
        let metadata = self.metadata;
        let target = metadata.entity_binding(target_entity).ok_or_else(|| {
            Error::mapping(format!(
                "fetch of `{attribute}` references unknown entity `{target_entity}`"
            ))
        })?;

        if self.fetch_path.iter().any(|entity| entity == target_entity) {
            // Circular fetch graph; break the cycle with a key-only
            // reference to the already-resolving entity.
            self.resolving_circular_fetch = true;
            self.foreign_key_side = Some(target_entity.to_string());
            let fetch = self.build_circular_key_fetch(attribute, target);
            self.foreign_key_side = None;
            self.resolving_circular_fetch = false;
            return fetch;
        }

        let Some(hierarchy) = metadata.hierarchy_details(target_entity) else {
            return Err(Error::mapping(format!(
                "entity `{target_entity}` has no bound identifier"
            )));
        };
        let key_count = hierarchy.identifier.values.len();

        if !fetch_builder.column_aliases.is_empty()
            && fetch_builder.column_aliases.len() != key_count
        {
            return Err(Error::mapping(format!(
                "fetch of `{attribute}` maps {} column alias(es) against {key_count} key column(s) of `{target_entity}`",
                fetch_builder.column_aliases.len()
            )));
        }

        let mut key_selections = Vec::with_capacity(key_count);
        for (index, value) in hierarchy.identifier.values.iter().enumerate() {
            let alias = match fetch_builder.column_aliases.get(index) {
                Some(alias) => alias.clone(),
                None => metadata
                    .database
                    .table(value.value.table)
                    .column(value.value)
                    .name
                    .clone(),
            };
            key_selections.push(self.register_alias(&alias, None)?);
        }

        self.fetch_path.push(target_entity.to_string());
        let mut fetches = vec![];
        let resolved: Result<()> = (|| {
            for (name, sub) in &target.attributes {
                self.resolve_attribute_fetches(
                    name,
                    sub,
                    &fetch_builder.table_alias,
                    None,
                    None,
                    &mut fetches,
                )?;
            }
            Ok(())
        })();
        self.fetch_path.pop();
        resolved?;

        Ok(Fetch::Entity {
            attribute: attribute.to_string(),
            entity: target_entity.to_string(),
            key_selections,
            fetches,
        })
    }

    /// Key-only fetch from the owner side's foreign-key columns.
    fn build_key_only_fetch(
        &mut self,
        attribute: &str,
        target_entity: &str,
        values: &[RelationalValueBinding],
    ) -> Result<Fetch> {
        let mut key_selections = Vec::with_capacity(values.len());
        for value in values {
            let Some(column_name) = self.value_column_name(value) else {
                continue;
            };
            key_selections.push(self.register_alias(&column_name, None)?);
        }
        Ok(Fetch::KeyOnly {
            attribute: attribute.to_string(),
            entity: target_entity.to_string(),
            key_selections,
        })
    }

    /// Cycle-breaking substitution: reference the circular target through its
    /// own key columns, which the outer resolution already consumed.
    fn build_circular_key_fetch(
        &mut self,
        attribute: &str,
        target: &EntityBinding,
    ) -> Result<Fetch> {
        assert!(
            self.resolving_circular_fetch
                && self.foreign_key_side.as_deref() == Some(target.entity.name.as_str()),
            "circular key substitution outside circular fetch resolution"
        );

        let metadata = self.metadata;
        let Some(hierarchy) = metadata.hierarchy_details(&target.entity.name) else {
            return Err(Error::mapping(format!(
                "entity `{}` has no bound identifier",
                target.entity.name
            )));
        };

        let mut key_selections = Vec::with_capacity(hierarchy.identifier.values.len());
        for value in &hierarchy.identifier.values {
            let column_name = metadata
                .database
                .table(value.value.table)
                .column(value.value)
                .name
                .clone();
            key_selections.push(self.register_alias(&column_name, None)?);
        }

        Ok(Fetch::KeyOnly {
            attribute: attribute.to_string(),
            entity: target.entity.name.clone(),
            key_selections,
        })
    }

    /// Pre-registers the entity's key column names as excused duplicates when
    /// the same name appears on more than one of the entity's own tables
    /// (secondary tables, joined-subclass tables).
    fn excuse_entity_key_duplicates(&mut self, binding: &EntityBinding) {
        let metadata = self.metadata;

        // single-table subclasses share the root's primary table; the set
        // keeps the shared table from counting twice
        let mut tables = HashSet::from([binding.primary_table]);
        tables.extend(binding.secondary_tables.iter().copied());
        for sub in &binding.sub_entities {
            if let Some(sub_binding) = metadata.entity_binding(sub) {
                tables.insert(sub_binding.primary_table);
            }
        }

        let primary = metadata.database.table(binding.primary_table);
        for column in primary.primary_key_columns() {
            let occurrences = tables
                .iter()
                .filter(|id| {
                    metadata
                        .database
                        .table(**id)
                        .find_column(&column.name)
                        .is_some()
                })
                .count();
            if occurrences >= 2 {
                self.known_duplicates.insert(column.name.clone());
            }
        }
    }

    fn value_column_name(&self, value: &RelationalValueBinding) -> Option<String> {
        let table = self.metadata.database.table(value.value.table);
        match table.value(value.value) {
            Value::Column(column) => Some(column.name.clone()),
            Value::Derived(_) => None,
        }
    }

    fn register_column(
        &mut self,
        column: &ScalarColumn,
        explicit_type: Option<ScalarType>,
    ) -> Result<usize> {
        match column {
            ScalarColumn::Alias(alias) => self.register_alias(alias, explicit_type),
            ScalarColumn::Position(position) => self.register_position(*position, explicit_type),
        }
    }

    /// Registers the selection for an alias, converting the 1-based JDBC
    /// position to the 0-based values-array position. Repeated registration
    /// of the same alias returns the existing selection.
    fn register_alias(&mut self, alias: &str, explicit_type: Option<ScalarType>) -> Result<usize> {
        let key = SelectionKey::Alias(alias.to_string());
        if let Some(&index) = self.registry.get(&key) {
            return Ok(index);
        }

        if self.row.alias_count(alias) > 1 && !self.known_duplicates.contains(alias) {
            return Err(Error::non_unique_alias(alias));
        }

        let Some(position) = self.row.resolve_alias(alias) else {
            return Err(Error::mapping(format!(
                "could not resolve column alias `{alias}` against the result shape"
            )));
        };

        Ok(self.push_selection(key, position, explicit_type))
    }

    /// Registers the selection for a 1-based ordinal. Refused once positional
    /// access has been locked out by a non-scalar result.
    fn register_position(
        &mut self,
        position: usize,
        explicit_type: Option<ScalarType>,
    ) -> Result<usize> {
        if self.positional_locked {
            return Err(Error::mapping(format!(
                "positional column access (ordinal {position}) is not allowed in a mapping containing entity results"
            )));
        }

        if position == 0 || position > self.row.column_count() {
            return Err(Error::mapping(format!(
                "column ordinal {position} is outside the result shape of {} column(s)",
                self.row.column_count()
            )));
        }

        let key = SelectionKey::Position(position);
        if let Some(&index) = self.registry.get(&key) {
            return Ok(index);
        }

        Ok(self.push_selection(key, position, explicit_type))
    }

    fn push_selection(
        &mut self,
        key: SelectionKey,
        position: usize,
        explicit_type: Option<ScalarType>,
    ) -> usize {
        let sql_type = explicit_type.unwrap_or_else(|| self.row.sql_type(position));
        let index = self.selections.len();
        self.selections.push(SqlSelection {
            values_position: position - 1,
            column_name: self.row.column_name(position).to_string(),
            sql_type,
        });
        self.registry.insert(key, index);
        index
    }
}
