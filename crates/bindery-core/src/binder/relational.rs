use super::Binder;
use crate::{
    schema::{
        binding::RelationalValueBinding,
        relational::{ColumnSpec, ForeignKey, ForeignKeyRef, SchemaName, TableId, ValueId},
    },
    source::{ColumnSource, RelationalValueSource, TableSpec},
};

/// Per-call-site answers to "is this column included in INSERT / UPDATE by
/// default, and is it nullable by default". Explicit tri-state overrides on
/// the column source take precedence when not `Unknown`.
#[derive(Debug, Clone, Copy)]
pub(super) struct ColumnDefaults {
    pub include_in_insert: bool,
    pub include_in_update: bool,
    pub nullable: bool,
}

impl ColumnDefaults {
    /// Ordinary attribute columns: written on insert and update, nullable.
    pub const ATTRIBUTE: Self = Self {
        include_in_insert: true,
        include_in_update: true,
        nullable: true,
    };

    /// Identifier columns: written once, never updated, never null.
    pub const IDENTIFIER: Self = Self {
        include_in_insert: true,
        include_in_update: false,
        nullable: false,
    };

    /// Version columns participate in every write and must be present.
    pub const VERSION: Self = Self {
        include_in_insert: true,
        include_in_update: true,
        nullable: false,
    };

    pub const DISCRIMINATOR: Self = Self {
        include_in_insert: true,
        include_in_update: false,
        nullable: false,
    };

    pub const COLLECTION_KEY: Self = Self {
        include_in_insert: true,
        include_in_update: false,
        nullable: false,
    };
}

impl Binder<'_> {
    /// Get-or-create a table from a spec, falling back to `default_name`
    /// when the spec names none.
    pub(super) fn resolve_table(&mut self, spec: &TableSpec, default_name: &str) -> TableId {
        let schema = spec
            .schema
            .as_ref()
            .map(|schema| SchemaName::named(schema.clone()))
            .unwrap_or_default();
        let name = spec.name.as_deref().unwrap_or(default_name);
        self.metadata.database.locate_table(&schema, name)
    }

    /// Get-or-create a column from its source, applying the call site's
    /// defaults under the source's tri-state overrides.
    pub(super) fn bind_column(
        &mut self,
        table: TableId,
        source: &ColumnSource,
        default_name: &str,
        defaults: ColumnDefaults,
    ) -> RelationalValueBinding {
        let name = source.name.as_deref().unwrap_or(default_name);
        let spec = ColumnSpec {
            nullable: source.nullable.or_default(defaults.nullable),
            unique: source.unique,
            jdbc_type_code: None,
            sql_type: source.sql_type.clone(),
            size: source.size,
            default_value: source.default_value.clone(),
            check_condition: source.check_condition.clone(),
            comment: source.comment.clone(),
        };

        let value = self
            .metadata
            .database
            .table_mut(table)
            .locate_column(name, spec);

        RelationalValueBinding {
            value,
            include_in_insert: source.insertable.or_default(defaults.include_in_insert),
            include_in_update: source.updatable.or_default(defaults.include_in_update),
        }
    }

    /// Binds an attribute's declared relational values; an empty declaration
    /// produces one default column named after the attribute. Derived values
    /// are read-only and excluded from insert and update.
    pub(super) fn bind_relational_values(
        &mut self,
        table: TableId,
        sources: &[RelationalValueSource],
        default_column_name: &str,
        defaults: ColumnDefaults,
    ) -> Vec<RelationalValueBinding> {
        if sources.is_empty() {
            let source = ColumnSource::default();
            return vec![self.bind_column(table, &source, default_column_name, defaults)];
        }

        sources
            .iter()
            .map(|source| match source {
                RelationalValueSource::Column(column) => {
                    self.bind_column(table, column, default_column_name, defaults)
                }
                RelationalValueSource::Derived { formula } => {
                    let value = self
                        .metadata
                        .database
                        .table_mut(table)
                        .create_derived_value(formula.clone());
                    RelationalValueBinding {
                        value,
                        include_in_insert: false,
                        include_in_update: false,
                    }
                }
            })
            .collect()
    }

    /// Appends a foreign key pairing the Nth source column with the Nth
    /// target column. Count mismatches must be rejected before this point.
    pub(super) fn create_foreign_key(
        &mut self,
        table: TableId,
        target_table: TableId,
        sources: Vec<ValueId>,
        targets: Vec<ValueId>,
    ) -> ForeignKeyRef {
        let table_ref = self.metadata.database.table_mut(table);
        let index = table_ref.foreign_keys.len();
        table_ref
            .foreign_keys
            .push(ForeignKey::new(table, target_table, sources, targets));
        ForeignKeyRef { table, index }
    }
}
