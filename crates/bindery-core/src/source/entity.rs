use super::{
    AttributeSource, DiscriminatorSource, IdentifierSource, Origin, VersionSource,
};
use crate::schema::binding::CustomSql;

/// One entity inheritance hierarchy: a root descriptor plus its recursive
/// subclass tree, all sharing one inheritance strategy.
#[derive(Debug)]
pub struct EntityHierarchy {
    pub inheritance: InheritanceKind,
    pub root: EntitySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritanceKind {
    /// No subclasses declared.
    None,
    SingleTable,
    Joined,
    TablePerClass,
}

/// Declarative description of one entity. Immutable once produced by the
/// front end.
#[derive(Debug)]
pub struct EntitySource {
    pub entity_name: String,

    pub class_name: Option<String>,

    /// Explicit primary table, when declared. Absent pieces fall back to the
    /// naming strategy.
    pub table: Option<TableSpec>,

    /// Required on hierarchy roots; its absence there indicates a bug in the
    /// front end, not a user error.
    pub identifier: Option<IdentifierSource>,

    pub version: Option<VersionSource>,

    /// Root-only; bindable only under single-table inheritance.
    pub discriminator: Option<DiscriminatorSource>,

    /// Subclass-only. Defaults to the entity name.
    pub discriminator_match_value: Option<String>,

    pub attributes: Vec<AttributeSource>,

    pub secondary_tables: Vec<SecondaryTableSource>,

    pub unique_constraints: Vec<UniqueConstraintSource>,

    pub dynamic_insert: bool,

    pub dynamic_update: bool,

    pub custom_sql: CustomSql,

    pub proxy_interface: Option<String>,

    pub persister_class: Option<String>,

    pub subclasses: Vec<EntitySource>,

    pub origin: Origin,
}

/// An explicit or partially explicit table reference.
#[derive(Debug, Clone, Default)]
pub struct TableSpec {
    pub schema: Option<String>,

    /// Logical table name. `None` asks the naming strategy.
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct SecondaryTableSource {
    pub table: TableSpec,
    pub origin: Origin,
}

#[derive(Debug)]
pub struct UniqueConstraintSource {
    pub name: String,
    pub columns: Vec<String>,
}

impl EntitySource {
    /// A minimal source for tests and programmatic front ends; everything
    /// defaulted except the name.
    pub fn new(entity_name: impl Into<String>) -> Self {
        let entity_name = entity_name.into();
        let origin = Origin::new(format!("{entity_name}.mapping"));
        Self {
            entity_name,
            class_name: None,
            table: None,
            identifier: None,
            version: None,
            discriminator: None,
            discriminator_match_value: None,
            attributes: vec![],
            secondary_tables: vec![],
            unique_constraints: vec![],
            dynamic_insert: false,
            dynamic_update: false,
            custom_sql: CustomSql::default(),
            proxy_interface: None,
            persister_class: None,
            subclasses: vec![],
            origin,
        }
    }
}

impl EntityHierarchy {
    pub fn new(inheritance: InheritanceKind, root: EntitySource) -> Self {
        Self { inheritance, root }
    }
}
