use super::{AttributeBinding, HierarchyDetails};
use crate::schema::{domain::Entity, relational::TableId};
use indexmap::IndexMap;

/// The bound counterpart of an entity source: its identity, tables,
/// attribute bindings, and inheritance links. Created exactly once per
/// entity name; re-requesting a binding returns the cached instance.
#[derive(Debug)]
pub struct EntityBinding {
    pub entity: Entity,

    pub primary_table: TableId,

    pub secondary_tables: Vec<TableId>,

    /// Attribute bindings in declaration order. The identifier attribute is
    /// not listed here; it lives in the hierarchy details.
    pub attributes: IndexMap<String, AttributeBinding>,

    /// Name of the hierarchy root. Subclasses share the root's hierarchy
    /// details by reference through the metadata registry.
    pub hierarchy_root: String,

    /// Present only on the hierarchy root.
    pub hierarchy: Option<HierarchyDetails>,

    pub super_entity: Option<String>,

    pub sub_entities: Vec<String>,

    /// Discriminator value matching this entity's rows (single-table
    /// subclasses).
    pub discriminator_match_value: Option<String>,

    pub dynamic_insert: bool,

    pub dynamic_update: bool,

    pub custom_sql: CustomSql,

    pub proxy_interface: Option<String>,

    pub persister_class: Option<String>,
}

/// Custom SQL overriding generated CRUD statements.
#[derive(Debug, Clone, Default)]
pub struct CustomSql {
    pub insert: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

impl EntityBinding {
    pub fn is_hierarchy_root(&self) -> bool {
        self.hierarchy.is_some()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.get(name)
    }
}
