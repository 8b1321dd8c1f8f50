use crate::{
    schema::{
        binding::{EntityBinding, HierarchyDetails},
        relational::Database,
    },
    types::TypeRegistry,
};
use heck::ToSnakeCase;
use indexmap::IndexMap;
use std::fmt;

/// The shared registry the binder publishes into and resolves against:
/// entity bindings by name, collection bindings by role, the relational
/// database model, the type registry, and the naming strategy.
///
/// Single-writer during bind time; not safe for concurrent mutation.
pub struct Metadata {
    pub database: Database,

    pub types: TypeRegistry,

    naming: Box<dyn NamingStrategy>,

    entities: IndexMap<String, EntityBinding>,

    collections: IndexMap<String, CollectionRole>,
}

/// Points a collection role (`Owner.attribute`) back at its owning entity
/// binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRole {
    pub entity: String,
    pub attribute: String,
}

/// Caller-supplied naming callbacks for everything the mapping leaves
/// implicit.
pub trait NamingStrategy: fmt::Debug {
    /// Primary table name for an entity with no explicit table.
    fn entity_table_name(&self, entity_name: &str) -> String;

    /// Collection table name derived from the owner path.
    fn collection_table_name(&self, owner_entity: &str, attribute: &str) -> String;

    /// Column name for an attribute with no explicit column.
    fn column_name(&self, attribute: &str) -> String;

    /// Key column name for a multi-column association.
    fn join_key_column_name(&self, attribute: &str, target_column: &str) -> String;

    /// Key column name on a collection table, pointing back at the owner.
    fn collection_key_column_name(&self, owner_entity: &str, target_column: &str) -> String;
}

#[derive(Debug, Default)]
pub struct DefaultNamingStrategy;

impl NamingStrategy for DefaultNamingStrategy {
    fn entity_table_name(&self, entity_name: &str) -> String {
        entity_name.to_snake_case()
    }

    fn collection_table_name(&self, owner_entity: &str, attribute: &str) -> String {
        format!(
            "{}_{}",
            owner_entity.to_snake_case(),
            attribute.to_snake_case()
        )
    }

    fn column_name(&self, attribute: &str) -> String {
        attribute.to_snake_case()
    }

    fn join_key_column_name(&self, attribute: &str, target_column: &str) -> String {
        format!("{}_{}", attribute.to_snake_case(), target_column)
    }

    fn collection_key_column_name(&self, owner_entity: &str, target_column: &str) -> String {
        format!("{}_{}", owner_entity.to_snake_case(), target_column)
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self::with_naming_strategy(Box::new(DefaultNamingStrategy))
    }

    pub fn with_naming_strategy(naming: Box<dyn NamingStrategy>) -> Self {
        Self {
            database: Database::new(),
            types: TypeRegistry::new(),
            naming,
            entities: IndexMap::new(),
            collections: IndexMap::new(),
        }
    }

    pub fn naming(&self) -> &dyn NamingStrategy {
        &*self.naming
    }

    /// Registers a new entity binding.
    ///
    /// # Panics
    ///
    /// Panics if the entity name is already bound; the binder's processed
    /// set must prevent rebinding.
    pub fn add_entity(&mut self, binding: EntityBinding) {
        let name = binding.entity.name.clone();
        let previous = self.entities.insert(name.clone(), binding);
        assert!(previous.is_none(), "entity `{name}` bound twice");
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn entity_binding(&self, name: &str) -> Option<&EntityBinding> {
        self.entities.get(name)
    }

    pub(crate) fn entity_binding_mut(&mut self, name: &str) -> &mut EntityBinding {
        self.entities.get_mut(name).expect("entity not bound")
    }

    pub fn entity_bindings(&self) -> impl Iterator<Item = &EntityBinding> {
        self.entities.values()
    }

    pub fn add_collection(&mut self, role: impl Into<String>, binding: CollectionRole) {
        self.collections.insert(role.into(), binding);
    }

    pub fn collection(&self, role: &str) -> Option<&CollectionRole> {
        self.collections.get(role)
    }

    /// The hierarchy details shared by every entity in `name`'s hierarchy.
    /// Subclass bindings resolve through their root here.
    pub fn hierarchy_details(&self, name: &str) -> Option<&HierarchyDetails> {
        let binding = self.entity_binding(name)?;
        self.entity_binding(&binding.hierarchy_root)?
            .hierarchy
            .as_ref()
    }

    pub(crate) fn types_and_database_mut(&mut self) -> (&TypeRegistry, &mut Database) {
        (&self.types, &mut self.database)
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("entities", &self.entities.keys().collect::<Vec<_>>())
            .field("collections", &self.collections.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
