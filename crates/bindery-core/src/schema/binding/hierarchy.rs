use super::RelationalValueBinding;
use crate::{schema::domain::SingularAttribute, source::InheritanceKind, types::TypeDescriptor};
use indexmap::IndexMap;

/// State owned by the root of an entity hierarchy and shared by every
/// subclass binding: identifier, version, discriminator, inheritance kind.
#[derive(Debug)]
pub struct HierarchyDetails {
    pub inheritance: InheritanceKind,
    pub identifier: IdentifierBinding,
    pub version: Option<VersionBinding>,
    pub discriminator: Option<DiscriminatorBinding>,
}

/// A simple (single-attribute) identifier. The identifier's relational
/// values are exactly the entity's primary-key columns.
#[derive(Debug)]
pub struct IdentifierBinding {
    pub attribute: SingularAttribute,
    pub values: Vec<RelationalValueBinding>,
    pub generator: IdentifierGenerator,
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug)]
pub struct VersionBinding {
    pub attribute: SingularAttribute,
    pub values: Vec<RelationalValueBinding>,
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug)]
pub struct DiscriminatorBinding {
    pub value: RelationalValueBinding,
    pub type_name: Option<String>,
}

/// How identifier values are produced for new rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierGenerator {
    pub strategy: String,
    pub params: IndexMap<String, String>,
}

impl IdentifierGenerator {
    /// The fallback when a root entity declares no generator: `assigned`,
    /// parameterized with the entity's own name.
    pub fn assigned(entity_name: &str) -> Self {
        let mut params = IndexMap::new();
        params.insert("entity_name".to_string(), entity_name.to_string());
        Self {
            strategy: "assigned".to_string(),
            params,
        }
    }
}
