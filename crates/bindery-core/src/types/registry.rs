use super::ScalarType;
use indexmap::IndexMap;

/// Registered named type definitions plus the built-in heuristic lookup.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    definitions: IndexMap<String, TypeDefinition>,
}

/// A named type definition: a registered alias for a scalar type plus
/// default parameters.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: String,
    pub scalar: ScalarType,
    pub params: IndexMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: TypeDefinition) {
        self.definitions
            .insert(definition.name.clone(), definition);
    }

    pub fn definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    /// Resolves a type name: a registered definition first, then the
    /// heuristic basic-type table. `None` means "not resolved yet", never a
    /// hard error.
    pub fn heuristic(&self, name: &str) -> Option<ScalarType> {
        if let Some(definition) = self.definition(name) {
            return Some(definition.scalar);
        }
        ScalarType::from_name(name)
    }
}
