//! Passive descriptions of the object model. Near-leaf value objects that
//! bindings point back at.

/// An entity in the domain model.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Entity name, unique within the metadata.
    pub name: String,

    /// Fully qualified class name, when the entity is backed by a class.
    pub class_name: Option<String>,

    /// Name of the superclass entity, if any.
    pub super_entity: Option<String>,
}

/// A composite (embeddable) value type.
#[derive(Debug, Clone)]
pub struct Composite {
    pub class_name: Option<String>,
}

/// A singular (non-collection) attribute of an entity or composite.
#[derive(Debug, Clone)]
pub struct SingularAttribute {
    pub name: String,

    /// The declared class of the attribute, recovered from the source model.
    /// Used as the last-resort type inference input.
    pub declared_class: Option<String>,
}

/// A collection-valued attribute.
#[derive(Debug, Clone)]
pub struct PluralAttribute {
    pub name: String,
    pub nature: PluralNature,

    /// Declared element class, recovered from the generic signature by the
    /// front end.
    pub declared_element_class: Option<String>,
}

/// Collection natures. Only unindexed natures are bindable today; `List` and
/// `Map` fail fast in the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralNature {
    Bag,
    Set,
    List,
    Map,
}

impl PluralNature {
    pub fn is_indexed(self) -> bool {
        matches!(self, PluralNature::List | PluralNature::Map)
    }
}
