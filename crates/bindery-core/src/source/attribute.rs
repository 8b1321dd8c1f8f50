use super::{ColumnSource, Origin, TableSpec};
use crate::schema::domain::PluralNature;
use indexmap::IndexMap;

/// Declarative description of one attribute. A closed sum over the mapping
/// forms the front end can produce; the binder matches exhaustively and
/// fails fast on the unsupported forms.
#[derive(Debug)]
pub enum AttributeSource {
    Basic(BasicAttributeSource),
    Component(ComponentAttributeSource),
    ManyToOne(ManyToOneAttributeSource),
    OneToOne { name: String, origin: Origin },
    Any { name: String, origin: Origin },
    Plural(PluralAttributeSource),
}

/// Explicit type hints from the mapping: a type name plus parameters.
#[derive(Debug, Clone, Default)]
pub struct TypeSource {
    pub name: Option<String>,
    pub params: IndexMap<String, String>,
}

/// A column or a derived SQL formula, as declared on an attribute.
#[derive(Debug)]
pub enum RelationalValueSource {
    Column(ColumnSource),
    Derived { formula: String },
}

#[derive(Debug)]
pub struct BasicAttributeSource {
    pub name: String,

    /// Declared class recovered by reflection in the front end.
    pub declared_class: Option<String>,

    pub type_source: TypeSource,

    /// Empty means one default column named after the attribute.
    pub values: Vec<RelationalValueSource>,

    pub origin: Origin,
}

#[derive(Debug)]
pub struct ComponentAttributeSource {
    pub name: String,
    pub class_name: Option<String>,
    pub attributes: Vec<AttributeSource>,
    pub origin: Origin,
}

#[derive(Debug)]
pub struct ManyToOneAttributeSource {
    pub name: String,

    pub referenced_entity: String,

    /// Names an attribute on the referenced entity to target instead of its
    /// identifier.
    pub property_ref: Option<String>,

    /// Declared key columns. Empty derives one column per target column.
    pub columns: Vec<ColumnSource>,

    pub origin: Origin,
}

#[derive(Debug)]
pub struct PluralAttributeSource {
    pub name: String,

    pub nature: PluralNature,

    /// Explicit collection table; ignored for one-to-many elements.
    pub table: Option<TableSpec>,

    /// Declared key columns on the collection table. Empty derives names
    /// from the owner.
    pub key_columns: Vec<ColumnSource>,

    pub element: PluralElementSource,

    /// Explicit collection type (a custom named type), when declared.
    pub type_source: TypeSource,

    pub origin: Origin,
}

#[derive(Debug)]
pub enum PluralElementSource {
    Basic {
        declared_class: Option<String>,
        type_source: TypeSource,
        values: Vec<RelationalValueSource>,
    },
    OneToMany {
        referenced_entity: String,
    },
}

impl BasicAttributeSource {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let origin = Origin::new(format!("attribute `{name}`"));
        Self {
            name,
            declared_class: None,
            type_source: TypeSource::default(),
            values: vec![],
            origin,
        }
    }
}

impl ManyToOneAttributeSource {
    pub fn new(name: impl Into<String>, referenced_entity: impl Into<String>) -> Self {
        let name = name.into();
        let origin = Origin::new(format!("attribute `{name}`"));
        Self {
            name,
            referenced_entity: referenced_entity.into(),
            property_ref: None,
            columns: vec![],
            origin,
        }
    }
}

impl AttributeSource {
    pub fn name(&self) -> &str {
        match self {
            AttributeSource::Basic(source) => &source.name,
            AttributeSource::Component(source) => &source.name,
            AttributeSource::ManyToOne(source) => &source.name,
            AttributeSource::OneToOne { name, .. } => name,
            AttributeSource::Any { name, .. } => name,
            AttributeSource::Plural(source) => &source.name,
        }
    }
}
