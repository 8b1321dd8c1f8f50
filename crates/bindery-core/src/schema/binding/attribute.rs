use crate::{
    schema::{
        domain::{Composite, PluralAttribute, SingularAttribute},
        relational::{ForeignKeyRef, TableId, ValueId},
    },
    types::TypeDescriptor,
};
use indexmap::IndexMap;

/// The bound form of a declared attribute. A closed sum so every
/// consumption site matches exhaustively; adding a kind is a compile-time
/// exercise.
#[derive(Debug)]
pub enum AttributeBinding {
    Basic(BasicAttributeBinding),
    Composite(CompositeAttributeBinding),
    ManyToOne(ManyToOneAttributeBinding),
    Plural(PluralAttributeBinding),
}

/// Pairs a relational value with its insert/update inclusion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationalValueBinding {
    pub value: ValueId,
    pub include_in_insert: bool,
    pub include_in_update: bool,
}

#[derive(Debug)]
pub struct BasicAttributeBinding {
    pub attribute: SingularAttribute,

    /// At least one relational value, in declaration order.
    pub values: Vec<RelationalValueBinding>,

    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug)]
pub struct CompositeAttributeBinding {
    pub attribute: SingularAttribute,
    pub composite: Composite,
    pub attributes: IndexMap<String, AttributeBinding>,
}

#[derive(Debug)]
pub struct ManyToOneAttributeBinding {
    pub attribute: SingularAttribute,

    pub referenced_entity: String,

    /// Attribute on the referenced entity named by a property-ref, when the
    /// association does not target the identifier.
    pub referenced_attribute: Option<String>,

    /// The key columns on the owner side, in declaration order.
    pub values: Vec<RelationalValueBinding>,

    pub foreign_key: ForeignKeyRef,

    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug)]
pub struct PluralAttributeBinding {
    pub attribute: PluralAttribute,

    pub collection_table: TableId,

    /// Key columns on the collection table, pointing back at the owner.
    pub key_values: Vec<RelationalValueBinding>,

    pub key_foreign_key: ForeignKeyRef,

    pub element: PluralElementBinding,

    /// Collection-as-a-whole type.
    pub type_descriptor: TypeDescriptor,

    /// Element type.
    pub element_type: TypeDescriptor,
}

#[derive(Debug)]
pub enum PluralElementBinding {
    /// Element values stored in the collection table.
    Basic {
        values: Vec<RelationalValueBinding>,
    },

    /// Elements are rows of another entity; the collection table is that
    /// entity's primary table.
    OneToMany { entity: String },
}

impl AttributeBinding {
    pub fn name(&self) -> &str {
        match self {
            AttributeBinding::Basic(binding) => &binding.attribute.name,
            AttributeBinding::Composite(binding) => &binding.attribute.name,
            AttributeBinding::ManyToOne(binding) => &binding.attribute.name,
            AttributeBinding::Plural(binding) => &binding.attribute.name,
        }
    }

    /// Collects the relational values reachable from this binding, in
    /// declaration order. Composites flatten recursively; plural attributes
    /// contribute nothing (a property-ref naming one is rejected upstream).
    pub fn collect_values(&self, out: &mut Vec<RelationalValueBinding>) {
        match self {
            AttributeBinding::Basic(binding) => out.extend_from_slice(&binding.values),
            AttributeBinding::ManyToOne(binding) => out.extend_from_slice(&binding.values),
            AttributeBinding::Composite(binding) => {
                for sub in binding.attributes.values() {
                    sub.collect_values(out);
                }
            }
            AttributeBinding::Plural(_) => {}
        }
    }
}
