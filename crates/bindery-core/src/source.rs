//! The read-only descriptor tree produced by the annotation/XML front end.
//! The binder references these, never mutates them.

mod attribute;
pub use attribute::{
    AttributeSource, BasicAttributeSource, ComponentAttributeSource, ManyToOneAttributeSource,
    PluralAttributeSource, PluralElementSource, RelationalValueSource, TypeSource,
};

mod column;
pub use column::{ColumnSource, TruthValue};

mod entity;
pub use entity::{
    EntityHierarchy, EntitySource, InheritanceKind, SecondaryTableSource, TableSpec,
    UniqueConstraintSource,
};

mod identifier;
pub use identifier::{
    DiscriminatorSource, GeneratorSource, IdentifierSource, SimpleIdentifierSource, VersionSource,
};

use std::fmt;

/// Where a descriptor came from (mapping file, annotated class), carried on
/// mapping errors so they are actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// File or class the descriptor was produced from.
    pub source: String,

    /// Location within the source, when known.
    pub location: Option<String>,
}

impl Origin {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            location: None,
        }
    }

    pub fn at(source: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            location: Some(location.into()),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)?;
        if let Some(location) = &self.location {
            write!(f, ":{location}")?;
        }
        Ok(())
    }
}
