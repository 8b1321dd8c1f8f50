mod attribute;
pub use attribute::{
    AttributeBinding, BasicAttributeBinding, CompositeAttributeBinding, ManyToOneAttributeBinding,
    PluralAttributeBinding, PluralElementBinding, RelationalValueBinding,
};

mod entity;
pub use entity::{CustomSql, EntityBinding};

mod hierarchy;
pub use hierarchy::{
    DiscriminatorBinding, HierarchyDetails, IdentifierBinding, IdentifierGenerator, VersionBinding,
};
