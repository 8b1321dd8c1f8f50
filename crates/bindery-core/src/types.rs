//! Type resolution: determining an attribute's runtime value type from
//! explicit hints, registered definitions, or the declared class, and
//! pushing resolved JDBC type information down onto relational values.

mod descriptor;
pub use descriptor::{fill, ResolvedType, TypeDescriptor};

mod helper;
pub use helper::{bind_plural_attribute_type, bind_singular_attribute_type};

mod registry;
pub use registry::{TypeDefinition, TypeRegistry};

mod scalar;
pub use scalar::ScalarType;
