use super::{fill, ResolvedType, ScalarType, TypeDescriptor, TypeRegistry};
use crate::schema::{
    binding::{PluralAttributeBinding, PluralElementBinding, RelationalValueBinding},
    relational::{Database, Value},
};

/// Resolves a singular attribute's runtime type and pushes JDBC type
/// information down onto its relational values.
///
/// Precedence: explicit type name (registered definition, then heuristic
/// table), then the declared class. Every step fills only fields that are
/// currently `None`, so re-invocation from composite recursion is
/// idempotent and order-independent.
pub fn bind_singular_attribute_type(
    registry: &TypeRegistry,
    descriptor: &mut TypeDescriptor,
    declared_class: Option<&str>,
    values: &[RelationalValueBinding],
    database: &mut Database,
) {
    fill(
        &mut descriptor.class_name,
        declared_class.map(str::to_string),
    );

    if descriptor.resolved.is_none() {
        let resolved = resolve_scalar(registry, descriptor);
        fill(&mut descriptor.resolved, resolved.map(ResolvedType::Scalar));
    }

    push_type_information(descriptor, values, database);
}

fn resolve_scalar(registry: &TypeRegistry, descriptor: &TypeDescriptor) -> Option<ScalarType> {
    if let Some(name) = &descriptor.explicit_type_name {
        // An unknown name is swallowed; resolution may succeed below via
        // the declared class.
        if let Some(scalar) = registry.heuristic(name) {
            return Some(scalar);
        }
    }

    descriptor
        .class_name
        .as_deref()
        .and_then(ScalarType::from_class)
}

/// Pushes the resolved JDBC type code onto the attribute's column, only when
/// the binding maps a single value, that value is a column, and the column
/// does not already carry type metadata. Multi-value bindings are left for a
/// more complete future algorithm.
fn push_type_information(
    descriptor: &TypeDescriptor,
    values: &[RelationalValueBinding],
    database: &mut Database,
) {
    let Some(scalar) = descriptor.resolved_scalar() else {
        return;
    };

    let [value] = values else {
        return;
    };

    let table = database.table_mut(value.value.table);
    match &mut table.values[value.value.index] {
        Value::Column(column) => {
            fill(&mut column.jdbc_type_code, Some(scalar.jdbc_type_code()));
        }
        Value::Derived(_) => {}
    }
}

/// Resolves a plural attribute's collection type and element type.
///
/// The collection-as-a-whole resolves to a custom named collection type
/// when one was declared, otherwise to the structural bag/set type. Element
/// type binding recurses with the same precedence rules as singular
/// attributes.
pub fn bind_plural_attribute_type(
    registry: &TypeRegistry,
    binding: &mut PluralAttributeBinding,
    database: &mut Database,
) {
    let nature = binding.attribute.nature;
    if binding.type_descriptor.resolved.is_none() {
        let custom_type = binding.type_descriptor.explicit_type_name.clone();
        binding.type_descriptor.resolved = Some(ResolvedType::Collection {
            nature,
            custom_type,
        });
    }

    match &binding.element {
        PluralElementBinding::Basic { values } => {
            let declared = binding.attribute.declared_element_class.clone();
            bind_singular_attribute_type(
                registry,
                &mut binding.element_type,
                declared.as_deref(),
                values,
                database,
            );
        }
        PluralElementBinding::OneToMany { entity } => {
            fill(&mut binding.element_type.class_name, Some(entity.clone()));
        }
    }
}
