use bindery_core::{
    schema::{binding::AttributeBinding, domain::PluralNature},
    source::{
        AttributeSource, BasicAttributeSource, EntityHierarchy, EntitySource, IdentifierSource,
        InheritanceKind, SimpleIdentifierSource,
    },
    types::{ResolvedType, ScalarType, TypeDefinition},
    Binder, Metadata,
};
use indexmap::IndexMap;

fn entity_with_attribute(attribute: BasicAttributeSource) -> EntityHierarchy {
    let mut id = BasicAttributeSource::new("id");
    id.declared_class = Some("i64".to_string());

    let mut source = EntitySource::new("User");
    source.identifier = Some(IdentifierSource::Simple(SimpleIdentifierSource {
        attribute: id,
        generator: None,
    }));
    source.attributes.push(AttributeSource::Basic(attribute));
    EntityHierarchy::new(InheritanceKind::None, source)
}

fn bind_with(metadata: &mut Metadata, hierarchy: EntityHierarchy) {
    Binder::process_entity_hierarchies(metadata, &[hierarchy]).unwrap();
}

fn resolved_attribute_type(metadata: &Metadata, name: &str) -> Option<ScalarType> {
    let binding = metadata.entity_binding("User").unwrap();
    let AttributeBinding::Basic(basic) = binding.attribute(name).unwrap() else {
        panic!("expected basic binding for {name}");
    };
    basic.type_descriptor.resolved_scalar()
}

fn column_code(metadata: &Metadata, name: &str) -> Option<i32> {
    let binding = metadata.entity_binding("User").unwrap();
    let table = metadata.database.table(binding.primary_table);
    table.column(table.find_column(name).unwrap()).jdbc_type_code
}

#[test]
fn explicit_type_name_wins_over_declared_class() {
    let mut attribute = BasicAttributeSource::new("count");
    attribute.declared_class = Some("String".to_string());
    attribute.type_source.name = Some("long".to_string());

    let mut metadata = Metadata::new();
    bind_with(&mut metadata, entity_with_attribute(attribute));

    assert_eq!(
        resolved_attribute_type(&metadata, "count"),
        Some(ScalarType::I64)
    );
    assert_eq!(column_code(&metadata, "count"), Some(-5));
}

#[test]
fn declared_class_is_the_fallback() {
    let mut attribute = BasicAttributeSource::new("count");
    attribute.declared_class = Some("String".to_string());

    let mut metadata = Metadata::new();
    bind_with(&mut metadata, entity_with_attribute(attribute));

    assert_eq!(
        resolved_attribute_type(&metadata, "count"),
        Some(ScalarType::String)
    );
    assert_eq!(column_code(&metadata, "count"), Some(12));
}

#[test]
fn unknown_type_name_is_a_soft_failure() {
    let mut attribute = BasicAttributeSource::new("count");
    attribute.declared_class = Some("i32".to_string());
    attribute.type_source.name = Some("no_such_type".to_string());

    let mut metadata = Metadata::new();
    bind_with(&mut metadata, entity_with_attribute(attribute));

    // resolution falls through to the declared class
    assert_eq!(
        resolved_attribute_type(&metadata, "count"),
        Some(ScalarType::I32)
    );
    assert_eq!(column_code(&metadata, "count"), Some(4));
}

#[test]
fn registered_definition_resolves_named_types() {
    let mut attribute = BasicAttributeSource::new("price");
    attribute.type_source.name = Some("money".to_string());

    let mut metadata = Metadata::new();
    metadata.types.register(TypeDefinition {
        name: "money".to_string(),
        scalar: ScalarType::Decimal,
        params: IndexMap::new(),
    });
    bind_with(&mut metadata, entity_with_attribute(attribute));

    assert_eq!(
        resolved_attribute_type(&metadata, "price"),
        Some(ScalarType::Decimal)
    );
    assert_eq!(column_code(&metadata, "price"), Some(2));
}

#[test]
fn unresolvable_attribute_leaves_column_untyped() {
    // no type name, no scalar-mapped class; the column keeps no type code
    let mut attribute = BasicAttributeSource::new("payload");
    attribute.declared_class = Some("crate::model::Payload".to_string());

    let mut metadata = Metadata::new();
    bind_with(&mut metadata, entity_with_attribute(attribute));

    assert_eq!(resolved_attribute_type(&metadata, "payload"), None);
    assert_eq!(column_code(&metadata, "payload"), None);
}

#[test]
fn collection_type_resolves_structurally() {
    use bindery_core::source::{
        Origin, PluralAttributeSource, PluralElementSource, TypeSource,
    };

    let mut id = BasicAttributeSource::new("id");
    id.declared_class = Some("i64".to_string());
    let mut source = EntitySource::new("User");
    source.identifier = Some(IdentifierSource::Simple(SimpleIdentifierSource {
        attribute: id,
        generator: None,
    }));
    source
        .attributes
        .push(AttributeSource::Plural(PluralAttributeSource {
            name: "tags".to_string(),
            nature: PluralNature::Set,
            table: None,
            key_columns: vec![],
            element: PluralElementSource::Basic {
                declared_class: Some("String".to_string()),
                type_source: TypeSource::default(),
                values: vec![],
            },
            type_source: TypeSource::default(),
            origin: Origin::new("User.mapping"),
        }));

    let mut metadata = Metadata::new();
    bind_with(
        &mut metadata,
        EntityHierarchy::new(InheritanceKind::None, source),
    );

    let binding = metadata.entity_binding("User").unwrap();
    let AttributeBinding::Plural(tags) = binding.attribute("tags").unwrap() else {
        panic!("expected plural binding");
    };
    assert_eq!(
        tags.type_descriptor.resolved,
        Some(ResolvedType::Collection {
            nature: PluralNature::Set,
            custom_type: None,
        })
    );
    assert_eq!(
        tags.element_type.resolved_scalar(),
        Some(ScalarType::String)
    );
}
