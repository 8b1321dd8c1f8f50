use bindery_core::{
    schema::{
        binding::{AttributeBinding, IdentifierGenerator},
        domain::PluralNature,
        relational::Table,
    },
    source::{
        AttributeSource, BasicAttributeSource, ColumnSource, ComponentAttributeSource,
        EntityHierarchy, EntitySource, GeneratorSource, IdentifierSource, InheritanceKind,
        ManyToOneAttributeSource, Origin, PluralAttributeSource, PluralElementSource,
        RelationalValueSource, SecondaryTableSource, SimpleIdentifierSource, TableSpec,
        TruthValue, TypeSource,
    },
    Binder, Metadata,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

fn long_id() -> IdentifierSource {
    let mut attribute = BasicAttributeSource::new("id");
    attribute.declared_class = Some("i64".to_string());
    IdentifierSource::Simple(SimpleIdentifierSource {
        attribute,
        generator: None,
    })
}

fn entity(name: &str) -> EntitySource {
    let mut source = EntitySource::new(name);
    source.identifier = Some(long_id());
    source
}

fn basic(name: &str, class: &str) -> AttributeSource {
    let mut attribute = BasicAttributeSource::new(name);
    attribute.declared_class = Some(class.to_string());
    AttributeSource::Basic(attribute)
}

fn many_to_one(name: &str, target: &str) -> AttributeSource {
    AttributeSource::ManyToOne(ManyToOneAttributeSource::new(name, target))
}

fn bind(hierarchies: &[EntityHierarchy]) -> Metadata {
    let mut metadata = Metadata::new();
    Binder::process_entity_hierarchies(&mut metadata, hierarchies).unwrap();
    metadata
}

fn primary_table<'a>(metadata: &'a Metadata, entity: &str) -> &'a Table {
    let binding = metadata.entity_binding(entity).unwrap();
    metadata.database.table(binding.primary_table)
}

#[test]
fn binds_basic_entity() {
    let mut user = entity("User");
    user.attributes.push(basic("name", "String"));

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::None, user)]);

    let table = primary_table(&metadata, "User");
    assert_eq!(table.name, "user");

    assert_eq!(table.primary_key.len(), 1);
    let id = table.column(table.primary_key[0]);
    assert_eq!(id.name, "id");
    assert!(!id.nullable);
    assert_eq!(id.jdbc_type_code, Some(-5));

    let name = table.column(table.find_column("name").unwrap());
    assert!(name.nullable);
    assert_eq!(name.jdbc_type_code, Some(12));
}

#[test]
fn default_generator_is_assigned() {
    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::None, entity("User"))]);

    let hierarchy = metadata.hierarchy_details("User").unwrap();
    assert_eq!(
        hierarchy.identifier.generator,
        IdentifierGenerator::assigned("User")
    );
}

#[test]
fn explicit_generator_is_kept() {
    let mut user = EntitySource::new("User");
    let mut attribute = BasicAttributeSource::new("id");
    attribute.declared_class = Some("i64".to_string());
    user.identifier = Some(IdentifierSource::Simple(SimpleIdentifierSource {
        attribute,
        generator: Some(GeneratorSource {
            strategy: "sequence".to_string(),
            params: IndexMap::new(),
        }),
    }));

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::None, user)]);

    let hierarchy = metadata.hierarchy_details("User").unwrap();
    assert_eq!(hierarchy.identifier.generator.strategy, "sequence");
}

#[test]
fn mutual_references_terminate() {
    let mut a = entity("A");
    a.attributes.push(many_to_one("b", "B"));
    let mut b = entity("B");
    b.attributes.push(many_to_one("a", "A"));

    let metadata = bind(&[
        EntityHierarchy::new(InheritanceKind::None, a),
        EntityHierarchy::new(InheritanceKind::None, b),
    ]);

    for (owner, attr, target) in [("A", "b", "B"), ("B", "a", "A")] {
        let binding = metadata.entity_binding(owner).unwrap();
        // bound exactly once; no duplicated attribute work
        assert_eq!(binding.attributes.len(), 1);

        let AttributeBinding::ManyToOne(m2o) = binding.attribute(attr).unwrap() else {
            panic!("expected many-to-one binding for {owner}.{attr}");
        };
        let fk_table = metadata.database.table(m2o.foreign_key.table);
        let fk = &fk_table.foreign_keys[m2o.foreign_key.index];
        assert_eq!(
            fk.target_table,
            metadata.entity_binding(target).unwrap().primary_table
        );
        assert_eq!(fk_table.column(fk.columns[0].source).name, attr);
    }
}

#[test]
fn foreign_key_preserves_column_order() {
    let mut one = BasicAttributeSource::new("one");
    one.declared_class = Some("i32".to_string());
    one.values
        .push(RelationalValueSource::Column(ColumnSource::named("c1")));
    let mut two = BasicAttributeSource::new("two");
    two.declared_class = Some("i32".to_string());
    two.values
        .push(RelationalValueSource::Column(ColumnSource::named("c2")));

    let mut b = entity("B");
    b.attributes
        .push(AttributeSource::Component(ComponentAttributeSource {
            name: "key".to_string(),
            class_name: Some("BKey".to_string()),
            attributes: vec![AttributeSource::Basic(one), AttributeSource::Basic(two)],
            origin: Origin::new("B.mapping"),
        }));

    let mut reference = ManyToOneAttributeSource::new("b", "B");
    reference.property_ref = Some("key".to_string());
    reference.columns = vec![ColumnSource::named("x1"), ColumnSource::named("x2")];
    let mut a = entity("A");
    a.attributes.push(AttributeSource::ManyToOne(reference));

    let metadata = bind(&[
        EntityHierarchy::new(InheritanceKind::None, a),
        EntityHierarchy::new(InheritanceKind::None, b),
    ]);

    let a_binding = metadata.entity_binding("A").unwrap();
    let AttributeBinding::ManyToOne(m2o) = a_binding.attribute("b").unwrap() else {
        panic!("expected many-to-one binding");
    };

    let a_table = metadata.database.table(m2o.foreign_key.table);
    let b_table = primary_table(&metadata, "B");
    let fk = &a_table.foreign_keys[m2o.foreign_key.index];

    let pairs: Vec<(&str, &str)> = fk
        .column_mappings()
        .map(|pair| {
            (
                a_table.column(pair.source).name.as_str(),
                b_table.column(pair.target).name.as_str(),
            )
        })
        .collect();
    assert_eq!(pairs, [("x1", "c1"), ("x2", "c2")]);
}

#[test]
fn foreign_key_count_mismatch_is_rejected() {
    let mut reference = ManyToOneAttributeSource::new("b", "B");
    reference.property_ref = Some("key".to_string());
    reference.columns = vec![ColumnSource::named("x1")];

    let mut one = BasicAttributeSource::new("one");
    one.values
        .push(RelationalValueSource::Column(ColumnSource::named("c1")));
    let mut two = BasicAttributeSource::new("two");
    two.values
        .push(RelationalValueSource::Column(ColumnSource::named("c2")));
    let mut b = entity("B");
    b.attributes
        .push(AttributeSource::Component(ComponentAttributeSource {
            name: "key".to_string(),
            class_name: None,
            attributes: vec![AttributeSource::Basic(one), AttributeSource::Basic(two)],
            origin: Origin::new("B.mapping"),
        }));

    let mut a = entity("A");
    a.attributes.push(AttributeSource::ManyToOne(reference));

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[
            EntityHierarchy::new(InheritanceKind::None, a),
            EntityHierarchy::new(InheritanceKind::None, b),
        ],
    )
    .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn property_ref_to_plural_is_rejected() {
    let mut b = entity("B");
    b.attributes
        .push(AttributeSource::Plural(PluralAttributeSource {
            name: "tags".to_string(),
            nature: PluralNature::Bag,
            table: None,
            key_columns: vec![],
            element: PluralElementSource::Basic {
                declared_class: Some("String".to_string()),
                type_source: TypeSource::default(),
                values: vec![],
            },
            type_source: TypeSource::default(),
            origin: Origin::new("B.mapping"),
        }));

    let mut reference = ManyToOneAttributeSource::new("b", "B");
    reference.property_ref = Some("tags".to_string());
    let mut a = entity("A");
    a.attributes.push(AttributeSource::ManyToOne(reference));

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[
            EntityHierarchy::new(InheritanceKind::None, a),
            EntityHierarchy::new(InheritanceKind::None, b),
        ],
    )
    .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn property_ref_to_derived_formula_is_rejected() {
    let mut code = BasicAttributeSource::new("code");
    code.values.push(RelationalValueSource::Derived {
        formula: "upper(name)".to_string(),
    });
    let mut b = entity("B");
    b.attributes.push(AttributeSource::Basic(code));

    let mut reference = ManyToOneAttributeSource::new("b", "B");
    reference.property_ref = Some("code".to_string());
    let mut a = entity("A");
    a.attributes.push(AttributeSource::ManyToOne(reference));

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[
            EntityHierarchy::new(InheritanceKind::None, a),
            EntityHierarchy::new(InheritanceKind::None, b),
        ],
    )
    .unwrap_err();
    assert!(err.is_mapping());
    assert!(err.to_string().contains("code"));
}

#[test]
fn unknown_association_target_is_rejected() {
    let mut a = entity("A");
    a.attributes.push(many_to_one("b", "Missing"));

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::None, a)],
    )
    .unwrap_err();
    assert!(err.is_mapping());
    assert!(err.to_string().contains("Missing"));
}

#[test]
fn unsupported_forms_fail_fast() {
    // one-to-one
    let mut a = entity("A");
    a.attributes.push(AttributeSource::OneToOne {
        name: "other".to_string(),
        origin: Origin::new("A.mapping"),
    });
    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::None, a)],
    )
    .unwrap_err();
    assert!(err.is_unsupported());

    // composite identifier
    let mut b = EntitySource::new("B");
    b.identifier = Some(IdentifierSource::Composite);
    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::None, b)],
    )
    .unwrap_err();
    assert!(err.is_unsupported());

    // indexed collection
    let mut c = entity("C");
    c.attributes
        .push(AttributeSource::Plural(PluralAttributeSource {
            name: "items".to_string(),
            nature: PluralNature::List,
            table: None,
            key_columns: vec![],
            element: PluralElementSource::Basic {
                declared_class: None,
                type_source: TypeSource::default(),
                values: vec![],
            },
            type_source: TypeSource::default(),
            origin: Origin::new("C.mapping"),
        }));
    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::None, c)],
    )
    .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn secondary_table_requires_explicit_name() {
    let mut user = entity("User");
    user.secondary_tables.push(SecondaryTableSource {
        table: TableSpec::default(),
        origin: Origin::new("User.mapping"),
    });

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::None, user)],
    )
    .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn secondary_table_is_bound() {
    let mut user = entity("User");
    user.secondary_tables.push(SecondaryTableSource {
        table: TableSpec {
            schema: None,
            name: Some("user_details".to_string()),
        },
        origin: Origin::new("User.mapping"),
    });

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::None, user)]);

    let binding = metadata.entity_binding("User").unwrap();
    assert_eq!(binding.secondary_tables.len(), 1);
    assert_eq!(
        metadata.database.table(binding.secondary_tables[0]).name,
        "user_details"
    );
}

#[test]
fn joined_subclass_gets_keyed_table() {
    let mut animal = entity("Animal");
    let mut dog = EntitySource::new("Dog");
    dog.attributes.push(basic("breed", "String"));
    animal.subclasses.push(dog);

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::Joined, animal)]);

    let animal_table_id = metadata.entity_binding("Animal").unwrap().primary_table;
    let dog_table = primary_table(&metadata, "Dog");
    assert_eq!(dog_table.name, "dog");

    // key mirrored from the root, type code included
    assert_eq!(dog_table.primary_key.len(), 1);
    let key = dog_table.column(dog_table.primary_key[0]);
    assert_eq!(key.name, "id");
    assert_eq!(key.jdbc_type_code, Some(-5));

    // join foreign key to the root's primary table
    assert_eq!(dog_table.foreign_keys.len(), 1);
    assert_eq!(dog_table.foreign_keys[0].target_table, animal_table_id);

    // subclasses resolve hierarchy details through the root
    assert!(metadata.hierarchy_details("Dog").is_some());
}

#[test]
fn table_per_class_subclass_has_no_join_key() {
    let mut animal = entity("Animal");
    animal.subclasses.push(EntitySource::new("Dog"));

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::TablePerClass, animal)]);

    let dog_table = primary_table(&metadata, "Dog");
    assert_eq!(dog_table.primary_key.len(), 1);
    assert!(dog_table.foreign_keys.is_empty());
}

#[test]
fn single_table_subclass_shares_root_table() {
    let mut animal = entity("Animal");
    animal.discriminator = Some(bindery_core::source::DiscriminatorSource {
        column: ColumnSource::default(),
        type_name: None,
    });
    animal.subclasses.push(EntitySource::new("Dog"));

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::SingleTable, animal)]);

    let animal_binding = metadata.entity_binding("Animal").unwrap();
    let dog_binding = metadata.entity_binding("Dog").unwrap();
    assert_eq!(animal_binding.primary_table, dog_binding.primary_table);
    assert_eq!(dog_binding.discriminator_match_value.as_deref(), Some("Dog"));

    let table = metadata.database.table(animal_binding.primary_table);
    let dtype = table.column(table.find_column("dtype").unwrap());
    assert!(!dtype.nullable);

    let hierarchy = metadata.hierarchy_details("Animal").unwrap();
    assert!(hierarchy.discriminator.is_some());
}

#[test]
fn discriminator_outside_single_table_is_rejected() {
    let mut animal = entity("Animal");
    animal.discriminator = Some(bindery_core::source::DiscriminatorSource {
        column: ColumnSource::default(),
        type_name: None,
    });
    animal.subclasses.push(EntitySource::new("Dog"));

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::Joined, animal)],
    )
    .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn subclasses_without_strategy_are_rejected() {
    let mut animal = entity("Animal");
    animal.subclasses.push(EntitySource::new("Dog"));

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::None, animal)],
    )
    .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn duplicate_entity_names_are_rejected() {
    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[
            EntityHierarchy::new(InheritanceKind::None, entity("User")),
            EntityHierarchy::new(InheritanceKind::None, entity("User")),
        ],
    )
    .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn truth_value_overrides_column_defaults() {
    let mut attribute = BasicAttributeSource::new("code");
    let mut column = ColumnSource::named("code");
    column.nullable = TruthValue::False;
    column.insertable = TruthValue::False;
    attribute
        .values
        .push(RelationalValueSource::Column(column));

    let mut user = entity("User");
    user.attributes.push(AttributeSource::Basic(attribute));

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::None, user)]);

    let binding = metadata.entity_binding("User").unwrap();
    let AttributeBinding::Basic(code) = binding.attribute("code").unwrap() else {
        panic!("expected basic binding");
    };
    assert!(!code.values[0].include_in_insert);
    assert!(code.values[0].include_in_update);

    let table = primary_table(&metadata, "User");
    assert!(!table.column(table.find_column("code").unwrap()).nullable);
}

#[test]
fn derived_values_are_read_only() {
    let mut attribute = BasicAttributeSource::new("display_name");
    attribute.values.push(RelationalValueSource::Derived {
        formula: "upper(name)".to_string(),
    });

    let mut user = entity("User");
    user.attributes.push(AttributeSource::Basic(attribute));

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::None, user)]);

    let binding = metadata.entity_binding("User").unwrap();
    let AttributeBinding::Basic(display) = binding.attribute("display_name").unwrap() else {
        panic!("expected basic binding");
    };
    assert!(!display.values[0].include_in_insert);
    assert!(!display.values[0].include_in_update);

    let table = primary_table(&metadata, "User");
    assert!(table.value(display.values[0].value).is_derived());
}

#[test]
fn derived_identifier_is_rejected() {
    let mut attribute = BasicAttributeSource::new("id");
    attribute.values.push(RelationalValueSource::Derived {
        formula: "nextval()".to_string(),
    });
    let mut user = EntitySource::new("User");
    user.identifier = Some(IdentifierSource::Simple(SimpleIdentifierSource {
        attribute,
        generator: None,
    }));

    let mut metadata = Metadata::new();
    let err = Binder::process_entity_hierarchies(
        &mut metadata,
        &[EntityHierarchy::new(InheritanceKind::None, user)],
    )
    .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn bag_of_basic_elements() {
    let mut user = entity("User");
    user.attributes
        .push(AttributeSource::Plural(PluralAttributeSource {
            name: "tags".to_string(),
            nature: PluralNature::Bag,
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

    let metadata = bind(&[EntityHierarchy::new(InheritanceKind::None, user)]);

    let binding = metadata.entity_binding("User").unwrap();
    let AttributeBinding::Plural(tags) = binding.attribute("tags").unwrap() else {
        panic!("expected plural binding");
    };

    let collection_table = metadata.database.table(tags.collection_table);
    assert_eq!(collection_table.name, "user_tags");

    // key column points back at the owner
    let key = collection_table.column(tags.key_values[0].value);
    assert_eq!(key.name, "user_id");
    assert!(!key.nullable);
    assert_eq!(key.jdbc_type_code, Some(-5));

    let fk = &collection_table.foreign_keys[tags.key_foreign_key.index];
    assert_eq!(fk.target_table, binding.primary_table);

    // element column typed from the declared element class
    let bindery_core::schema::binding::PluralElementBinding::Basic { values } = &tags.element
    else {
        panic!("expected basic element binding");
    };
    let element = collection_table.column(values[0].value);
    assert_eq!(element.name, "tags");
    assert_eq!(element.jdbc_type_code, Some(12));

    assert!(metadata.collection("User.tags").is_some());
}

#[test]
fn one_to_many_uses_target_primary_table() {
    let mut order = entity("Order");
    order
        .attributes
        .push(AttributeSource::Plural(PluralAttributeSource {
            name: "lines".to_string(),
            nature: PluralNature::Bag,
            table: None,
            key_columns: vec![],
            element: PluralElementSource::OneToMany {
                referenced_entity: "LineItem".to_string(),
            },
            type_source: TypeSource::default(),
            origin: Origin::new("Order.mapping"),
        }));

    let metadata = bind(&[
        EntityHierarchy::new(InheritanceKind::None, order),
        EntityHierarchy::new(InheritanceKind::None, entity("LineItem")),
    ]);

    let order_binding = metadata.entity_binding("Order").unwrap();
    let line_item_binding = metadata.entity_binding("LineItem").unwrap();
    let AttributeBinding::Plural(lines) = order_binding.attribute("lines").unwrap() else {
        panic!("expected plural binding");
    };

    assert_eq!(lines.collection_table, line_item_binding.primary_table);

    let table = metadata.database.table(lines.collection_table);
    let key = table.column(lines.key_values[0].value);
    assert_eq!(key.name, "order_id");

    let fk = &table.foreign_keys[lines.key_foreign_key.index];
    assert_eq!(fk.target_table, order_binding.primary_table);
}
