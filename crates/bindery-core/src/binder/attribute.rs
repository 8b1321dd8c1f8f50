use super::{relational::ColumnDefaults, Binder};
use crate::{
    metadata::CollectionRole,
    schema::{
        binding::{
            AttributeBinding, BasicAttributeBinding, CompositeAttributeBinding,
            ManyToOneAttributeBinding, PluralAttributeBinding, PluralElementBinding,
            RelationalValueBinding,
        },
        domain::{Composite, PluralAttribute, SingularAttribute},
        relational::{TableId, ValueId},
    },
    source::{
        AttributeSource, BasicAttributeSource, ColumnSource, ComponentAttributeSource,
        ManyToOneAttributeSource, PluralAttributeSource, PluralElementSource,
    },
    types::{self, fill, TypeDescriptor},
    Error, Result,
};
use indexmap::IndexMap;

impl<'a> Binder<'a> {
    pub(super) fn bind_attribute(
        &mut self,
        owner_entity: &str,
        source: &AttributeSource,
        table: TableId,
    ) -> Result<AttributeBinding> {
        match source {
            AttributeSource::Basic(basic) => {
                Ok(AttributeBinding::Basic(self.bind_basic(basic, table)))
            }
            AttributeSource::Component(component) => Ok(AttributeBinding::Composite(
                self.bind_component(owner_entity, component, table)?,
            )),
            AttributeSource::ManyToOne(many_to_one) => Ok(AttributeBinding::ManyToOne(
                self.bind_many_to_one(many_to_one, table)?,
            )),
            AttributeSource::OneToOne { name, .. } => Err(Error::unsupported(format!(
                "one-to-one attribute `{name}`"
            ))),
            AttributeSource::Any { name, .. } => {
                Err(Error::unsupported(format!("ANY-type attribute `{name}`")))
            }
            AttributeSource::Plural(plural) => Ok(AttributeBinding::Plural(
                self.bind_plural(owner_entity, plural, table)?,
            )),
        }
    }

    fn bind_basic(&mut self, source: &BasicAttributeSource, table: TableId) -> BasicAttributeBinding {
        let default_name = self.metadata.naming().column_name(&source.name);
        let values = self.bind_relational_values(
            table,
            &source.values,
            &default_name,
            ColumnDefaults::ATTRIBUTE,
        );

        let mut type_descriptor = TypeDescriptor::default();
        type_descriptor.apply_hints(&source.type_source);
        let (registry, database) = self.metadata.types_and_database_mut();
        types::bind_singular_attribute_type(
            registry,
            &mut type_descriptor,
            source.declared_class.as_deref(),
            &values,
            database,
        );

        BasicAttributeBinding {
            attribute: SingularAttribute {
                name: source.name.clone(),
                declared_class: source.declared_class.clone(),
            },
            values,
            type_descriptor,
        }
    }

    fn bind_component(
        &mut self,
        owner_entity: &str,
        source: &ComponentAttributeSource,
        table: TableId,
    ) -> Result<CompositeAttributeBinding> {
        let mut attributes = IndexMap::new();
        for sub_source in &source.attributes {
            let binding = self.bind_attribute(owner_entity, sub_source, table)?;
            let name = binding.name().to_string();
            attributes.insert(name, binding);
        }

        Ok(CompositeAttributeBinding {
            attribute: SingularAttribute {
                name: source.name.clone(),
                declared_class: source.class_name.clone(),
            },
            composite: Composite {
                class_name: source.class_name.clone(),
            },
            attributes,
        })
    }

    /// Binds a to-one association: resolves the target entity on demand,
    /// determines the target columns (identifier or property-ref), creates
    /// the key columns on the owner side, and establishes the foreign key.
    fn bind_many_to_one(
        &mut self,
        source: &ManyToOneAttributeSource,
        table: TableId,
    ) -> Result<ManyToOneAttributeBinding> {
        self.resolve_entity_binding(&source.referenced_entity, &source.origin)?;

        let (target_table, target_values) = self.resolve_association_target(source)?;
        if target_values.is_empty() {
            return Err(Error::mapping_at(
                format!(
                    "association `{}` resolved no target columns on entity `{}`",
                    source.name, source.referenced_entity
                ),
                &source.origin,
            ));
        }

        if !source.columns.is_empty() && source.columns.len() != target_values.len() {
            return Err(Error::mapping_at(
                format!(
                    "association `{}` maps {} column(s) against {} target column(s)",
                    source.name,
                    source.columns.len(),
                    target_values.len()
                ),
                &source.origin,
            ));
        }

        let mut values = Vec::with_capacity(target_values.len());
        if source.columns.is_empty() {
            for target in &target_values {
                let target_name = self
                    .metadata
                    .database
                    .table(target_table)
                    .column(*target)
                    .name
                    .clone();
                let name = if target_values.len() == 1 {
                    self.metadata.naming().column_name(&source.name)
                } else {
                    self.metadata
                        .naming()
                        .join_key_column_name(&source.name, &target_name)
                };
                values.push(self.bind_column(
                    table,
                    &ColumnSource::default(),
                    &name,
                    ColumnDefaults::ATTRIBUTE,
                ));
            }
        } else {
            let default_name = self.metadata.naming().column_name(&source.name);
            for column in &source.columns {
                values.push(self.bind_column(
                    table,
                    column,
                    &default_name,
                    ColumnDefaults::ATTRIBUTE,
                ));
            }
        }

        self.push_key_type_information(table, &values, target_table, &target_values);

        let foreign_key = self.create_foreign_key(
            table,
            target_table,
            values.iter().map(|value| value.value).collect(),
            target_values,
        );

        let mut type_descriptor = TypeDescriptor::default();
        let target_class = self
            .metadata
            .entity_binding(&source.referenced_entity)
            .expect("target bound on demand")
            .entity
            .class_name
            .clone();
        fill(
            &mut type_descriptor.class_name,
            target_class.or_else(|| Some(source.referenced_entity.clone())),
        );

        Ok(ManyToOneAttributeBinding {
            attribute: SingularAttribute {
                name: source.name.clone(),
                declared_class: None,
            },
            referenced_entity: source.referenced_entity.clone(),
            referenced_attribute: source.property_ref.clone(),
            values,
            foreign_key,
            type_descriptor,
        })
    }

    /// Target columns for a to-one association: the referenced entity's
    /// primary-key columns, or a named property-ref's columns with
    /// composites flattened recursively in declaration order.
    fn resolve_association_target(
        &self,
        source: &ManyToOneAttributeSource,
    ) -> Result<(TableId, Vec<ValueId>)> {
        let target = self
            .metadata
            .entity_binding(&source.referenced_entity)
            .expect("target bound on demand");

        match &source.property_ref {
            None => {
                let table = target.primary_table;
                Ok((table, self.metadata.database.table(table).primary_key.clone()))
            }
            Some(property_ref) => {
                let Some(attribute) = target.attribute(property_ref) else {
                    return Err(Error::mapping_at(
                        format!(
                            "property-ref `{property_ref}` not found on entity `{}`",
                            source.referenced_entity
                        ),
                        &source.origin,
                    ));
                };

                if matches!(attribute, AttributeBinding::Plural(_)) {
                    return Err(Error::mapping_at(
                        format!(
                            "property-ref `{property_ref}` on entity `{}` names a plural attribute",
                            source.referenced_entity
                        ),
                        &source.origin,
                    ));
                }

                let mut flattened = vec![];
                attribute.collect_values(&mut flattened);
                let maps_derived = flattened.iter().any(|value| {
                    self.metadata
                        .database
                        .table(value.value.table)
                        .value(value.value)
                        .is_derived()
                });
                if maps_derived {
                    return Err(Error::mapping_at(
                        format!(
                            "property-ref `{property_ref}` on entity `{}` maps to a derived formula",
                            source.referenced_entity
                        ),
                        &source.origin,
                    ));
                }
                Ok((
                    target.primary_table,
                    flattened.into_iter().map(|value| value.value).collect(),
                ))
            }
        }
    }

    /// Copies target key JDBC type codes onto source key columns that carry
    /// none yet.
    fn push_key_type_information(
        &mut self,
        table: TableId,
        values: &[RelationalValueBinding],
        target_table: TableId,
        target_values: &[ValueId],
    ) {
        for (value, target) in values.iter().zip(target_values) {
            let code = self
                .metadata
                .database
                .table(target_table)
                .column(*target)
                .jdbc_type_code;
            if let Some(code) = code {
                let column = self
                    .metadata
                    .database
                    .table_mut(table)
                    .column_mut(value.value);
                fill(&mut column.jdbc_type_code, Some(code));
            }
        }
    }

    fn bind_plural(
        &mut self,
        owner_entity: &str,
        source: &PluralAttributeSource,
        owner_table: TableId,
    ) -> Result<PluralAttributeBinding> {
        if source.nature.is_indexed() {
            return Err(Error::unsupported(format!(
                "indexed collection nature {:?} on attribute `{}`",
                source.nature, source.name
            )));
        }

        let owner_pk = self.metadata.database.table(owner_table).primary_key.clone();
        assert!(
            !owner_pk.is_empty(),
            "owner primary key must be bound before collections"
        );

        let collection_table = match &source.element {
            PluralElementSource::Basic { .. } => {
                let default_name = self
                    .metadata
                    .naming()
                    .collection_table_name(owner_entity, &source.name);
                let spec = source.table.clone().unwrap_or_default();
                self.resolve_table(&spec, &default_name)
            }
            PluralElementSource::OneToMany { referenced_entity } => {
                self.resolve_entity_binding(referenced_entity, &source.origin)?;
                self.metadata
                    .entity_binding(referenced_entity)
                    .expect("target bound on demand")
                    .primary_table
            }
        };

        if !source.key_columns.is_empty() && source.key_columns.len() != owner_pk.len() {
            return Err(Error::mapping_at(
                format!(
                    "collection `{}` maps {} key column(s) against {} owner key column(s)",
                    source.name,
                    source.key_columns.len(),
                    owner_pk.len()
                ),
                &source.origin,
            ));
        }

        let mut key_values = Vec::with_capacity(owner_pk.len());
        for (index, pk) in owner_pk.iter().enumerate() {
            let pk_name = self
                .metadata
                .database
                .table(owner_table)
                .column(*pk)
                .name
                .clone();
            let default_name = self
                .metadata
                .naming()
                .collection_key_column_name(owner_entity, &pk_name);
            let column_source = source.key_columns.get(index);
            let binding = match column_source {
                Some(column) => self.bind_column(
                    collection_table,
                    column,
                    &default_name,
                    ColumnDefaults::COLLECTION_KEY,
                ),
                None => self.bind_column(
                    collection_table,
                    &ColumnSource::default(),
                    &default_name,
                    ColumnDefaults::COLLECTION_KEY,
                ),
            };
            key_values.push(binding);
        }

        self.push_key_type_information(
            collection_table,
            &key_values,
            owner_table,
            &owner_pk,
        );

        let key_foreign_key = self.create_foreign_key(
            collection_table,
            owner_table,
            key_values.iter().map(|value| value.value).collect(),
            owner_pk,
        );

        let (element, declared_element_class, element_type) = match &source.element {
            PluralElementSource::Basic {
                declared_class,
                type_source,
                values,
            } => {
                let default_name = self.metadata.naming().column_name(&source.name);
                let values = self.bind_relational_values(
                    collection_table,
                    values,
                    &default_name,
                    ColumnDefaults::ATTRIBUTE,
                );
                let mut element_type = TypeDescriptor::default();
                element_type.apply_hints(type_source);
                (
                    PluralElementBinding::Basic { values },
                    declared_class.clone(),
                    element_type,
                )
            }
            PluralElementSource::OneToMany { referenced_entity } => (
                PluralElementBinding::OneToMany {
                    entity: referenced_entity.clone(),
                },
                None,
                TypeDescriptor::default(),
            ),
        };

        let mut type_descriptor = TypeDescriptor::default();
        type_descriptor.apply_hints(&source.type_source);

        let mut binding = PluralAttributeBinding {
            attribute: PluralAttribute {
                name: source.name.clone(),
                nature: source.nature,
                declared_element_class,
            },
            collection_table,
            key_values,
            key_foreign_key,
            element,
            type_descriptor,
            element_type,
        };

        let (registry, database) = self.metadata.types_and_database_mut();
        types::bind_plural_attribute_type(registry, &mut binding, database);

        self.metadata.add_collection(
            format!("{owner_entity}.{}", source.name),
            CollectionRole {
                entity: owner_entity.to_string(),
                attribute: source.name.clone(),
            },
        );

        Ok(binding)
    }
}
