//! The entity/attribute binder: walks forward-declared entity hierarchies
//! and produces the bound model, resolving cross-entity references on
//! demand with memoization.

mod attribute;

mod relational;
use relational::ColumnDefaults;

use crate::{
    schema::{
        binding::{
            DiscriminatorBinding, EntityBinding, HierarchyDetails, IdentifierBinding,
            IdentifierGenerator, VersionBinding,
        },
        domain::{Entity, SingularAttribute},
        relational::{ColumnSpec, TableId, UniqueKey},
    },
    source::{
        DiscriminatorSource, EntityHierarchy, EntitySource, IdentifierSource, InheritanceKind,
        Origin, SimpleIdentifierSource, VersionSource,
    },
    types::{self, TypeDescriptor},
    Error, Metadata, Result,
};
use indexmap::IndexMap;

/// Binds entity hierarchies into a [`Metadata`] registry.
///
/// One binder instance performs one mapping-time pass; it holds the
/// name-indexed source map and relies on the registry as the processed-set,
/// so it must not be shared across threads.
pub struct Binder<'a> {
    metadata: &'a mut Metadata,

    hierarchies: &'a [EntityHierarchy],

    /// Every entity source (roots and subclasses) indexed by entity name,
    /// built before any binding so associations can reference any entity,
    /// visited or not.
    source_index: IndexMap<&'a str, usize>,
}

/// State scoped to one hierarchy's walk, threaded as a parameter through the
/// recursive bind calls so nothing leaks between hierarchies.
#[derive(Clone, Copy)]
struct HierarchyContext<'a> {
    inheritance: InheritanceKind,
    root_entity: &'a str,
}

impl<'a> Binder<'a> {
    /// Binds all hierarchies: first indexes every entity descriptor by name,
    /// then walks each hierarchy root-down, producing bindings depth-first
    /// through the subclass tree.
    pub fn process_entity_hierarchies(
        metadata: &'a mut Metadata,
        hierarchies: &'a [EntityHierarchy],
    ) -> Result<()> {
        let mut source_index = IndexMap::new();
        for (index, hierarchy) in hierarchies.iter().enumerate() {
            index_entity_sources(&mut source_index, &hierarchy.root, index)?;
        }

        let mut binder = Binder {
            metadata,
            hierarchies,
            source_index,
        };

        for index in 0..hierarchies.len() {
            binder.bind_hierarchy(index)?;
        }

        Ok(())
    }

    fn bind_hierarchy(&mut self, index: usize) -> Result<()> {
        let hierarchies = self.hierarchies;
        let hierarchy = &hierarchies[index];

        if hierarchy.inheritance == InheritanceKind::None && !hierarchy.root.subclasses.is_empty()
        {
            return Err(Error::mapping_at(
                format!(
                    "entity `{}` declares subclasses but no inheritance strategy",
                    hierarchy.root.entity_name
                ),
                &hierarchy.root.origin,
            ));
        }

        let cx = HierarchyContext {
            inheritance: hierarchy.inheritance,
            root_entity: &hierarchy.root.entity_name,
        };

        self.create_entity_binding(&hierarchy.root, None, cx)?;
        self.bind_subclass_tree(&hierarchy.root, cx)
    }

    fn bind_subclass_tree(
        &mut self,
        parent: &'a EntitySource,
        cx: HierarchyContext<'a>,
    ) -> Result<()> {
        for subclass in &parent.subclasses {
            self.create_entity_binding(subclass, Some(&parent.entity_name), cx)?;
            self.bind_subclass_tree(subclass, cx)?;
        }
        Ok(())
    }

    /// Resolves an entity binding by name, binding the entity's entire
    /// hierarchy on demand when it has not been visited yet. This is the
    /// cyclic-reference breaker: the target's name is registered before its
    /// own attributes are walked, so a reference cycle terminates.
    fn resolve_entity_binding(&mut self, name: &str, origin: &Origin) -> Result<()> {
        if self.metadata.has_entity(name) {
            return Ok(());
        }

        let Some(&index) = self.source_index.get(name) else {
            return Err(Error::mapping_at(
                format!("association references unknown entity `{name}`"),
                origin,
            ));
        };

        self.bind_hierarchy(index)
    }

    /// Builds and registers the binding for one entity. Idempotent: an
    /// already-bound entity name returns immediately without rebinding.
    ///
    /// The binding is registered in the metadata registry *before* its
    /// attributes are bound; the identifier is bound earlier still, so any
    /// entity reached through on-demand association resolution always
    /// exposes usable key columns.
    fn create_entity_binding(
        &mut self,
        source: &'a EntitySource,
        super_entity: Option<&str>,
        cx: HierarchyContext<'a>,
    ) -> Result<()> {
        if self.metadata.has_entity(&source.entity_name) {
            return Ok(());
        }

        let is_root = super_entity.is_none();

        let primary_table = match (is_root, cx.inheritance) {
            (true, _)
            | (false, InheritanceKind::Joined)
            | (false, InheritanceKind::TablePerClass) => {
                let default_name = self
                    .metadata
                    .naming()
                    .entity_table_name(&source.entity_name);
                let spec = source.table.clone().unwrap_or_default();
                self.resolve_table(&spec, &default_name)
            }
            (false, InheritanceKind::SingleTable) => {
                self.metadata
                    .entity_binding(cx.root_entity)
                    .expect("root bound before subclasses")
                    .primary_table
            }
            (false, InheritanceKind::None) => {
                unreachable!("subclasses without an inheritance strategy are rejected earlier")
            }
        };

        let hierarchy = if is_root {
            Some(self.bind_hierarchy_details(source, primary_table, cx)?)
        } else {
            None
        };

        if !is_root {
            match cx.inheritance {
                InheritanceKind::Joined => {
                    self.bind_subclass_primary_key(primary_table, cx, true)
                }
                InheritanceKind::TablePerClass => {
                    self.bind_subclass_primary_key(primary_table, cx, false)
                }
                InheritanceKind::SingleTable => {}
                InheritanceKind::None => unreachable!(),
            }
        }

        let discriminator_match_value = source.discriminator_match_value.clone().or_else(|| {
            (!is_root && cx.inheritance == InheritanceKind::SingleTable)
                .then(|| source.entity_name.clone())
        });

        self.metadata.add_entity(EntityBinding {
            entity: Entity {
                name: source.entity_name.clone(),
                class_name: source.class_name.clone(),
                super_entity: super_entity.map(str::to_string),
            },
            primary_table,
            secondary_tables: vec![],
            attributes: IndexMap::new(),
            hierarchy_root: cx.root_entity.to_string(),
            hierarchy,
            super_entity: super_entity.map(str::to_string),
            sub_entities: source
                .subclasses
                .iter()
                .map(|sub| sub.entity_name.clone())
                .collect(),
            discriminator_match_value,
            dynamic_insert: source.dynamic_insert,
            dynamic_update: source.dynamic_update,
            custom_sql: source.custom_sql.clone(),
            proxy_interface: source.proxy_interface.clone(),
            persister_class: source.persister_class.clone(),
        });

        for attribute_source in &source.attributes {
            let attribute =
                self.bind_attribute(&source.entity_name, attribute_source, primary_table)?;
            let name = attribute.name().to_string();
            self.metadata
                .entity_binding_mut(&source.entity_name)
                .attributes
                .insert(name, attribute);
        }

        for secondary in &source.secondary_tables {
            let Some(name) = secondary.table.name.clone() else {
                return Err(Error::mapping_at(
                    format!(
                        "secondary table on entity `{}` requires an explicit name",
                        source.entity_name
                    ),
                    &secondary.origin,
                ));
            };
            let table = self.resolve_table(&secondary.table, &name);
            self.metadata
                .entity_binding_mut(&source.entity_name)
                .secondary_tables
                .push(table);
        }

        self.bind_unique_constraints(source, primary_table);

        Ok(())
    }

    fn bind_hierarchy_details(
        &mut self,
        source: &EntitySource,
        primary_table: TableId,
        cx: HierarchyContext<'_>,
    ) -> Result<HierarchyDetails> {
        let Some(identifier_source) = &source.identifier else {
            // A root with no identifier source is a bug in the front end,
            // not a user mapping error.
            panic!(
                "root entity source `{}` is missing an identifier source",
                source.entity_name
            );
        };

        let identifier = match identifier_source {
            IdentifierSource::Simple(simple) => {
                self.bind_simple_identifier(source, simple, primary_table)?
            }
            IdentifierSource::Composite => {
                return Err(Error::unsupported(format!(
                    "composite identifier on entity `{}`",
                    source.entity_name
                )));
            }
        };

        let version = match &source.version {
            Some(version) => Some(self.bind_version(version, primary_table)),
            None => None,
        };

        let discriminator = match &source.discriminator {
            Some(discriminator) if cx.inheritance == InheritanceKind::SingleTable => {
                Some(self.bind_discriminator(discriminator, primary_table))
            }
            Some(_) => {
                return Err(Error::mapping_at(
                    format!(
                        "discriminator on entity `{}` requires single-table inheritance",
                        source.entity_name
                    ),
                    &source.origin,
                ));
            }
            None => None,
        };

        Ok(HierarchyDetails {
            inheritance: cx.inheritance,
            identifier,
            version,
            discriminator,
        })
    }

    /// Binds a simple identifier: its relational values become exactly the
    /// primary-key columns of the entity's primary table.
    fn bind_simple_identifier(
        &mut self,
        entity: &EntitySource,
        source: &SimpleIdentifierSource,
        table: TableId,
    ) -> Result<IdentifierBinding> {
        let attribute = &source.attribute;
        let default_name = self.metadata.naming().column_name(&attribute.name);
        let values = self.bind_relational_values(
            table,
            &attribute.values,
            &default_name,
            ColumnDefaults::IDENTIFIER,
        );

        for value in &values {
            if self
                .metadata
                .database
                .table(table)
                .value(value.value)
                .is_derived()
            {
                return Err(Error::mapping_at(
                    format!(
                        "identifier attribute `{}` must map to physical columns",
                        attribute.name
                    ),
                    &attribute.origin,
                ));
            }
        }

        self.metadata.database.table_mut(table).primary_key =
            values.iter().map(|value| value.value).collect();

        let generator = source
            .generator
            .as_ref()
            .map(|generator| IdentifierGenerator {
                strategy: generator.strategy.clone(),
                params: generator.params.clone(),
            })
            .unwrap_or_else(|| IdentifierGenerator::assigned(&entity.entity_name));

        let mut type_descriptor = TypeDescriptor::default();
        type_descriptor.apply_hints(&attribute.type_source);
        let (registry, database) = self.metadata.types_and_database_mut();
        types::bind_singular_attribute_type(
            registry,
            &mut type_descriptor,
            attribute.declared_class.as_deref(),
            &values,
            database,
        );

        Ok(IdentifierBinding {
            attribute: SingularAttribute {
                name: attribute.name.clone(),
                declared_class: attribute.declared_class.clone(),
            },
            values,
            generator,
            type_descriptor,
        })
    }

    fn bind_version(&mut self, source: &VersionSource, table: TableId) -> VersionBinding {
        let attribute = &source.attribute;
        let default_name = self.metadata.naming().column_name(&attribute.name);
        let values = self.bind_relational_values(
            table,
            &attribute.values,
            &default_name,
            ColumnDefaults::VERSION,
        );

        let mut type_descriptor = TypeDescriptor::default();
        type_descriptor.apply_hints(&attribute.type_source);
        let (registry, database) = self.metadata.types_and_database_mut();
        types::bind_singular_attribute_type(
            registry,
            &mut type_descriptor,
            attribute.declared_class.as_deref(),
            &values,
            database,
        );

        VersionBinding {
            attribute: SingularAttribute {
                name: attribute.name.clone(),
                declared_class: attribute.declared_class.clone(),
            },
            values,
            type_descriptor,
        }
    }

    fn bind_discriminator(
        &mut self,
        source: &DiscriminatorSource,
        table: TableId,
    ) -> DiscriminatorBinding {
        let value = self.bind_column(table, &source.column, "dtype", ColumnDefaults::DISCRIMINATOR);
        DiscriminatorBinding {
            value,
            type_name: source.type_name.clone(),
        }
    }

    /// Mirrors the root's primary-key columns onto a subclass table and,
    /// for joined inheritance, establishes the join foreign key from the
    /// subclass key to the root's primary table.
    fn bind_subclass_primary_key(
        &mut self,
        table: TableId,
        cx: HierarchyContext<'_>,
        join_to_root: bool,
    ) {
        let root_table = self
            .metadata
            .entity_binding(cx.root_entity)
            .expect("root bound before subclasses")
            .primary_table;

        let root_pk: Vec<(String, Option<i32>, _)> = {
            let table_ref = self.metadata.database.table(root_table);
            table_ref
                .primary_key
                .iter()
                .map(|id| {
                    let column = table_ref.column(*id);
                    (column.name.clone(), column.jdbc_type_code, *id)
                })
                .collect()
        };

        let mut pk_values = Vec::with_capacity(root_pk.len());
        for (name, jdbc_type_code, _) in &root_pk {
            let spec = ColumnSpec {
                nullable: false,
                jdbc_type_code: *jdbc_type_code,
                ..ColumnSpec::default()
            };
            pk_values.push(
                self.metadata
                    .database
                    .table_mut(table)
                    .locate_column(name, spec),
            );
        }
        self.metadata.database.table_mut(table).primary_key = pk_values.clone();

        if join_to_root {
            self.create_foreign_key(
                table,
                root_table,
                pk_values,
                root_pk.into_iter().map(|(_, _, id)| id).collect(),
            );
        }
    }

    fn bind_unique_constraints(&mut self, source: &EntitySource, table: TableId) {
        for constraint in &source.unique_constraints {
            let columns = constraint
                .columns
                .iter()
                .map(|name| {
                    self.metadata
                        .database
                        .table_mut(table)
                        .locate_column(name, ColumnSpec {
                            nullable: true,
                            ..ColumnSpec::default()
                        })
                })
                .collect();
            self.metadata
                .database
                .table_mut(table)
                .unique_keys
                .push(UniqueKey {
                    name: constraint.name.clone(),
                    columns,
                });
        }
    }
}

fn index_entity_sources<'a>(
    index: &mut IndexMap<&'a str, usize>,
    source: &'a EntitySource,
    hierarchy: usize,
) -> Result<()> {
    let previous = index.insert(&source.entity_name, hierarchy);
    if previous.is_some() {
        return Err(Error::mapping_at(
            format!("duplicate entity name `{}`", source.entity_name),
            &source.origin,
        ));
    }

    for subclass in &source.subclasses {
        index_entity_sources(index, subclass, hierarchy)?;
    }

    Ok(())
}
