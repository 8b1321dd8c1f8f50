use super::{Table, TableId};
use indexmap::IndexMap;

/// The full relational model built during binding: every schema and every
/// table, keyed so that repeated lookups converge on the same objects.
#[derive(Debug, Default)]
pub struct Database {
    /// Table lookup per schema. Identifiers are reserved in declaration
    /// order, so iteration is deterministic.
    schemas: IndexMap<SchemaName, IndexMap<String, TableId>>,

    /// Tables as they are built. `TableId` indexes into this vec.
    tables: Vec<Table>,
}

/// Identifies a schema within the database. `default()` is the unnamed
/// default schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaName {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

impl SchemaName {
    pub fn named(schema: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: Some(schema.into()),
        }
    }
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the schema if it has not been seen yet.
    pub fn locate_schema(&mut self, name: &SchemaName) {
        if !self.schemas.contains_key(name) {
            self.schemas.insert(name.clone(), IndexMap::new());
        }
    }

    /// Get-or-create a table by logical name within a schema. Repeated calls
    /// with the same (schema, name) pair return the same `TableId`, which is
    /// how primary, secondary, and collection tables sharing one physical
    /// table converge onto one object.
    pub fn locate_table(&mut self, schema: &SchemaName, logical_name: &str) -> TableId {
        self.locate_schema(schema);

        if let Some(id) = self.schemas[schema].get(logical_name) {
            return *id;
        }

        let id = TableId(self.tables.len());
        self.tables
            .push(Table::new(id, schema.clone(), logical_name.to_string()));
        self.schemas
            .get_mut(schema)
            .unwrap()
            .insert(logical_name.to_string(), id);
        id
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    pub fn table_mut(&mut self, id: TableId) -> &mut Table {
        &mut self.tables[id.0]
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_converges() {
        let mut db = Database::new();
        let schema = SchemaName::default();

        let a = db.locate_table(&schema, "users");
        let b = db.locate_table(&schema, "users");
        assert_eq!(a, b);
        assert_eq!(db.tables().count(), 1);

        let c = db.locate_table(&SchemaName::named("audit"), "users");
        assert_ne!(a, c);
    }
}
