use super::{Column, ColumnSpec, DerivedValue, ForeignKey, SchemaName, UniqueKey, Value, ValueId};
use std::fmt;

/// A database table.
#[derive(Debug)]
pub struct Table {
    /// Uniquely identifies the table within the database.
    pub id: TableId,

    /// Schema the table belongs to.
    pub schema: SchemaName,

    /// Logical name of the table.
    pub name: String,

    /// Columns and derived values, in creation order.
    pub values: Vec<Value>,

    /// Values that make up the primary key, in declaration order.
    pub primary_key: Vec<ValueId>,

    pub foreign_keys: Vec<ForeignKey>,

    pub unique_keys: Vec<UniqueKey>,
}

/// Uniquely identifies a table.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct TableId(pub usize);

impl Table {
    pub(crate) fn new(id: TableId, schema: SchemaName, name: String) -> Self {
        Self {
            id,
            schema,
            name,
            values: vec![],
            primary_key: vec![],
            foreign_keys: vec![],
            unique_keys: vec![],
        }
    }

    /// Get-or-create a column by name. A name collision returns the existing
    /// column, which is how repeated attribute and key references to the
    /// same physical column converge.
    pub fn locate_column(&mut self, name: &str, spec: ColumnSpec) -> ValueId {
        if let Some(id) = self.find_column(name) {
            return id;
        }

        let id = ValueId {
            table: self.id,
            index: self.values.len(),
        };
        self.values.push(Value::Column(Column::new(id, name, spec)));
        id
    }

    pub fn find_column(&self, name: &str) -> Option<ValueId> {
        self.values.iter().enumerate().find_map(|(index, value)| {
            match value {
                Value::Column(column) if column.name == name => Some(ValueId {
                    table: self.id,
                    index,
                }),
                _ => None,
            }
        })
    }

    /// Derived values are always created fresh; formulas have no name to
    /// converge on.
    pub fn create_derived_value(&mut self, formula: impl Into<String>) -> ValueId {
        let id = ValueId {
            table: self.id,
            index: self.values.len(),
        };
        self.values.push(Value::Derived(DerivedValue {
            id,
            formula: formula.into(),
        }));
        id
    }

    pub fn value(&self, id: ValueId) -> &Value {
        assert_eq!(self.id, id.table);
        &self.values[id.index]
    }

    /// Returns the column for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` refers to a derived value.
    pub fn column(&self, id: ValueId) -> &Column {
        match self.value(id) {
            Value::Column(column) => column,
            Value::Derived(_) => panic!("expected column, found derived value"),
        }
    }

    pub fn column_mut(&mut self, id: ValueId) -> &mut Column {
        assert_eq!(self.id, id.table);
        match &mut self.values[id.index] {
            Value::Column(column) => column,
            Value::Derived(_) => panic!("expected column, found derived value"),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.values.iter().filter_map(|value| match value {
            Value::Column(column) => Some(column),
            Value::Derived(_) => None,
        })
    }

    pub fn primary_key_columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.primary_key.iter().map(|id| self.column(*id))
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TableId({})", self.0)
    }
}
