use super::{Column, TableId};
use std::fmt;

/// A relational value a binding can map onto: either a physical column or a
/// read-only SQL formula.
#[derive(Debug)]
pub enum Value {
    Column(Column),
    Derived(DerivedValue),
}

/// A read-only SQL formula fragment evaluated by the database.
#[derive(Debug)]
pub struct DerivedValue {
    pub id: ValueId,
    pub formula: String,
}

/// Uniquely identifies a value (column or derived) within its table.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct ValueId {
    pub table: TableId,
    pub index: usize,
}

impl Value {
    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Value::Column(column) => Some(column),
            Value::Derived(_) => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Value::Derived(_))
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ValueId({}/{})", self.table.0, self.index)
    }
}
