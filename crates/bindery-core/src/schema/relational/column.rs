use super::ValueId;

/// A physical table column.
#[derive(Debug, PartialEq)]
pub struct Column {
    /// Uniquely identifies the column within the database.
    pub id: ValueId,

    /// The name of the column in the database.
    pub name: String,

    pub nullable: bool,

    pub unique: bool,

    /// JDBC type code, once known. Filled in by the type resolution helper
    /// only when currently `None` (explicit mapping wins over inference).
    pub jdbc_type_code: Option<i32>,

    /// Explicit SQL type name from the mapping, if any.
    pub sql_type: Option<String>,

    pub size: Size,

    pub default_value: Option<String>,

    pub check_condition: Option<String>,

    pub comment: Option<String>,
}

/// Length / precision / scale, as declared in the mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

/// Everything a call site knows about a column it is about to create. Used
/// only on creation; a name collision ignores the spec and returns the
/// existing column.
#[derive(Debug, Default)]
pub struct ColumnSpec {
    pub nullable: bool,
    pub unique: bool,
    pub jdbc_type_code: Option<i32>,
    pub sql_type: Option<String>,
    pub size: Size,
    pub default_value: Option<String>,
    pub check_condition: Option<String>,
    pub comment: Option<String>,
}

impl Column {
    pub(crate) fn new(id: ValueId, name: &str, spec: ColumnSpec) -> Self {
        Self {
            id,
            name: name.to_string(),
            nullable: spec.nullable,
            unique: spec.unique,
            jdbc_type_code: spec.jdbc_type_code,
            sql_type: spec.sql_type,
            size: spec.size,
            default_value: spec.default_value,
            check_condition: spec.check_condition,
            comment: spec.comment,
        }
    }
}
