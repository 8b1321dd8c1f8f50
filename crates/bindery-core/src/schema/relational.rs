mod column;
pub use column::{Column, ColumnSpec, Size};

mod database;
pub use database::{Database, SchemaName};

mod foreign_key;
pub use foreign_key::{ForeignKey, ForeignKeyColumn, ForeignKeyRef};

mod table;
pub use table::{Table, TableId};

mod unique_key;
pub use unique_key::UniqueKey;

mod value;
pub use value::{DerivedValue, Value, ValueId};
