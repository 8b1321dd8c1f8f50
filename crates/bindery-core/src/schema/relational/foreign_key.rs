use super::{TableId, ValueId};

/// A foreign key constraint mapping source columns to target columns 1:1,
/// order-preserving.
#[derive(Debug)]
pub struct ForeignKey {
    pub name: Option<String>,

    /// Table the constraint lives on.
    pub table: TableId,

    pub target_table: TableId,

    /// The Nth source column maps to the Nth target column.
    pub columns: Vec<ForeignKeyColumn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyColumn {
    pub source: ValueId,
    pub target: ValueId,
}

/// Locates a foreign key within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: TableId,
    pub index: usize,
}

impl ForeignKey {
    pub(crate) fn new(
        table: TableId,
        target_table: TableId,
        sources: Vec<ValueId>,
        targets: Vec<ValueId>,
    ) -> Self {
        // Count mismatches are rejected upstream as mapping errors; reaching
        // this point with unequal lists is a bug.
        assert_eq!(sources.len(), targets.len());

        Self {
            name: None,
            table,
            target_table,
            columns: sources
                .into_iter()
                .zip(targets)
                .map(|(source, target)| ForeignKeyColumn { source, target })
                .collect(),
        }
    }

    pub fn column_mappings(&self) -> impl ExactSizeIterator<Item = &ForeignKeyColumn> {
        self.columns.iter()
    }
}
