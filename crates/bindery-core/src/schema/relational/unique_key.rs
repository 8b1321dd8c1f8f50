use super::ValueId;

/// A named table-level unique constraint.
#[derive(Debug)]
pub struct UniqueKey {
    pub name: String,
    pub columns: Vec<ValueId>,
}
