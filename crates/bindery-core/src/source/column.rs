use crate::schema::relational::Size;

/// Declarative description of one column. Any field may be left for the
/// binder to default.
#[derive(Debug, Clone, Default)]
pub struct ColumnSource {
    /// Explicit column name; `None` derives the name from the attribute.
    pub name: Option<String>,

    pub nullable: TruthValue,

    pub insertable: TruthValue,

    pub updatable: TruthValue,

    pub unique: bool,

    pub sql_type: Option<String>,

    pub size: Size,

    pub default_value: Option<String>,

    pub check_condition: Option<String>,

    pub comment: Option<String>,
}

/// Tri-state truth value for per-column overrides. `Unknown` defers to the
/// call site's column-binding defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruthValue {
    True,
    False,
    #[default]
    Unknown,
}

impl TruthValue {
    /// Resolves the tri-state against a default: an explicit value wins,
    /// `Unknown` yields the default.
    pub fn or_default(self, default: bool) -> bool {
        match self {
            TruthValue::True => true,
            TruthValue::False => false,
            TruthValue::Unknown => default,
        }
    }
}

impl ColumnSource {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
