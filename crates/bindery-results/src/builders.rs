use bindery_core::types::ScalarType;
use indexmap::IndexMap;

/// A requested top-level result. A closed sum; the resolver matches
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultBuilder {
    Scalar(ScalarResultBuilder),

    /// A scalar read at an explicit relational type and converted to a
    /// domain class on extraction.
    ConvertedScalar {
        column: ScalarColumn,
        relational_type: ScalarType,
        domain_class: String,
    },

    Entity(EntityResultBuilder),

    Instantiation(InstantiationResultBuilder),
}

/// How a scalar result names its column: by discovered alias, or by 1-based
/// ordinal. Ordinal access is locked out once the mapping contains a
/// non-scalar result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarColumn {
    Alias(String),
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarResultBuilder {
    pub column: ScalarColumn,

    /// Overrides the driver-reported type when present.
    pub explicit_type: Option<ScalarType>,
}

impl ScalarResultBuilder {
    pub fn aliased(alias: impl Into<String>) -> Self {
        Self {
            column: ScalarColumn::Alias(alias.into()),
            explicit_type: None,
        }
    }

    pub fn positional(position: usize) -> Self {
        Self {
            column: ScalarColumn::Position(position),
            explicit_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityResultBuilder {
    pub entity_name: String,

    /// The SQL table alias this result was declared under; the owner key for
    /// legacy fetch declarations.
    pub table_alias: String,

    /// Explicit column alias per attribute name. Attributes not listed
    /// resolve by their mapped column names.
    pub attribute_aliases: IndexMap<String, String>,

    /// Explicit fetch builders keyed by attribute name; the highest-priority
    /// link in the fetch resolution chain.
    pub fetches: IndexMap<String, FetchBuilder>,
}

impl EntityResultBuilder {
    pub fn new(entity_name: impl Into<String>, table_alias: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            table_alias: table_alias.into(),
            attribute_aliases: IndexMap::new(),
            fetches: IndexMap::new(),
        }
    }
}

/// An eager join-fetch declaration for one association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBuilder {
    pub owner_alias: String,

    pub attribute: String,

    /// The fetched entity's own SQL alias; the owner key for fetches nested
    /// under it.
    pub table_alias: String,

    /// Aliases of the fetched entity's key columns, in key-column order.
    /// Empty resolves by the key columns' own names.
    pub column_aliases: Vec<String>,
}

impl FetchBuilder {
    pub fn new(
        owner_alias: impl Into<String>,
        attribute: impl Into<String>,
        table_alias: impl Into<String>,
    ) -> Self {
        Self {
            owner_alias: owner_alias.into(),
            attribute: attribute.into(),
            table_alias: table_alias.into(),
            column_aliases: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiationResultBuilder {
    /// Class or constructor target to instantiate per row.
    pub target: String,

    pub arguments: Vec<ScalarResultBuilder>,
}
