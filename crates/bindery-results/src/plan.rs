use bindery_core::types::ScalarType;

/// The executable read plan for one (mapping, column shape) pair: the ordered
/// JDBC value extraction list plus the domain-result tree assembled from it.
///
/// Immutable once produced; freely shareable across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesMapping {
    /// Selections in registration order; one per physical column actually
    /// consumed.
    pub selections: Vec<SqlSelection>,

    /// One entry per requested top-level result, in request order.
    pub results: Vec<DomainResult>,
}

impl ValuesMapping {
    /// Width of the values array read per row.
    pub fn row_size(&self) -> usize {
        self.selections.len()
    }
}

/// One JDBC value extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSelection {
    /// 0-based position in the per-row values array.
    pub values_position: usize,

    pub column_name: String,

    pub sql_type: ScalarType,
}

/// A top-level result in the assembled row. Selections are referenced by
/// index into [`ValuesMapping::selections`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainResult {
    Scalar {
        selection: usize,
        sql_type: ScalarType,
    },

    /// A scalar read at one relational type and converted to a domain class
    /// on extraction.
    Converted {
        selection: usize,
        relational_type: ScalarType,
        domain_class: String,
    },

    Entity {
        entity: String,
        key_selections: Vec<usize>,
        fetches: Vec<Fetch>,
    },

    /// Constructor-style instantiation of `target` from scalar arguments in
    /// declaration order.
    Instantiation {
        target: String,
        arguments: Vec<DomainResult>,
    },
}

/// One fetched part of an entity result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    /// A basic (or flattened composite) attribute read from one selection.
    /// Composite sub-attributes carry dotted paths.
    Basic { attribute: String, selection: usize },

    /// A to-one association materialized as its foreign key only; the
    /// default when no fetch builder covers the association, and the
    /// substitution that breaks circular fetch graphs.
    KeyOnly {
        attribute: String,
        entity: String,
        key_selections: Vec<usize>,
    },

    /// An eagerly fetched association, resolved in place.
    Entity {
        attribute: String,
        entity: String,
        key_selections: Vec<usize>,
        fetches: Vec<Fetch>,
    },
}
