use bindery_core::types::ScalarType;

/// The column shape of one executed statement, as reported by the driver.
///
/// Positions are 1-based, following the JDBC convention. The resolver
/// converts to 0-based values-array positions exactly once, at the
/// selection-registration boundary.
pub trait RowMetadata {
    fn column_count(&self) -> usize;

    /// The 1-based position of the first column carrying `alias`, or `None`
    /// when no column does.
    fn resolve_alias(&self, alias: &str) -> Option<usize>;

    /// The name of the column at a 1-based position.
    ///
    /// # Panics
    ///
    /// Panics if `position` is zero or past the column count.
    fn column_name(&self, position: usize) -> &str;

    /// Best-guess scalar type for the column at a 1-based position, from
    /// driver-reported type metadata.
    fn sql_type(&self, position: usize) -> ScalarType;

    /// How many columns carry `alias`. More than one means the driver cannot
    /// disambiguate by-name access for that alias.
    fn alias_count(&self, alias: &str) -> usize {
        (1..=self.column_count())
            .filter(|position| self.column_name(*position) == alias)
            .count()
    }
}

/// A fixed column shape backed by `(name, type)` pairs; the in-memory stand-in
/// for driver metadata.
#[derive(Debug, Clone)]
pub struct StaticRowMetadata {
    columns: Vec<(String, ScalarType)>,
}

impl StaticRowMetadata {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ScalarType)>,
        S: Into<String>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        }
    }
}

impl RowMetadata for StaticRowMetadata {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn resolve_alias(&self, alias: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|(name, _)| name == alias)
            .map(|index| index + 1)
    }

    fn column_name(&self, position: usize) -> &str {
        &self.columns[position - 1].0
    }

    fn sql_type(&self, position: usize) -> ScalarType {
        self.columns[position - 1].1
    }
}
