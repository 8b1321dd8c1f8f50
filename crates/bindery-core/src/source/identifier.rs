use super::{BasicAttributeSource, ColumnSource};
use indexmap::IndexMap;

/// Identifier declaration on a hierarchy root.
#[derive(Debug)]
pub enum IdentifierSource {
    Simple(SimpleIdentifierSource),

    /// Aggregated or non-aggregated composite identifiers; not bindable yet.
    Composite,
}

#[derive(Debug)]
pub struct SimpleIdentifierSource {
    pub attribute: BasicAttributeSource,
    pub generator: Option<GeneratorSource>,
}

#[derive(Debug, Clone)]
pub struct GeneratorSource {
    pub strategy: String,
    pub params: IndexMap<String, String>,
}

#[derive(Debug)]
pub struct VersionSource {
    pub attribute: BasicAttributeSource,
}

#[derive(Debug)]
pub struct DiscriminatorSource {
    pub column: ColumnSource,
    pub type_name: Option<String>,
}
