//! Native-query result-set mapping: binds declarative result/fetch builders
//! onto an arbitrary JDBC column shape and produces an executable read plan,
//! memoized per distinct shape.

mod builders;
pub use builders::{
    EntityResultBuilder, FetchBuilder, InstantiationResultBuilder, ResultBuilder, ScalarColumn,
    ScalarResultBuilder,
};

mod cache;
pub use cache::MappingCache;

mod mapping;
pub use mapping::ResultSetMapping;

mod plan;
pub use plan::{DomainResult, Fetch, SqlSelection, ValuesMapping};

mod resolver;

mod row;
pub use row::{RowMetadata, StaticRowMetadata};

pub use bindery_core::{Error, Result};
