mod error;
pub use error::Error;

pub mod binder;
pub use binder::Binder;

pub mod metadata;
pub use metadata::Metadata;

pub mod schema;
pub mod source;
pub mod types;

/// A Result type alias that uses Bindery's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
