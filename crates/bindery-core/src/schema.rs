pub mod binding;
pub mod domain;
pub mod relational;
