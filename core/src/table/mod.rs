// opchain/src/table/mod.rs

//! The operation table: named operations split into query and mutation
//! namespaces, the default handlers prefixed onto them, and table merging.

pub mod definition;
pub mod merge;
pub mod namespace;

pub use definition::{Materialized, OperationEntry, OperationTable};
pub use namespace::Namespace;
