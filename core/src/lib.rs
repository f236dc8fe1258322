// src/lib.rs

//! Opchain: ordered, reusable handler chains for named operations.
//!
//! Opchain attaches pre-processing steps ("handlers") to individual named
//! operations, such as the query and mutation resolvers of an API, and
//! compiles them together with the operation's terminal logic into a single
//! async callable:
//!  - Handlers run strictly in registration order and may be sync or async.
//!  - A handler may short-circuit, transform the value of the rest of the
//!    chain, mutate the shared per-invocation args/context, or abort with an error.
//!  - Every invocation gets its own progress record, so concurrent calls of the
//!    same compiled operation never interfere.
//!  - Default handlers, per-operation handlers and table merging compose
//!    deterministically, with snapshot semantics.
//!  - A type-keyed `Registry` collects group-level and operation-level
//!    declarations in any order and resolves them lazily.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod table;

// --- Re-exports for the Public API ---

pub use crate::core::call::Call;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::Control;
pub use crate::core::handler::{
  from_middleware, handler, sync_handler, sync_terminal, terminal, ChainFuture, Handler, Middleware, Terminal,
};
pub use crate::core::signature::Signature;

pub use crate::pipeline::{compile, CompiledOperation, Next};

pub use crate::table::merge::merge;
pub use crate::table::{Materialized, Namespace, OperationEntry, OperationTable};

pub use crate::registry::{Declare, GroupScope, Registry};

pub use crate::error::{OpchainError, OpchainResult};

/*
    Core Workflow:
    1. Describe your operation types with a marker type implementing `Signature`.
    2. Build handlers with `handler(..)`, `sync_handler(..)` or `from_middleware(..)`,
       and terminal logic with `terminal(..)` or `sync_terminal(..)`.
    3. Either:
       - fill an `OperationTable` directly (`use_handlers`, `query`, `mutation`, `merge`), or
       - declare per group on a `Registry` and resolve with `registry.table_for::<Group>()`.
    4. Call `table.materialize(Namespace::Query)` (or `materialize_all()`) once at setup and
       hand the compiled operations to the host executor.
    5. Per request: `compiled.invoke(Call::new(parent, args, context, metadata)).await`.
*/
