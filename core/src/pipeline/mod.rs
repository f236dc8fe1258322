// opchain/src/pipeline/mod.rs

//! The pipeline compiler: turns an ordered handler list plus terminal logic
//! into one callable with isolated per-invocation progress.

pub mod compile;
pub mod next;

pub use compile::{compile, CompiledOperation};
pub use next::Next;
