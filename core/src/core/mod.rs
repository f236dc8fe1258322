pub mod call;
pub mod context_data;
pub mod control;
pub mod handler;
pub mod signature;

// Re-export key types for easier access from other opchain modules (and lib.rs)
pub use call::Call;
pub use context_data::ContextData;
pub use control::Control;
pub use handler::{ChainFuture, Handler, Middleware, Terminal};
pub use signature::Signature;
