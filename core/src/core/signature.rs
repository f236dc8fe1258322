// opchain/src/core/signature.rs

//! Defines the `Signature` trait, the bundle of types one family of operations shares.

use crate::error::OpchainError;

/// Describes the inputs and outcome of every operation compiled for one host schema.
///
/// Implement it on a zero-sized marker type:
///
/// ```ignore
/// struct Api;
/// impl Signature for Api {
///   type Parent = ();
///   type Args = GreetArgs;
///   type Context = RequestCtx;
///   type Metadata = FieldInfo;
///   type Output = String;
///   type Error = ApiError;
/// }
/// ```
///
/// `Error` must be constructible from `OpchainError` so that chain-level
/// failures (double completion, aborts) can be reported through it.
pub trait Signature: Send + Sync + 'static {
  /// The value the operation hangs off (the parent object of a resolver).
  type Parent: Send + Sync + 'static;
  /// Arguments. Shared and mutable for the duration of one invocation.
  type Args: Send + Sync + 'static;
  /// Request-scoped context. Shared and mutable for the duration of one invocation.
  type Context: Send + Sync + 'static;
  /// Read-only description of the operation being invoked.
  type Metadata: Send + Sync + 'static;
  type Output: Send + 'static;
  type Error: std::error::Error + From<OpchainError> + Send + Sync + 'static;
}
