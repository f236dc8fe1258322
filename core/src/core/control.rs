// opchain/src/core/control.rs

//! Signal returned by synchronous handlers.

/// Tells the pipeline what a synchronous handler decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control<T> {
  /// Call the continuation: the next handler (or the terminal logic) runs and
  /// its value becomes this handler's value.
  Continue,
  /// Short-circuit. Nothing after this handler runs and `T` is the result of
  /// the whole operation.
  Respond(T),
}
