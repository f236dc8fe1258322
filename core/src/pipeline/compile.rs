// opchain/src/pipeline/compile.rs

//! Contains `compile()` and the `CompiledOperation<S>` it produces.

use crate::core::call::Call;
use crate::core::handler::{Handler, Terminal};
use crate::core::signature::Signature;
use crate::error::{OpchainError, OpchainResult};
use crate::pipeline::next::{Chain, InvocationRecord, Next};
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Compiles `handlers` and `terminal` into a single callable.
///
/// Fails with `OpchainError::Configuration` when no terminal logic is given.
/// The handler list is captured as-is; later changes to the vector the caller
/// built it from have no effect on the compiled operation.
pub fn compile<S: Signature>(
  operation: impl Into<String>,
  handlers: Vec<Handler<S>>,
  terminal: Option<Terminal<S>>,
) -> OpchainResult<CompiledOperation<S>> {
  let operation = operation.into();
  let Some(terminal) = terminal else {
    event!(Level::ERROR, %operation, "Cannot compile operation without terminal logic.");
    return Err(OpchainError::configuration(operation, "terminal logic is not defined"));
  };

  event!(Level::DEBUG, %operation, num_handlers = handlers.len(), "Compiled operation.");
  Ok(CompiledOperation {
    chain: Arc::new(Chain {
      operation,
      handlers,
      terminal,
    }),
  })
}

/// A compiled handler chain for one operation.
///
/// Cheap to clone and safe to invoke concurrently: each invocation gets its
/// own progress record, so interleaved runs never see each other's position.
pub struct CompiledOperation<S: Signature> {
  chain: Arc<Chain<S>>,
}

impl<S: Signature> Clone for CompiledOperation<S> {
  fn clone(&self) -> Self {
    Self {
      chain: Arc::clone(&self.chain),
    }
  }
}

impl<S: Signature> std::fmt::Debug for CompiledOperation<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CompiledOperation")
      .field("operation", &self.chain.operation)
      .field("num_handlers", &self.chain.handlers.len())
      .finish()
  }
}

impl<S: Signature> CompiledOperation<S> {
  /// Runs the chain for one call.
  ///
  /// Resolves to the value produced by the first handler as the chain unwinds
  /// (or the terminal's value when there are no handlers). If the pipeline was
  /// aborted, either through `Next::fail` or by a handler or terminal logic
  /// returning an error, that first error is returned instead, even when an
  /// outer handler discarded it.
  #[instrument(
    name = "CompiledOperation::invoke",
    skip_all,
    fields(
      operation = %self.chain.operation,
      num_handlers = self.chain.handlers.len(),
    ),
    err(Display)
  )]
  pub async fn invoke(&self, call: Call<S>) -> Result<S::Output, S::Error> {
    let record = Arc::new(InvocationRecord::new());
    let outcome = Next::start(Arc::clone(&self.chain), Arc::clone(&record), call).run().await;

    if let Some(err) = record.take_failure() {
      event!(Level::DEBUG, "Invocation aborted.");
      return Err(err);
    }
    outcome
  }

  /// Shorthand for `invoke(Call::new(parent, args, context, metadata))`.
  pub async fn call(
    &self,
    parent: S::Parent,
    args: S::Args,
    context: S::Context,
    metadata: S::Metadata,
  ) -> Result<S::Output, S::Error> {
    self.invoke(Call::new(parent, args, context, metadata)).await
  }

  pub fn name(&self) -> &str {
    &self.chain.operation
  }

  pub fn handler_count(&self) -> usize {
    self.chain.handlers.len()
  }
}
