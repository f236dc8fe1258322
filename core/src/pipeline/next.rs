// opchain/src/pipeline/next.rs

//! Contains the continuation `Next<S>` and the invocation record it advances.

use crate::core::call::Call;
use crate::core::handler::{ChainFuture, Handler, Terminal};
use crate::core::signature::Signature;
use crate::error::OpchainError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{event, span, Instrument, Level, Span};

/// The immutable part of a compiled operation, shared by all its invocations.
pub(crate) struct Chain<S: Signature> {
  pub(crate) operation: String,
  pub(crate) handlers: Vec<Handler<S>>,
  pub(crate) terminal: Terminal<S>,
}

struct Progress<E> {
  /// Number of handlers started so far.
  index: usize,
  completed: bool,
  aborted: bool,
  failure: Option<E>,
}

/// Progress of exactly one invocation. Created fresh by every
/// `CompiledOperation::invoke` and dropped when that invocation returns.
pub(crate) struct InvocationRecord<E> {
  progress: Mutex<Progress<E>>,
}

impl<E> InvocationRecord<E> {
  pub(crate) fn new() -> Self {
    Self {
      progress: Mutex::new(Progress {
        index: 0,
        completed: false,
        aborted: false,
        failure: None,
      }),
    }
  }

  /// Marks the invocation aborted and keeps `err` as its failure unless one is
  /// already stored, in which case `err` is handed back.
  fn abort(&self, err: E) -> Option<E> {
    let mut progress = self.progress.lock();
    progress.aborted = true;
    if progress.failure.is_none() {
      progress.failure = Some(err);
      None
    } else {
      Some(err)
    }
  }

  pub(crate) fn take_failure(&self) -> Option<E> {
    self.progress.lock().failure.take()
  }
}

enum Advance {
  Handler(usize),
  Terminal,
  Completed,
  Aborted,
}

/// The continuation handed to each handler.
///
/// All clones of a `Next` are bound to the same invocation record, so the
/// position it advances to is decided by the record at call time, not by the
/// handler that holds it.
pub struct Next<S: Signature> {
  chain: Arc<Chain<S>>,
  record: Arc<InvocationRecord<S::Error>>,
  call: Call<S>,
}

impl<S: Signature> Clone for Next<S> {
  fn clone(&self) -> Self {
    Self {
      chain: Arc::clone(&self.chain),
      record: Arc::clone(&self.record),
      call: self.call.clone(),
    }
  }
}

impl<S: Signature> Next<S> {
  pub(crate) fn start(chain: Arc<Chain<S>>, record: Arc<InvocationRecord<S::Error>>, call: Call<S>) -> Self {
    Self { chain, record, call }
  }

  /// Advances the pipeline.
  ///
  /// Runs the next handler, or the terminal logic once every handler has
  /// started, and resolves to the value that link produces. Fails with
  /// `OpchainError::ChainCompleted` once the terminal logic already ran and with
  /// `OpchainError::PipelineAborted` after the pipeline was aborted.
  ///
  /// A link that fails aborts the pipeline just like `fail` does: its error is
  /// kept as the invocation's failure and the caller of `run` receives a
  /// `PipelineAborted` placeholder instead.
  pub fn run(&self) -> ChainFuture<S> {
    let advance = {
      let mut progress = self.record.progress.lock();
      if progress.aborted {
        Advance::Aborted
      } else if progress.completed {
        Advance::Completed
      } else if progress.index < self.chain.handlers.len() {
        let position = progress.index;
        progress.index += 1;
        Advance::Handler(position)
      } else {
        progress.completed = true;
        Advance::Terminal
      }
    };

    let operation = self.chain.operation.as_str();
    match advance {
      Advance::Handler(position) => {
        event!(Level::TRACE, operation, position, "Advancing to handler.");
        let handler_span = span!(Level::DEBUG, "chain_handler", operation, position);
        let handler = Arc::clone(&self.chain.handlers[position]);
        self.guard(handler(self.call.clone(), self.clone()), handler_span)
      }
      Advance::Terminal => {
        event!(Level::TRACE, operation, "Advancing to terminal logic.");
        let terminal_span = span!(Level::DEBUG, "chain_terminal", operation);
        self.guard((self.chain.terminal)(self.call.clone()), terminal_span)
      }
      Advance::Completed => {
        event!(Level::DEBUG, operation, "Continuation called after the pipeline completed.");
        let err = S::Error::from(OpchainError::ChainCompleted {
          operation: operation.to_string(),
        });
        Box::pin(async move { Err::<S::Output, S::Error>(err) })
      }
      Advance::Aborted => {
        event!(Level::DEBUG, operation, "Continuation called after the pipeline was aborted.");
        let err = S::Error::from(OpchainError::PipelineAborted {
          operation: operation.to_string(),
        });
        Box::pin(async move { Err::<S::Output, S::Error>(err) })
      }
    }
  }

  /// Aborts the pipeline with `err`.
  ///
  /// No further handler and no terminal logic will run for this invocation and
  /// the compiled operation fails with `err`, whatever the calling handler
  /// returns afterwards. Only the first error passed to `fail` is kept.
  ///
  /// The returned value is an `OpchainError::PipelineAborted` placeholder meant
  /// to be returned straight from the handler: `return next.fail(err);`.
  pub fn fail(&self, err: S::Error) -> Result<S::Output, S::Error> {
    let operation = self.chain.operation.clone();
    event!(Level::DEBUG, operation = %operation, error = %err, "Pipeline aborted by handler.");
    if self.record.abort(err).is_some() {
      event!(Level::TRACE, operation = %operation, "Pipeline already aborted, keeping the first error.");
    }
    Err(S::Error::from(OpchainError::PipelineAborted { operation }))
  }

  /// Runs one link under `link_span`. An error the link yields aborts the
  /// invocation; the first such error is swapped for a placeholder so that no
  /// handler can swallow it.
  fn guard(&self, link: ChainFuture<S>, link_span: Span) -> ChainFuture<S> {
    let record = Arc::clone(&self.record);
    let operation = self.chain.operation.clone();
    Box::pin(
      async move {
        match link.await {
          Ok(value) => Ok::<S::Output, S::Error>(value),
          Err(err) => {
            event!(Level::DEBUG, operation = %operation, error = %err, "Link failed, aborting pipeline.");
            match record.abort(err) {
              None => Err(S::Error::from(OpchainError::PipelineAborted { operation })),
              Some(passed_through) => Err(passed_through),
            }
          }
        }
      }
      .instrument(link_span),
    )
  }

  /// The call this continuation forwards.
  pub fn call(&self) -> &Call<S> {
    &self.call
  }

  pub fn operation(&self) -> &str {
    &self.chain.operation
  }
}
