// opchain/src/core/handler.rs

//! Defines the `Handler<S>` and `Terminal<S>` types and the functions that
//! build them from closures or from `Middleware` implementations.

use crate::core::call::Call;
use crate::core::control::Control;
use crate::core::signature::Signature;
use crate::pipeline::Next;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The future every link of a chain resolves to.
pub type ChainFuture<S> =
  Pin<Box<dyn Future<Output = Result<<S as Signature>::Output, <S as Signature>::Error>> + Send>>;

/// A pre-processing step attached to one or more operations.
///
/// A handler receives the invocation's `Call<S>` and the continuation `Next<S>`.
/// It may:
/// 1. Await `next.run()` to let the rest of the chain execute, and return
///    (or transform) the value it yields.
/// 2. Return a value without calling `next`, short-circuiting the chain.
/// 3. Call `next.fail(err)` or return `Err` to abort the whole pipeline.
///
/// Handlers are reference counted; the same handler can sit in many chains.
pub type Handler<S> = Arc<dyn Fn(Call<S>, Next<S>) -> ChainFuture<S> + Send + Sync>;

/// The operation's main business logic. Runs at most once per invocation and
/// only when every handler called its continuation.
pub type Terminal<S> = Arc<dyn Fn(Call<S>) -> ChainFuture<S> + Send + Sync>;

/// Wraps an async closure as a `Handler<S>`.
///
/// The closure's error type only needs to convert into `S::Error`.
pub fn handler<S, F, UserErr>(handler_fn: impl Fn(Call<S>, Next<S>) -> F + Send + Sync + 'static) -> Handler<S>
where
  S: Signature,
  F: Future<Output = Result<S::Output, UserErr>> + Send + 'static,
  UserErr: Into<S::Error> + Send + Sync + 'static,
{
  Arc::new(move |call: Call<S>, next: Next<S>| -> ChainFuture<S> {
    let user_fut = handler_fn(call, next);
    Box::pin(async move { user_fut.await.map_err(Into::<S::Error>::into) })
  })
}

/// Wraps a synchronous pre-step as a `Handler<S>`.
///
/// The closure inspects or mutates the call and then either lets the chain
/// continue (`Control::Continue`) or answers on its own (`Control::Respond`).
/// An `Err` aborts the pipeline.
pub fn sync_handler<S, UserErr>(
  handler_fn: impl Fn(&Call<S>) -> Result<Control<S::Output>, UserErr> + Send + Sync + 'static,
) -> Handler<S>
where
  S: Signature,
  UserErr: Into<S::Error> + Send + Sync + 'static,
{
  Arc::new(move |call: Call<S>, next: Next<S>| -> ChainFuture<S> {
    match handler_fn(&call) {
      Ok(Control::Continue) => next.run(),
      Ok(Control::Respond(value)) => Box::pin(async move { Ok::<S::Output, S::Error>(value) }),
      Err(user_err) => {
        let err: S::Error = user_err.into();
        Box::pin(async move { Err::<S::Output, S::Error>(err) })
      }
    }
  })
}

/// Wraps an async closure as terminal logic.
pub fn terminal<S, F, UserErr>(terminal_fn: impl Fn(Call<S>) -> F + Send + Sync + 'static) -> Terminal<S>
where
  S: Signature,
  F: Future<Output = Result<S::Output, UserErr>> + Send + 'static,
  UserErr: Into<S::Error> + Send + Sync + 'static,
{
  Arc::new(move |call: Call<S>| -> ChainFuture<S> {
    let user_fut = terminal_fn(call);
    Box::pin(async move { user_fut.await.map_err(Into::<S::Error>::into) })
  })
}

/// Wraps a synchronous function as terminal logic.
pub fn sync_terminal<S, UserErr>(
  terminal_fn: impl Fn(&Call<S>) -> Result<S::Output, UserErr> + Send + Sync + 'static,
) -> Terminal<S>
where
  S: Signature,
  UserErr: Into<S::Error> + Send + Sync + 'static,
{
  Arc::new(move |call: Call<S>| -> ChainFuture<S> {
    let outcome = terminal_fn(&call).map_err(Into::<S::Error>::into);
    Box::pin(async move { outcome })
  })
}

/// A handler with its own state, implemented on a struct instead of a closure.
///
/// ```ignore
/// struct RequireAuth { realm: String }
///
/// #[async_trait]
/// impl Middleware<Api> for RequireAuth {
///   async fn handle(&self, call: Call<Api>, next: Next<Api>) -> Result<String, ApiError> {
///     if call.context.read().user.is_none() {
///       return next.fail(ApiError::Unauthorized(self.realm.clone()));
///     }
///     next.run().await
///   }
/// }
/// ```
#[async_trait]
pub trait Middleware<S: Signature>: Send + Sync + 'static {
  async fn handle(&self, call: Call<S>, next: Next<S>) -> Result<S::Output, S::Error>;
}

/// Turns a `Middleware<S>` into a `Handler<S>`.
pub fn from_middleware<S, M>(middleware: M) -> Handler<S>
where
  S: Signature,
  M: Middleware<S>,
{
  let middleware = Arc::new(middleware);
  Arc::new(move |call: Call<S>, next: Next<S>| -> ChainFuture<S> {
    let middleware = Arc::clone(&middleware);
    Box::pin(async move { middleware.handle(call, next).await })
  })
}
