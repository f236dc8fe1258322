// opchain/src/core/call.rs

use crate::core::context_data::ContextData;
use crate::core::signature::Signature;
use std::sync::Arc;

/// The four inputs of one invocation: parent, args, context and metadata.
///
/// Every handler in a chain receives a clone of the same `Call`, so writes to
/// `args` or `context` made by one handler are visible to the handlers after it
/// and to the terminal logic. Keep a clone around to inspect the arguments once
/// the invocation finished.
pub struct Call<S: Signature> {
  pub parent: Arc<S::Parent>,
  pub args: ContextData<S::Args>,
  pub context: ContextData<S::Context>,
  pub metadata: Arc<S::Metadata>,
}

impl<S: Signature> Call<S> {
  pub fn new(parent: S::Parent, args: S::Args, context: S::Context, metadata: S::Metadata) -> Self {
    Self {
      parent: Arc::new(parent),
      args: ContextData::new(args),
      context: ContextData::new(context),
      metadata: Arc::new(metadata),
    }
  }

  /// Builds a call around handles the caller already owns, e.g. a context
  /// shared by several sibling operations of one request.
  pub fn from_parts(
    parent: Arc<S::Parent>,
    args: ContextData<S::Args>,
    context: ContextData<S::Context>,
    metadata: Arc<S::Metadata>,
  ) -> Self {
    Self {
      parent,
      args,
      context,
      metadata,
    }
  }
}

impl<S: Signature> Clone for Call<S> {
  fn clone(&self) -> Self {
    Self {
      parent: Arc::clone(&self.parent),
      args: self.args.clone(),
      context: self.context.clone(),
      metadata: Arc::clone(&self.metadata),
    }
  }
}
