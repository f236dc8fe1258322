// opchain/src/table/definition.rs

//! Contains the `OperationTable<S>` struct, its registration methods and
//! materialization into compiled operations.

use crate::core::handler::{Handler, Terminal};
use crate::core::signature::Signature;
use crate::error::{OpchainError, OpchainResult};
use crate::pipeline::{compile, CompiledOperation};
use crate::table::namespace::Namespace;
use std::collections::BTreeMap;
use tracing::{event, instrument, Level};

/// A registered operation: its terminal logic and the fully resolved handler
/// list (default handlers captured at registration time, then its own).
pub struct OperationEntry<S: Signature> {
  pub(crate) name: String,
  pub(crate) terminal: Option<Terminal<S>>,
  pub(crate) handlers: Vec<Handler<S>>,
}

impl<S: Signature> Clone for OperationEntry<S> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      terminal: self.terminal.clone(),
      handlers: self.handlers.clone(),
    }
  }
}

impl<S: Signature> std::fmt::Debug for OperationEntry<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OperationEntry")
      .field("name", &self.name)
      .field("terminal_present", &self.terminal.is_some())
      .field("num_handlers", &self.handlers.len())
      .finish()
  }
}

impl<S: Signature> OperationEntry<S> {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn handler_count(&self) -> usize {
    self.handlers.len()
  }

  pub fn has_terminal(&self) -> bool {
    self.terminal.is_some()
  }

  pub fn compile(&self) -> OpchainResult<CompiledOperation<S>> {
    compile(self.name.clone(), self.handlers.clone(), self.terminal.clone())
  }
}

/// Both namespaces of a table, compiled.
pub struct Materialized<S: Signature> {
  pub queries: BTreeMap<String, CompiledOperation<S>>,
  pub mutations: BTreeMap<String, CompiledOperation<S>>,
}

/// Registry of named operations, configured once during service setup.
///
/// Default handlers added with `use_handlers` apply to entries registered
/// *after* the call. Each entry keeps its own copy of the list, so neither
/// later defaults nor merges rewrite existing entries.
pub struct OperationTable<S: Signature> {
  pub(crate) defaults: Vec<Handler<S>>,
  pub(crate) queries: BTreeMap<String, OperationEntry<S>>,
  pub(crate) mutations: BTreeMap<String, OperationEntry<S>>,
}

impl<S: Signature> Default for OperationTable<S> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S: Signature> Clone for OperationTable<S> {
  fn clone(&self) -> Self {
    Self {
      defaults: self.defaults.clone(),
      queries: self.queries.clone(),
      mutations: self.mutations.clone(),
    }
  }
}

impl<S: Signature> OperationTable<S> {
  pub fn new() -> Self {
    Self {
      defaults: Vec::new(),
      queries: BTreeMap::new(),
      mutations: BTreeMap::new(),
    }
  }

  pub(crate) fn namespace(&self, namespace: Namespace) -> &BTreeMap<String, OperationEntry<S>> {
    match namespace {
      Namespace::Query => &self.queries,
      Namespace::Mutation => &self.mutations,
    }
  }

  pub(crate) fn namespace_mut(&mut self, namespace: Namespace) -> &mut BTreeMap<String, OperationEntry<S>> {
    match namespace {
      Namespace::Query => &mut self.queries,
      Namespace::Mutation => &mut self.mutations,
    }
  }

  /// Appends to the default handlers. Only entries registered afterwards get them.
  pub fn use_handlers(&mut self, handlers: impl IntoIterator<Item = Handler<S>>) -> &mut Self {
    let before = self.defaults.len();
    self.defaults.extend(handlers);
    event!(Level::DEBUG, added = self.defaults.len() - before, total = self.defaults.len(), "Default handlers added.");
    self
  }

  /// Registers `name` in `namespace`, replacing any previous entry with that name.
  ///
  /// The entry's handler list is the current default handlers followed by `handlers`.
  pub fn register(
    &mut self,
    namespace: Namespace,
    name: impl Into<String>,
    terminal: Terminal<S>,
    handlers: impl IntoIterator<Item = Handler<S>>,
  ) -> OpchainResult<&mut Self> {
    let name = name.into();
    Self::check_name(namespace, &name)?;
    self.insert_entry(namespace, name, Some(terminal), handlers);
    Ok(self)
  }

  /// Rejects names that cannot key an entry.
  pub(crate) fn check_name(namespace: Namespace, name: &str) -> OpchainResult<()> {
    if name.is_empty() {
      event!(Level::ERROR, %namespace, "Rejected registration with an empty operation name.");
      return Err(OpchainError::configuration(
        name,
        format!("{} operation name must not be empty", namespace),
      ));
    }
    Ok(())
  }

  pub fn query(
    &mut self,
    name: impl Into<String>,
    terminal: Terminal<S>,
    handlers: impl IntoIterator<Item = Handler<S>>,
  ) -> OpchainResult<&mut Self> {
    self.register(Namespace::Query, name, terminal, handlers)
  }

  pub fn mutation(
    &mut self,
    name: impl Into<String>,
    terminal: Terminal<S>,
    handlers: impl IntoIterator<Item = Handler<S>>,
  ) -> OpchainResult<&mut Self> {
    self.register(Namespace::Mutation, name, terminal, handlers)
  }

  /// Stores an entry without validating it. A missing terminal surfaces when
  /// the entry is compiled.
  pub(crate) fn insert_entry(
    &mut self,
    namespace: Namespace,
    name: String,
    terminal: Option<Terminal<S>>,
    handlers: impl IntoIterator<Item = Handler<S>>,
  ) {
    let mut resolved = self.defaults.clone();
    resolved.extend(handlers);
    event!(Level::DEBUG, %namespace, operation = %name, num_handlers = resolved.len(), "Registering operation.");
    let entry = OperationEntry {
      name: name.clone(),
      terminal,
      handlers: resolved,
    };
    if self.namespace_mut(namespace).insert(name, entry).is_some() {
      event!(Level::DEBUG, %namespace, "Replaced an existing operation with the same name.");
    }
  }

  /// Compiles every entry of `namespace`.
  ///
  /// Nothing is cached; each call reflects the table as it is now.
  #[instrument(name = "OperationTable::materialize", skip(self), fields(num_entries = self.len(namespace)))]
  pub fn materialize(&self, namespace: Namespace) -> OpchainResult<BTreeMap<String, CompiledOperation<S>>> {
    self
      .namespace(namespace)
      .iter()
      .map(|(name, entry)| entry.compile().map(|compiled| (name.clone(), compiled)))
      .collect()
  }

  pub fn materialize_all(&self) -> OpchainResult<Materialized<S>> {
    Ok(Materialized {
      queries: self.materialize(Namespace::Query)?,
      mutations: self.materialize(Namespace::Mutation)?,
    })
  }

  pub fn entry(&self, namespace: Namespace, name: &str) -> Option<&OperationEntry<S>> {
    self.namespace(namespace).get(name)
  }

  pub fn operation_names(&self, namespace: Namespace) -> Vec<&str> {
    self.namespace(namespace).keys().map(String::as_str).collect()
  }

  pub fn len(&self, namespace: Namespace) -> usize {
    self.namespace(namespace).len()
  }

  pub fn is_empty(&self) -> bool {
    self.queries.is_empty() && self.mutations.is_empty()
  }

  pub fn default_handler_count(&self) -> usize {
    self.defaults.len()
  }
}
