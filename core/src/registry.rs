// opchain/src/registry.rs

//! Defines `Registry<S>`, a type-keyed store of operation declarations.
//!
//! Declarations for a group (a Rust type standing for a resolver class or
//! module) are collected in any order: group-level handlers, terminal logic
//! and operation-level handlers. They are only resolved into an
//! `OperationTable` when the table is requested, so group-level handlers
//! always come first regardless of the order they were declared in.

use crate::core::handler::{Handler, Terminal};
use crate::core::signature::Signature;
use crate::error::{OpchainError, OpchainResult};
use crate::table::{Namespace, OperationTable};
use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::{event, instrument, Level};

struct OperationDecl<S: Signature> {
  namespace: Namespace,
  name: String,
  terminal: Option<Terminal<S>>,
  handlers: Vec<Handler<S>>,
}

struct GroupDecl<S: Signature> {
  group_name: &'static str,
  group_handlers: Vec<Handler<S>>,
  // Kept in first-declaration order.
  operations: Vec<OperationDecl<S>>,
}

impl<S: Signature> GroupDecl<S> {
  fn new(group_name: &'static str) -> Self {
    Self {
      group_name,
      group_handlers: Vec::new(),
      operations: Vec::new(),
    }
  }

  fn operation_mut(&mut self, namespace: Namespace, name: &str) -> &mut OperationDecl<S> {
    let position = match self
      .operations
      .iter()
      .position(|op| op.namespace == namespace && op.name == name)
    {
      Some(position) => position,
      None => {
        self.operations.push(OperationDecl {
          namespace,
          name: name.to_string(),
          terminal: None,
          handlers: Vec::new(),
        });
        self.operations.len() - 1
      }
    };
    &mut self.operations[position]
  }

  fn resolve(&self) -> OpchainResult<OperationTable<S>> {
    let mut table = OperationTable::new();
    table.use_handlers(self.group_handlers.iter().cloned());
    for op in &self.operations {
      OperationTable::<S>::check_name(op.namespace, &op.name)?;
      table.insert_entry(op.namespace, op.name.clone(), op.terminal.clone(), op.handlers.iter().cloned());
    }
    Ok(table)
  }
}

/// Explicit registry mapping group types to their operation declarations.
///
/// Declarations are meant to be made during setup; resolving a table while
/// other threads still declare is allowed but sees whatever was declared so far.
pub struct Registry<S: Signature> {
  groups: RwLock<HashMap<TypeId, GroupDecl<S>>>,
}

impl<S: Signature> Default for Registry<S> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S: Signature> Registry<S> {
  pub fn new() -> Self {
    Self {
      groups: RwLock::new(HashMap::new()),
    }
  }

  /// Touches group `G`, creating its (empty) declarations if needed, and
  /// returns a handle to declare on it.
  pub fn group<G: 'static>(&self) -> GroupScope<'_, S, G> {
    self.with_group::<G, _>(|_| ());
    GroupScope {
      registry: self,
      _group: PhantomData,
    }
  }

  /// Runs `G::declare` against this registry.
  pub fn install<G: Declare<S>>(&self) -> &Self {
    event!(Level::DEBUG, group = type_name::<G>(), "Installing group declarations.");
    G::declare(&self.group::<G>());
    self
  }

  pub fn contains<G: 'static>(&self) -> bool {
    self.groups.read().contains_key(&TypeId::of::<G>())
  }

  pub fn group_count(&self) -> usize {
    self.groups.read().len()
  }

  /// Resolves the declarations of `G` into a fresh `OperationTable`.
  ///
  /// Group-level handlers become the table's default handlers; every operation
  /// is then registered in the order it was first declared, with its own
  /// handlers after them. Fails with `OpchainError::Lookup` if `G` was never
  /// declared on and with `OpchainError::Configuration` if one of its
  /// declarations names no operation.
  #[instrument(name = "Registry::table_for", skip(self), fields(group = type_name::<G>()))]
  pub fn table_for<G: 'static>(&self) -> OpchainResult<OperationTable<S>> {
    let groups = self.groups.read();
    let decl = groups.get(&TypeId::of::<G>()).ok_or_else(|| {
      event!(Level::ERROR, "No declarations for group.");
      OpchainError::Lookup {
        group: type_name::<G>().to_string(),
      }
    })?;
    event!(
      Level::DEBUG,
      num_group_handlers = decl.group_handlers.len(),
      num_operations = decl.operations.len(),
      "Resolving group declarations."
    );
    decl.resolve()
  }

  /// Same as `table_for`; reads better at the end of a setup phase.
  pub fn finalize<G: 'static>(&self) -> OpchainResult<OperationTable<S>> {
    self.table_for::<G>()
  }

  fn with_group<G: 'static, R>(&self, f: impl FnOnce(&mut GroupDecl<S>) -> R) -> R {
    let mut groups = self.groups.write();
    let decl = groups.entry(TypeId::of::<G>()).or_insert_with(|| {
      event!(Level::DEBUG, group = type_name::<G>(), "Creating group declarations.");
      GroupDecl::new(type_name::<G>())
    });
    f(decl)
  }
}

/// Declaration handle for group `G`, obtained from `Registry::group`.
pub struct GroupScope<'r, S: Signature, G: 'static> {
  registry: &'r Registry<S>,
  _group: PhantomData<fn() -> G>,
}

impl<'r, S: Signature, G: 'static> GroupScope<'r, S, G> {
  /// Adds group-level handlers. They run before every operation's own handlers.
  pub fn handlers(&self, handlers: impl IntoIterator<Item = Handler<S>>) -> &Self {
    self.registry.with_group::<G, _>(|decl| {
      decl.group_handlers.extend(handlers);
      event!(Level::TRACE, group = decl.group_name, total = decl.group_handlers.len(), "Group handlers declared.");
    });
    self
  }

  /// Binds the terminal logic of an operation, replacing an earlier binding.
  pub fn operation(&self, namespace: Namespace, name: impl Into<String>, terminal: Terminal<S>) -> &Self {
    let name = name.into();
    self.registry.with_group::<G, _>(|decl| {
      event!(Level::TRACE, group = decl.group_name, %namespace, operation = %name, "Terminal logic declared.");
      decl.operation_mut(namespace, &name).terminal = Some(terminal);
    });
    self
  }

  /// Adds operation-level handlers. May be declared before or after the
  /// operation's terminal logic.
  pub fn operation_handlers(
    &self,
    namespace: Namespace,
    name: impl Into<String>,
    handlers: impl IntoIterator<Item = Handler<S>>,
  ) -> &Self {
    let name = name.into();
    self.registry.with_group::<G, _>(|decl| {
      event!(Level::TRACE, group = decl.group_name, %namespace, operation = %name, "Operation handlers declared.");
      decl.operation_mut(namespace, &name).handlers.extend(handlers);
    });
    self
  }

  pub fn query(&self, name: impl Into<String>, terminal: Terminal<S>) -> &Self {
    self.operation(Namespace::Query, name, terminal)
  }

  pub fn mutation(&self, name: impl Into<String>, terminal: Terminal<S>) -> &Self {
    self.operation(Namespace::Mutation, name, terminal)
  }
}

/// Implemented by group types that declare their own operations.
///
/// ```ignore
/// struct Greetings;
///
/// impl Declare<Api> for Greetings {
///   fn declare(group: &GroupScope<'_, Api, Self>) {
///     group
///       .handlers([log_request()])
///       .query("hello", hello_terminal())
///       .operation_handlers(Namespace::Query, "hello", [require_name()]);
///   }
/// }
///
/// registry.install::<Greetings>();
/// ```
pub trait Declare<S: Signature>: Sized + 'static {
  fn declare(group: &GroupScope<'_, S, Self>);
}
