// opchain/src/table/merge.rs

//! Contains `OperationTable::merge`.

use crate::core::signature::Signature;
use crate::table::definition::OperationTable;
use crate::table::namespace::Namespace;
use tracing::{event, Level};

impl<S: Signature> OperationTable<S> {
  /// Copies every entry of `source` into this table.
  ///
  /// Each copied entry gets this table's current default handlers in front of
  /// the handlers it already carries (which include whatever defaults `source`
  /// had when the entry was registered there). The copy is a snapshot: neither
  /// later defaults added here nor later changes to `source` affect it.
  /// Entries with the same name are replaced.
  pub fn merge(&mut self, source: &OperationTable<S>) -> &mut Self {
    for namespace in Namespace::ALL {
      for (name, entry) in source.namespace(namespace) {
        self.insert_entry(namespace, name.clone(), entry.terminal.clone(), entry.handlers.iter().cloned());
      }
    }
    event!(
      Level::DEBUG,
      merged_queries = source.queries.len(),
      merged_mutations = source.mutations.len(),
      prefixed_defaults = self.defaults.len(),
      "Merged operation table."
    );
    self
  }
}

/// Merges `source` into `target`. Same as `target.merge(source)`.
pub fn merge<S: Signature>(target: &mut OperationTable<S>, source: &OperationTable<S>) {
  target.merge(source);
}
