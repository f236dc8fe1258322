// opchain/src/table/namespace.rs

use std::fmt;

/// One of the two independent partitions of an `OperationTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
  /// Read operations.
  Query,
  /// Write operations.
  Mutation,
}

impl Namespace {
  pub const ALL: [Namespace; 2] = [Namespace::Query, Namespace::Mutation];

  pub fn as_str(&self) -> &'static str {
    match self {
      Namespace::Query => "query",
      Namespace::Mutation => "mutation",
    }
  }
}

impl fmt::Display for Namespace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
