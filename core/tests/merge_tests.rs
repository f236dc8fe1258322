// tests/merge_tests.rs
mod common;

use common::*;
use opchain::{merge, Namespace, OperationTable};

fn source_table() -> OperationTable<TestApi> {
  let mut source = OperationTable::<TestApi>::new();
  source.use_handlers([tag_handler("b")]);
  source.query("greet", echo_terminal(), [tag_handler("own")]).unwrap();
  source.mutation("rename", echo_terminal(), []).unwrap();
  source
}

#[tokio::test]
async fn test_merge_prefixes_target_defaults() {
  setup_tracing();
  let mut target = OperationTable::<TestApi>::new();
  target.use_handlers([tag_handler("a")]);
  target.merge(&source_table());

  let all = target.materialize_all().unwrap();
  assert_eq!(all.queries["greet"].invoke(new_call("greet")).await.unwrap(), "greet:a,b,own");
  assert_eq!(all.mutations["rename"].invoke(new_call("rename")).await.unwrap(), "rename:a,b");
}

#[tokio::test]
async fn test_defaults_added_after_merge_do_not_touch_merged_entries() {
  setup_tracing();
  let mut target = OperationTable::<TestApi>::new();
  target.use_handlers([tag_handler("a")]);
  target.merge(&source_table());
  target.use_handlers([tag_handler("late")]);

  assert_eq!(target.entry(Namespace::Query, "greet").unwrap().handler_count(), 3);
  let queries = target.materialize(Namespace::Query).unwrap();
  assert_eq!(queries["greet"].invoke(new_call("greet")).await.unwrap(), "greet:a,b,own");

  // New registrations do see the late default.
  target.query("fresh", echo_terminal(), []).unwrap();
  let queries = target.materialize(Namespace::Query).unwrap();
  assert_eq!(queries["fresh"].invoke(new_call("fresh")).await.unwrap(), "fresh:a,late");
}

#[tokio::test]
async fn test_merge_leaves_existing_target_entries_alone() {
  setup_tracing();
  let mut target = OperationTable::<TestApi>::new();
  target.query("local", echo_terminal(), [tag_handler("local")]).unwrap();
  target.use_handlers([tag_handler("a")]);
  target.merge(&source_table());

  assert_eq!(target.operation_names(Namespace::Query), vec!["greet", "local"]);
  let queries = target.materialize(Namespace::Query).unwrap();
  assert_eq!(queries["local"].invoke(new_call("local")).await.unwrap(), "local:local");
}

#[tokio::test]
async fn test_source_changes_after_merge_are_not_seen() {
  setup_tracing();
  let mut source = source_table();
  let mut target = OperationTable::<TestApi>::new();
  target.merge(&source);

  source.use_handlers([tag_handler("after")]);
  source.query("greet", fixed_terminal("replaced"), []).unwrap();
  source.query("extra", fixed_terminal("extra"), []).unwrap();

  assert_eq!(target.len(Namespace::Query), 1);
  let queries = target.materialize(Namespace::Query).unwrap();
  assert_eq!(queries["greet"].invoke(new_call("greet")).await.unwrap(), "greet:b,own");
}

#[tokio::test]
async fn test_later_merges_win_and_keep_call_order() {
  setup_tracing();
  let mut first = OperationTable::<TestApi>::new();
  first.query("shared", fixed_terminal("from-first"), []).unwrap();
  first.query("only_first", fixed_terminal("first"), []).unwrap();

  let mut second = OperationTable::<TestApi>::new();
  second.use_handlers([tag_handler("second")]);
  second.query("shared", echo_terminal(), []).unwrap();

  let mut target = OperationTable::<TestApi>::new();
  target.use_handlers([tag_handler("root")]);
  merge(&mut target, &first);
  merge(&mut target, &second);

  let queries = target.materialize(Namespace::Query).unwrap();
  assert_eq!(queries["shared"].invoke(new_call("shared")).await.unwrap(), "shared:root,second");
  let call = new_call("only_first");
  assert_eq!(queries["only_first"].invoke(call.clone()).await.unwrap(), "first");
  assert_eq!(call.args.read().tags, vec!["root"]);
}

#[tokio::test]
async fn test_nested_merges_stack_prefixes() {
  setup_tracing();
  let mut inner = OperationTable::<TestApi>::new();
  inner.use_handlers([tag_handler("inner")]);
  inner.query("deep", echo_terminal(), []).unwrap();

  let mut middle = OperationTable::<TestApi>::new();
  middle.use_handlers([tag_handler("middle")]);
  middle.merge(&inner);

  let mut outer = OperationTable::<TestApi>::new();
  outer.use_handlers([tag_handler("outer")]);
  outer.merge(&middle);

  let queries = outer.materialize(Namespace::Query).unwrap();
  assert_eq!(queries["deep"].invoke(new_call("deep")).await.unwrap(), "deep:outer,middle,inner");
}
