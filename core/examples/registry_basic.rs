// opchain/examples/registry_basic.rs

use opchain::{
  sync_handler, sync_terminal, Call, Control, Declare, GroupScope, Handler, Namespace, OpchainError, OperationTable,
  Registry, Signature,
};
use tracing::info;

struct BookApi;

#[derive(Clone, Debug, Default)]
struct BookArgs {
  title: String,
  log: Vec<String>,
}

impl Signature for BookApi {
  type Parent = ();
  type Args = BookArgs;
  type Context = ();
  type Metadata = ();
  type Output = String;
  type Error = OpchainError;
}

fn log_step(label: &'static str) -> Handler<BookApi> {
  sync_handler(move |call: &Call<BookApi>| {
    call.args.write().log.push(label.to_string());
    Ok::<_, OpchainError>(Control::Continue)
  })
}

// --- A group declaring its own operations ---
struct BookResolvers;

impl Declare<BookApi> for BookResolvers {
  fn declare(group: &GroupScope<'_, BookApi, Self>) {
    // Operation-level handlers can come before the group-level ones;
    // the group's handlers still run first.
    group
      .operation_handlers(Namespace::Mutation, "addBook", [log_step("validate")])
      .mutation(
        "addBook",
        sync_terminal(|call: &Call<BookApi>| {
          let args = call.args.read();
          Ok::<_, OpchainError>(format!("added '{}' after {:?}", args.title, args.log))
        }),
      )
      .query(
        "book",
        sync_terminal(|call: &Call<BookApi>| {
          let args = call.args.read();
          Ok::<_, OpchainError>(format!("found '{}' after {:?}", args.title, args.log))
        }),
      )
      .handlers([log_step("authenticate")]);
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Opchain Registry Basic Example ---");

  // 1. Collect declarations
  let registry = Registry::<BookApi>::new();
  registry.install::<BookResolvers>();

  // 2. Merge the group's table into the service root, behind a root-wide handler
  let mut root = OperationTable::<BookApi>::new();
  root.use_handlers([log_step("trace")]);
  root.merge(&registry.table_for::<BookResolvers>()?);

  // 3. Materialize both namespaces and call them
  let schema = root.materialize_all()?;
  let args = BookArgs {
    title: "Dune".to_string(),
    log: Vec::new(),
  };
  info!("{}", schema.queries["book"].call((), args.clone(), (), ()).await?);
  info!("{}", schema.mutations["addBook"].call((), args, (), ()).await?);

  Ok(())
}
