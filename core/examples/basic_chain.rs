// opchain/examples/basic_chain.rs

use opchain::{handler, sync_handler, sync_terminal, Call, Control, Namespace, Next, OpchainError, OperationTable, Signature};
use tracing::info;

// 1. Describe the operation family
struct GreeterApi;

#[derive(Clone, Debug, Default)]
struct GreetArgs {
  name: String,
  tags: Vec<String>,
}

#[derive(Clone, Debug, Default)]
struct RequestContext {
  request_id: u32,
}

impl Signature for GreeterApi {
  type Parent = ();
  type Args = GreetArgs;
  type Context = RequestContext;
  type Metadata = &'static str;
  type Output = String;
  // For simplicity, this example uses OpchainError directly.
  type Error = OpchainError;
}

#[tokio::main]
async fn main() -> Result<(), OpchainError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Chain Example ---");

  // 2. Build a table with a default handler applied to every later registration
  let mut table = OperationTable::<GreeterApi>::new();
  table.use_handlers([sync_handler(|call: &Call<GreeterApi>| {
    call.args.write().tags.push("tagA".to_string());
    Ok::<_, OpchainError>(Control::Continue)
  })]);

  // 3. Register an operation with its own handler
  let tag_b = handler(|call: Call<GreeterApi>, next: Next<GreeterApi>| async move {
    call.args.write().tags.push("tagB".to_string());
    let greeting = next.run().await?;
    // Handlers may transform what the rest of the chain produced
    Ok::<_, OpchainError>(format!("{} (request {})", greeting, call.context.read().request_id))
  });
  let greet = sync_terminal(|call: &Call<GreeterApi>| {
    let args = call.args.read();
    Ok::<_, OpchainError>(format!("Hello {}! tags = {:?}", args.name, args.tags))
  });
  table.register(Namespace::Query, "greet", greet, [tag_b])?;

  // 4. Materialize once at setup, then invoke per request
  let queries = table.materialize(Namespace::Query)?;
  for (request_id, name) in [(1, "Ada"), (2, "Grace")] {
    let call = Call::new(
      (),
      GreetArgs {
        name: name.to_string(),
        tags: Vec::new(),
      },
      RequestContext { request_id },
      "greet",
    );
    let answer = queries["greet"].invoke(call).await?;
    info!("{}", answer);
  }

  Ok(())
}
