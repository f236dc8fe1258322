// opchain/examples/error_handling.rs

use opchain::{compile, handler, terminal, Call, Next, OpchainError, Signature};
use tracing::{error, info};

// 1. Define a custom application error type
#[derive(Debug, thiserror::Error)]
enum ExampleAppError {
  #[error("Not allowed: {0}")]
  Forbidden(String),

  #[error("Opchain framework error: {0}")]
  Opchain(#[from] OpchainError), // Allows OpchainError to be converted into ExampleAppError
}

struct AdminApi;

#[derive(Clone, Debug, Default)]
struct Session {
  user: Option<String>,
  is_admin: bool,
}

impl Signature for AdminApi {
  type Parent = ();
  type Args = ();
  type Context = Session;
  type Metadata = ();
  type Output = String;
  type Error = ExampleAppError;
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  let require_admin = handler(|call: Call<AdminApi>, next: Next<AdminApi>| async move {
    let session = call.context.read().clone();
    if !session.is_admin {
      let who = session.user.unwrap_or_else(|| "anonymous".to_string());
      // Aborting through the continuation: nothing after this handler runs.
      return next.fail(ExampleAppError::Forbidden(who));
    }
    next.run().await
  });
  let purge = terminal(|_call: Call<AdminApi>| async move { Ok::<_, ExampleAppError>("cache purged".to_string()) });

  let op = match compile("purgeCache", vec![require_admin], Some(purge)) {
    Ok(op) => op,
    Err(e) => {
      error!("Setup failed: {}", e);
      return;
    }
  };

  // Scenario 1: the guard aborts the pipeline
  info!("\nScenario 1: non-admin caller");
  let session = Session {
    user: Some("bob".to_string()),
    is_admin: false,
  };
  match op.invoke(Call::new((), (), session, ())).await {
    Ok(v) => info!("Unexpected success: {}", v),
    Err(e) => error!("Pipeline failed as expected: {}", e),
  }

  // Scenario 2: the guard lets the call through
  info!("\nScenario 2: admin caller");
  let session = Session {
    user: Some("alice".to_string()),
    is_admin: true,
  };
  match op.invoke(Call::new((), (), session, ())).await {
    Ok(v) => info!("Pipeline result: {}", v),
    Err(e) => error!("Unexpected failure: {}", e),
  }

  // Scenario 3: configuration error, no terminal logic
  info!("\nScenario 3: missing terminal logic");
  if let Err(e) = compile::<AdminApi>("broken", Vec::new(), None) {
    error!("Compile failed as expected: {}", e);
  }
}
