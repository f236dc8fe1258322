// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use opchain::{handler, sync_handler, terminal, Call, Control, Handler, Next, OpchainError, Signature, Terminal};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::Level;

// --- Common Signature ---
pub struct TestApi;

impl Signature for TestApi {
  type Parent = ();
  type Args = TestArgs;
  type Context = TestContext;
  type Metadata = FieldInfo;
  type Output = String;
  type Error = TestError;
}

#[derive(Clone, Debug, Default)]
pub struct TestArgs {
  pub name: String,
  pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub trail: Vec<String>,
  pub user: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct FieldInfo {
  pub field_name: String,
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Opchain framework error: {0}")]
  Opchain(String), // Debug-formatted OpchainError, kept as String for Eq comparison

  #[error("Test handler failed: {0}")]
  Handler(String),

  #[error("Test terminal failed: {0}")]
  Terminal(String),
}

impl From<OpchainError> for TestError {
  fn from(oe: OpchainError) -> Self {
    TestError::Opchain(format!("{:?}", oe))
  }
}

pub fn new_call(name: &str) -> Call<TestApi> {
  Call::new(
    (),
    TestArgs {
      name: name.to_string(),
      tags: Vec::new(),
    },
    TestContext::default(),
    FieldInfo {
      field_name: name.to_string(),
    },
  )
}

// --- Common Handler Creators ---

/// Appends `tag` to the call's args and trail, then continues.
pub fn tag_handler(tag: &'static str) -> Handler<TestApi> {
  sync_handler(move |call: &Call<TestApi>| {
    call.args.write().tags.push(tag.to_string());
    call.context.write().trail.push(tag.to_string());
    tracing::debug!(target: "test_handlers", %tag, "tag handler executed");
    Ok::<_, TestError>(Control::Continue)
  })
}

/// Appends `tag`, suspends for `delay_ms`, then continues.
pub fn async_tag_handler(tag: &'static str, delay_ms: u64) -> Handler<TestApi> {
  handler(move |call: Call<TestApi>, next: Next<TestApi>| async move {
    call.args.write().tags.push(tag.to_string());
    call.context.write().trail.push(tag.to_string());
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    next.run().await
  })
}

/// Appends `tag` and answers `response` without calling the continuation.
pub fn responding_handler(tag: &'static str, response: &'static str) -> Handler<TestApi> {
  sync_handler(move |call: &Call<TestApi>| {
    call.context.write().trail.push(tag.to_string());
    Ok::<_, TestError>(Control::Respond(response.to_string()))
  })
}

/// Appends `tag` and fails with `TestError::Handler(message)`.
pub fn failing_handler(tag: &'static str, message: &'static str) -> Handler<TestApi> {
  sync_handler(move |call: &Call<TestApi>| {
    call.context.write().trail.push(tag.to_string());
    tracing::warn!(target: "test_handlers", %tag, "failing with: '{}'", message);
    Err::<Control<String>, _>(TestError::Handler(message.to_string()))
  })
}

/// Records "terminal" in the trail and answers `name:tag1,tag2,...`.
pub fn echo_terminal() -> Terminal<TestApi> {
  terminal(|call: Call<TestApi>| async move {
    TERMINAL_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    call.context.write().trail.push("terminal".to_string());
    let args = call.args.read();
    Ok::<_, TestError>(format!("{}:{}", args.name, args.tags.join(",")))
  })
}

/// Terminal logic that returns a fixed value.
pub fn fixed_terminal(value: &'static str) -> Terminal<TestApi> {
  terminal(move |call: Call<TestApi>| async move {
    call.context.write().trail.push(format!("terminal:{}", value));
    Ok::<_, TestError>(value.to_string())
  })
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static TERMINAL_EXEC_COUNTER: Lazy<AtomicUsize> = Lazy::new(|| AtomicUsize::new(0));

pub fn reset_counters() {
  TERMINAL_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

pub fn terminal_runs() -> usize {
  TERMINAL_EXEC_COUNTER.load(Ordering::SeqCst)
}
