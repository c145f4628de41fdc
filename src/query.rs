//! Background tasks owned by views.
//!
//! A `Query<T>` runs one future at a time on the tokio runtime and hands its
//! result back through a channel that the view polls on each tick. Starting
//! a new run aborts the previous task, so only the latest request a view
//! issued can ever report back.
//!
//! # Example
//!
//! ```ignore
//! let mut query = Query::new();
//! let users = stores.users.clone();
//! query.run(async move {
//!     users.fetch_users(10, 0).await;
//!     Ok(())
//! });
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The state of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
  /// Nothing has been run yet
  Idle,
  /// A task is running
  Loading,
  /// The last task completed successfully
  Success(T),
  /// The last task failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// Handle to the latest background task of a view.
pub struct Query<T> {
  state: QueryState<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  handle: Option<JoinHandle<()>>,
}

impl<T> Default for Query<T> {
  fn default() -> Self {
    Self {
      state: QueryState::Idle,
      receiver: None,
      handle: None,
    }
  }
}

impl<T: Send + 'static> Query<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start `future`, aborting the task from any earlier run.
  pub fn run<Fut>(&mut self, future: Fut)
  where
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    self.spawn(Box::pin(future));
  }

  /// Abort the running task, if any, and return to idle.
  pub fn cancel(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
    self.receiver = None;
    if self.state.is_loading() {
      self.state = QueryState::Idle;
    }
  }

  /// Poll for the result of the running task.
  ///
  /// Returns `true` if the state changed. Call this in the event loop tick.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.finish();
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.finish();
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task panicked or was aborted before sending
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.finish();
        true
      }
    }
  }

  fn spawn(&mut self, future: BoxFuture<'static, Result<T, String>>) {
    self.cancel();

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    self.handle = Some(tokio::spawn(async move {
      let result = future.await;
      // Receiver is gone when the view was closed
      let _ = tx.send(result);
    }));
  }

  fn finish(&mut self) {
    self.receiver = None;
    self.handle = None;
  }
}

impl<T> Drop for Query<T> {
  fn drop(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
