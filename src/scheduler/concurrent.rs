use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use futures::executor::ThreadPool;
use once_cell::sync::OnceCell;

use super::{schedule_periodic_chain, Action, PeriodicAction, Scheduler};
use crate::{
  disposable::{AnyDisposable, BooleanDisposable, Disposable},
  error::RxError,
};

static SHARED_POOL: OnceCell<ThreadPool> = OnceCell::new();

/// Runs work in parallel on a `futures` thread pool.
///
/// Cloning yields another handle to the same pool. Actions carry no ordering
/// guarantee relative to each other.
#[derive(Clone)]
pub struct ConcurrentScheduler {
  pool: ThreadPool,
}

impl ConcurrentScheduler {
  /// A handle to the process-wide pool, created on first use.
  pub fn shared() -> Result<Self, RxError> {
    let pool = SHARED_POOL.get_or_try_init(|| Self::builder().name_prefix("rxcore-").create_pool())?;
    Ok(Self { pool: pool.clone() })
  }

  pub fn builder() -> ConcurrentSchedulerBuilder { ConcurrentSchedulerBuilder::default() }

  /// Wrap an existing pool.
  pub fn from_pool(pool: ThreadPool) -> Self { Self { pool } }

  fn spawn(&self, due: Option<Duration>, action: Action) -> AnyDisposable {
    let cancel = Arc::new(BooleanDisposable::new());
    let c_cancel = cancel.clone();
    self.pool.spawn_ok(async move {
      if let Some(due) = due {
        delay(due).await;
      }
      if !c_cancel.is_disposed() {
        action();
      }
    });
    cancel
  }
}

#[cfg(feature = "timer")]
async fn delay(due: Duration) { futures_time::task::sleep(due.into()).await; }

#[cfg(not(feature = "timer"))]
async fn delay(due: Duration) { std::thread::sleep(due); }

/// Configures a dedicated pool for a [`ConcurrentScheduler`].
#[derive(Default)]
pub struct ConcurrentSchedulerBuilder {
  pool_size: Option<usize>,
  name_prefix: Option<String>,
}

impl ConcurrentSchedulerBuilder {
  /// Number of worker threads. Defaults to the number of CPUs.
  pub fn pool_size(mut self, size: usize) -> Self {
    self.pool_size = Some(size);
    self
  }

  pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.name_prefix = Some(prefix.into());
    self
  }

  pub fn build(self) -> Result<ConcurrentScheduler, RxError> {
    Ok(ConcurrentScheduler { pool: self.create_pool()? })
  }

  fn create_pool(self) -> Result<ThreadPool, RxError> {
    let mut builder = ThreadPool::builder();
    match self.pool_size {
      Some(0) => return Err(RxError::InvalidConfig("pool size must be at least 1".into())),
      Some(size) => {
        builder.pool_size(size);
      }
      None => {}
    }
    if let Some(prefix) = self.name_prefix {
      builder.name_prefix(prefix);
    }
    Ok(builder.create()?)
  }
}

impl Scheduler for ConcurrentScheduler {
  #[inline]
  fn now(&self) -> Instant { Instant::now() }

  fn schedule_action(&self, action: Action) -> AnyDisposable { self.spawn(None, action) }

  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable {
    self.spawn(Some(due), action)
  }

  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, tick: PeriodicAction,
  ) -> AnyDisposable {
    schedule_periodic_chain(Arc::new(self.clone()), start, period, tick)
  }
}
