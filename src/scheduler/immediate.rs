use std::{
  sync::Arc,
  thread,
  time::{Duration, Instant},
};

use super::{Action, PeriodicAction, Scheduler};
use crate::disposable::{AnyDisposable, BooleanDisposable, Disposable, Disposables};

/// Runs every action synchronously on the calling thread.
///
/// Relative scheduling blocks the caller for the due time. Periodic work
/// cannot run on the caller without blocking it forever, so it gets a
/// dedicated thread that sleeps between ticks.
#[derive(Clone, Copy, Default, Debug)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  #[inline]
  fn now(&self) -> Instant { Instant::now() }

  fn schedule_action(&self, action: Action) -> AnyDisposable {
    action();
    Disposables::empty()
  }

  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable {
    if !due.is_zero() {
      thread::sleep(due);
    }
    action();
    Disposables::empty()
  }

  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, mut tick: PeriodicAction,
  ) -> AnyDisposable {
    let cancel = Arc::new(BooleanDisposable::new());
    let c_cancel = cancel.clone();
    let spawned = thread::Builder::new().name("rxcore-periodic".into()).spawn(move || {
      thread::sleep(start);
      while !c_cancel.is_disposed() {
        tick();
        thread::sleep(period);
      }
    });
    if let Err(err) = spawned {
      tracing::error!(%err, "failed to spawn periodic worker thread");
      cancel.dispose();
    }
    cancel
  }
}
