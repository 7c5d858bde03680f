//! Schedulers decide where and when a unit of work runs.
//!
//! Every scheduler implements the object-safe [`Scheduler`] trait; the
//! state-threading conveniences live on [`SchedulerExt`].
//!
//! | Scheduler | Execution |
//! |-----------|-----------|
//! | [`ImmediateScheduler`] | synchronously, on the caller |
//! | [`CurrentThreadScheduler`] | on the caller, trampolined |
//! | [`ConcurrentScheduler`] | on a `futures` thread pool, in parallel |
//! | [`SerialScheduler`] | FIFO without overlap, on top of another scheduler |
//! | [`VirtualTimeScheduler`] | on a virtual clock, advanced explicitly |
//! | [`TestScheduler`] | virtual time plus recording helpers |

use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::disposable::{AnyDisposable, Disposable};

#[cfg(feature = "futures-scheduler")]
mod concurrent;
mod current_thread;
mod immediate;
mod serial;
mod test_scheduler;
mod virtual_time;

#[cfg(feature = "futures-scheduler")]
pub use concurrent::*;
pub use current_thread::*;
pub use immediate::*;
pub use serial::*;
pub use test_scheduler::*;
pub use virtual_time::*;

/// A one-shot unit of work.
pub type Action = Box<dyn FnOnce() + Send>;

/// A unit of work run once per period.
pub type PeriodicAction = Box<dyn FnMut() + Send>;

/// Type-erased, shareable scheduler.
pub type AnyScheduler = Arc<dyn Scheduler>;

/// Orders units of work and decides where they execute.
pub trait Scheduler: Send + Sync {
  /// The scheduler's notion of the current time.
  fn now(&self) -> Instant;

  /// Run `action` as soon as possible.
  fn schedule_action(&self, action: Action) -> AnyDisposable;

  /// Run `action` after `due` has elapsed.
  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable;

  /// Run `tick` first after `start`, then once every `period`.
  ///
  /// Disposing the returned handle stops further iterations; an iteration
  /// already running finishes.
  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, tick: PeriodicAction,
  ) -> AnyDisposable;
}

impl<T: Scheduler + ?Sized> Scheduler for Arc<T> {
  #[inline]
  fn now(&self) -> Instant { (**self).now() }

  #[inline]
  fn schedule_action(&self, action: Action) -> AnyDisposable { (**self).schedule_action(action) }

  #[inline]
  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable {
    (**self).schedule_relative_action(due, action)
  }

  #[inline]
  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, tick: PeriodicAction,
  ) -> AnyDisposable {
    (**self).schedule_periodic_action(start, period, tick)
  }
}

/// Generic, state-passing forms of the [`Scheduler`] methods.
pub trait SchedulerExt: Scheduler {
  fn schedule<S, F>(&self, state: S, f: F) -> AnyDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) + Send + 'static,
  {
    self.schedule_action(Box::new(move || f(state)))
  }

  fn schedule_relative<S, F>(&self, state: S, due: Duration, f: F) -> AnyDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) + Send + 'static,
  {
    self.schedule_relative_action(due, Box::new(move || f(state)))
  }

  /// Run `f` once per `period`, threading an accumulator through every call.
  fn schedule_periodic<S, F>(&self, state: S, period: Duration, mut f: F) -> AnyDisposable
  where
    S: Send + 'static,
    F: FnMut(S) -> S + Send + 'static,
  {
    let mut state = Some(state);
    self.schedule_periodic_action(
      period,
      period,
      Box::new(move || {
        if let Some(s) = state.take() {
          state = Some(f(s));
        }
      }),
    )
  }
}

impl<T: Scheduler + ?Sized> SchedulerExt for T {}

/// Periodic work expressed as a chain of relative schedules on `scheduler`.
///
/// Each iteration schedules the next one after it ran. The latest pending
/// handle is kept so disposal can cancel it; handles are tagged with their
/// iteration number because on a parallel scheduler the next iteration may
/// register its handle before the current one does.
pub(crate) fn schedule_periodic_chain(
  scheduler: AnyScheduler, start: Duration, period: Duration, tick: PeriodicAction,
) -> AnyDisposable {
  let chain = Arc::new(PeriodicChain {
    cancelled: AtomicBool::new(false),
    pending: Mutex::new((0, None)),
    tick: Mutex::new(tick),
    period,
    scheduler,
  });
  PeriodicChain::step(&chain, 0, start);
  chain
}

struct PeriodicChain {
  cancelled: AtomicBool,
  pending: Mutex<(u64, Option<AnyDisposable>)>,
  tick: Mutex<PeriodicAction>,
  period: Duration,
  scheduler: AnyScheduler,
}

impl PeriodicChain {
  fn step(this: &Arc<Self>, iteration: u64, due: Duration) {
    let c_this = this.clone();
    let handle = this.scheduler.schedule_relative_action(
      due,
      Box::new(move || {
        if c_this.cancelled.load(Ordering::Acquire) {
          return;
        }
        {
          let mut tick = c_this.tick.lock();
          (*tick)();
        }
        if c_this.cancelled.load(Ordering::Acquire) {
          tracing::trace!(iteration, "periodic schedule stopped");
          return;
        }
        PeriodicChain::step(&c_this, iteration + 1, c_this.period);
      }),
    );

    let mut pending = this.pending.lock();
    if pending.1.is_some() && pending.0 > iteration {
      return;
    }
    *pending = (iteration, Some(handle.clone()));
    drop(pending);
    if this.cancelled.load(Ordering::Acquire) {
      handle.dispose();
    }
  }
}

impl Disposable for PeriodicChain {
  fn dispose(&self) {
    if self.cancelled.swap(true, Ordering::AcqRel) {
      return;
    }
    let pending = self.pending.lock().1.take();
    if let Some(pending) = pending {
      pending.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.cancelled.load(Ordering::Acquire) }
}
