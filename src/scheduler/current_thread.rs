use std::{
  cell::RefCell,
  collections::VecDeque,
  sync::Arc,
  thread,
  time::{Duration, Instant},
};

use super::{schedule_periodic_chain, Action, PeriodicAction, Scheduler};
use crate::disposable::{AnyDisposable, BooleanDisposable, Disposable, Disposables};

/// Queued work: the action, when it may run and its cancellation flag.
struct Work {
  due: Option<Instant>,
  action: Action,
  cancel: Arc<BooleanDisposable>,
}

thread_local! {
  /// `Some` while the current thread is draining its trampoline.
  static TRAMPOLINE: RefCell<Option<VecDeque<Work>>> = const { RefCell::new(None) };
}

/// Runs work on the calling thread through a trampoline.
///
/// The outermost `schedule_*` call on a thread runs its action right away
/// and then drains, in order, everything scheduled while it ran. Nested calls
/// only enqueue, so recursive scheduling never grows the stack. Nested timed
/// work keeps its place in the queue; the drain waits for its due time when
/// it gets there.
///
/// Periodic work needs a trampoline to run in: scheduled from outside one,
/// it would never hand its handle back, so it is refused and an already
/// disposed handle is returned.
#[derive(Clone, Copy, Default, Debug)]
pub struct CurrentThreadScheduler;

impl CurrentThreadScheduler {
  /// `true` if the calling thread is not already draining a trampoline, i.e.
  /// a call to `schedule_action` would run its action right away.
  pub fn is_schedule_required() -> bool { TRAMPOLINE.with(|q| q.borrow().is_none()) }

  fn enqueue(due: Option<Instant>, action: Action) -> AnyDisposable {
    let cancel = Arc::new(BooleanDisposable::new());
    let run_now = TRAMPOLINE.with(|q| {
      let mut q = q.borrow_mut();
      match q.as_mut() {
        Some(queue) => {
          queue.push_back(Work { due, action, cancel: cancel.clone() });
          None
        }
        None => {
          *q = Some(VecDeque::new());
          Some(action)
        }
      }
    });

    if let Some(action) = run_now {
      let _guard = TrampolineGuard;
      wait_until(due);
      action();
      while let Some(work) = TRAMPOLINE.with(|q| q.borrow_mut().as_mut().and_then(VecDeque::pop_front)) {
        if work.cancel.is_disposed() {
          continue;
        }
        wait_until(work.due);
        if !work.cancel.is_disposed() {
          (work.action)();
        }
      }
    }
    cancel
  }
}

fn wait_until(due: Option<Instant>) {
  if let Some(due) = due {
    let now = Instant::now();
    if due > now {
      thread::sleep(due - now);
    }
  }
}

/// Clears the trampoline even if an action panics.
struct TrampolineGuard;

impl Drop for TrampolineGuard {
  fn drop(&mut self) { TRAMPOLINE.with(|q| q.borrow_mut().take()); }
}

impl Scheduler for CurrentThreadScheduler {
  #[inline]
  fn now(&self) -> Instant { Instant::now() }

  #[inline]
  fn schedule_action(&self, action: Action) -> AnyDisposable { Self::enqueue(None, action) }

  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable {
    let due = (!due.is_zero()).then(|| Instant::now() + due);
    Self::enqueue(due, action)
  }

  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, tick: PeriodicAction,
  ) -> AnyDisposable {
    if Self::is_schedule_required() {
      tracing::warn!("periodic work on the current-thread scheduler needs a running trampoline, refused");
      return Disposables::empty();
    }
    schedule_periodic_chain(Arc::new(*self), start, period, tick)
  }
}
