//! Virtual time scheduler for deterministic, single-threaded execution of
//! time-based code.
//!
//! Time is an integer tick count that only moves when the owner calls
//! [`start`](VirtualTimeScheduler::start),
//! [`advance_to`](VirtualTimeScheduler::advance_to),
//! [`advance_by`](VirtualTimeScheduler::advance_by) or
//! [`sleep`](VirtualTimeScheduler::sleep). Work is totally ordered by due
//! tick, then by insertion order.
//!
//! ```rust
//! use rxcore::prelude::*;
//! use std::{sync::Arc, time::Duration};
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let hits = Arc::new(parking_lot::Mutex::new(vec![]));
//! let c_hits = hits.clone();
//! let c_scheduler = scheduler.clone();
//! scheduler.schedule_relative((), Duration::from_millis(10), move |_| {
//!   c_hits.lock().push(c_scheduler.clock());
//! });
//!
//! scheduler.advance_to(9);
//! assert!(hits.lock().is_empty());
//! scheduler.advance_to(10);
//! assert_eq!(*hits.lock(), vec![10]);
//! ```

use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  sync::Arc,
  time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{schedule_periodic_chain, Action, PeriodicAction, Scheduler};
use crate::{
  disposable::{AnyDisposable, BooleanDisposable, Disposable},
  error::RxError,
};

struct ScheduledItem {
  due: u64,
  id: u64,
  action: Action,
  cancel: Arc<BooleanDisposable>,
}

impl PartialEq for ScheduledItem {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.id == other.id }
}

impl Eq for ScheduledItem {}

impl PartialOrd for ScheduledItem {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledItem {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier ticks first, then FIFO by id
    other.due.cmp(&self.due).then_with(|| other.id.cmp(&self.id))
  }
}

struct State {
  clock: u64,
  queue: BinaryHeap<ScheduledItem>,
  next_id: u64,
  running: bool,
}

struct Inner {
  state: Mutex<State>,
  origin: Instant,
  resolution: Duration,
}

/// A scheduler driven by a virtual clock.
///
/// Cloning yields another handle to the same clock and queue. The internal
/// lock is never held while an action runs, so actions may schedule more work
/// or read the clock.
#[derive(Clone)]
pub struct VirtualTimeScheduler {
  inner: Arc<Inner>,
}

impl Default for VirtualTimeScheduler {
  fn default() -> Self { Self::build(0, Duration::from_millis(1)) }
}

impl VirtualTimeScheduler {
  /// A scheduler at tick 0 where one tick is one millisecond.
  pub fn new() -> Self { Self::default() }

  /// A scheduler starting at `initial_clock` where one tick lasts
  /// `resolution`.
  pub fn with_resolution(initial_clock: u64, resolution: Duration) -> Result<Self, RxError> {
    if resolution.is_zero() {
      return Err(RxError::InvalidConfig("virtual time resolution must be non-zero".into()));
    }
    Ok(Self::build(initial_clock, resolution))
  }

  fn build(initial_clock: u64, resolution: Duration) -> Self {
    let state = State { clock: initial_clock, queue: BinaryHeap::new(), next_id: 0, running: false };
    Self { inner: Arc::new(Inner { state: Mutex::new(state), origin: Instant::now(), resolution }) }
  }

  /// The current virtual tick.
  #[inline]
  pub fn clock(&self) -> u64 { self.inner.state.lock().clock }

  #[inline]
  pub fn resolution(&self) -> Duration { self.inner.resolution }

  /// Convert a real duration to whole ticks, rounding down.
  pub fn to_ticks(&self, duration: Duration) -> u64 {
    let ticks = duration.as_nanos() / self.inner.resolution.as_nanos();
    u64::try_from(ticks).unwrap_or(u64::MAX)
  }

  /// Number of scheduled actions that have not run and were not cancelled.
  pub fn pending(&self) -> usize {
    self.inner.state.lock().queue.iter().filter(|item| !item.cancel.is_disposed()).count()
  }

  /// Schedule `action` at the absolute tick `due`. A tick in the past runs
  /// at the current tick.
  pub fn schedule_absolute(&self, due: u64, action: Action) -> AnyDisposable {
    let cancel = Arc::new(BooleanDisposable::new());
    let mut state = self.inner.state.lock();
    let id = state.next_id;
    state.next_id += 1;
    state.queue.push(ScheduledItem { due, id, action, cancel: cancel.clone() });
    cancel
  }

  /// Run every scheduled action, including the ones scheduled along the way,
  /// until the queue is empty or [`stop`](Self::stop) is called.
  pub fn start(&self) {
    {
      let mut state = self.inner.state.lock();
      if state.running {
        return;
      }
      state.running = true;
    }
    tracing::debug!(clock = self.clock(), "virtual time scheduler started");
    self.run_until(None);
    self.inner.state.lock().running = false;
    tracing::debug!(clock = self.clock(), "virtual time scheduler stopped");
  }

  /// Run every action due at or before `tick`, then set the clock to `tick`.
  ///
  /// # Panics
  ///
  /// Panics if `tick` is earlier than the current clock.
  pub fn advance_to(&self, tick: u64) {
    let was_running = {
      let mut state = self.inner.state.lock();
      assert!(
        tick >= state.clock,
        "cannot move virtual time backwards (from {} to {tick})",
        state.clock
      );
      std::mem::replace(&mut state.running, true)
    };
    let finished = self.run_until(Some(tick));
    let mut state = self.inner.state.lock();
    if finished && state.clock < tick {
      state.clock = tick;
    }
    state.running = was_running && finished;
  }

  /// [`advance_to`](Self::advance_to) the current tick plus `duration`.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.clock().saturating_add(self.to_ticks(duration));
    self.advance_to(target);
  }

  /// Move the clock forward without running anything.
  pub fn sleep(&self, duration: Duration) {
    let ticks = self.to_ticks(duration);
    let mut state = self.inner.state.lock();
    state.clock = state.clock.saturating_add(ticks);
  }

  /// Stop the running `start` or `advance_*` loop after the current action.
  pub fn stop(&self) { self.inner.state.lock().running = false; }

  /// Returns `false` if the loop was interrupted by `stop`.
  fn run_until(&self, limit: Option<u64>) -> bool {
    loop {
      let item = {
        let mut state = self.inner.state.lock();
        if !state.running {
          return false;
        }
        let due_now = state.queue.peek().is_some_and(|next| limit.is_none_or(|limit| next.due <= limit));
        if !due_now {
          return true;
        }
        let Some(item) = state.queue.pop() else { return true };
        if item.cancel.is_disposed() {
          continue;
        }
        if item.due > state.clock {
          state.clock = item.due;
        }
        item
      };
      (item.action)();
    }
  }
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Instant {
    let nanos = self.inner.resolution.as_nanos().saturating_mul(u128::from(self.clock()));
    self.inner.origin + Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
  }

  fn schedule_action(&self, action: Action) -> AnyDisposable {
    let clock = self.clock();
    self.schedule_absolute(clock, action)
  }

  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable {
    let due = self.clock().saturating_add(self.to_ticks(due));
    self.schedule_absolute(due, action)
  }

  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, tick: PeriodicAction,
  ) -> AnyDisposable {
    schedule_periodic_chain(Arc::new(self.clone()), start, period, tick)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scheduler::SchedulerExt;

  fn log_at(
    scheduler: &VirtualTimeScheduler, log: &Arc<Mutex<Vec<(u64, &'static str)>>>, tick: u64,
    name: &'static str,
  ) -> AnyDisposable {
    let (c_log, c_scheduler) = (log.clone(), scheduler.clone());
    scheduler.schedule_absolute(tick, Box::new(move || c_log.lock().push((c_scheduler.clock(), name))))
  }

  #[test]
  fn ordered_by_time_then_insertion() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 20, "c");
    log_at(&scheduler, &log, 10, "a");
    log_at(&scheduler, &log, 10, "b");
    scheduler.start();
    assert_eq!(*log.lock(), vec![(10, "a"), (10, "b"), (20, "c")]);
    assert_eq!(scheduler.clock(), 20);
  }

  #[test]
  fn advance_to_runs_due_work_only() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 5, "a");
    log_at(&scheduler, &log, 15, "b");

    scheduler.advance_to(10);
    assert_eq!(*log.lock(), vec![(5, "a")]);
    assert_eq!(scheduler.clock(), 10);
    assert_eq!(scheduler.pending(), 1);

    scheduler.advance_by(Duration::from_millis(5));
    assert_eq!(*log.lock(), vec![(5, "a"), (15, "b")]);
  }

  #[test]
  fn cancelled_work_does_not_run() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let handle = log_at(&scheduler, &log, 5, "a");
    handle.dispose();
    assert_eq!(scheduler.pending(), 0);
    scheduler.start();
    assert!(log.lock().is_empty());
    assert_eq!(scheduler.clock(), 0);
  }

  #[test]
  fn actions_may_schedule_more_work() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let (c_log, c_scheduler) = (log.clone(), scheduler.clone());
    scheduler.schedule_absolute(
      3,
      Box::new(move || {
        let (cc_log, cc_scheduler) = (c_log.clone(), c_scheduler.clone());
        c_scheduler.schedule_relative((), Duration::from_millis(2), move |_| {
          cc_log.lock().push(cc_scheduler.clock())
        });
        c_log.lock().push(c_scheduler.clock());
      }),
    );
    scheduler.start();
    assert_eq!(*log.lock(), vec![3, 5]);
  }

  #[test]
  fn stop_interrupts_start() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let c_scheduler = scheduler.clone();
    log_at(&scheduler, &log, 1, "a");
    scheduler.schedule_absolute(2, Box::new(move || c_scheduler.stop()));
    log_at(&scheduler, &log, 3, "b");

    scheduler.start();
    assert_eq!(*log.lock(), vec![(1, "a")]);
    assert_eq!(scheduler.clock(), 2);

    scheduler.start();
    assert_eq!(*log.lock(), vec![(1, "a"), (3, "b")]);
  }

  #[test]
  fn sleep_moves_clock_only() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 5, "a");
    scheduler.sleep(Duration::from_millis(10));
    assert_eq!(scheduler.clock(), 10);
    assert!(log.lock().is_empty());
    scheduler.start();
    assert_eq!(*log.lock(), vec![(10, "a")]);
  }

  #[test]
  fn resolution() {
    let scheduler = VirtualTimeScheduler::with_resolution(100, Duration::from_secs(1)).unwrap();
    assert_eq!(scheduler.clock(), 100);
    assert_eq!(scheduler.to_ticks(Duration::from_millis(2500)), 2);
    assert!(matches!(
      VirtualTimeScheduler::with_resolution(0, Duration::ZERO),
      Err(RxError::InvalidConfig(_))
    ));
  }

  #[test]
  #[should_panic(expected = "backwards")]
  fn advance_backwards_panics() {
    let scheduler = VirtualTimeScheduler::new();
    scheduler.advance_to(10);
    scheduler.advance_to(5);
  }
}
