use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{Action, PeriodicAction, Scheduler, VirtualTimeScheduler};
use crate::{
  disposable::{AnyDisposable, Disposable},
  event::Event,
  observable::Observable,
  testing::{ColdObservable, HotObservable, Recorded, TestableObserver},
};

/// Tick at which [`TestScheduler::start`] creates the observable.
pub const CREATED: u64 = 100;
/// Tick at which [`TestScheduler::start`] subscribes.
pub const SUBSCRIBED: u64 = 200;
/// Tick at which [`TestScheduler::start`] disposes the subscription.
pub const DISPOSED: u64 = 1000;

/// A virtual time scheduler with helpers to script and record scenarios.
///
/// One tick is one millisecond, so `Duration::from_millis(10)` on this
/// scheduler is ten ticks.
#[derive(Clone, Default)]
pub struct TestScheduler {
  clock: VirtualTimeScheduler,
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// The underlying virtual time scheduler.
  pub fn virtual_time(&self) -> &VirtualTimeScheduler { &self.clock }

  #[inline]
  pub fn clock(&self) -> u64 { self.clock.clock() }

  pub fn advance_to(&self, tick: u64) { self.clock.advance_to(tick) }

  pub fn advance_by(&self, duration: Duration) { self.clock.advance_by(duration) }

  /// Run everything scheduled until the queue is empty.
  pub fn flush(&self) { self.clock.start() }

  /// Run `action` at the absolute tick `tick`.
  pub fn schedule_at<F>(&self, tick: u64, action: F) -> AnyDisposable
  where
    F: FnOnce() + Send + 'static,
  {
    self.clock.schedule_absolute(tick, Box::new(action))
  }

  /// An observable emitting `messages` at their absolute ticks.
  pub fn create_hot_observable<Item, Err>(
    &self, messages: Vec<Recorded<Event<Item, Err>>>,
  ) -> HotObservable<Item, Err>
  where
    Item: Clone + Send + 'static,
    Err: Clone + Send + 'static,
  {
    HotObservable::new(self.clock.clone(), messages)
  }

  /// An observable emitting `messages` relative to each subscription.
  pub fn create_cold_observable<Item, Err>(
    &self, messages: Vec<Recorded<Event<Item, Err>>>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable::new(self.clock.clone(), messages)
  }

  /// An observer recording events against this scheduler's clock.
  pub fn create_observer<Item, Err>(&self) -> TestableObserver<Item, Err> {
    TestableObserver::new(self.clock.clone())
  }

  /// [`start_with_timing`](Self::start_with_timing) with the default ticks:
  /// created at 100, subscribed at 200, disposed at 1000.
  pub fn start<O, F>(&self, factory: F) -> TestableObserver<O::Item, O::Err>
  where
    O: Observable + 'static,
    O::Item: Send + 'static,
    O::Err: Send + 'static,
    F: FnOnce() -> O + Send + 'static,
  {
    self.start_with_timing(CREATED, SUBSCRIBED, DISPOSED, factory)
  }

  /// Like [`start`](Self::start) but disposing at `disposed`.
  pub fn start_with_dispose<O, F>(&self, disposed: u64, factory: F) -> TestableObserver<O::Item, O::Err>
  where
    O: Observable + 'static,
    O::Item: Send + 'static,
    O::Err: Send + 'static,
    F: FnOnce() -> O + Send + 'static,
  {
    self.start_with_timing(CREATED, SUBSCRIBED, disposed, factory)
  }

  /// Build the observable with `factory` at `created`, subscribe a recording
  /// observer at `subscribed`, dispose it at `disposed`, then run the clock
  /// until nothing is left to do.
  pub fn start_with_timing<O, F>(
    &self, created: u64, subscribed: u64, disposed: u64, factory: F,
  ) -> TestableObserver<O::Item, O::Err>
  where
    O: Observable + 'static,
    O::Item: Send + 'static,
    O::Err: Send + 'static,
    F: FnOnce() -> O + Send + 'static,
  {
    let observer = self.create_observer::<O::Item, O::Err>();
    // The source stays alive until disposal; some observables only hold
    // weak references to their shared state from the subscription.
    let source: Arc<Mutex<Option<Arc<O>>>> = Arc::new(Mutex::new(None));
    let subscription: Arc<Mutex<Option<AnyDisposable>>> = Arc::new(Mutex::new(None));

    let c_source = source.clone();
    let _ = self.schedule_at(created, move || {
      *c_source.lock() = Some(Arc::new(factory()));
    });

    let (c_source, c_subscription, c_observer) = (source.clone(), subscription.clone(), observer.clone());
    let _ = self.schedule_at(subscribed, move || {
      let source = c_source.lock().clone();
      if let Some(source) = source {
        let handle = source.subscribe(Arc::new(c_observer));
        *c_subscription.lock() = Some(handle);
      }
    });

    let _ = self.schedule_at(disposed, move || {
      let handle = subscription.lock().take();
      if let Some(handle) = handle {
        handle.dispose();
      }
      drop(source.lock().take());
    });

    self.flush();
    observer
  }
}

impl Scheduler for TestScheduler {
  #[inline]
  fn now(&self) -> Instant { self.clock.now() }

  #[inline]
  fn schedule_action(&self, action: Action) -> AnyDisposable { self.clock.schedule_action(action) }

  #[inline]
  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable {
    self.clock.schedule_relative_action(due, action)
  }

  #[inline]
  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, tick: PeriodicAction,
  ) -> AnyDisposable {
    self.clock.schedule_periodic_action(start, period, tick)
  }
}
