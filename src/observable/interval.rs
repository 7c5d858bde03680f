use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::{
  disposable::{AnyDisposable, Disposables},
  observable::Observable,
  observer::{AnyObserver, ObserverExt, Sink},
  scheduler::{AnyScheduler, Scheduler, SchedulerExt},
};

/// Creates an observable which emits `0, 1, 2, ...`, the first value after
/// `period` and then one per `period`, on `scheduler`.
pub fn interval<S>(period: Duration, scheduler: S) -> Interval
where
  S: Scheduler + 'static,
{
  Interval { period, scheduler: Arc::new(scheduler) }
}

#[derive(Clone)]
pub struct Interval {
  period: Duration,
  scheduler: AnyScheduler,
}

impl Observable for Interval {
  type Item = usize;
  type Err = Infallible;

  fn subscribe(&self, observer: AnyObserver<usize, Infallible>) -> AnyDisposable {
    let sink = Arc::new(Sink::new(observer));
    let c_sink = sink.clone();
    let ticks = self.scheduler.schedule_periodic(0, self.period, move |seq| {
      c_sink.on_next(seq);
      seq + 1
    });
    Disposables::create2(sink, ticks)
  }
}

/// Creates an observable which emits `0` after `due` on `scheduler`, then
/// completes.
pub fn timer<S>(due: Duration, scheduler: S) -> Timer
where
  S: Scheduler + 'static,
{
  Timer { due, scheduler: Arc::new(scheduler) }
}

#[derive(Clone)]
pub struct Timer {
  due: Duration,
  scheduler: AnyScheduler,
}

impl Observable for Timer {
  type Item = usize;
  type Err = Infallible;

  fn subscribe(&self, observer: AnyObserver<usize, Infallible>) -> AnyDisposable {
    let sink = Arc::new(Sink::new(observer));
    let c_sink = sink.clone();
    let pending = self.scheduler.schedule_relative((), self.due, move |_| {
      c_sink.on_next(0);
      c_sink.on_completed();
    });
    Disposables::create2(sink, pending)
  }
}

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;

  use super::*;
  use crate::{
    event::Event,
    prelude::*,
    testing::{completed, next, Recorded},
  };

  #[test]
  fn interval_on_virtual_time() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start_with_dispose(245, {
      let scheduler = scheduler.clone();
      move || interval(Duration::from_millis(10), scheduler)
    });
    let expected: Vec<Recorded<Event<usize, Infallible>>> =
      vec![next(210, 0), next(220, 1), next(230, 2), next(240, 3)];
    assert_eq!(observer.events(), expected);
  }

  #[test]
  fn timer_emits_once_and_completes() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start({
      let scheduler = scheduler.clone();
      move || timer(Duration::from_millis(50), scheduler)
    });
    let expected: Vec<Recorded<Event<usize, Infallible>>> = vec![next(250, 0), completed(250)];
    assert_eq!(observer.events(), expected);
  }

  #[test]
  fn interval_stops_on_dispose() {
    let scheduler = VirtualTimeScheduler::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let subscription =
      interval(Duration::from_millis(1), scheduler.clone()).subscribe_next(move |v| c_seen.lock().push(v));
    scheduler.advance_to(3);
    subscription.dispose();
    scheduler.advance_to(10);
    assert_eq!(*seen.lock(), vec![0, 1, 2]);
  }
}
