use std::sync::Arc;

use crate::{
  disposable::{AnyDisposable, Disposables, ScheduledDisposable, SingleAssignmentDisposable},
  observable::Observable,
  observer::AnyObserver,
  scheduler::AnyScheduler,
};

/// Subscribes to the source on a scheduler. Disposing the subscription
/// disposes the source's subscription on the same scheduler.
pub struct SubscribeOn<Src> {
  source: Arc<Src>,
  scheduler: AnyScheduler,
}

impl<Src> Clone for SubscribeOn<Src> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), scheduler: self.scheduler.clone() } }
}

impl<Src> SubscribeOn<Src> {
  pub fn new(source: Src, scheduler: AnyScheduler) -> Self { Self { source: Arc::new(source), scheduler } }
}

impl<Src> Observable for SubscribeOn<Src>
where
  Src: Observable + 'static,
  Src::Item: 'static,
  Src::Err: 'static,
{
  type Item = Src::Item;
  type Err = Src::Err;

  fn subscribe(&self, observer: AnyObserver<Src::Item, Src::Err>) -> AnyDisposable {
    let single = Arc::new(SingleAssignmentDisposable::new());
    let (source, scheduler, c_single) = (self.source.clone(), self.scheduler.clone(), single.clone());
    let scheduled = self.scheduler.schedule_action(Box::new(move || {
      let subscription = source.subscribe(observer);
      c_single.set(ScheduledDisposable::new(scheduler, subscription));
    }));
    Disposables::create2(scheduled, single)
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use parking_lot::Mutex;

  use super::*;
  use crate::{
    disposable::Disposable,
    observable::{create, ObservableExt},
    scheduler::VirtualTimeScheduler,
  };

  #[test]
  fn subscription_and_disposal_happen_on_the_scheduler() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let (c_log, c_scheduler) = (log.clone(), scheduler.clone());
    let source = create(move |_: AnyObserver<i32, ()>| {
      c_log.lock().push(format!("subscribe at {}", c_scheduler.clock()));
      let (d_log, d_scheduler) = (c_log.clone(), c_scheduler.clone());
      Disposables::create(move || d_log.lock().push(format!("dispose at {}", d_scheduler.clock())))
    });

    scheduler.sleep(Duration::from_millis(5));
    let subscription = source.subscribe_on(scheduler.clone()).subscribe_next(|_| {});
    assert!(log.lock().is_empty());
    scheduler.start();
    assert_eq!(*log.lock(), vec!["subscribe at 5"]);

    scheduler.sleep(Duration::from_millis(5));
    subscription.dispose();
    assert_eq!(log.lock().len(), 1);
    scheduler.start();
    assert_eq!(*log.lock(), vec!["subscribe at 5", "dispose at 10"]);
  }

  #[test]
  fn disposing_before_the_schedule_skips_the_subscription() {
    let scheduler = VirtualTimeScheduler::new();
    let subscribed = Arc::new(Mutex::new(false));
    let c_subscribed = subscribed.clone();
    let source = create(move |_: AnyObserver<i32, ()>| {
      *c_subscribed.lock() = true;
      Disposables::empty()
    });
    let subscription = source.subscribe_on(scheduler.clone()).subscribe_next(|_| {});
    subscription.dispose();
    scheduler.start();
    assert!(!*subscribed.lock());
  }
}
