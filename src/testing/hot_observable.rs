use std::sync::Arc;

use parking_lot::Mutex;

use super::{Recorded, SubscriptionLog};
use crate::{
  bag::Bag,
  disposable::{AnyDisposable, Disposables},
  event::Event,
  observable::Observable,
  observer::AnyObserver,
  scheduler::VirtualTimeScheduler,
};

/// An observable that emits its recorded events at fixed virtual ticks,
/// whether anyone is subscribed or not.
pub struct HotObservable<Item, Err> {
  inner: Arc<Inner<Item, Err>>,
}

struct Inner<Item, Err> {
  scheduler: VirtualTimeScheduler,
  observers: Mutex<Bag<AnyObserver<Item, Err>>>,
  subscriptions: Mutex<Vec<SubscriptionLog>>,
}

impl<Item, Err> Clone for HotObservable<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> HotObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub(crate) fn new(scheduler: VirtualTimeScheduler, messages: Vec<Recorded<Event<Item, Err>>>) -> Self {
    let inner = Arc::new(Inner {
      scheduler: scheduler.clone(),
      observers: Mutex::new(Bag::new()),
      subscriptions: Mutex::new(Vec::new()),
    });
    for Recorded { time, value } in messages {
      let c_inner = inner.clone();
      // Emissions are part of the scenario and are never cancelled.
      let _ = scheduler.schedule_absolute(
        time,
        Box::new(move || {
          let observers = c_inner.observers.lock().snapshot();
          for observer in observers.iter() {
            observer.on(value.clone());
          }
        }),
      );
    }
    Self { inner }
  }
}

impl<Item, Err> HotObservable<Item, Err> {
  /// Every subscription made so far, in subscription order.
  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.inner.subscriptions.lock().clone() }
}

impl<Item, Err> Observable for HotObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable {
    let index = {
      let mut subscriptions = self.inner.subscriptions.lock();
      subscriptions.push(SubscriptionLog::active(self.inner.scheduler.clock()));
      subscriptions.len() - 1
    };
    let key = self.inner.observers.lock().insert(observer);
    let inner = self.inner.clone();
    Disposables::create(move || {
      let removed = inner.observers.lock().remove(key);
      drop(removed);
      let clock = inner.scheduler.clock();
      inner.subscriptions.lock()[index].unsubscribe = clock;
    })
  }
}
