use std::sync::Arc;

use parking_lot::Mutex;

use super::{Recorded, SubscriptionLog};
use crate::{
  disposable::{AnyDisposable, CompositeDisposable, Disposable, Disposables},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer, Sink},
  scheduler::VirtualTimeScheduler,
};

/// An observable that replays its recorded events to every subscriber,
/// with ticks taken relative to the subscription time.
pub struct ColdObservable<Item, Err> {
  inner: Arc<Inner<Item, Err>>,
}

struct Inner<Item, Err> {
  scheduler: VirtualTimeScheduler,
  messages: Vec<Recorded<Event<Item, Err>>>,
  subscriptions: Mutex<Vec<SubscriptionLog>>,
}

impl<Item, Err> Clone for ColdObservable<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub(crate) fn new(scheduler: VirtualTimeScheduler, messages: Vec<Recorded<Event<Item, Err>>>) -> Self {
    Self { inner: Arc::new(Inner { scheduler, messages, subscriptions: Mutex::new(Vec::new()) }) }
  }

  /// Every subscription made so far, in subscription order.
  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.inner.subscriptions.lock().clone() }
}

impl<Item, Err> Observable for ColdObservable<Item, Err>
where
  Item: Clone + Send + Sync + 'static,
  Err: Clone + Send + Sync + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable {
    let start = self.inner.scheduler.clock();
    let index = {
      let mut subscriptions = self.inner.subscriptions.lock();
      subscriptions.push(SubscriptionLog::active(start));
      subscriptions.len() - 1
    };

    let sink = Arc::new(Sink::new(observer));
    let pending = Arc::new(CompositeDisposable::new());
    for Recorded { time, value } in self.inner.messages.iter().cloned() {
      let c_sink = sink.clone();
      let handle = self
        .inner
        .scheduler
        .schedule_absolute(start.saturating_add(time), Box::new(move || c_sink.on(value)));
      pending.insert(handle);
    }

    let inner = self.inner.clone();
    Disposables::create(move || {
      sink.dispose();
      pending.dispose();
      let clock = inner.scheduler.clock();
      inner.subscriptions.lock()[index].unsubscribe = clock;
    })
  }
}
