use std::sync::Arc;

use parking_lot::Mutex;

use super::Recorded;
use crate::{event::Event, observer::Observer, scheduler::VirtualTimeScheduler};

/// Records every event together with the virtual tick it arrived at.
pub struct TestableObserver<Item, Err> {
  scheduler: VirtualTimeScheduler,
  events: Arc<Mutex<Vec<Recorded<Event<Item, Err>>>>>,
}

impl<Item, Err> Clone for TestableObserver<Item, Err> {
  fn clone(&self) -> Self { Self { scheduler: self.scheduler.clone(), events: self.events.clone() } }
}

impl<Item, Err> TestableObserver<Item, Err> {
  pub(crate) fn new(scheduler: VirtualTimeScheduler) -> Self {
    Self { scheduler, events: Arc::new(Mutex::new(Vec::new())) }
  }

  /// Everything recorded so far.
  pub fn events(&self) -> Vec<Recorded<Event<Item, Err>>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.events.lock().clone()
  }

  /// Only the values, without timestamps.
  pub fn values(&self) -> Vec<Item>
  where
    Item: Clone,
  {
    self.events.lock().iter().filter_map(|r| r.value.next_value().cloned()).collect()
  }
}

impl<Item: Send, Err: Send> Observer<Item, Err> for TestableObserver<Item, Err> {
  fn on(&self, event: Event<Item, Err>) {
    let time = self.scheduler.clock();
    self.events.lock().push(Recorded::new(time, event));
  }
}
