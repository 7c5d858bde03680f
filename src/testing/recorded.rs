use std::fmt;

use crate::event::Event;

/// A value stamped with the virtual tick it was observed at.
#[derive(Clone, PartialEq, Eq)]
pub struct Recorded<T> {
  pub time: u64,
  pub value: T,
}

impl<T> Recorded<T> {
  pub fn new(time: u64, value: T) -> Self { Self { time, value } }
}

impl<T: fmt::Debug> fmt::Debug for Recorded<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:?}@{}", self.value, self.time) }
}

/// A `Next(value)` at `time`.
pub fn next<Item, Err>(time: u64, value: Item) -> Recorded<Event<Item, Err>> {
  Recorded::new(time, Event::Next(value))
}

/// An `Error(err)` at `time`.
pub fn error<Item, Err>(time: u64, err: Err) -> Recorded<Event<Item, Err>> {
  Recorded::new(time, Event::Error(err))
}

/// A `Completed` at `time`.
pub fn completed<Item, Err>(time: u64) -> Recorded<Event<Item, Err>> { Recorded::new(time, Event::Completed) }

/// When a test observable was subscribed and unsubscribed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionLog {
  pub subscribe: u64,
  pub unsubscribe: u64,
}

impl SubscriptionLog {
  /// `unsubscribe` value of a subscription that is still active.
  pub const ACTIVE: u64 = u64::MAX;

  pub fn new(subscribe: u64, unsubscribe: u64) -> Self { Self { subscribe, unsubscribe } }

  /// A subscription made at `subscribe` and never disposed.
  pub fn active(subscribe: u64) -> Self { Self::new(subscribe, Self::ACTIVE) }

  pub fn is_active(&self) -> bool { self.unsubscribe == Self::ACTIVE }
}

impl fmt::Debug for SubscriptionLog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_active() {
      write!(f, "({}, active)", self.subscribe)
    } else {
      write!(f, "({}, {})", self.subscribe, self.unsubscribe)
    }
  }
}
