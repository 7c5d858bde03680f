use std::{collections::VecDeque, sync::Arc};

use smallvec::SmallVec;

use super::{
  subject_core::{Buffer, SubjectCore},
  Subject,
};
use crate::{disposable::AnyDisposable, event::Event, observable::Observable, observer::{AnyObserver, Observer}};

/// A subject that replays buffered values to every new subscriber, in
/// arrival order, before live events.
///
/// A terminated replay subject still replays its buffer, followed by the
/// terminal event.
pub struct ReplaySubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err, History<Item>>>,
}

pub(crate) struct History<Item> {
  values: VecDeque<Item>,
  capacity: Option<usize>,
}

impl<Item, Err> Buffer<Item, Err> for History<Item>
where
  Item: Clone + Send + 'static,
{
  fn push(&mut self, value: &Item) -> bool {
    match self.capacity {
      Some(0) => {}
      Some(capacity) => {
        if self.values.len() == capacity {
          self.values.pop_front();
        }
        self.values.push_back(value.clone());
      }
      None => self.values.push_back(value.clone()),
    }
    true
  }

  fn replay(&self, _: Option<&Event<Item, Err>>) -> SmallVec<[Item; 1]> { self.values.iter().cloned().collect() }
}

impl<Item, Err> ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  /// Keep the last `buffer_size` values.
  pub fn with_buffer_size(buffer_size: usize) -> Self {
    let history = History { values: VecDeque::with_capacity(buffer_size.min(64)), capacity: Some(buffer_size) };
    Self { core: SubjectCore::new(history) }
  }

  /// Keep every value.
  pub fn unbounded() -> Self {
    Self { core: SubjectCore::new(History { values: VecDeque::new(), capacity: None }) }
  }

  /// The values a new subscriber would receive.
  pub fn buffered(&self) -> Vec<Item> { self.core.inspect(|history, _| history.values.iter().cloned().collect()) }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn has_observers(&self) -> bool { self.core.has_observers() }

  pub fn is_stopped(&self) -> bool { self.core.is_stopped() }
}

impl<Item, Err> Clone for ReplaySubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { self.core.on(event) }
}

impl<Item, Err> Observable for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable { self.core.subscribe(observer) }
}

impl<Item, Err> Subject<Item, Err> for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn has_observers(&self) -> bool { self.core.has_observers() }
}
