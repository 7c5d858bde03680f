use std::sync::Arc;

use smallvec::SmallVec;

use super::{
  subject_core::{Buffer, SubjectCore},
  Subject,
};
use crate::{disposable::AnyDisposable, event::Event, observable::Observable, observer::{AnyObserver, Observer}};

/// A subject that emits only the last value, and only once the source
/// completes.
///
/// On `Completed`, attached and later subscribers get the last value (if
/// any) followed by `Completed`. On `Error` the value is discarded and only
/// the error goes out.
pub struct AsyncSubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err, Last<Item>>>,
}

pub(crate) struct Last<Item>(Option<Item>);

impl<Item, Err> Buffer<Item, Err> for Last<Item>
where
  Item: Clone + Send + 'static,
{
  fn push(&mut self, value: &Item) -> bool {
    self.0 = Some(value.clone());
    false
  }

  fn replay(&self, stopped: Option<&Event<Item, Err>>) -> SmallVec<[Item; 1]> {
    match (stopped, &self.0) {
      (Some(Event::Completed), Some(last)) => SmallVec::from_elem(last.clone(), 1),
      _ => SmallVec::new(),
    }
  }

  fn terminate(&mut self, terminal: &Event<Item, Err>) -> Option<Item> {
    match terminal {
      Event::Completed => self.0.clone(),
      _ => {
        self.0 = None;
        None
      }
    }
  }
}

impl<Item, Err> AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub fn new() -> Self { Self { core: SubjectCore::new(Last(None)) } }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn has_observers(&self) -> bool { self.core.has_observers() }

  pub fn is_stopped(&self) -> bool { self.core.is_stopped() }
}

impl<Item, Err> Default for AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for AsyncSubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { self.core.on(event) }
}

impl<Item, Err> Observable for AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable { self.core.subscribe(observer) }
}

impl<Item, Err> Subject<Item, Err> for AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn has_observers(&self) -> bool { self.core.has_observers() }
}
