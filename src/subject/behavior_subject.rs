use std::sync::Arc;

use smallvec::{smallvec, SmallVec};

use super::{
  subject_core::{Buffer, SubjectCore},
  Subject,
};
use crate::{disposable::AnyDisposable, event::Event, observable::Observable, observer::{AnyObserver, Observer}};

/// A subject that always holds a current value.
///
/// A subscriber first receives the current value, then every later one.
/// After termination, subscribers only receive the terminal event.
pub struct BehaviorSubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err, Current<Item>>>,
}

pub(crate) struct Current<Item>(Item);

impl<Item, Err> Buffer<Item, Err> for Current<Item>
where
  Item: Clone + Send + 'static,
{
  #[inline]
  fn push(&mut self, value: &Item) -> bool {
    self.0 = value.clone();
    true
  }

  fn replay(&self, stopped: Option<&Event<Item, Err>>) -> SmallVec<[Item; 1]> {
    match stopped {
      None => smallvec![self.0.clone()],
      Some(_) => SmallVec::new(),
    }
  }
}

impl<Item, Err> BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub fn new(initial: Item) -> Self { Self { core: SubjectCore::new(Current(initial)) } }

  /// The latest value, or the error the subject terminated with.
  pub fn value(&self) -> Result<Item, Err> {
    self.core.inspect(|current, stopped| match stopped {
      Some(Event::Error(err)) => Err(err.clone()),
      _ => Ok(current.0.clone()),
    })
  }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn has_observers(&self) -> bool { self.core.has_observers() }

  pub fn is_stopped(&self) -> bool { self.core.is_stopped() }
}

impl<Item, Err> Default for BehaviorSubject<Item, Err>
where
  Item: Clone + Default + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn default() -> Self { Self::new(Item::default()) }
}

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { self.core.on(event) }
}

impl<Item, Err> Observable for BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable { self.core.subscribe(observer) }
}

impl<Item, Err> Subject<Item, Err> for BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn has_observers(&self) -> bool { self.core.has_observers() }
}
