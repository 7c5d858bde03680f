use std::sync::Arc;

use smallvec::SmallVec;

use super::{
  subject_core::{Buffer, SubjectCore},
  Subject,
};
use crate::{disposable::AnyDisposable, event::Event, observable::Observable, observer::{AnyObserver, Observer}};

/// Forwards events to the observers attached at emission time and keeps
/// nothing for late subscribers.
///
/// ```rust
/// # use rxcore::prelude::*;
/// let subject = PublishSubject::<i32, ()>::new();
/// subject.on_next(1);
/// subject.clone().subscribe_next(|v| println!("{v}"));
/// subject.on_next(2);
/// // Prints: 2
/// ```
pub struct PublishSubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err, Nothing>>,
}

pub(crate) struct Nothing;

impl<Item, Err> Buffer<Item, Err> for Nothing {
  #[inline]
  fn push(&mut self, _: &Item) -> bool { true }

  #[inline]
  fn replay(&self, _: Option<&Event<Item, Err>>) -> SmallVec<[Item; 1]> { SmallVec::new() }
}

impl<Item, Err> PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub fn new() -> Self { Self { core: SubjectCore::new(Nothing) } }

  /// Number of attached observers.
  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn has_observers(&self) -> bool { self.core.has_observers() }

  /// `true` once an `Error` or `Completed` went through.
  pub fn is_stopped(&self) -> bool { self.core.is_stopped() }
}

impl<Item, Err> Default for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for PublishSubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { self.core.on(event) }
}

impl<Item, Err> Observable for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable { self.core.subscribe(observer) }
}

impl<Item, Err> Subject<Item, Err> for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn has_observers(&self) -> bool { self.core.has_observers() }
}
