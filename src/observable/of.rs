use std::{array, iter, sync::Arc};

use crate::{
  disposable::{AnyDisposable, BooleanDisposable, Disposables},
  observable::Observable,
  observer::{AnyObserver, ObserverExt, Sink},
  type_hint::TypeHint,
};

/// Creates an observable that produces values from an iterator, then
/// completes.
///
/// The iterator is cloned for every subscriber. Emission stops early if the
/// subscription is disposed from inside a callback.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).subscribe_next(|v| println!("{v},"));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> FromIter<Iter, Err>
where
  Iter: IntoIterator + Clone,
{
  FromIter { iter, _hint: TypeHint::new() }
}

/// Emits the given values in order, then completes.
pub fn of<Item, Err, const N: usize>(values: [Item; N]) -> FromIter<array::IntoIter<Item, N>, Err>
where
  Item: Clone,
{
  from_iter(values.into_iter())
}

/// Emits a single value, then completes.
pub fn just<Item, Err>(value: Item) -> FromIter<iter::Once<Item>, Err>
where
  Item: Clone,
{
  from_iter(iter::once(value))
}

/// Completes immediately without emitting.
pub fn empty<Item, Err>() -> FromIter<iter::Empty<Item>, Err> { from_iter(iter::empty()) }

#[derive(Clone)]
pub struct FromIter<Iter, Err> {
  iter: Iter,
  _hint: TypeHint<Err>,
}

impl<Iter, Err> Observable for FromIter<Iter, Err>
where
  Iter: IntoIterator + Clone + Send + Sync,
  Iter::Item: 'static,
  Err: 'static,
{
  type Item = Iter::Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Iter::Item, Err>) -> AnyDisposable {
    let sink = Arc::new(Sink::new(observer));
    for v in self.iter.clone() {
      if sink.is_closed() {
        return sink;
      }
      sink.on_next(v);
    }
    sink.on_completed();
    sink
  }
}

/// Never emits and never terminates.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(TypeHint::new()) }

#[derive(Clone)]
pub struct Never<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Observable for Never<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, _observer: AnyObserver<Item, Err>) -> AnyDisposable {
    Arc::new(BooleanDisposable::new())
  }
}

/// Terminates immediately with `err`.
pub fn throw_err<Item, Err>(err: Err) -> ThrowErr<Item, Err>
where
  Err: Clone,
{
  ThrowErr { err, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct ThrowErr<Item, Err> {
  err: Err,
  _hint: TypeHint<Item>,
}

impl<Item, Err> Observable for ThrowErr<Item, Err>
where
  Err: Clone + Send + Sync,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable {
    observer.on_error(self.err.clone());
    Disposables::empty()
  }
}
