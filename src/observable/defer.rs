use crate::{disposable::AnyDisposable, observable::Observable, observer::AnyObserver};

/// Creates an observable that, on each subscription, calls `factory` and
/// subscribes to the observable it returns.
///
/// ```rust
/// # use rxcore::prelude::*;
///
/// observable::defer(|| {
///   println!("Hi!");
///   observable::just::<_, ()>("Hello!")
/// })
/// .subscribe_next(move |v| println!("{v}"));
/// // Prints: Hi!\nHello!\n
/// ```
pub fn defer<F, O>(factory: F) -> Defer<F>
where
  F: Fn() -> O + Send + Sync,
  O: Observable,
{
  Defer(factory)
}

#[derive(Clone)]
pub struct Defer<F>(F);

impl<F, O> Observable for Defer<F>
where
  F: Fn() -> O + Send + Sync,
  O: Observable,
{
  type Item = O::Item;
  type Err = O::Err;

  fn subscribe(&self, observer: AnyObserver<O::Item, O::Err>) -> AnyDisposable {
    (self.0)().subscribe(observer)
  }
}
