//! Observables: the producing end of a subscription.
//!
//! [`Observable::subscribe`] attaches an observer and returns the disposable
//! that cancels the subscription. Everything else (creation functions,
//! operators, multicasting) is layered on top of that single method.

use std::{fmt::Debug, sync::Arc};

use crate::{
  disposable::AnyDisposable,
  observer::{AnyObserver, CallbackObserver, Observer},
  ops::{
    catch::{Catch, CatchAndReturn},
    observe_on::ObserveOn,
    retry::{Retry, RetryForever, RetryPolicy},
    share::{Share, SubjectLifetimeScope},
    subscribe_on::SubscribeOn,
  },
  scheduler::Scheduler,
  subject::{PublishSubject, ReplaySubject, Subject},
};

mod connectable;
mod create;
mod defer;
mod interval;
mod of;

pub use connectable::*;
pub use create::*;
pub use defer::*;
pub use interval::*;
pub use of::*;

/// A push-based source of events.
pub trait Observable: Send + Sync {
  type Item;
  type Err;

  /// Start delivering events to `observer`. Disposing the returned handle
  /// stops delivery and releases the subscription's resources.
  fn subscribe(&self, observer: AnyObserver<Self::Item, Self::Err>) -> AnyDisposable;
}

/// Type-erased, shareable observable.
pub type BoxedObservable<Item, Err> = Arc<dyn Observable<Item = Item, Err = Err>>;

impl<T: Observable + ?Sized> Observable for Arc<T> {
  type Item = T::Item;
  type Err = T::Err;

  #[inline]
  fn subscribe(&self, observer: AnyObserver<Self::Item, Self::Err>) -> AnyDisposable {
    (**self).subscribe(observer)
  }
}

/// Subscription helpers and operators available on every observable.
pub trait ObservableExt: Observable + Sized {
  /// Erase the concrete type.
  fn boxed(self) -> BoxedObservable<Self::Item, Self::Err>
  where
    Self: 'static,
  {
    Arc::new(self)
  }

  fn subscribe_with<O>(&self, observer: O) -> AnyDisposable
  where
    O: Observer<Self::Item, Self::Err> + 'static,
  {
    self.subscribe(Arc::new(observer))
  }

  /// Subscribe with a value callback only. Errors go to the default error
  /// handler.
  fn subscribe_next<N>(&self, next: N) -> AnyDisposable
  where
    N: Fn(Self::Item) + Send + Sync + 'static,
    Self::Item: 'static,
    Self::Err: Debug + 'static,
  {
    self.subscribe(Arc::new(CallbackObserver::next(next)))
  }

  fn subscribe_err<N, E>(&self, next: N, error: E) -> AnyDisposable
  where
    N: Fn(Self::Item) + Send + Sync + 'static,
    E: Fn(Self::Err) + Send + Sync + 'static,
    Self::Item: 'static,
    Self::Err: 'static,
  {
    self.subscribe(Arc::new(CallbackObserver::with_error(next, error)))
  }

  fn subscribe_all<N, E, C>(&self, next: N, error: E, completed: C) -> AnyDisposable
  where
    N: Fn(Self::Item) + Send + Sync + 'static,
    E: Fn(Self::Err) + Send + Sync + 'static,
    C: Fn() + Send + Sync + 'static,
    Self::Item: 'static,
    Self::Err: 'static,
  {
    self.subscribe(Arc::new(CallbackObserver::new(next, error, completed)))
  }

  /// Deliver events on `scheduler`.
  fn observe_on<S>(self, scheduler: S) -> ObserveOn<Self>
  where
    S: Scheduler + 'static,
  {
    ObserveOn::new(self, Arc::new(scheduler))
  }

  /// Subscribe to, and dispose, the source on `scheduler`.
  fn subscribe_on<S>(self, scheduler: S) -> SubscribeOn<Self>
  where
    S: Scheduler + 'static,
  {
    SubscribeOn::new(self, Arc::new(scheduler))
  }

  /// On error, continue with the observable returned by `handler`.
  fn catch_error<F, R>(self, handler: F) -> Catch<Self, F>
  where
    F: Fn(Self::Err) -> R + Send + Sync + 'static,
    R: Observable<Item = Self::Item, Err = Self::Err> + 'static,
  {
    Catch::new(self, handler)
  }

  /// On error, emit `value` and complete.
  fn catch_and_return(self, value: Self::Item) -> CatchAndReturn<Self>
  where
    Self::Item: Clone + Send + Sync,
  {
    CatchAndReturn::new(self, value)
  }

  /// Resubscribe on error as long as `policy` allows. A plain count is the
  /// number of retries after the first failure.
  fn retry<P>(self, policy: P) -> Retry<Self, P>
  where
    P: RetryPolicy<Self::Err>,
  {
    Retry::new(self, policy)
  }

  /// Resubscribe on every error.
  fn retry_forever(self) -> Retry<Self, RetryForever> { Retry::new(self, RetryForever) }

  /// Multicast through `subject`, which is kept for every connection.
  fn multicast<S>(self, subject: S) -> ConnectableObservable<Self, S>
  where
    Self: 'static,
    Self::Item: 'static,
    Self::Err: 'static,
    S: Subject<Self::Item, Self::Err> + Clone + 'static,
  {
    ConnectableObservable::new(self, subject)
  }

  /// Multicast through a subject produced by `factory`; a fresh subject is
  /// created for every connection.
  fn multicast_with<S, F>(self, factory: F) -> ConnectableObservable<Self, S>
  where
    Self: 'static,
    Self::Item: 'static,
    Self::Err: 'static,
    S: Subject<Self::Item, Self::Err> + Clone + 'static,
    F: Fn() -> S + Send + Sync + 'static,
  {
    ConnectableObservable::with_factory(self, factory)
  }

  /// Multicast through a [`PublishSubject`].
  fn publish(self) -> ConnectableObservable<Self, PublishSubject<Self::Item, Self::Err>>
  where
    Self: 'static,
    Self::Item: Clone + Send + 'static,
    Self::Err: Clone + Send + 'static,
  {
    self.multicast(PublishSubject::new())
  }

  /// Multicast through a [`ReplaySubject`] that keeps the last `buffer_size`
  /// values.
  fn replay(self, buffer_size: usize) -> ConnectableObservable<Self, ReplaySubject<Self::Item, Self::Err>>
  where
    Self: 'static,
    Self::Item: Clone + Send + 'static,
    Self::Err: Clone + Send + 'static,
  {
    self.multicast(ReplaySubject::with_buffer_size(buffer_size))
  }

  /// Multicast through an unbounded [`ReplaySubject`].
  fn replay_all(self) -> ConnectableObservable<Self, ReplaySubject<Self::Item, Self::Err>>
  where
    Self: 'static,
    Self::Item: Clone + Send + 'static,
    Self::Err: Clone + Send + 'static,
  {
    self.multicast(ReplaySubject::unbounded())
  }

  /// `share_replay(0, SubjectLifetimeScope::WhileConnected)`.
  fn share(self) -> Share<Self>
  where
    Self: 'static,
    Self::Item: Clone + Send + Sync + 'static,
    Self::Err: Clone + Send + Sync + 'static,
  {
    self.share_replay(0, SubjectLifetimeScope::WhileConnected)
  }

  /// Share one upstream subscription among all subscribers, replaying the
  /// last `replay` values to late subscribers.
  fn share_replay(self, replay: usize, scope: SubjectLifetimeScope) -> Share<Self>
  where
    Self: 'static,
    Self::Item: Clone + Send + Sync + 'static,
    Self::Err: Clone + Send + Sync + 'static,
  {
    crate::ops::share::share_replay(self, replay, scope)
  }
}

impl<T: Observable + Sized> ObservableExt for T {}
