//! Observers: the receiving end of a subscription.
//!
//! An observer has a single entry point, [`Observer::on`], which receives
//! every [`Event`]. Closures are adapted with [`FnObserver`] (one closure for
//! all events) or [`CallbackObserver`] (one closure per event kind).

use std::{
  fmt::Debug,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::ReentrantMutex;

use crate::{disposable::Disposable, event::Event, hooks};

/// Receives the events of one or more subscriptions.
///
/// Implementations must not panic from `on`.
pub trait Observer<Item, Err>: Send + Sync {
  fn on(&self, event: Event<Item, Err>);
}

/// Type-erased, shareable observer.
pub type AnyObserver<Item, Err> = Arc<dyn Observer<Item, Err>>;

impl<Item, Err, T> Observer<Item, Err> for Arc<T>
where
  T: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { (**self).on(event) }
}

impl<Item, Err, T> Observer<Item, Err> for Box<T>
where
  T: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { (**self).on(event) }
}

/// Shorthands for sending a single kind of event.
pub trait ObserverExt<Item, Err>: Observer<Item, Err> {
  #[inline]
  fn on_next(&self, value: Item) { self.on(Event::Next(value)) }

  #[inline]
  fn on_error(&self, err: Err) { self.on(Event::Error(err)) }

  #[inline]
  fn on_completed(&self) { self.on(Event::Completed) }
}

impl<Item, Err, T: Observer<Item, Err> + ?Sized> ObserverExt<Item, Err> for T {}

/// Adapts a closure taking whole events.
pub struct FnObserver<F>(F);

impl<F> FnObserver<F> {
  pub fn new<Item, Err>(f: F) -> Self
  where
    F: Fn(Event<Item, Err>) + Send + Sync,
  {
    Self(f)
  }
}

impl<Item, Err, F> Observer<Item, Err> for FnObserver<F>
where
  F: Fn(Event<Item, Err>) + Send + Sync,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { (self.0)(event) }
}

type NextFn<Item> = Box<dyn Fn(Item) + Send + Sync>;
type ErrFn<Err> = Box<dyn Fn(Err) + Send + Sync>;
type UnitFn = Box<dyn Fn() + Send + Sync>;

/// An observer built from one callback per event kind.
///
/// When no error callback is given, errors are handed to the process-wide
/// default error handler (see [`hooks`]).
pub struct CallbackObserver<Item, Err> {
  next: NextFn<Item>,
  error: ErrFn<Err>,
  completed: Option<UnitFn>,
}

impl<Item, Err> CallbackObserver<Item, Err> {
  /// Handle values only; errors go to the default error handler.
  pub fn next<N>(next: N) -> Self
  where
    N: Fn(Item) + Send + Sync + 'static,
    Err: Debug,
  {
    Self {
      next: Box::new(next),
      error: Box::new(|err: Err| hooks::report_unhandled(&err)),
      completed: None,
    }
  }

  pub fn new<N, E, C>(next: N, error: E, completed: C) -> Self
  where
    N: Fn(Item) + Send + Sync + 'static,
    E: Fn(Err) + Send + Sync + 'static,
    C: Fn() + Send + Sync + 'static,
  {
    Self { next: Box::new(next), error: Box::new(error), completed: Some(Box::new(completed)) }
  }

  pub fn with_error<N, E>(next: N, error: E) -> Self
  where
    N: Fn(Item) + Send + Sync + 'static,
    E: Fn(Err) + Send + Sync + 'static,
  {
    Self { next: Box::new(next), error: Box::new(error), completed: None }
  }

  /// Replace the completion callback.
  pub fn on_completed_do<C>(mut self, completed: C) -> Self
  where
    C: Fn() + Send + Sync + 'static,
  {
    self.completed = Some(Box::new(completed));
    self
  }
}

impl<Item, Err> Observer<Item, Err> for CallbackObserver<Item, Err> {
  fn on(&self, event: Event<Item, Err>) {
    match event {
      Event::Next(v) => (self.next)(v),
      Event::Error(e) => (self.error)(e),
      Event::Completed => {
        if let Some(completed) = &self.completed {
          completed()
        }
      }
    }
  }
}

/// Enforces the event grammar in front of a downstream observer.
///
/// A sink drops everything after the first terminal event and everything
/// after it has been disposed. Concurrent producers are serialized through a
/// reentrant gate, so a downstream handler may synchronously re-enter the
/// sink from the same thread (for instance to dispose it) without
/// deadlocking.
pub struct Sink<Item, Err> {
  observer: AnyObserver<Item, Err>,
  stopped: AtomicBool,
  disposed: AtomicBool,
  gate: ReentrantMutex<()>,
}

impl<Item, Err> Sink<Item, Err> {
  pub fn new(observer: AnyObserver<Item, Err>) -> Self {
    Self {
      observer,
      stopped: AtomicBool::new(false),
      disposed: AtomicBool::new(false),
      gate: ReentrantMutex::new(()),
    }
  }

  /// `true` once a terminal event went through or the sink was disposed.
  #[inline]
  pub fn is_closed(&self) -> bool {
    self.stopped.load(Ordering::Acquire) || self.disposed.load(Ordering::Acquire)
  }
}

impl<Item, Err> Observer<Item, Err> for Sink<Item, Err> {
  fn on(&self, event: Event<Item, Err>) {
    if self.is_closed() {
      return;
    }
    let _gate = self.gate.lock();
    if self.disposed.load(Ordering::Acquire) {
      return;
    }
    if event.is_stop_event() {
      if self.stopped.swap(true, Ordering::AcqRel) {
        return;
      }
    } else if self.stopped.load(Ordering::Acquire) {
      return;
    }
    self.observer.on(event);
  }
}

impl<Item, Err> Disposable for Sink<Item, Err> {
  #[inline]
  fn dispose(&self) { self.disposed.store(true, Ordering::Release); }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
