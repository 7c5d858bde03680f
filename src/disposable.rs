//! Cancellation handles and the containers that compose them into trees.
//!
//! A [`Disposable`] represents a logical subscription or resource. Whoever
//! creates it owns it, but anyone holding it may dispose it, from any thread
//! and any number of times; only the first call has an effect.
//!
//! | Type | Role |
//! |------|------|
//! | [`SingleAssignmentDisposable`] | one inner handle, assigned exactly once |
//! | [`SerialDisposable`] | replaceable inner handle |
//! | [`CompositeDisposable`] | keyed set of handles |
//! | [`RefCountDisposable`] | primary handle released after all children |
//! | [`ScheduledDisposable`] | disposes its inner handle on a scheduler |
//! | [`DisposeBag`] / [`DisposeGuard`] | RAII owners |
//!
//! No container holds its internal lock while disposing a child, so a child
//! that disposes its own parent from inside `dispose` cannot deadlock.
use std::sync::Arc;

mod anonymous;
mod composite;
mod dispose_bag;
mod ref_count;
mod scheduled;
mod serial;
mod single_assignment;

pub use anonymous::*;
pub use composite::*;
pub use dispose_bag::*;
pub use ref_count::*;
pub use scheduled::*;
pub use serial::*;
pub use single_assignment::*;

/// A cancellation/resource-release handle.
pub trait Disposable: Send + Sync {
  /// Release the resource. Idempotent.
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

/// Type-erased, shareable disposable. This is what `subscribe` returns.
pub type AnyDisposable = Arc<dyn Disposable>;

impl<T: Disposable + ?Sized> Disposable for Arc<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// Constructors for the common disposables.
pub struct Disposables;

impl Disposables {
  /// A disposable that does nothing.
  pub fn empty() -> AnyDisposable { Arc::new(NopDisposable) }

  /// Runs `action` on the first `dispose()`.
  pub fn create<F>(action: F) -> AnyDisposable
  where
    F: FnOnce() + Send + 'static,
  {
    Arc::new(AnonymousDisposable::new(action))
  }

  /// Disposes both handles, in order, on the first `dispose()`.
  pub fn create2(first: AnyDisposable, second: AnyDisposable) -> AnyDisposable {
    Arc::new(BinaryDisposable::new(first, second))
  }
}

/// Convenience methods available on every concrete disposable.
pub trait DisposableExt: Disposable + Sized + 'static {
  /// Erase the concrete type.
  fn into_any(self) -> AnyDisposable { Arc::new(self) }

  /// Hand ownership to `bag`; it will be disposed when the bag is.
  fn disposed_by(self, bag: &DisposeBag) { bag.insert(self); }

  /// Activates "RAII" behavior for this disposable: `dispose()` is called as
  /// soon as the returned guard goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `dispose()` is called immediately, which is probably not what you want!
  fn dispose_when_dropped(self) -> DisposeGuard<Self> { DisposeGuard::new(self) }
}

impl<T: Disposable + Sized + 'static> DisposableExt for T {}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  #[test]
  fn create_runs_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let d = Disposables::create(move || {
      c.fetch_add(1, Ordering::SeqCst);
    });
    assert!(!d.is_disposed());
    d.dispose();
    d.dispose();
    assert!(d.is_disposed());
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn create2_disposes_both_in_order() {
    let order = Arc::new(parking_lot::Mutex::new(vec![]));
    let (o1, o2) = (order.clone(), order.clone());
    let d = Disposables::create2(
      Disposables::create(move || o1.lock().push(1)),
      Disposables::create(move || o2.lock().push(2)),
    );
    d.dispose();
    d.dispose();
    assert_eq!(*order.lock(), vec![1, 2]);
  }

  #[test]
  fn arc_and_box_forward() {
    let inner = Arc::new(BooleanDisposable::new());
    let boxed: Box<dyn Disposable> = Box::new(inner.clone());
    boxed.dispose();
    assert!(inner.is_disposed());
  }
}
