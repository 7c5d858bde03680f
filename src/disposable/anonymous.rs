use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{AnyDisposable, Disposable};

/// Runs a closure on the first `dispose()`.
pub struct AnonymousDisposable {
  disposed: AtomicBool,
  action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl AnonymousDisposable {
  pub fn new<F>(action: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    Self { disposed: AtomicBool::new(false), action: Mutex::new(Some(Box::new(action))) }
  }
}

impl Disposable for AnonymousDisposable {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    let action = self.action.lock().take();
    if let Some(action) = action {
      action();
    }
  }

  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

/// A flag that can be read after being disposed.
#[derive(Default)]
pub struct BooleanDisposable(AtomicBool);

impl BooleanDisposable {
  pub fn new() -> Self { Self::default() }

  /// A disposable that is already disposed.
  pub fn disposed() -> Self { Self(AtomicBool::new(true)) }
}

impl Disposable for BooleanDisposable {
  #[inline]
  fn dispose(&self) { self.0.store(true, Ordering::Release); }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.load(Ordering::Acquire) }
}

/// Does nothing. Always reports itself as disposed.
#[derive(Clone, Copy, Default, Debug)]
pub struct NopDisposable;

impl Disposable for NopDisposable {
  #[inline]
  fn dispose(&self) {}

  #[inline]
  fn is_disposed(&self) -> bool { true }
}

/// Owns two handles and disposes both, first then second.
pub struct BinaryDisposable {
  disposed: AtomicBool,
  pair: Mutex<Option<(AnyDisposable, AnyDisposable)>>,
}

impl BinaryDisposable {
  pub fn new(first: AnyDisposable, second: AnyDisposable) -> Self {
    Self { disposed: AtomicBool::new(false), pair: Mutex::new(Some((first, second))) }
  }
}

impl Disposable for BinaryDisposable {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    let pair = self.pair.lock().take();
    if let Some((first, second)) = pair {
      first.dispose();
      second.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
