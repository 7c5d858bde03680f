use parking_lot::Mutex;

use super::Disposable;

/// Owns a set of disposables and disposes them all when dropped.
///
/// Useful to tie the lifetime of a group of subscriptions to the lifetime of
/// an owning value.
pub struct DisposeBag {
  items: Mutex<Option<Vec<Box<dyn Disposable>>>>,
}

impl Default for DisposeBag {
  fn default() -> Self { Self { items: Mutex::new(Some(Vec::new())) } }
}

impl DisposeBag {
  pub fn new() -> Self { Self::default() }

  /// Add a disposable. Disposed immediately if the bag was already disposed.
  pub fn insert<D: Disposable + 'static>(&self, disposable: D) {
    let mut items = self.items.lock();
    match items.as_mut() {
      Some(items) => items.push(Box::new(disposable)),
      None => {
        drop(items);
        disposable.dispose();
      }
    }
  }

  pub fn len(&self) -> usize { self.items.lock().as_ref().map_or(0, Vec::len) }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Disposable for DisposeBag {
  fn dispose(&self) {
    let items = self.items.lock().take();
    for item in items.into_iter().flatten() {
      item.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.items.lock().is_none() }
}

impl Drop for DisposeBag {
  fn drop(&mut self) { self.dispose() }
}

/// An RAII implementation of a "scoped subscription". When this structure is
/// dropped (falls out of scope), the inner disposable will be disposed.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[derive(Debug)]
#[must_use]
pub struct DisposeGuard<T: Disposable>(pub(crate) T);

impl<T: Disposable> DisposeGuard<T> {
  /// Wraps an existing disposable with a guard to enable RAII behavior for
  /// it.
  pub fn new(disposable: T) -> DisposeGuard<T> { DisposeGuard(disposable) }

  #[inline]
  pub fn get_ref(&self) -> &T { &self.0 }
}

impl<T: Disposable> Drop for DisposeGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.dispose() }
}
