use parking_lot::Mutex;

use super::Disposable;

struct Inner {
  disposed: bool,
  current: Option<Box<dyn Disposable>>,
}

/// A disposable whose inner handle can be replaced.
///
/// Each assignment disposes the previous inner handle. Once the serial
/// disposable itself is disposed, every later assignment is disposed on the
/// spot.
pub struct SerialDisposable {
  inner: Mutex<Inner>,
}

impl Default for SerialDisposable {
  fn default() -> Self { Self { inner: Mutex::new(Inner { disposed: false, current: None }) } }
}

impl SerialDisposable {
  pub fn new() -> Self { Self::default() }

  /// Replace the inner handle, disposing the one it replaces.
  pub fn set<D: Disposable + 'static>(&self, disposable: D) {
    let mut inner = self.inner.lock();
    if inner.disposed {
      drop(inner);
      disposable.dispose();
      return;
    }
    let old = inner.current.replace(Box::new(disposable));
    drop(inner);
    if let Some(old) = old {
      old.dispose();
    }
  }

  /// Dispose the current inner handle and leave the slot empty.
  pub fn clear(&self) {
    let old = self.inner.lock().current.take();
    if let Some(old) = old {
      old.dispose();
    }
  }
}

impl Disposable for SerialDisposable {
  fn dispose(&self) {
    let current = {
      let mut inner = self.inner.lock();
      if inner.disposed {
        return;
      }
      inner.disposed = true;
      inner.current.take()
    };
    if let Some(current) = current {
      current.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.inner.lock().disposed }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::disposable::BooleanDisposable;

  #[test]
  fn assignment_disposes_previous() {
    let serial = SerialDisposable::new();
    let first = Arc::new(BooleanDisposable::new());
    let second = Arc::new(BooleanDisposable::new());
    serial.set(first.clone());
    serial.set(second.clone());
    assert!(first.is_disposed());
    assert!(!second.is_disposed());

    serial.dispose();
    assert!(second.is_disposed());
    assert!(serial.is_disposed());
  }

  #[test]
  fn assignment_after_dispose_is_disposed() {
    let serial = SerialDisposable::new();
    serial.dispose();
    let late = Arc::new(BooleanDisposable::new());
    serial.set(late.clone());
    assert!(late.is_disposed());
  }

  #[test]
  fn clear_keeps_the_container_live() {
    let serial = SerialDisposable::new();
    let first = Arc::new(BooleanDisposable::new());
    serial.set(first.clone());
    serial.clear();
    assert!(first.is_disposed());
    assert!(!serial.is_disposed());

    let second = Arc::new(BooleanDisposable::new());
    serial.set(second.clone());
    assert!(!second.is_disposed());
  }
}
