use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use parking_lot::Mutex;

use super::{AnyDisposable, Disposable, Disposables};

struct State {
  primary: Option<Box<dyn Disposable>>,
  primary_disposed: bool,
  count: usize,
}

impl State {
  /// Takes the primary out once both conditions hold.
  fn take_if_released(&mut self) -> Option<Box<dyn Disposable>> {
    if self.primary_disposed && self.count == 0 { self.primary.take() } else { None }
  }
}

/// Disposes its primary handle only after `dispose()` was requested and
/// every handle returned by [`retain`](RefCountDisposable::retain) was
/// disposed, in any order.
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::Arc;
///
/// let primary = Arc::new(BooleanDisposable::new());
/// let rc = RefCountDisposable::new(primary.clone());
/// let child = rc.retain();
///
/// rc.dispose();
/// assert!(!primary.is_disposed());
/// child.dispose();
/// assert!(primary.is_disposed());
/// ```
pub struct RefCountDisposable {
  state: Arc<Mutex<State>>,
}

impl RefCountDisposable {
  pub fn new<D: Disposable + 'static>(primary: D) -> Self {
    let state = State { primary: Some(Box::new(primary)), primary_disposed: false, count: 0 };
    Self { state: Arc::new(Mutex::new(state)) }
  }

  /// Take a dependent handle. After the primary has been released this
  /// returns a no-op disposable.
  pub fn retain(&self) -> AnyDisposable {
    let mut state = self.state.lock();
    if state.primary.is_none() {
      return Disposables::empty();
    }
    state.count += 1;
    Arc::new(RefCountChild { parent: self.state.clone(), disposed: AtomicBool::new(false) })
  }
}

impl Disposable for RefCountDisposable {
  fn dispose(&self) {
    let primary = {
      let mut state = self.state.lock();
      if state.primary_disposed {
        return;
      }
      state.primary_disposed = true;
      state.take_if_released()
    };
    if let Some(primary) = primary {
      primary.dispose();
    }
  }

  /// `true` once the primary handle itself has been disposed.
  fn is_disposed(&self) -> bool { self.state.lock().primary.is_none() }
}

struct RefCountChild {
  parent: Arc<Mutex<State>>,
  disposed: AtomicBool,
}

impl Disposable for RefCountChild {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    let primary = {
      let mut state = self.parent.lock();
      state.count = state
        .count
        .checked_sub(1)
        .unwrap_or_else(|| panic!("RefCountDisposable released more often than retained"));
      state.take_if_released()
    };
    if let Some(primary) = primary {
      primary.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
