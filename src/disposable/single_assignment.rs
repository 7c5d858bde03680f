use parking_lot::Mutex;

use super::Disposable;

enum State {
  Empty,
  Assigned(Box<dyn Disposable>),
  /// Disposed before anything was assigned.
  DisposedEmpty,
  /// Disposed and assigned, in either order.
  Done,
}

/// Holds at most one inner disposable, assigned exactly once.
///
/// Disposing before assignment makes the eventual assignment dispose the
/// inner handle immediately. Assigning twice is a contract violation and
/// panics.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let holder = SingleAssignmentDisposable::new();
/// holder.dispose();
///
/// let inner = std::sync::Arc::new(BooleanDisposable::new());
/// holder.set(inner.clone());
/// assert!(inner.is_disposed());
/// ```
pub struct SingleAssignmentDisposable {
  state: Mutex<State>,
}

impl Default for SingleAssignmentDisposable {
  fn default() -> Self { Self { state: Mutex::new(State::Empty) } }
}

impl SingleAssignmentDisposable {
  pub fn new() -> Self { Self::default() }

  /// Assign the inner disposable.
  ///
  /// # Panics
  ///
  /// Panics if a disposable was already assigned.
  pub fn set<D: Disposable + 'static>(&self, disposable: D) {
    let mut state = self.state.lock();
    match std::mem::replace(&mut *state, State::Done) {
      State::Empty => *state = State::Assigned(Box::new(disposable)),
      State::DisposedEmpty => {
        drop(state);
        disposable.dispose();
      }
      prev @ (State::Assigned(_) | State::Done) => {
        *state = prev;
        drop(state);
        panic!("SingleAssignmentDisposable::set called more than once");
      }
    }
  }

  /// `true` once `set` has been called.
  pub fn is_assigned(&self) -> bool { matches!(&*self.state.lock(), State::Assigned(_) | State::Done) }
}

impl Disposable for SingleAssignmentDisposable {
  fn dispose(&self) {
    let inner = {
      let mut state = self.state.lock();
      match std::mem::replace(&mut *state, State::Done) {
        State::Empty => {
          *state = State::DisposedEmpty;
          None
        }
        State::Assigned(inner) => Some(inner),
        State::DisposedEmpty => {
          *state = State::DisposedEmpty;
          None
        }
        State::Done => None,
      }
    };
    if let Some(inner) = inner {
      inner.dispose();
    }
  }

  fn is_disposed(&self) -> bool {
    matches!(&*self.state.lock(), State::DisposedEmpty | State::Done)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;
  use crate::disposable::{BooleanDisposable, Disposables};

  #[test]
  fn set_then_dispose() {
    let holder = SingleAssignmentDisposable::new();
    let inner = Arc::new(BooleanDisposable::new());
    holder.set(inner.clone());
    assert!(holder.is_assigned());
    assert!(!inner.is_disposed());
    holder.dispose();
    assert!(inner.is_disposed());
    assert!(holder.is_disposed());
  }

  #[test]
  fn dispose_then_set_disposes_on_assignment() {
    let holder = SingleAssignmentDisposable::new();
    holder.dispose();
    assert!(holder.is_disposed());
    assert!(!holder.is_assigned());
    let inner = Arc::new(BooleanDisposable::new());
    holder.set(inner.clone());
    assert!(inner.is_disposed());
  }

  #[test]
  fn repeated_dispose_runs_inner_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let holder = SingleAssignmentDisposable::new();
    holder.set(Disposables::create(move || {
      c.fetch_add(1, Ordering::SeqCst);
    }));
    for _ in 0..3 {
      holder.dispose();
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  #[should_panic(expected = "called more than once")]
  fn double_assignment_panics() {
    let holder = SingleAssignmentDisposable::new();
    holder.set(Disposables::empty());
    holder.set(Disposables::empty());
  }

  #[test]
  #[should_panic(expected = "called more than once")]
  fn double_assignment_after_dispose_panics() {
    let holder = SingleAssignmentDisposable::new();
    holder.dispose();
    holder.set(Disposables::empty());
    holder.set(Disposables::empty());
  }
}
