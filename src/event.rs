//! The Rx grammar: `Next* (Error | Completed)?`.

use std::fmt;

/// A single notification pushed from an observable to an observer.
///
/// Once an `Error` or `Completed` has been delivered through a subscription,
/// nothing else may be delivered through it.
#[derive(Clone, PartialEq, Eq)]
pub enum Event<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Event<Item, Err> {
  /// `true` for `Error` and `Completed`.
  #[inline]
  pub fn is_stop_event(&self) -> bool { !matches!(self, Event::Next(_)) }

  #[inline]
  pub fn is_completed(&self) -> bool { matches!(self, Event::Completed) }

  #[inline]
  pub fn is_error(&self) -> bool { matches!(self, Event::Error(_)) }

  pub fn next_value(&self) -> Option<&Item> {
    match self {
      Event::Next(v) => Some(v),
      _ => None,
    }
  }

  pub fn into_next(self) -> Option<Item> {
    match self {
      Event::Next(v) => Some(v),
      _ => None,
    }
  }

  pub fn error_value(&self) -> Option<&Err> {
    match self {
      Event::Error(e) => Some(e),
      _ => None,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(Item) -> U) -> Event<U, Err> {
    match self {
      Event::Next(v) => Event::Next(f(v)),
      Event::Error(e) => Event::Error(e),
      Event::Completed => Event::Completed,
    }
  }

  pub fn map_err<E2>(self, f: impl FnOnce(Err) -> E2) -> Event<Item, E2> {
    match self {
      Event::Next(v) => Event::Next(v),
      Event::Error(e) => Event::Error(f(e)),
      Event::Completed => Event::Completed,
    }
  }
}

impl<Item: fmt::Debug, Err: fmt::Debug> fmt::Debug for Event<Item, Err> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Event::Next(v) => write!(f, "next({v:?})"),
      Event::Error(e) => write!(f, "error({e:?})"),
      Event::Completed => f.write_str("completed"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stop_events() {
    assert!(!Event::<i32, ()>::Next(1).is_stop_event());
    assert!(Event::<i32, ()>::Completed.is_stop_event());
    assert!(Event::<i32, &str>::Error("e").is_stop_event());
  }

  #[test]
  fn map_keeps_terminal_events() {
    assert_eq!(Event::<i32, ()>::Next(2).map(|v| v * 10), Event::Next(20));
    assert_eq!(Event::<i32, ()>::Completed.map(|v| v * 10), Event::Completed);
    assert_eq!(Event::<i32, i32>::Error(1).map_err(|e| e + 1), Event::Error(2));
  }

  #[test]
  fn debug_format() {
    assert_eq!(format!("{:?}", Event::<i32, &str>::Next(1)), "next(1)");
    assert_eq!(format!("{:?}", Event::<i32, &str>::Error("x")), "error(\"x\")");
    assert_eq!(format!("{:?}", Event::<i32, &str>::Completed), "completed");
  }
}
