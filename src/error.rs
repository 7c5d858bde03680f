//! Library-level errors.
//!
//! Stream errors travel through [`Event::Error`](crate::event::Event) with
//! whatever error type the stream chooses. `RxError` covers the few fallible
//! library APIs and doubles as a ready-made stream error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RxError {
  /// The worker pool behind a concurrent scheduler could not be created.
  #[error("failed to build scheduler thread pool: {0}")]
  ThreadPool(#[from] std::io::Error),

  /// A builder received an unusable value.
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("{0}")]
  Unknown(String),
}

impl Clone for RxError {
  fn clone(&self) -> Self {
    match self {
      // io::Error is not Clone; keep kind and message.
      RxError::ThreadPool(e) => RxError::ThreadPool(std::io::Error::new(e.kind(), e.to_string())),
      RxError::InvalidConfig(s) => RxError::InvalidConfig(s.clone()),
      RxError::Unknown(s) => RxError::Unknown(s.clone()),
    }
  }
}

impl PartialEq for RxError {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (RxError::ThreadPool(a), RxError::ThreadPool(b)) => a.kind() == b.kind(),
      (RxError::InvalidConfig(a), RxError::InvalidConfig(b)) => a == b,
      (RxError::Unknown(a), RxError::Unknown(b)) => a == b,
      _ => false,
    }
  }
}

impl RxError {
  pub fn unknown(msg: impl Into<String>) -> Self { RxError::Unknown(msg.into()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_and_clone() {
    let err = RxError::unknown("boom");
    assert_eq!(err.to_string(), "boom");
    assert_eq!(err.clone(), err);

    let io = RxError::from(std::io::Error::other("no threads"));
    assert_eq!(io.to_string(), "failed to build scheduler thread pool: no threads");
    assert_eq!(io.clone(), io);
  }
}
