//! Process-wide hooks.
//!
//! The only hook today is the default error handler: the sink for stream
//! errors that reach a subscription without an error callback. The handler
//! is read at delivery time, so replacing it affects every error delivered
//! afterwards, while subscriptions that carry their own error callback never
//! consult it.

use std::{any::type_name, fmt, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// An error that no subscriber handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnhandledError {
  /// Rust type name of the stream's error type.
  pub type_name: &'static str,
  /// `Debug` rendering of the error value.
  pub message: String,
}

impl UnhandledError {
  pub fn new<E: fmt::Debug>(err: &E) -> Self {
    Self { type_name: type_name::<E>(), message: format!("{err:?}") }
  }
}

impl fmt::Display for UnhandledError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "unhandled stream error ({}): {}", self.type_name, self.message)
  }
}

pub type ErrorHandler = Arc<dyn Fn(&UnhandledError) + Send + Sync>;

static DEFAULT_ERROR_HANDLER: Lazy<RwLock<ErrorHandler>> =
  Lazy::new(|| RwLock::new(Arc::new(log_unhandled)));

fn log_unhandled(err: &UnhandledError) {
  tracing::error!(error_type = err.type_name, message = %err.message, "unhandled stream error");
}

/// Replace the process-wide default error handler.
pub fn set_default_error_handler<F>(handler: F)
where
  F: Fn(&UnhandledError) + Send + Sync + 'static,
{
  *DEFAULT_ERROR_HANDLER.write() = Arc::new(handler);
}

/// Restore the built-in handler, which logs through `tracing`.
pub fn reset_default_error_handler() { *DEFAULT_ERROR_HANDLER.write() = Arc::new(log_unhandled); }

/// The handler currently installed.
pub fn default_error_handler() -> ErrorHandler { DEFAULT_ERROR_HANDLER.read().clone() }

/// Hand an unhandled error to the current default handler.
///
/// The handler is cloned out of the slot first, so a handler may itself
/// replace the hook without deadlocking.
pub(crate) fn report_unhandled<E: fmt::Debug>(err: &E) {
  let handler = default_error_handler();
  handler(&UnhandledError::new(err));
}
