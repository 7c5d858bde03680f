use std::sync::atomic::{AtomicBool, Ordering};

use super::{AnyDisposable, Disposable};
use crate::scheduler::AnyScheduler;

/// Disposes its inner handle on `scheduler` instead of on the caller.
pub struct ScheduledDisposable {
  scheduler: AnyScheduler,
  inner: AnyDisposable,
  disposed: AtomicBool,
}

impl ScheduledDisposable {
  pub fn new(scheduler: AnyScheduler, inner: AnyDisposable) -> Self {
    Self { scheduler, inner, disposed: AtomicBool::new(false) }
  }

  #[inline]
  pub fn scheduler(&self) -> &AnyScheduler { &self.scheduler }
}

impl Disposable for ScheduledDisposable {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    let inner = self.inner.clone();
    // The returned handle only cancels the dispose itself, nothing to keep.
    let _ = self.scheduler.schedule_action(Box::new(move || inner.dispose()));
  }

  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
