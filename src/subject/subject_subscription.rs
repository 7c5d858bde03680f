use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc, Weak,
};

use crate::{bag::BagKey, disposable::Disposable};

/// Detaches an observer from whatever it was attached to.
pub(crate) trait ObserverRemover: Send + Sync {
  fn remove(&self, key: BagKey);
}

/// Subscription handle for a subject.
///
/// Disposing it detaches the observer from the subject. The subject is only
/// referenced weakly, so a handle that outlives its subject does nothing.
pub struct SubjectSubscription {
  remover: Weak<dyn ObserverRemover>,
  key: BagKey,
  disposed: Arc<AtomicBool>,
}

impl SubjectSubscription {
  pub(crate) fn new(remover: Weak<dyn ObserverRemover>, key: BagKey, disposed: Arc<AtomicBool>) -> Self {
    Self { remover, key, disposed }
  }
}

impl Disposable for SubjectSubscription {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    if let Some(remover) = self.remover.upgrade() {
      remover.remove(self.key);
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
