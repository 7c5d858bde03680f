use parking_lot::Mutex;

use super::Disposable;
use crate::bag::{Bag, BagKey};

/// Key of an entry inside a [`CompositeDisposable`].
pub type DisposeKey = BagKey;

/// A keyed group of disposables, disposed together.
///
/// `None` in the slot means the group has been disposed; an insert that loses
/// the race against `dispose` disposes its argument immediately.
pub struct CompositeDisposable {
  items: Mutex<Option<Bag<Box<dyn Disposable>>>>,
}

impl Default for CompositeDisposable {
  fn default() -> Self { Self { items: Mutex::new(Some(Bag::new())) } }
}

impl CompositeDisposable {
  pub fn new() -> Self { Self::default() }

  /// Track `disposable`. Returns `None`, after disposing it, if this group
  /// was already disposed.
  pub fn insert<D: Disposable + 'static>(&self, disposable: D) -> Option<DisposeKey> {
    let mut items = self.items.lock();
    match items.as_mut() {
      Some(bag) => Some(bag.insert(Box::new(disposable))),
      None => {
        drop(items);
        disposable.dispose();
        None
      }
    }
  }

  /// Stop tracking the entry under `key` and dispose it.
  pub fn remove(&self, key: DisposeKey) {
    let removed = self.items.lock().as_mut().and_then(|bag| bag.remove(key));
    if let Some(removed) = removed {
      removed.dispose();
    }
  }

  /// Number of entries currently tracked. Always 0 once disposed.
  pub fn count(&self) -> usize { self.items.lock().as_ref().map_or(0, Bag::len) }
}

impl Disposable for CompositeDisposable {
  fn dispose(&self) {
    let bag = self.items.lock().take();
    if let Some(mut bag) = bag {
      for item in bag.drain() {
        item.dispose();
      }
    }
  }

  fn is_disposed(&self) -> bool { self.items.lock().is_none() }
}
