use smallvec::SmallVec;

/// Key returned by [`Bag::insert`], used to remove the same entry later.
///
/// Keys are never reused by a bag, so a stale key held by a late disposer can
/// never remove an entry inserted after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BagKey(u64);

/// A small keyed container with insertion-ordered iteration.
///
/// This is the storage behind subject observer sets and
/// [`CompositeDisposable`](crate::disposable::CompositeDisposable).
///
/// # Design
///
/// - **SmallVec Optimization**: the common case of 0-2 entries does not touch
///   the heap.
/// - **Monotonic keys**: removal by key is `O(n)`, which is fine for the
///   handful of observers a subject usually holds.
///
/// # Examples
///
/// ```rust
/// use rxcore::bag::Bag;
///
/// let mut bag = Bag::default();
/// let a = bag.insert("a");
/// let _b = bag.insert("b");
/// assert_eq!(bag.len(), 2);
///
/// assert_eq!(bag.remove(a), Some("a"));
/// assert_eq!(bag.iter().copied().collect::<Vec<_>>(), vec!["b"]);
/// ```
pub struct Bag<T> {
  next_key: u64,
  items: SmallVec<[(BagKey, T); 2]>,
}

impl<T> Default for Bag<T> {
  fn default() -> Self { Self { next_key: 0, items: SmallVec::new() } }
}

impl<T> Bag<T> {
  /// Create an empty bag.
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Insert an item and return its unique key.
  #[inline]
  pub fn insert(&mut self, item: T) -> BagKey {
    let key = BagKey(self.next_key);
    self.next_key += 1;
    self.items.push((key, item));
    key
  }

  /// Remove an item by key.
  pub fn remove(&mut self, key: BagKey) -> Option<T> {
    self
      .items
      .iter()
      .position(|(k, _)| *k == key)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, key: BagKey) -> bool { self.items.iter().any(|(k, _)| *k == key) }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Remove every item, yielding them in insertion order.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &T> { self.items.iter().map(|(_, item)| item) }
}

impl<T: Clone> Bag<T> {
  /// Clone every item out of the bag, so the caller can release its lock
  /// before touching them.
  pub fn snapshot(&self) -> SmallVec<[T; 2]> { self.iter().cloned().collect() }
}
