use std::sync::Arc;

use crate::{
  disposable::{AnyDisposable, Disposables},
  observable::Observable,
  observer::{AnyObserver, Sink},
  type_hint::TypeHint,
};

/// Creates an observable from a subscribe function.
///
/// `subscribe` runs once per subscriber. It receives an observer that
/// enforces the event grammar (nothing after the first terminal event or
/// after disposal) and returns the disposable that tears its work down.
///
/// ```rust
/// use rxcore::prelude::*;
/// use std::sync::Arc;
///
/// let source = observable::create(|observer: AnyObserver<i32, ()>| {
///   observer.on_next(1);
///   observer.on_completed();
///   observer.on_next(2); // dropped
///   Disposables::empty()
/// });
///
/// let seen = Arc::new(parking_lot::Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// source.subscribe_next(move |v| c_seen.lock().push(v));
/// assert_eq!(*seen.lock(), vec![1]);
/// ```
pub fn create<Item, Err, F>(subscribe: F) -> Create<F, Item, Err>
where
  F: Fn(AnyObserver<Item, Err>) -> AnyDisposable + Send + Sync,
{
  Create { subscribe, _hint: TypeHint::new() }
}

/// Observable created from a function.
///
/// This struct is created by [`create`].
#[derive(Clone)]
pub struct Create<F, Item, Err> {
  subscribe: F,
  _hint: TypeHint<(Item, Err)>,
}

impl<F, Item, Err> Observable for Create<F, Item, Err>
where
  F: Fn(AnyObserver<Item, Err>) -> AnyDisposable + Send + Sync,
  Item: 'static,
  Err: 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> AnyDisposable {
    let sink = Arc::new(Sink::new(observer));
    let inner = (self.subscribe)(sink.clone());
    Disposables::create2(sink, inner)
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::atomic::{AtomicBool, Ordering}, thread};

  use parking_lot::Mutex;

  use super::*;
  use crate::{disposable::Disposable, event::Event, observer::ObserverExt, prelude::*};

  #[test]
  fn grammar_is_enforced() {
    let source = create(|o: AnyObserver<i32, &str>| {
      o.on_next(1);
      o.on_error("first");
      o.on_error("second");
      o.on_completed();
      o.on_next(2);
      Disposables::empty()
    });
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    source.subscribe_with(FnObserver::new(move |e: Event<i32, &str>| c_log.lock().push(e)));
    assert_eq!(*log.lock(), vec![Event::Next(1), Event::Error("first")]);
  }

  #[test]
  fn dispose_reaches_teardown_and_stops_delivery() {
    let torn_down = Arc::new(AtomicBool::new(false));
    let slot: Arc<Mutex<Option<AnyObserver<i32, ()>>>> = Arc::new(Mutex::new(None));
    let (c_torn_down, c_slot) = (torn_down.clone(), slot.clone());
    let source = create(move |o: AnyObserver<i32, ()>| {
      *c_slot.lock() = Some(o);
      let c_torn_down = c_torn_down.clone();
      Disposables::create(move || c_torn_down.store(true, Ordering::SeqCst))
    });

    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    let subscription = source.subscribe_next(move |v| c_log.lock().push(v));
    let producer = slot.lock().clone().unwrap();
    producer.on_next(1);
    subscription.dispose();
    producer.on_next(2);

    assert!(torn_down.load(Ordering::SeqCst));
    assert_eq!(*log.lock(), vec![1]);
  }

  #[test]
  fn concurrent_producers_are_serialized() {
    let source = create(|o: AnyObserver<usize, ()>| {
      let handles: Vec<_> = (0..4)
        .map(|t| {
          let o = o.clone();
          thread::spawn(move || {
            for i in 0..250 {
              o.on_next(t * 1000 + i);
            }
          })
        })
        .collect();
      for h in handles {
        h.join().unwrap();
      }
      o.on_completed();
      Disposables::empty()
    });

    let inside = Arc::new(AtomicBool::new(false));
    let overlap = Arc::new(AtomicBool::new(false));
    let count = Arc::new(Mutex::new(0));
    let (c_inside, c_overlap, c_count) = (inside.clone(), overlap.clone(), count.clone());
    source.subscribe_next(move |_| {
      if c_inside.swap(true, Ordering::SeqCst) {
        c_overlap.store(true, Ordering::SeqCst);
      }
      *c_count.lock() += 1;
      c_inside.store(false, Ordering::SeqCst);
    });
    assert!(!overlap.load(Ordering::SeqCst));
    assert_eq!(*count.lock(), 1000);
  }
}
