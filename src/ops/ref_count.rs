use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::{
  disposable::{AnyDisposable, Disposable, Disposables, SingleAssignmentDisposable},
  event::Event,
  observable::{Connectable, Observable},
  observer::{AnyObserver, Observer},
};

/// Keeps a [`Connectable`] connected while it has subscribers.
///
/// The first subscriber connects; when the last one disposes, the connection
/// is disposed. A terminal event from the source also ends the connection,
/// so the next subscriber connects again.
///
/// Attaching, connecting and disconnecting are carried out by one thread at a
/// time. A subscriber arriving while another thread is mid-transition queues
/// its observer and returns; the busy thread attaches it once the previous
/// connection is fully torn down.
pub struct RefCount<C: Observable> {
  inner: Arc<Inner<C>>,
}

struct Inner<C: Observable> {
  connectable: C,
  state: Mutex<State<C::Item, C::Err>>,
}

/// `id` changes whenever the subscriber count drops to zero or the source
/// terminates, so stale releases and stale connections are recognised.
struct State<Item, Err> {
  id: u64,
  count: usize,
  connection: Option<AnyDisposable>,
  busy: bool,
  waiting: Vec<Waiting<Item, Err>>,
}

/// A subscriber not attached to the connectable yet.
struct Waiting<Item, Err> {
  observer: AnyObserver<Item, Err>,
  subscription: Arc<SingleAssignmentDisposable>,
}

enum Step {
  Connect(u64),
  Disconnect(AnyDisposable),
  Attach,
}

impl<C: Observable> Clone for RefCount<C> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<C: Observable> RefCount<C> {
  pub fn new(connectable: C) -> Self {
    let state = State { id: 0, count: 0, connection: None, busy: false, waiting: vec![] };
    Self { inner: Arc::new(Inner { connectable, state: Mutex::new(state) }) }
  }

  /// Number of live subscribers.
  pub fn subscriber_count(&self) -> usize { self.inner.state.lock().count }
}

impl<C> Inner<C>
where
  C: Connectable + 'static,
{
  /// One subscriber of generation `id` left.
  fn release(&self, id: u64) {
    {
      let mut state = self.state.lock();
      if state.id != id || state.count == 0 {
        return;
      }
      state.count -= 1;
      if state.count > 0 {
        return;
      }
      tracing::trace!(connection = id, "last subscriber left");
      state.id += 1;
      if state.busy {
        return;
      }
      state.busy = true;
    }
    self.settle();
  }

  /// Generation `id` delivered a terminal event.
  fn terminate(&self, id: u64) {
    let connection = {
      let mut state = self.state.lock();
      if state.id != id {
        return;
      }
      state.id += 1;
      state.count = 0;
      state.connection.take()
    };
    tracing::trace!(connection = id, "source terminated, disconnecting");
    if let Some(connection) = connection {
      connection.dispose();
    }
  }

  /// Bring the connection in line with the subscriber count. Only the thread
  /// that set `busy` runs this; it loops until nothing is left to do.
  fn settle(&self) {
    loop {
      let (waiting, step) = {
        let mut state = self.state.lock();
        let waiting = std::mem::take(&mut state.waiting);
        let step = match (state.count > 0, state.connection.take()) {
          (true, None) => Step::Connect(state.id),
          (false, Some(connection)) => Step::Disconnect(connection),
          (_, connection) => {
            state.connection = connection;
            if waiting.is_empty() {
              state.busy = false;
              return;
            }
            Step::Attach
          }
        };
        (waiting, step)
      };

      for Waiting { observer, subscription } in waiting {
        subscription.set(self.connectable.subscribe(observer));
      }
      match step {
        Step::Connect(id) => {
          tracing::trace!(connection = id, "first subscriber, connecting");
          let connection = self.connectable.connect();
          let stale = {
            let mut state = self.state.lock();
            if state.id == id && state.count > 0 {
              state.connection = Some(connection);
              None
            } else {
              Some(connection)
            }
          };
          if let Some(stale) = stale {
            stale.dispose();
          }
        }
        Step::Disconnect(connection) => {
          tracing::trace!("disconnecting");
          connection.dispose();
        }
        Step::Attach => {}
      }
    }
  }
}

impl<C> Observable for RefCount<C>
where
  C: Connectable + 'static,
  C::Item: 'static,
  C::Err: 'static,
{
  type Item = C::Item;
  type Err = C::Err;

  fn subscribe(&self, observer: AnyObserver<C::Item, C::Err>) -> AnyDisposable {
    let subscription = Arc::new(SingleAssignmentDisposable::new());
    let (id, drive) = {
      let mut state = self.inner.state.lock();
      state.count += 1;
      let id = state.id;
      let tracked = RefCountObserver { observer, parent: Arc::downgrade(&self.inner), id };
      state.waiting.push(Waiting { observer: Arc::new(tracked), subscription: subscription.clone() });
      let drive = !state.busy;
      state.busy = true;
      (id, drive)
    };
    if drive {
      self.inner.settle();
    }

    let parent = self.inner.clone();
    let release = Disposables::create(move || parent.release(id));
    Disposables::create2(subscription, release)
  }
}

struct RefCountObserver<C: Observable> {
  observer: AnyObserver<C::Item, C::Err>,
  parent: Weak<Inner<C>>,
  id: u64,
}

impl<C> Observer<C::Item, C::Err> for RefCountObserver<C>
where
  C: Connectable + 'static,
{
  fn on(&self, event: Event<C::Item, C::Err>) {
    if event.is_stop_event() {
      if let Some(parent) = self.parent.upgrade() {
        parent.terminate(self.id);
      }
    }
    self.observer.on(event);
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::{
    observable::{create, ObservableExt},
    observer::ObserverExt,
    subject::PublishSubject,
  };

  fn counted(
    subscribed: Arc<AtomicUsize>, disposed: Arc<AtomicUsize>,
  ) -> impl Observable<Item = i32, Err = ()> + Clone {
    Arc::new(create(move |_: AnyObserver<i32, ()>| {
      subscribed.fetch_add(1, Ordering::SeqCst);
      let disposed = disposed.clone();
      Disposables::create(move || {
        disposed.fetch_add(1, Ordering::SeqCst);
      })
    }))
  }

  #[test]
  fn connects_once_for_many_subscribers() {
    let (subscribed, disposed) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
    let shared = counted(subscribed.clone(), disposed.clone()).publish().ref_count();

    let a = shared.subscribe_next(|_| {});
    let b = shared.subscribe_next(|_| {});
    assert_eq!(subscribed.load(Ordering::SeqCst), 1);
    assert_eq!(shared.subscriber_count(), 2);

    a.dispose();
    assert_eq!(disposed.load(Ordering::SeqCst), 0);
    b.dispose();
    assert_eq!(disposed.load(Ordering::SeqCst), 1);
    assert_eq!(shared.subscriber_count(), 0);

    let _c = shared.subscribe_next(|_| {});
    assert_eq!(subscribed.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn double_dispose_counts_once() {
    let (subscribed, disposed) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
    let shared = counted(subscribed.clone(), disposed.clone()).publish().ref_count();
    let a = shared.subscribe_next(|_| {});
    let _b = shared.subscribe_next(|_| {});
    a.dispose();
    a.dispose();
    assert_eq!(shared.subscriber_count(), 1);
    assert_eq!(disposed.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn terminal_event_resets_the_connection() {
    let source = PublishSubject::<i32, ()>::new();
    let shared = source.clone().multicast_with(PublishSubject::<i32, ()>::new).ref_count();
    let completed = Arc::new(AtomicUsize::new(0));
    let c_completed = completed.clone();
    let _a = shared.subscribe_all(|_| {}, |_| {}, move || {
      c_completed.fetch_add(1, Ordering::SeqCst);
    });
    assert!(source.has_observers());

    source.on_completed();
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(shared.subscriber_count(), 0);
    assert!(!source.has_observers());
  }

  #[test]
  fn reconnects_after_completion() {
    let subscribed = Arc::new(AtomicUsize::new(0));
    let c_subscribed = subscribed.clone();
    let source = create(move |observer: AnyObserver<i32, ()>| {
      let n = c_subscribed.fetch_add(1, Ordering::SeqCst) as i32;
      observer.on_next(n);
      observer.on_completed();
      Disposables::empty()
    });
    let shared = source.multicast_with(PublishSubject::<i32, ()>::new).ref_count();

    let seen = Arc::new(parking_lot::Mutex::new(vec![]));
    for _ in 0..3 {
      let c_seen = seen.clone();
      shared.subscribe_next(move |v| c_seen.lock().push(v));
    }
    assert_eq!(*seen.lock(), vec![0, 1, 2]);
  }

  #[test]
  fn subscription_outliving_its_handle_still_disconnects() {
    let source = PublishSubject::<i32, ()>::new();
    let subscription = {
      let shared = source.clone().share();
      shared.subscribe_next(|_| {})
    };
    assert!(source.has_observers());

    subscription.dispose();
    assert!(!source.has_observers());
  }

  #[test]
  fn subscribe_during_a_synchronous_terminal_reconnects() {
    let subscribed = Arc::new(AtomicUsize::new(0));
    let c_subscribed = subscribed.clone();
    let source = create(move |observer: AnyObserver<i32, ()>| {
      if c_subscribed.fetch_add(1, Ordering::SeqCst) == 0 {
        observer.on_completed();
      } else {
        observer.on_next(7);
      }
      Disposables::empty()
    });
    let shared = source.share();

    let seen = Arc::new(parking_lot::Mutex::new(vec![]));
    let slot: Arc<parking_lot::Mutex<Option<AnyDisposable>>> = Arc::new(parking_lot::Mutex::new(None));
    let (c_shared, c_seen, c_slot) = (shared.clone(), seen.clone(), slot.clone());
    let _first = shared.subscribe_all(
      |_| {},
      |_| {},
      move || {
        let cc_seen = c_seen.clone();
        *c_slot.lock() = Some(c_shared.subscribe_next(move |v| cc_seen.lock().push(v)));
      },
    );

    assert_eq!(subscribed.load(Ordering::SeqCst), 2);
    assert_eq!(*seen.lock(), vec![7]);
    assert_eq!(shared.subscriber_count(), 1);
  }
}
