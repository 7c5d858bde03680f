use std::{
  collections::VecDeque,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::subject_subscription::{ObserverRemover, SubjectSubscription};
use crate::{
  bag::{Bag, BagKey},
  disposable::{AnyDisposable, Disposables},
  event::Event,
  observer::AnyObserver,
};

/// What a subject keeps for late subscribers.
pub(crate) trait Buffer<Item, Err>: Send + 'static {
  /// Record a value. Returns `false` if the value must not be broadcast
  /// live.
  fn push(&mut self, value: &Item) -> bool;

  /// Values a new subscriber receives before anything else. `stopped` is the
  /// terminal event, if the subject has terminated.
  fn replay(&self, stopped: Option<&Event<Item, Err>>) -> SmallVec<[Item; 1]>;

  /// Called once on termination. Returns a value to deliver to the attached
  /// observers right before the terminal event.
  fn terminate(&mut self, _terminal: &Event<Item, Err>) -> Option<Item> { None }
}

/// An attached observer, the flag its subscription handle flips, and the
/// events waiting for it.
///
/// Events are queued under the subject's state lock, so every observer sees
/// them in the order the subject accepted them. Whoever finds the outbox idle
/// drains it with no lock held while the observer runs; anyone else only
/// queues and returns.
pub(crate) struct Attached<Item, Err> {
  observer: AnyObserver<Item, Err>,
  disposed: Arc<AtomicBool>,
  outbox: Mutex<Outbox<Item, Err>>,
}

struct Outbox<Item, Err> {
  pending: VecDeque<Event<Item, Err>>,
  draining: bool,
}

impl<Item, Err> Attached<Item, Err> {
  fn new(observer: AnyObserver<Item, Err>, disposed: Arc<AtomicBool>, pending: VecDeque<Event<Item, Err>>) -> Self {
    Self { observer, disposed, outbox: Mutex::new(Outbox { pending, draining: false }) }
  }

  #[inline]
  fn push(&self, event: Event<Item, Err>) { self.outbox.lock().pending.push_back(event); }

  fn drain(&self) {
    {
      let mut outbox = self.outbox.lock();
      if outbox.draining {
        tracing::trace!(queued = outbox.pending.len(), "observer busy, event queued");
        return;
      }
      outbox.draining = true;
    }
    loop {
      let event = {
        let mut outbox = self.outbox.lock();
        match outbox.pending.pop_front() {
          Some(event) => event,
          None => {
            outbox.draining = false;
            return;
          }
        }
      };
      if !self.disposed.load(Ordering::Acquire) {
        self.observer.on(event);
      }
    }
  }
}

struct State<Item, Err, B> {
  observers: Bag<Arc<Attached<Item, Err>>>,
  stopped: Option<Event<Item, Err>>,
  buffer: B,
}

/// The machinery shared by every subject.
///
/// `state` is only locked for bookkeeping and never while an observer runs.
/// A subscriber's replay is queued in its outbox before it becomes visible
/// to emitters, so it gets every value through its replay or live, never
/// both and never out of order. An observer may emit into, or subscribe to,
/// the same subject; a nested emission reaches it after its current event.
pub(crate) struct SubjectCore<Item, Err, B> {
  state: Mutex<State<Item, Err, B>>,
}

type Snapshot<Item, Err> = SmallVec<[Arc<Attached<Item, Err>>; 2]>;

impl<Item, Err, B> SubjectCore<Item, Err, B>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  B: Buffer<Item, Err>,
{
  pub(crate) fn new(buffer: B) -> Arc<Self> {
    let state = State { observers: Bag::new(), stopped: None, buffer };
    Arc::new(Self { state: Mutex::new(state) })
  }

  pub(crate) fn on(&self, event: Event<Item, Err>) {
    let observers: Snapshot<Item, Err> = match event {
      Event::Next(value) => {
        let mut state = self.state.lock();
        if state.stopped.is_some() || !state.buffer.push(&value) {
          return;
        }
        let observers = state.observers.snapshot();
        for observer in observers.iter() {
          observer.push(Event::Next(value.clone()));
        }
        observers
      }
      terminal => {
        let mut state = self.state.lock();
        if state.stopped.is_some() {
          return;
        }
        let last = state.buffer.terminate(&terminal);
        state.stopped = Some(terminal.clone());
        let observers: Snapshot<Item, Err> = state.observers.drain().collect();
        for observer in observers.iter() {
          if let Some(last) = &last {
            observer.push(Event::Next(last.clone()));
          }
          observer.push(terminal.clone());
        }
        observers
      }
    };
    for observer in observers.iter() {
      observer.drain();
    }
  }

  pub(crate) fn subscribe(self: &Arc<Self>, observer: AnyObserver<Item, Err>) -> AnyDisposable {
    let disposed = Arc::new(AtomicBool::new(false));
    let (attached, key) = {
      let mut guard = self.state.lock();
      let state = &mut *guard;
      let mut pending: VecDeque<_> =
        state.buffer.replay(state.stopped.as_ref()).into_iter().map(Event::Next).collect();
      if let Some(stopped) = &state.stopped {
        pending.push_back(stopped.clone());
      }
      let attached = Arc::new(Attached::new(observer, disposed.clone(), pending));
      let key = match state.stopped {
        Some(_) => None,
        None => Some(state.observers.insert(attached.clone())),
      };
      (attached, key)
    };

    attached.drain();
    match key {
      Some(key) => {
        let remover: Arc<dyn ObserverRemover> = self.clone();
        Arc::new(SubjectSubscription::new(Arc::downgrade(&remover), key, disposed))
      }
      None => Disposables::empty(),
    }
  }

  pub(crate) fn has_observers(&self) -> bool { !self.state.lock().observers.is_empty() }

  pub(crate) fn observer_count(&self) -> usize { self.state.lock().observers.len() }

  pub(crate) fn is_stopped(&self) -> bool { self.state.lock().stopped.is_some() }

  /// Run `f` on the buffer and the terminal event, under the state lock.
  pub(crate) fn inspect<R>(&self, f: impl FnOnce(&B, Option<&Event<Item, Err>>) -> R) -> R {
    let state = self.state.lock();
    f(&state.buffer, state.stopped.as_ref())
  }
}

impl<Item, Err, B> ObserverRemover for SubjectCore<Item, Err, B>
where
  Item: Send,
  Err: Send,
  B: Send,
{
  fn remove(&self, key: BagKey) {
    // Dropped outside the lock: the observer may own anything.
    let removed = self.state.lock().observers.remove(key);
    drop(removed);
  }
}
