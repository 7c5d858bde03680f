use std::{
  collections::VecDeque,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;

use crate::{
  disposable::{AnyDisposable, Disposable, Disposables},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer, Sink},
  scheduler::AnyScheduler,
};

/// Re-emits the source's events on a scheduler, in order.
#[derive(Clone)]
pub struct ObserveOn<Src> {
  source: Src,
  scheduler: AnyScheduler,
}

impl<Src> ObserveOn<Src> {
  pub fn new(source: Src, scheduler: AnyScheduler) -> Self { Self { source, scheduler } }
}

impl<Src> Observable for ObserveOn<Src>
where
  Src: Observable,
  Src::Item: Send + 'static,
  Src::Err: Send + 'static,
{
  type Item = Src::Item;
  type Err = Src::Err;

  fn subscribe(&self, observer: AnyObserver<Src::Item, Src::Err>) -> AnyDisposable {
    let relay = Arc::new(Relay {
      sink: Sink::new(observer),
      scheduler: self.scheduler.clone(),
      queue: Mutex::new(Pending { events: VecDeque::new(), draining: false }),
      disposed: AtomicBool::new(false),
    });
    let upstream = self.source.subscribe(Arc::new(RelayObserver(relay.clone())));
    Disposables::create2(relay, upstream)
  }
}

struct Pending<Item, Err> {
  events: VecDeque<Event<Item, Err>>,
  draining: bool,
}

/// Queue between the source and the scheduler. At most one drain is
/// scheduled at a time, so events are delivered in arrival order.
struct Relay<Item, Err> {
  sink: Sink<Item, Err>,
  scheduler: AnyScheduler,
  queue: Mutex<Pending<Item, Err>>,
  disposed: AtomicBool,
}

impl<Item, Err> Relay<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn enqueue(self: &Arc<Self>, event: Event<Item, Err>) {
    if self.disposed.load(Ordering::Acquire) {
      return;
    }
    {
      let mut queue = self.queue.lock();
      queue.events.push_back(event);
      if queue.draining {
        return;
      }
      queue.draining = true;
    }
    let relay = self.clone();
    // Disposal is observed through `disposed`, the handle is not needed.
    let _ = self.scheduler.schedule_action(Box::new(move || relay.drain()));
  }

  fn drain(&self) {
    loop {
      let event = {
        let mut queue = self.queue.lock();
        if self.disposed.load(Ordering::Acquire) {
          queue.events.clear();
          queue.draining = false;
          return;
        }
        match queue.events.pop_front() {
          Some(event) => event,
          None => {
            queue.draining = false;
            return;
          }
        }
      };
      self.sink.on(event);
    }
  }
}

impl<Item: Send, Err: Send> Disposable for Relay<Item, Err> {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    self.sink.dispose();
    // Queued events own values; drop them outside the lock.
    let dropped = std::mem::take(&mut self.queue.lock().events);
    drop(dropped);
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

struct RelayObserver<Item, Err>(Arc<Relay<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for RelayObserver<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  #[inline]
  fn on(&self, event: Event<Item, Err>) { self.0.enqueue(event) }
}
