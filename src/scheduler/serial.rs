use std::{
  collections::VecDeque,
  sync::Arc,
  time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{schedule_periodic_chain, Action, AnyScheduler, PeriodicAction, Scheduler};
use crate::disposable::{AnyDisposable, BooleanDisposable, Disposable, Disposables};

struct Mailbox {
  items: VecDeque<(Action, Arc<BooleanDisposable>)>,
  draining: bool,
}

struct Inner {
  target: AnyScheduler,
  mailbox: Mutex<Mailbox>,
}

/// Runs work one item at a time, in submission order, on top of another
/// scheduler.
///
/// At most one drain job is outstanding on the target scheduler, so actions
/// never overlap even when the target is parallel. An action that blocks
/// stalls everything queued behind it.
#[derive(Clone)]
pub struct SerialScheduler {
  inner: Arc<Inner>,
}

impl SerialScheduler {
  pub fn new(target: AnyScheduler) -> Self {
    let mailbox = Mailbox { items: VecDeque::new(), draining: false };
    Self { inner: Arc::new(Inner { target, mailbox: Mutex::new(mailbox) }) }
  }

  /// A serial scheduler on top of the shared concurrent pool.
  #[cfg(feature = "futures-scheduler")]
  pub fn concurrent() -> Result<Self, crate::error::RxError> {
    Ok(Self::new(Arc::new(super::ConcurrentScheduler::shared()?)))
  }

  fn enqueue(&self, action: Action, cancel: Arc<BooleanDisposable>) {
    let start_drain = {
      let mut mailbox = self.inner.mailbox.lock();
      mailbox.items.push_back((action, cancel));
      !std::mem::replace(&mut mailbox.draining, true)
    };
    if start_drain {
      let this = self.clone();
      // Draining ends by itself once the mailbox is empty.
      let _ = self.inner.target.schedule_action(Box::new(move || this.drain()));
    }
  }

  fn drain(&self) {
    loop {
      let next = {
        let mut mailbox = self.inner.mailbox.lock();
        match mailbox.items.pop_front() {
          Some(next) => next,
          None => {
            mailbox.draining = false;
            return;
          }
        }
      };
      let (action, cancel) = next;
      if !cancel.is_disposed() {
        action();
      }
    }
  }
}

impl Scheduler for SerialScheduler {
  fn now(&self) -> Instant { self.inner.target.now() }

  fn schedule_action(&self, action: Action) -> AnyDisposable {
    let cancel = Arc::new(BooleanDisposable::new());
    self.enqueue(action, cancel.clone());
    cancel
  }

  fn schedule_relative_action(&self, due: Duration, action: Action) -> AnyDisposable {
    if due.is_zero() {
      return self.schedule_action(action);
    }
    let cancel = Arc::new(BooleanDisposable::new());
    let (this, c_cancel) = (self.clone(), cancel.clone());
    let timer =
      self.inner.target.schedule_relative_action(due, Box::new(move || this.enqueue(action, c_cancel)));
    Disposables::create2(cancel, timer)
  }

  fn schedule_periodic_action(
    &self, start: Duration, period: Duration, tick: PeriodicAction,
  ) -> AnyDisposable {
    schedule_periodic_chain(Arc::new(self.clone()), start, period, tick)
  }
}
