use std::collections::VecDeque;

use parking_lot::Mutex;

type Work = Box<dyn FnOnce() + Send>;

struct Queue {
  items: VecDeque<Work>,
  running: bool,
}

/// Runs work items one at a time, in submission order.
///
/// Work submitted while an item is running (from that item, or from another
/// thread) is queued and run by the thread already draining, after the
/// current item returns. Recursive resubscription therefore becomes a loop
/// and the stack stays flat no matter how often it happens.
pub(crate) struct Trampoline {
  queue: Mutex<Queue>,
}

impl Default for Trampoline {
  fn default() -> Self { Self { queue: Mutex::new(Queue { items: VecDeque::new(), running: false }) } }
}

impl Trampoline {
  pub(crate) fn new() -> Self { Self::default() }

  pub(crate) fn run<F>(&self, work: F)
  where
    F: FnOnce() + Send + 'static,
  {
    {
      let mut queue = self.queue.lock();
      queue.items.push_back(Box::new(work));
      if queue.running {
        return;
      }
      queue.running = true;
    }

    loop {
      let next = {
        let mut queue = self.queue.lock();
        match queue.items.pop_front() {
          Some(next) => next,
          None => {
            queue.running = false;
            return;
          }
        }
      };
      next();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;

  fn recurse(trampoline: Arc<Trampoline>, depth: Arc<Mutex<(usize, usize)>>, remaining: usize) {
    {
      let mut depth = depth.lock();
      depth.0 += 1;
      depth.1 = depth.1.max(depth.0);
    }
    if remaining > 0 {
      let (c_trampoline, c_depth) = (trampoline.clone(), depth.clone());
      trampoline.run(move || recurse(c_trampoline, c_depth, remaining - 1));
    }
    depth.lock().0 -= 1;
  }

  #[test]
  fn nested_work_runs_after_the_current_item() {
    let trampoline = Arc::new(Trampoline::new());
    let depth = Arc::new(Mutex::new((0, 0)));
    let (c_trampoline, c_depth) = (trampoline.clone(), depth.clone());
    trampoline.run(move || recurse(c_trampoline, c_depth, 50_000));
    assert_eq!(depth.lock().1, 1);
  }

  #[test]
  fn keeps_submission_order() {
    let trampoline = Arc::new(Trampoline::new());
    let log = Arc::new(Mutex::new(vec![]));
    let (c_trampoline, c_log) = (trampoline.clone(), log.clone());
    trampoline.run(move || {
      c_log.lock().push(1);
      let inner_log = c_log.clone();
      c_trampoline.run(move || inner_log.lock().push(3));
      c_log.lock().push(2);
    });
    assert_eq!(*log.lock(), vec![1, 2, 3]);
  }
}
