//! Disposables raced against assignment from several threads.

use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Barrier,
  },
  thread,
};

use rxcore::prelude::*;

fn counting(counter: &Arc<AtomicUsize>) -> AnyDisposable {
  let c_counter = counter.clone();
  Disposables::create(move || {
    c_counter.fetch_add(1, Ordering::SeqCst);
  })
}

#[test]
fn single_assignment_set_races_dispose() {
  for _ in 0..1000 {
    let holder = Arc::new(SingleAssignmentDisposable::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(2));

    let setter = {
      let (holder, barrier, inner) = (holder.clone(), barrier.clone(), counting(&counter));
      thread::spawn(move || {
        barrier.wait();
        holder.set(inner);
      })
    };
    let disposer = {
      let (holder, barrier) = (holder.clone(), barrier.clone());
      thread::spawn(move || {
        barrier.wait();
        holder.dispose();
      })
    };
    setter.join().unwrap();
    disposer.join().unwrap();

    assert!(holder.is_disposed());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }
}

#[test]
fn serial_replacements_race_dispose() {
  for _ in 0..200 {
    let serial = Arc::new(SerialDisposable::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(5));

    let mut workers = vec![];
    for _ in 0..4 {
      let (serial, barrier, counter) = (serial.clone(), barrier.clone(), counter.clone());
      workers.push(thread::spawn(move || {
        barrier.wait();
        for _ in 0..10 {
          serial.set(counting(&counter));
        }
      }));
    }
    let c_serial = serial.clone();
    let c_barrier = barrier.clone();
    workers.push(thread::spawn(move || {
      c_barrier.wait();
      c_serial.dispose();
    }));
    for worker in workers {
      worker.join().unwrap();
    }

    // Replaced or disposed, every one of the 40 handles ran exactly once.
    assert!(serial.is_disposed());
    assert_eq!(counter.load(Ordering::SeqCst), 40);
  }
}

#[test]
fn composite_inserts_race_dispose() {
  for _ in 0..200 {
    let group = Arc::new(CompositeDisposable::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(4));

    let mut workers = vec![];
    for _ in 0..3 {
      let (group, barrier, counter) = (group.clone(), barrier.clone(), counter.clone());
      workers.push(thread::spawn(move || {
        barrier.wait();
        for _ in 0..20 {
          group.insert(counting(&counter));
        }
      }));
    }
    barrier.wait();
    group.dispose();
    for worker in workers {
      worker.join().unwrap();
    }

    assert_eq!(group.count(), 0);
    assert_eq!(counter.load(Ordering::SeqCst), 60);
  }
}

#[test]
fn ref_count_children_released_from_many_threads() {
  let primary = Arc::new(BooleanDisposable::new());
  let rc = RefCountDisposable::new(primary.clone());
  let children: Vec<_> = (0..64).map(|_| rc.retain()).collect();
  rc.dispose();

  let barrier = Arc::new(Barrier::new(children.len()));
  let workers: Vec<_> = children
    .into_iter()
    .map(|child| {
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        child.dispose();
        child.dispose();
      })
    })
    .collect();
  for worker in workers {
    worker.join().unwrap();
  }

  assert!(primary.is_disposed());
  assert!(rc.is_disposed());
}

#[test]
fn dispose_bag_releases_everything_on_drop() {
  let counter = Arc::new(AtomicUsize::new(0));
  {
    let bag = DisposeBag::new();
    for _ in 0..5 {
      counting(&counter).disposed_by(&bag);
    }
    assert_eq!(bag.len(), 5);
  }
  assert_eq!(counter.load(Ordering::SeqCst), 5);
}
