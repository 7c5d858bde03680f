//! `share` and `share_replay` driven through virtual time.

use std::sync::Arc;

use parking_lot::Mutex;
use rxcore::{
  prelude::*,
  testing::{next, HotObservable, Recorded, SubscriptionLog, TestableObserver},
};

type Events = Vec<Recorded<Event<i32, ()>>>;

/// Subscribe a recording observer to `source` at `subscribe` and dispose it
/// at `dispose`.
fn attach<O>(scheduler: &TestScheduler, source: O, subscribe: u64, dispose: u64) -> TestableObserver<i32, ()>
where
  O: Observable<Item = i32, Err = ()> + 'static,
{
  let observer = scheduler.create_observer();
  let subscription: Arc<Mutex<Option<AnyDisposable>>> = Arc::new(Mutex::new(None));

  let (c_subscription, c_observer) = (subscription.clone(), observer.clone());
  scheduler.schedule_at(subscribe, move || {
    let handle = source.subscribe(Arc::new(c_observer));
    *c_subscription.lock() = Some(handle);
  });
  scheduler.schedule_at(dispose, move || {
    let handle = subscription.lock().take();
    if let Some(handle) = handle {
      handle.dispose();
    }
  });
  observer
}

fn source(scheduler: &TestScheduler) -> HotObservable<i32, ()> {
  scheduler.create_hot_observable(vec![
    next(210, 1),
    next(220, 2),
    next(230, 3),
    next(240, 4),
    next(250, 5),
    next(320, 6),
    next(340, 7),
    next(450, 8),
    next(550, 9),
    next(650, 10),
  ])
}

#[test]
fn share_while_connected() {
  let scheduler = TestScheduler::new();
  let xs = source(&scheduler);
  let shared = xs.clone().share();

  let a = attach(&scheduler, shared.clone(), 200, 330);
  let b = attach(&scheduler, shared.clone(), 300, 350);
  let c = attach(&scheduler, shared, 500, 600);
  scheduler.flush();

  let expected_a: Events =
    vec![next(210, 1), next(220, 2), next(230, 3), next(240, 4), next(250, 5), next(320, 6)];
  let expected_b: Events = vec![next(320, 6), next(340, 7)];
  let expected_c: Events = vec![next(550, 9)];
  assert_eq!(a.events(), expected_a);
  assert_eq!(b.events(), expected_b);
  assert_eq!(c.events(), expected_c);
  assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 350), SubscriptionLog::new(500, 600)]);
}

#[test]
fn share_replay_while_connected_forgets_on_disconnect() {
  let scheduler = TestScheduler::new();
  let xs = source(&scheduler);
  let shared = xs.clone().share_replay(1, SubjectLifetimeScope::WhileConnected);

  let a = attach(&scheduler, shared.clone(), 200, 330);
  let b = attach(&scheduler, shared.clone(), 300, 350);
  let c = attach(&scheduler, shared, 500, 600);
  scheduler.flush();

  let expected_b: Events = vec![next(300, 5), next(320, 6), next(340, 7)];
  let expected_c: Events = vec![next(550, 9)];
  assert_eq!(a.values(), vec![1, 2, 3, 4, 5, 6]);
  assert_eq!(b.events(), expected_b);
  assert_eq!(c.events(), expected_c);
  assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 350), SubscriptionLog::new(500, 600)]);
}

#[test]
fn share_replay_forever_remembers_across_connections() {
  let scheduler = TestScheduler::new();
  let xs = source(&scheduler);
  let shared = xs.clone().share_replay(1, SubjectLifetimeScope::Forever);

  let a = attach(&scheduler, shared.clone(), 200, 330);
  let b = attach(&scheduler, shared.clone(), 300, 350);
  let c = attach(&scheduler, shared, 500, 600);
  scheduler.flush();

  let expected_b: Events = vec![next(300, 5), next(320, 6), next(340, 7)];
  let expected_c: Events = vec![next(500, 7), next(550, 9)];
  assert_eq!(a.values(), vec![1, 2, 3, 4, 5, 6]);
  assert_eq!(b.events(), expected_b);
  assert_eq!(c.events(), expected_c);
  assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 350), SubscriptionLog::new(500, 600)]);
}

#[test]
fn publish_and_connect_by_hand() {
  let scheduler = TestScheduler::new();
  let xs = source(&scheduler);
  let published = xs.clone().publish();

  let a = attach(&scheduler, published.clone(), 200, 1000);
  let connection: Arc<Mutex<Option<AnyDisposable>>> = Arc::new(Mutex::new(None));
  let (c_connection, c_published) = (connection.clone(), published.clone());
  scheduler.schedule_at(235, move || *c_connection.lock() = Some(c_published.connect()));
  scheduler.schedule_at(330, move || {
    let handle = connection.lock().take();
    if let Some(handle) = handle {
      handle.dispose();
    }
  });
  scheduler.flush();

  assert_eq!(a.values(), vec![4, 5, 6]);
  assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(235, 330)]);
  assert!(!published.is_connected());
}
