use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use bencher::{benchmark_group, benchmark_main, black_box, Bencher};
use rxcore::prelude::*;

fn counting_subscribers<S>(subject: &S, count: usize) -> (Arc<AtomicUsize>, Vec<AnyDisposable>)
where
  S: Observable<Item = usize, Err = ()>,
{
  let total = Arc::new(AtomicUsize::new(0));
  let subscriptions = (0..count)
    .map(|_| {
      let c_total = total.clone();
      subject.subscribe_next(move |v| {
        c_total.fetch_add(v, Ordering::Relaxed);
      })
    })
    .collect();
  (total, subscriptions)
}

fn publish_to_one(b: &mut Bencher) {
  let subject = PublishSubject::<usize, ()>::new();
  let (total, _subscriptions) = counting_subscribers(&subject, 1);
  b.iter(|| {
    for v in 0..100 {
      subject.on_next(v);
    }
  });
  black_box(total.load(Ordering::Relaxed));
}

fn publish_to_many(b: &mut Bencher) {
  let subject = PublishSubject::<usize, ()>::new();
  let (total, _subscriptions) = counting_subscribers(&subject, 64);
  b.iter(|| {
    for v in 0..100 {
      subject.on_next(v);
    }
  });
  black_box(total.load(Ordering::Relaxed));
}

fn replay_to_late_subscriber(b: &mut Bencher) {
  let subject = ReplaySubject::<usize, ()>::with_buffer_size(64);
  for v in 0..1000 {
    subject.on_next(v);
  }
  b.iter(|| {
    let (total, subscriptions) = counting_subscribers(&subject, 1);
    for subscription in subscriptions {
      subscription.dispose();
    }
    total.load(Ordering::Relaxed)
  });
}

fn share_connect_cycle(b: &mut Bencher) {
  let source = PublishSubject::<usize, ()>::new();
  let shared = source.clone().share();
  b.iter(|| {
    let (total, subscriptions) = counting_subscribers(&shared, 4);
    source.on_next(1);
    for subscription in subscriptions {
      subscription.dispose();
    }
    total.load(Ordering::Relaxed)
  });
}

benchmark_group!(
  benches,
  publish_to_one,
  publish_to_many,
  replay_to_late_subscriber,
  share_connect_cycle
);
benchmark_main!(benches);
