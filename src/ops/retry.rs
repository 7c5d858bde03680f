//! Retry operator implementation
//!
//! `retry` resubscribes to the source when it errors, as long as a
//! [`RetryPolicy`] allows it. Resubscription goes through a trampoline, so a
//! source that fails synchronously can be retried any number of times
//! without growing the stack. The failed subscription is always disposed
//! before the next one is made.
//!
//! ```rust
//! use std::sync::{
//!   atomic::{AtomicUsize, Ordering},
//!   Arc,
//! };
//!
//! use rxcore::prelude::*;
//!
//! let attempts = Arc::new(AtomicUsize::new(0));
//! let c_attempts = attempts.clone();
//! let source = observable::create(move |observer: AnyObserver<i32, &'static str>| {
//!   if c_attempts.fetch_add(1, Ordering::SeqCst) < 2 {
//!     observer.on_error("flaky");
//!   } else {
//!     observer.on_next(1);
//!     observer.on_completed();
//!   }
//!   Disposables::empty()
//! });
//!
//! source.retry(3).subscribe_next(|v| assert_eq!(v, 1));
//! assert_eq!(attempts.load(Ordering::SeqCst), 3);
//! ```

use std::sync::{
  atomic::{AtomicBool, AtomicUsize, Ordering},
  Arc,
};

use super::trampoline::Trampoline;
use crate::{
  disposable::{AnyDisposable, Disposable, Disposables, SerialDisposable},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer, Sink},
};

/// Policy for determining whether to retry an error.
///
/// A plain `usize` is the maximum number of retries; [`RetryForever`] never
/// gives up; [`RetryConfig`] adds resetting on success. Implement it for
/// error-aware policies:
///
/// ```rust
/// use rxcore::ops::retry::RetryPolicy;
///
/// #[derive(Clone)]
/// struct ServerErrors;
///
/// impl RetryPolicy<u16> for ServerErrors {
///   fn should_retry(&self, status: &u16, attempt: usize) -> bool {
///     attempt < 3 && (500..600).contains(status)
///   }
/// }
/// ```
pub trait RetryPolicy<Err>: Clone + Send + Sync + 'static {
  /// `attempt` is the number of retries already made for the current run
  /// of failures, starting at 0 for the first error.
  fn should_retry(&self, err: &Err, attempt: usize) -> bool;

  /// Whether a value from the source resets the attempt counter.
  fn reset_on_success(&self) -> bool { false }
}

impl<Err> RetryPolicy<Err> for usize {
  #[inline]
  fn should_retry(&self, _err: &Err, attempt: usize) -> bool { attempt < *self }
}

/// Retry every error.
#[derive(Clone, Copy, Debug, Default)]
pub struct RetryForever;

impl<Err> RetryPolicy<Err> for RetryForever {
  #[inline]
  fn should_retry(&self, _err: &Err, _attempt: usize) -> bool { true }
}

/// Builder for a count-limited policy.
///
/// ```rust
/// use rxcore::ops::retry::RetryConfig;
///
/// let config = RetryConfig::new().count(5).reset_on_success();
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryConfig {
  count: Option<usize>,
  reset_on_success: bool,
}

impl RetryConfig {
  /// No limit, no reset.
  pub fn new() -> Self { Self::default() }

  /// Allow at most `count` retries, so `count + 1` subscriptions in total.
  pub fn count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  /// Reset the retry count whenever the source emits a value.
  pub fn reset_on_success(mut self) -> Self {
    self.reset_on_success = true;
    self
  }
}

impl<Err> RetryPolicy<Err> for RetryConfig {
  fn should_retry(&self, _err: &Err, attempt: usize) -> bool { self.count.map_or(true, |count| attempt < count) }

  fn reset_on_success(&self) -> bool { self.reset_on_success }
}

/// The Retry operator struct.
pub struct Retry<Src, P> {
  source: Arc<Src>,
  policy: P,
}

impl<Src, P: Clone> Clone for Retry<Src, P> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), policy: self.policy.clone() } }
}

impl<Src, P> Retry<Src, P> {
  pub fn new(source: Src, policy: P) -> Self { Self { source: Arc::new(source), policy } }
}

impl<Src, P> Observable for Retry<Src, P>
where
  Src: Observable + 'static,
  Src::Item: Send + 'static,
  Src::Err: Send + 'static,
  P: RetryPolicy<Src::Err>,
{
  type Item = Src::Item;
  type Err = Src::Err;

  fn subscribe(&self, observer: AnyObserver<Src::Item, Src::Err>) -> AnyDisposable {
    let sink = Arc::new(Sink::new(observer));
    let run = Arc::new(RetryRun {
      source: self.source.clone(),
      policy: self.policy.clone(),
      sink: sink.clone(),
      attempts: AtomicUsize::new(0),
      upstream: Arc::new(SerialDisposable::new()),
      trampoline: Trampoline::new(),
    });
    let upstream = run.upstream.clone();
    run.resubscribe();
    Disposables::create2(sink, upstream)
  }
}

/// State of one subscription to a [`Retry`].
struct RetryRun<Src: Observable, P> {
  source: Arc<Src>,
  policy: P,
  sink: Arc<Sink<Src::Item, Src::Err>>,
  attempts: AtomicUsize,
  upstream: Arc<SerialDisposable>,
  trampoline: Trampoline,
}

impl<Src, P> RetryRun<Src, P>
where
  Src: Observable + 'static,
  Src::Item: Send + 'static,
  Src::Err: Send + 'static,
  P: RetryPolicy<Src::Err>,
{
  fn resubscribe(self: &Arc<Self>) {
    let run = self.clone();
    self.trampoline.run(move || {
      run.upstream.clear();
      if run.upstream.is_disposed() || run.sink.is_closed() {
        return;
      }
      let attempt = RetryAttempt { run: run.clone(), stopped: AtomicBool::new(false) };
      let subscription = run.source.subscribe(Arc::new(attempt));
      run.upstream.set(subscription);
    });
  }
}

/// Observer for a single subscription attempt.
struct RetryAttempt<Src: Observable, P> {
  run: Arc<RetryRun<Src, P>>,
  stopped: AtomicBool,
}

impl<Src, P> Observer<Src::Item, Src::Err> for RetryAttempt<Src, P>
where
  Src: Observable + 'static,
  Src::Item: Send + 'static,
  Src::Err: Send + 'static,
  P: RetryPolicy<Src::Err>,
{
  fn on(&self, event: Event<Src::Item, Src::Err>) {
    if self.stopped.load(Ordering::Acquire) {
      return;
    }
    match event {
      Event::Next(value) => {
        if self.run.policy.reset_on_success() {
          self.run.attempts.store(0, Ordering::Release);
        }
        self.run.sink.on(Event::Next(value));
      }
      Event::Error(err) => {
        if self.stopped.swap(true, Ordering::AcqRel) {
          return;
        }
        let attempt = self.run.attempts.load(Ordering::Acquire);
        if self.run.policy.should_retry(&err, attempt) {
          self.run.attempts.store(attempt + 1, Ordering::Release);
          tracing::trace!(attempt = attempt + 1, "retrying after error");
          self.run.resubscribe();
        } else {
          self.run.sink.on(Event::Error(err));
          self.run.upstream.dispose();
        }
      }
      Event::Completed => {
        if !self.stopped.swap(true, Ordering::AcqRel) {
          self.run.sink.on(Event::Completed);
          self.run.upstream.dispose();
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;

  use super::*;
  use crate::{
    observable::{create, throw_err, ObservableExt},
    observer::{FnObserver, ObserverExt},
    subject::PublishSubject,
  };

  fn flaky(failures: usize, attempts: Arc<AtomicUsize>) -> impl Observable<Item = usize, Err = &'static str> {
    create(move |observer: AnyObserver<usize, &'static str>| {
      let n = attempts.fetch_add(1, Ordering::SeqCst);
      observer.on_next(n);
      if n < failures {
        observer.on_error("fail");
      } else {
        observer.on_completed();
      }
      Disposables::empty()
    })
  }

  fn record<O>(source: &O) -> Arc<Mutex<Vec<Event<usize, &'static str>>>>
  where
    O: Observable<Item = usize, Err = &'static str>,
  {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    source.subscribe(Arc::new(FnObserver::new(move |e: Event<usize, &'static str>| c_log.lock().push(e))));
    log
  }

  #[test]
  fn count_is_retries_after_first_failure() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let log = record(&flaky(usize::MAX, attempts.clone()).retry(3));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(
      *log.lock(),
      vec![Event::Next(0), Event::Next(1), Event::Next(2), Event::Next(3), Event::Error("fail")]
    );
  }

  #[test]
  fn recovers_before_running_out() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let log = record(&flaky(2, attempts.clone()).retry(5));
    assert_eq!(*log.lock(), vec![Event::Next(0), Event::Next(1), Event::Next(2), Event::Completed]);
  }

  #[test]
  fn zero_retries_forwards_the_error() {
    let log = Arc::new(Mutex::new(None));
    let c_log = log.clone();
    throw_err::<i32, _>("boom").retry(0).subscribe_err(|_| {}, move |e| *c_log.lock() = Some(e));
    assert_eq!(*log.lock(), Some("boom"));
  }

  #[test]
  fn synchronous_retries_keep_the_stack_flat() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let log = record(&flaky(10_000, attempts.clone()).retry_forever());
    assert_eq!(attempts.load(Ordering::SeqCst), 10_001);
    assert_eq!(log.lock().last(), Some(&Event::Completed));
  }

  #[test]
  fn failed_subscription_is_disposed_before_resubscribing() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    let attempts = Arc::new(AtomicUsize::new(0));
    let source = create(move |observer: AnyObserver<i32, ()>| {
      let n = attempts.fetch_add(1, Ordering::SeqCst);
      c_log.lock().push(format!("subscribe {n}"));
      if n == 0 {
        observer.on_error(());
      }
      let d_log = c_log.clone();
      Disposables::create(move || d_log.lock().push(format!("dispose {n}")))
    });
    let subscription = source.retry(1).subscribe_next(|_| {});
    subscription.dispose();
    assert_eq!(*log.lock(), vec!["subscribe 0", "dispose 0", "subscribe 1", "dispose 1"]);
  }

  #[test]
  fn reset_on_success_restarts_the_count() {
    let current: Arc<Mutex<Option<AnyObserver<i32, ()>>>> = Arc::new(Mutex::new(None));
    let c_current = current.clone();
    let source = create(move |observer: AnyObserver<i32, ()>| {
      *c_current.lock() = Some(observer);
      Disposables::empty()
    });
    let emit = |event: Event<i32, ()>| {
      let observer = current.lock().clone();
      if let Some(observer) = observer {
        observer.on(event);
      }
    };

    let errors = Arc::new(Mutex::new(0));
    let c_errors = errors.clone();
    source.retry(RetryConfig::new().count(1).reset_on_success()).subscribe_err(|_| {}, move |_| {
      *c_errors.lock() += 1;
    });

    for _ in 0..5 {
      emit(Event::Next(1));
      emit(Event::Error(()));
    }
    assert_eq!(*errors.lock(), 0);

    emit(Event::Error(()));
    emit(Event::Error(()));
    assert_eq!(*errors.lock(), 1);
  }

  #[test]
  fn disposal_stops_retrying() {
    let subject = PublishSubject::<i32, ()>::new();
    let subscription = subject.clone().retry_forever().subscribe_next(|_| {});
    assert!(subject.has_observers());
    subscription.dispose();
    assert!(!subject.has_observers());
    subject.on_error(());
    assert!(!subject.has_observers());
  }
}
