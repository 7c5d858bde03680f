//! Error recovery by switching to another observable.

use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use super::trampoline::Trampoline;
use crate::{
  disposable::{AnyDisposable, Disposable, Disposables, SerialDisposable},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer, Sink},
};

/// On error, continues with the observable produced by a handler.
///
/// Only errors from the source are caught; errors from the replacement reach
/// the downstream observer.
pub struct Catch<Src, F> {
  source: Arc<Src>,
  handler: Arc<F>,
}

impl<Src, F> Clone for Catch<Src, F> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), handler: self.handler.clone() } }
}

impl<Src, F> Catch<Src, F> {
  pub fn new(source: Src, handler: F) -> Self { Self { source: Arc::new(source), handler: Arc::new(handler) } }
}

impl<Src, F, R> Observable for Catch<Src, F>
where
  Src: Observable + 'static,
  Src::Item: Send + 'static,
  Src::Err: Send + 'static,
  F: Fn(Src::Err) -> R + Send + Sync + 'static,
  R: Observable<Item = Src::Item, Err = Src::Err> + 'static,
{
  type Item = Src::Item;
  type Err = Src::Err;

  fn subscribe(&self, observer: AnyObserver<Src::Item, Src::Err>) -> AnyDisposable {
    let sink = Arc::new(Sink::new(observer));
    let upstream = Arc::new(SerialDisposable::new());
    let run = Arc::new(CatchRun {
      handler: self.handler.clone(),
      sink: sink.clone(),
      upstream: upstream.clone(),
      trampoline: Trampoline::new(),
    });
    let (c_run, source) = (run.clone(), self.source.clone());
    run.trampoline.run(move || {
      let first = CatchObserver { run: c_run.clone(), stopped: AtomicBool::new(false) };
      let subscription = source.subscribe(Arc::new(first));
      c_run.upstream.set(subscription);
    });
    Disposables::create2(sink, upstream)
  }
}

struct CatchRun<Item, Err, F> {
  handler: Arc<F>,
  sink: Arc<Sink<Item, Err>>,
  upstream: Arc<SerialDisposable>,
  trampoline: Trampoline,
}

struct CatchObserver<Item, Err, F> {
  run: Arc<CatchRun<Item, Err, F>>,
  stopped: AtomicBool,
}

impl<Item, Err, F, R> Observer<Item, Err> for CatchObserver<Item, Err, F>
where
  Item: Send + 'static,
  Err: Send + 'static,
  F: Fn(Err) -> R + Send + Sync + 'static,
  R: Observable<Item = Item, Err = Err> + 'static,
{
  fn on(&self, event: Event<Item, Err>) {
    if self.stopped.load(Ordering::Acquire) {
      return;
    }
    match event {
      Event::Error(err) => {
        if self.stopped.swap(true, Ordering::AcqRel) {
          return;
        }
        let replacement = (self.run.handler)(err);
        let run = self.run.clone();
        self.run.trampoline.run(move || {
          run.upstream.clear();
          if run.upstream.is_disposed() || run.sink.is_closed() {
            return;
          }
          let subscription = replacement.subscribe(run.sink.clone());
          run.upstream.set(subscription);
        });
      }
      terminal @ Event::Completed => {
        self.stopped.store(true, Ordering::Release);
        self.run.sink.on(terminal);
      }
      next => self.run.sink.on(next),
    }
  }
}

/// On error, emits a fallback value and completes.
pub struct CatchAndReturn<Src: Observable> {
  source: Src,
  value: Src::Item,
}

impl<Src> Clone for CatchAndReturn<Src>
where
  Src: Observable + Clone,
  Src::Item: Clone,
{
  fn clone(&self) -> Self { Self { source: self.source.clone(), value: self.value.clone() } }
}

impl<Src: Observable> CatchAndReturn<Src> {
  pub fn new(source: Src, value: Src::Item) -> Self { Self { source, value } }
}

impl<Src> Observable for CatchAndReturn<Src>
where
  Src: Observable,
  Src::Item: Clone + Send + Sync + 'static,
  Src::Err: Send + 'static,
{
  type Item = Src::Item;
  type Err = Src::Err;

  fn subscribe(&self, observer: AnyObserver<Src::Item, Src::Err>) -> AnyDisposable {
    let sink = Arc::new(Sink::new(observer));
    let fallback = Fallback { sink: sink.clone(), value: self.value.clone() };
    let upstream = self.source.subscribe(Arc::new(fallback));
    Disposables::create2(sink, upstream)
  }
}

struct Fallback<Item, Err> {
  sink: Arc<Sink<Item, Err>>,
  value: Item,
}

impl<Item, Err> Observer<Item, Err> for Fallback<Item, Err>
where
  Item: Clone + Send + Sync,
  Err: Send,
{
  fn on(&self, event: Event<Item, Err>) {
    match event {
      Event::Error(_) => {
        self.sink.on(Event::Next(self.value.clone()));
        self.sink.on(Event::Completed);
      }
      event => self.sink.on(event),
    }
  }
}
