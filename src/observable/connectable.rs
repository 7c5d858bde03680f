use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc, Weak,
};

use parking_lot::Mutex;

use crate::{
  disposable::{AnyDisposable, Disposable, SingleAssignmentDisposable},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer},
  ops::ref_count::RefCount,
  subject::Subject,
};

/// An observable whose upstream subscription is started explicitly.
pub trait Connectable: Observable + Sized {
  /// Subscribe the source to the multicast subject. Calling it while
  /// connected returns the live connection.
  fn connect(&self) -> AnyDisposable;

  /// Connect on the first subscriber and disconnect after the last one
  /// leaves.
  fn ref_count(self) -> RefCount<Self> { RefCount::new(self) }
}

/// Multicasts one upstream subscription through a subject.
///
/// Subscribers attach to the subject; nothing flows until
/// [`connect`](Connectable::connect). Disposing the connection disposes the
/// upstream subscription only, the subscribers stay attached.
pub struct ConnectableObservable<Src, S> {
  inner: Arc<Inner<Src, S>>,
}

struct Inner<Src, S> {
  source: Src,
  factory: Box<dyn Fn() -> S + Send + Sync>,
  reset_on_disconnect: bool,
  state: Mutex<State<S>>,
}

struct State<S> {
  subject: Option<S>,
  connection: Option<Arc<Connection>>,
  next_id: u64,
}

impl<Src, S> Clone for ConnectableObservable<Src, S> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Src, S> ConnectableObservable<Src, S>
where
  Src: Observable + 'static,
  Src::Item: 'static,
  Src::Err: 'static,
  S: Subject<Src::Item, Src::Err> + Clone + 'static,
{
  /// Multicast through `subject` for every connection.
  pub fn new(source: Src, subject: S) -> Self {
    let template = subject.clone();
    Self::build(source, Box::new(move || template.clone()), false, Some(subject))
  }

  /// Multicast through a subject from `factory`. The subject is dropped when
  /// a connection ends, so every connection gets a fresh one.
  pub fn with_factory<F>(source: Src, factory: F) -> Self
  where
    F: Fn() -> S + Send + Sync + 'static,
  {
    Self::build(source, Box::new(factory), true, None)
  }

  fn build(
    source: Src, factory: Box<dyn Fn() -> S + Send + Sync>, reset_on_disconnect: bool, subject: Option<S>,
  ) -> Self {
    let state = State { subject, connection: None, next_id: 0 };
    Self { inner: Arc::new(Inner { source, factory, reset_on_disconnect, state: Mutex::new(state) }) }
  }

  pub fn is_connected(&self) -> bool { self.inner.state.lock().connection.is_some() }

  fn subject(&self) -> S {
    let mut state = self.inner.state.lock();
    state.subject.get_or_insert_with(|| (self.inner.factory)()).clone()
  }
}

impl<Src, S> Observable for ConnectableObservable<Src, S>
where
  Src: Observable + 'static,
  Src::Item: 'static,
  Src::Err: 'static,
  S: Subject<Src::Item, Src::Err> + Clone + 'static,
{
  type Item = Src::Item;
  type Err = Src::Err;

  fn subscribe(&self, observer: AnyObserver<Src::Item, Src::Err>) -> AnyDisposable {
    self.subject().subscribe(observer)
  }
}

impl<Src, S> Connectable for ConnectableObservable<Src, S>
where
  Src: Observable + 'static,
  Src::Item: 'static,
  Src::Err: 'static,
  S: Subject<Src::Item, Src::Err> + Clone + 'static,
{
  fn connect(&self) -> AnyDisposable {
    let (connection, subject) = {
      let mut state = self.inner.state.lock();
      if let Some(connection) = &state.connection {
        return connection.clone();
      }
      let subject = state.subject.get_or_insert_with(|| (self.inner.factory)()).clone();
      let id = state.next_id;
      state.next_id += 1;
      let owner: Arc<dyn ConnectionOwner> = self.inner.clone();
      let connection = Arc::new(Connection {
        id,
        owner: Arc::downgrade(&owner),
        upstream: SingleAssignmentDisposable::new(),
        disposed: AtomicBool::new(false),
      });
      state.connection = Some(connection.clone());
      (connection, subject)
    };

    tracing::debug!(connection = connection.id, "connectable connected");
    let observer = ConnectionObserver { subject, connection: connection.clone() };
    let upstream = self.inner.source.subscribe(Arc::new(observer));
    connection.upstream.set(upstream);
    connection
  }
}

trait ConnectionOwner: Send + Sync {
  fn release(&self, id: u64);
}

impl<Src, S> ConnectionOwner for Inner<Src, S>
where
  Src: Send + Sync,
  S: Send,
{
  fn release(&self, id: u64) {
    let (connection, subject) = {
      let mut state = self.state.lock();
      if state.connection.as_ref().map(|c| c.id) != Some(id) {
        return;
      }
      let subject = if self.reset_on_disconnect { state.subject.take() } else { None };
      (state.connection.take(), subject)
    };
    tracing::debug!(connection = id, "connectable disconnected");
    drop(connection);
    drop(subject);
  }
}

/// One connection of a [`ConnectableObservable`].
struct Connection {
  id: u64,
  owner: Weak<dyn ConnectionOwner>,
  upstream: SingleAssignmentDisposable,
  disposed: AtomicBool,
}

impl Disposable for Connection {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    if let Some(owner) = self.owner.upgrade() {
      owner.release(self.id);
    }
    self.upstream.dispose();
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

/// Feeds the subject for one connection. A terminal event ends the
/// connection before it reaches the subject.
struct ConnectionObserver<S> {
  subject: S,
  connection: Arc<Connection>,
}

impl<Item, Err, S> Observer<Item, Err> for ConnectionObserver<S>
where
  S: Subject<Item, Err>,
{
  fn on(&self, event: Event<Item, Err>) {
    if self.connection.is_disposed() {
      return;
    }
    if event.is_stop_event() {
      self.connection.dispose();
    }
    self.subject.on(event);
  }
}
