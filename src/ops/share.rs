use std::sync::Arc;

use crate::{
  observable::{Connectable, ConnectableObservable, Observable},
  ops::ref_count::RefCount,
  subject::{AnySubject, PublishSubject, ReplaySubject},
};

/// How long the subject behind a shared observable lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SubjectLifetimeScope {
  /// One subject for the lifetime of the shared observable. Late
  /// subscribers, even after a reconnect, see its replay buffer and its
  /// terminal state.
  Forever,
  /// A fresh subject for every connection.
  #[default]
  WhileConnected,
}

/// An observable shared through a ref-counted multicast.
pub type Share<Src> = RefCount<
  ConnectableObservable<Src, AnySubject<<Src as Observable>::Item, <Src as Observable>::Err>>,
>;

/// Share one subscription to `source` among all subscribers, replaying the
/// last `replay` values to each new subscriber.
pub fn share_replay<Src>(source: Src, replay: usize, scope: SubjectLifetimeScope) -> Share<Src>
where
  Src: Observable + 'static,
  Src::Item: Clone + Send + Sync + 'static,
  Src::Err: Clone + Send + Sync + 'static,
{
  let make_subject = move || -> AnySubject<Src::Item, Src::Err> {
    if replay > 0 {
      Arc::new(ReplaySubject::<Src::Item, Src::Err>::with_buffer_size(replay))
    } else {
      Arc::new(PublishSubject::<Src::Item, Src::Err>::new())
    }
  };
  let connectable = match scope {
    SubjectLifetimeScope::Forever => ConnectableObservable::new(source, make_subject()),
    SubjectLifetimeScope::WhileConnected => ConnectableObservable::with_factory(source, make_subject),
  };
  connectable.ref_count()
}
