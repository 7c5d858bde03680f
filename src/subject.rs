//! Subjects: observers that are also observables, multicasting every event
//! they receive to their attached subscribers.
//!
//! | Subject | Replay on subscribe |
//! |---------|---------------------|
//! | [`PublishSubject`] | nothing |
//! | [`BehaviorSubject`] | the current value |
//! | [`ReplaySubject`] | the last N values |
//! | [`AsyncSubject`] | the last value, only after successful completion |
//!
//! Once terminated, a subject delivers exactly its terminal event (after the
//! replay, where one applies) to current and future subscribers and no
//! longer attaches anyone.

use std::sync::Arc;

use crate::{observable::Observable, observer::Observer};

mod async_subject;
mod behavior_subject;
mod publish_subject;
mod replay_subject;
mod subject_core;
mod subject_subscription;

pub use async_subject::AsyncSubject;
pub use behavior_subject::BehaviorSubject;
pub use publish_subject::PublishSubject;
pub use replay_subject::ReplaySubject;
pub use subject_subscription::SubjectSubscription;

/// An observer that is also an observable of the same events.
pub trait Subject<Item, Err>: Observer<Item, Err> + Observable<Item = Item, Err = Err> {
  /// `true` while at least one subscriber is attached.
  fn has_observers(&self) -> bool;
}

impl<Item, Err, T> Subject<Item, Err> for Arc<T>
where
  T: Subject<Item, Err> + ?Sized,
{
  #[inline]
  fn has_observers(&self) -> bool { (**self).has_observers() }
}

/// Type-erased, shareable subject.
pub type AnySubject<Item, Err> = Arc<dyn Subject<Item, Err>>;
