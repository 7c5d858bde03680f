//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Creation functions stay behind their module: `observable::create(..)`.
pub use crate::observable;
// Disposables
pub use crate::disposable::{
  AnyDisposable, BooleanDisposable, CompositeDisposable, Disposable, DisposableExt, Disposables,
  DisposeBag, DisposeGuard, RefCountDisposable, ScheduledDisposable, SerialDisposable,
  SingleAssignmentDisposable,
};
// Core traits
pub use crate::observable::{
  BoxedObservable, Connectable, ConnectableObservable, Observable, ObservableExt,
};
pub use crate::observer::{AnyObserver, CallbackObserver, FnObserver, Observer, ObserverExt};
// Operators
pub use crate::ops::{
  ref_count::RefCount,
  retry::{RetryConfig, RetryForever, RetryPolicy},
  share::SubjectLifetimeScope,
};
// Schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ConcurrentScheduler;
pub use crate::scheduler::{
  AnyScheduler, CurrentThreadScheduler, ImmediateScheduler, Scheduler, SchedulerExt,
  SerialScheduler, TestScheduler, VirtualTimeScheduler,
};
// Subject
pub use crate::subject::{
  AnySubject, AsyncSubject, BehaviorSubject, PublishSubject, ReplaySubject, Subject,
};
pub use crate::{error::RxError, event::Event};
