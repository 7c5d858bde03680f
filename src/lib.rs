//! # rxcore: a thread-safe reactive core
//!
//! The building blocks of Reactive Extensions, safe to use from any thread:
//! cancellation trees, subjects, schedulers and shared observables.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use rxcore::prelude::*;
//!
//! let seen = Arc::new(Mutex::new(vec![]));
//! let c_seen = seen.clone();
//!
//! let subject = PublishSubject::<i32, ()>::new();
//! let subscription = subject.subscribe_next(move |v| c_seen.lock().push(v));
//!
//! subject.on_next(1);
//! subject.on_next(2);
//! subscription.dispose();
//! subject.on_next(3);
//!
//! assert_eq!(*seen.lock(), vec![1, 2]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A source; `subscribe` is its only required method |
//! | [`Observer`] | Consumes `Next`, `Error` and `Completed` events |
//! | [`Disposable`] | Handle that cancels a subscription or releases a resource |
//! | [`Scheduler`] | Decides where and when work runs |
//! | [`Subject`] | Both an observer and an observable, broadcasting to many |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ConcurrentScheduler`] on a `futures`
//!   thread pool
//! - **`timer`** (default): non-blocking delays for the concurrent scheduler
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Disposable`]: disposable::Disposable
//! [`Scheduler`]: scheduler::Scheduler
//! [`Subject`]: subject::Subject
//! [`ConcurrentScheduler`]: scheduler::ConcurrentScheduler

pub mod bag;
pub mod disposable;
pub mod error;
pub mod event;
pub mod hooks;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod testing;

mod type_hint;

pub use prelude::*;
