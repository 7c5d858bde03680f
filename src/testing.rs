//! Building blocks for virtual-time tests.
//!
//! Events are recorded together with the virtual tick they happened at, so a
//! whole scenario can be asserted with a single `assert_eq!`:
//!
//! ```rust
//! use rxcore::{prelude::*, testing::*};
//!
//! let scheduler = TestScheduler::new();
//! let xs = scheduler.create_hot_observable(vec![next(150, 1), next(210, 2), completed(300)]);
//! let observer = scheduler.start({
//!   let xs = xs.clone();
//!   move || xs
//! });
//!
//! let expected: Vec<Recorded<Event<i32, ()>>> = vec![next(210, 2), completed(300)];
//! assert_eq!(observer.events(), expected);
//! assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 1000)]);
//! ```

mod cold_observable;
mod hot_observable;
mod recorded;
mod testable_observer;

pub use cold_observable::ColdObservable;
pub use hot_observable::HotObservable;
pub use recorded::{completed, error, next, Recorded, SubscriptionLog};
pub use testable_observer::TestableObserver;
