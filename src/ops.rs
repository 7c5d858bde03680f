//! Operators. Each is reachable as a method on
//! [`ObservableExt`](crate::observable::ObservableExt) or
//! [`Connectable`](crate::observable::Connectable); the types live here.

pub mod catch;
pub mod observe_on;
pub mod ref_count;
pub mod retry;
pub mod share;
pub mod subscribe_on;
mod trampoline;
