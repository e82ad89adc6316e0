//! External device collaborators
//!
//! The engine never touches the OS directly. Two narrow traits stand in for
//! the platform: a usage counter that reports accumulated learning seconds
//! for the current day, and a restriction control that accepts the lock
//! state. Both are injected; failures at this boundary are observability
//! concerns, never engine failures.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
