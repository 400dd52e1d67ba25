//! Request-scoped session binding.
//!
//! The store itself is an external capability; this module only defines its
//! interface, a process-local default, and the binder that writes identities.

mod binder;
mod store;

pub use binder::*;
pub use store::*;
