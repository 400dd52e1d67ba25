//! Domain types for the gatekeeper.
//!
//! Identities and decisions that outlive a single authentication attempt.

mod decision;
mod identity;

pub use decision::*;
pub use identity::*;
