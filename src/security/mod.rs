//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → identity.rs (resolve caller ID from request parts)
//!     → Ok(Some(id)) / Ok(None): classification continues
//!     → Err(IdentityError):      401 with the resolver's message
//! ```
//!
//! # Design Decisions
//! - Fail closed: any resolver error terminates the request
//! - No trust in client input: malformed IDs are errors, not anonymous

pub mod identity;

pub use identity::{HeaderIdentity, IdentityError, IdentityResolver};
