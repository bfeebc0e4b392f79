//! Request classification subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers, form values)
//!     → router.rs (classification state machine)
//!         CORS check → normalize → identity → matcher.rs (version)
//!         → sub path → kind derivation
//!     → context.rs (RequestContext, built fresh per request)
//!     → QueryDispatcher
//!     → Response, or error.rs (ClassifyError → status + plain text)
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - Deterministic: same input always classifies the same way
//! - No per-request state on shared objects

pub mod context;
pub mod error;
pub mod matcher;
pub mod router;

pub use context::{decode_path, normalize_path, FormValues, RequestContext, RequestKind};
pub use error::ClassifyError;
pub use matcher::{PatternTable, VersionError, VersionMatch};
pub use router::RequestClassifier;
