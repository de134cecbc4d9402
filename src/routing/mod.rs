//! Virtual host routing.
//!
//! # Data Flow
//! ```text
//! RequestParams (hostname, port, path)
//!     → router.rs (site lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched Site, default Site, or None
//!
//! Site Compilation (at startup):
//!     SiteConfig[]
//!     → Sort by priority
//!     → Compile matchers
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Sites compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same site
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod router;

pub use router::{Router, Site};
