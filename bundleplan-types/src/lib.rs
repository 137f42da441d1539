//! Shared DTOs (schemas-as-code) for the bundleplan workspace.
//!
//! # Design constraints
//! - These types are serialized into plan artifacts consumed by an external bundler.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod diagnostic;
pub mod env;
pub mod error;
pub mod plan;
pub mod stage;
pub mod target;

pub use error::BuildError;

/// Schema identifiers.
pub mod schema {
    pub const BUNDLEPLAN_PLAN_V1: &str = "bundleplan.plan.v1";
}
