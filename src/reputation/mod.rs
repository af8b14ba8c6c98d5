//! Reputation scoring
//!
//! Shared by the single-agent trust endpoint and the leaderboard so the
//! two never drift apart.

pub mod accuracy;
pub mod aggregator;
pub mod factors;
pub mod snapshot;

pub use aggregator::{compute, TrustReport};
pub use snapshot::{ActorSnapshot, AssessmentRecord, Tier};
