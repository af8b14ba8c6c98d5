//! Factor scorers
//!
//! Each scorer maps one raw input to a 0-100 sub-score. They are total:
//! out-of-range inputs are clamped, never rejected.

use chrono::{DateTime, Utc};

use super::snapshot::Tier;

/// Accuracy substituted when an actor has no comparable assessments
pub const NEUTRAL_ACCURACY: f64 = 50.0;

/// Days reported for an actor that has never been active
pub const NEVER_ACTIVE_DAYS: i64 = 999;

const SECONDS_PER_DAY: i64 = 86_400;

/// The five reputation factors and their fixed weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    Tier,
    Contributions,
    AssessmentAccuracy,
    Tokens,
    Activity,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::Tier,
        Factor::Contributions,
        Factor::AssessmentAccuracy,
        Factor::Tokens,
        Factor::Activity,
    ];

    /// Weight in whole percent. All five sum to 100.
    pub fn weight_percent(&self) -> u8 {
        match self {
            Factor::Tier => 40,
            Factor::Contributions => 20,
            Factor::AssessmentAccuracy => 20,
            Factor::Tokens => 10,
            Factor::Activity => 10,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight_percent() as f64 / 100.0
    }

    /// Weight as shown in the breakdown, e.g. "40%"
    pub fn weight_label(&self) -> &'static str {
        match self {
            Factor::Tier => "40%",
            Factor::Contributions | Factor::AssessmentAccuracy => "20%",
            Factor::Tokens | Factor::Activity => "10%",
        }
    }

    /// Key used in the JSON breakdown
    pub fn key(&self) -> &'static str {
        match self {
            Factor::Tier => "tier",
            Factor::Contributions => "contributions",
            Factor::AssessmentAccuracy => "assessmentAccuracy",
            Factor::Tokens => "tokens",
            Factor::Activity => "activity",
        }
    }
}

pub fn tier_score(tier: Tier) -> f64 {
    match tier {
        Tier::Founding => 100.0,
        Tier::Trusted => 70.0,
        Tier::General | Tier::Unclaimed => 40.0,
    }
}

/// 10 points per contribution, saturating at 10 contributions
pub fn contribution_score(contribution_count: u32) -> f64 {
    (contribution_count as f64 * 10.0).min(100.0)
}

/// Accuracy passes through; unknown accuracy scores as neutral, not zero
pub fn accuracy_score(accuracy: Option<f64>) -> f64 {
    accuracy.unwrap_or(NEUTRAL_ACCURACY).clamp(0.0, 100.0)
}

/// A balance of 100 tokens saturates the factor
pub fn token_score(token_balance: f64) -> f64 {
    ((token_balance / 100.0) * 100.0).clamp(0.0, 100.0)
}

/// Whole days since the actor was last active.
/// Future timestamps count as today; no timestamp counts as 999 days.
pub fn days_since_active(last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match last_active_at {
        Some(ts) => {
            let secs = (now - ts).num_seconds().max(0);
            secs / SECONDS_PER_DAY
        }
        None => NEVER_ACTIVE_DAYS,
    }
}

/// Loses 2 points per idle day, zero after 50 days
pub fn activity_score(days_since_active: i64) -> f64 {
    (100.0 - days_since_active as f64 * 2.0).clamp(0.0, 100.0)
}
