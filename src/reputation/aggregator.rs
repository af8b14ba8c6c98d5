use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use super::accuracy::{self, AccuracyDetails};
use super::factors::{self, Factor};
use super::snapshot::ActorSnapshot;

/// One row of the trust breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore<V> {
    pub value: V,
    pub score: u8,
    pub weight: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AccuracyDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    /// Tier level (1-4)
    pub tier: FactorScore<u8>,
    pub contributions: FactorScore<u32>,
    /// Accuracy percentage, null when the actor has nothing comparable
    pub assessment_accuracy: FactorScore<Option<f64>>,
    pub tokens: FactorScore<f64>,
    /// Days since last activity
    pub activity: FactorScore<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustReport {
    #[serde(rename = "trustScore")]
    pub overall_score: u8,
    pub breakdown: Breakdown,
}

/// Compute the composite trust score for one actor.
///
/// Pure: the result depends only on the snapshot and `now`.
///   overall = round(Σ clamp(score_i, 0, 100) * weight_i)
pub fn compute(snapshot: &ActorSnapshot, now: DateTime<Utc>) -> TrustReport {
    let accuracy_estimate = accuracy::estimate(&snapshot.assessments);
    let accuracy = accuracy_estimate.map(|e| e.accuracy);
    let days_idle = factors::days_since_active(snapshot.last_active_at, now);

    // Same order as Factor::ALL
    let scores = [
        factors::tier_score(snapshot.tier),
        factors::contribution_score(snapshot.contribution_count),
        factors::accuracy_score(accuracy),
        factors::token_score(snapshot.token_balance),
        factors::activity_score(days_idle),
    ];

    let weighted: f64 = Factor::ALL
        .iter()
        .zip(scores)
        .map(|(factor, score)| {
            trace!(factor = factor.key(), score, weight = factor.weight(), "factor scored");
            score.clamp(0.0, 100.0) * factor.weight()
        })
        .sum();
    let overall_score = to_score(weighted);

    let [tier, contributions, assessment_accuracy, tokens, activity] = scores;

    TrustReport {
        overall_score,
        breakdown: Breakdown {
            tier: row(Factor::Tier, snapshot.tier.level(), tier, None),
            contributions: row(
                Factor::Contributions,
                snapshot.contribution_count,
                contributions,
                None,
            ),
            assessment_accuracy: row(
                Factor::AssessmentAccuracy,
                accuracy.map(|a| accuracy::round_to(a, 1)),
                assessment_accuracy,
                accuracy_estimate.map(|e| e.details),
            ),
            tokens: row(Factor::Tokens, snapshot.token_balance, tokens, None),
            activity: row(Factor::Activity, days_idle, activity, None),
        },
    }
}

fn row<V>(factor: Factor, value: V, score: f64, details: Option<AccuracyDetails>) -> FactorScore<V> {
    FactorScore {
        value,
        score: to_score(score),
        weight: factor.weight_label(),
        details,
    }
}

/// Round and clamp into 0-100. NaN collapses to 0.
fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
