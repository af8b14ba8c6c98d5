use std::cmp::Ordering;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::LeaderboardConfig;
use crate::reputation::{self, Tier};
use crate::store::ActorStore;

#[derive(Debug, Clone, Default)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
    pub tier: Option<Tier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub agent_id: String,
    pub name: String,
    pub tier: Tier,
    pub tier_name: &'static str,
    pub trust_score: u8,
    pub token_balance: f64,
    pub lifetime_earned: f64,
    pub contribution_count: u32,
}

/// Trust leaderboard - 信頼スコアランキング
pub struct Leaderboard {
    config: LeaderboardConfig,
}

impl Leaderboard {
    pub fn new(config: &LeaderboardConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Effective limit: requested value, or the default, capped at max_limit
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit.max(1))
    }

    /// Score every agent and rank them.
    ///
    /// Order: trust score desc, lifetime earned desc, agent id asc.
    /// Returns the ranked page and the number of agents that matched the filter.
    pub fn rank(
        &self,
        store: &ActorStore,
        now: DateTime<Utc>,
        query: &LeaderboardQuery,
    ) -> (Vec<LeaderboardEntry>, usize) {
        let mut entries: Vec<LeaderboardEntry> = store
            .agent_ids()
            .into_iter()
            .filter_map(|id| {
                let agent = store.agent(&id)?;
                if query.tier.is_some_and(|t| t != agent.tier) {
                    return None;
                }
                let snapshot = store.snapshot(&id)?;
                let report = reputation::compute(&snapshot, now);
                Some(LeaderboardEntry {
                    rank: 0,
                    agent_id: agent.id,
                    name: agent.name,
                    tier: agent.tier,
                    tier_name: agent.tier.name(),
                    trust_score: report.overall_score,
                    token_balance: snapshot.token_balance,
                    lifetime_earned: snapshot.lifetime_earned,
                    contribution_count: snapshot.contribution_count,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.trust_score
                .cmp(&a.trust_score)
                .then_with(|| {
                    b.lifetime_earned
                        .partial_cmp(&a.lifetime_earned)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });

        let total = entries.len();
        entries.truncate(self.effective_limit(query.limit));
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }

        (entries, total)
    }
}
