use std::sync::atomic::{AtomicU64, Ordering};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::reputation::{ActorSnapshot, AssessmentRecord, Tier};

/// Assessments are scored on a 0-10 scale
pub const MIN_ASSESSMENT_SCORE: f64 = 0.0;
pub const MAX_ASSESSMENT_SCORE: f64 = 10.0;

/// Agent profile as known to the marketplace
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub token_balance: f64,
    pub lifetime_earned: f64,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
    /// Maintained by the store, ignored on upsert
    pub contribution_count: u32,
}

/// A shared pattern. Assessments are made against these.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct AssessmentEntry {
    contribution_id: String,
    assessor_id: String,
    score: f64,
}

/// Running total of every score a contribution has received
#[derive(Debug, Clone, Copy, Default)]
struct ScoreTally {
    sum: f64,
    count: u32,
}

impl ScoreTally {
    fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// In-memory agent store - スナップショット組み立て役
///
/// Holds agents, contributions and the assessment ledger, and joins them
/// into ActorSnapshots for the reputation aggregator.
///
/// Lock order: ledger first, then any DashMap shard. Never hold a DashMap
/// ref while taking the ledger lock.
pub struct ActorStore {
    agents: DashMap<String, AgentRecord>,
    contributions: DashMap<String, ContributionRecord>,
    tallies: DashMap<String, ScoreTally>,
    /// Append-only assessment ledger
    ledger: RwLock<Vec<AssessmentEntry>>,
    /// assessor id -> ledger indices
    by_assessor: DashMap<String, Vec<usize>>,
    snapshots_built: AtomicU64,
}

impl ActorStore {
    pub fn new() -> Self {
        Self {
            agents: DashMap::new(),
            contributions: DashMap::new(),
            tallies: DashMap::new(),
            ledger: RwLock::new(Vec::new()),
            by_assessor: DashMap::new(),
            snapshots_built: AtomicU64::new(0),
        }
    }

    /// Insert or replace an agent profile. The contribution count is kept.
    pub fn upsert_agent(&self, mut agent: AgentRecord) {
        if let Some(existing) = self.agents.get(&agent.id) {
            agent.contribution_count = existing.contribution_count;
        } else {
            agent.contribution_count = 0;
        }
        debug!("Upsert agent {} (tier {})", agent.id, agent.tier.level());
        self.agents.insert(agent.id.clone(), agent);
    }

    /// Register a contribution and credit it to its author
    pub fn record_contribution(&self, contribution: ContributionRecord) -> anyhow::Result<()> {
        if self.contributions.contains_key(&contribution.id) {
            anyhow::bail!("Contribution '{}' already exists", contribution.id);
        }

        {
            let mut author = self.agents.get_mut(&contribution.author_id).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown author '{}' for contribution '{}'",
                    contribution.author_id,
                    contribution.id
                )
            })?;
            author.contribution_count = author.contribution_count.saturating_add(1);
            bump_last_active(&mut author, contribution.created_at);
        }

        self.tallies.insert(contribution.id.clone(), ScoreTally::default());
        self.contributions.insert(contribution.id.clone(), contribution);
        Ok(())
    }

    /// Record one assessor's score for a contribution.
    ///
    /// Each assessor may assess a contribution once. The score feeds the
    /// contribution's population average, which includes this assessor.
    pub fn record_assessment(
        &self,
        contribution_id: &str,
        assessor_id: &str,
        score: f64,
        assessed_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        if !(MIN_ASSESSMENT_SCORE..=MAX_ASSESSMENT_SCORE).contains(&score) {
            anyhow::bail!(
                "Assessment score {} out of range ({}-{})",
                score,
                MIN_ASSESSMENT_SCORE,
                MAX_ASSESSMENT_SCORE
            );
        }
        if !self.contributions.contains_key(contribution_id) {
            anyhow::bail!("Unknown contribution '{}'", contribution_id);
        }
        if !self.agents.contains_key(assessor_id) {
            anyhow::bail!("Unknown assessor '{}'", assessor_id);
        }

        let mut ledger = self.ledger.write();

        if let Some(indices) = self.by_assessor.get(assessor_id) {
            if indices.iter().any(|&i| ledger[i].contribution_id == contribution_id) {
                anyhow::bail!(
                    "Agent '{}' already assessed contribution '{}'",
                    assessor_id,
                    contribution_id
                );
            }
        }

        ledger.push(AssessmentEntry {
            contribution_id: contribution_id.to_string(),
            assessor_id: assessor_id.to_string(),
            score,
        });
        let index = ledger.len() - 1;

        {
            let mut tally = self.tallies.entry(contribution_id.to_string()).or_default();
            tally.sum += score;
            tally.count += 1;
        }
        self.by_assessor
            .entry(assessor_id.to_string())
            .or_default()
            .push(index);

        if let (Some(ts), Some(mut assessor)) = (assessed_at, self.agents.get_mut(assessor_id)) {
            bump_last_active(&mut assessor, ts);
        }

        Ok(())
    }

    /// Current average of every score the contribution has received
    pub fn population_average(&self, contribution_id: &str) -> Option<f64> {
        self.tallies.get(contribution_id).and_then(|t| t.average())
    }

    pub fn agent(&self, agent_id: &str) -> Option<AgentRecord> {
        self.agents.get(agent_id).map(|a| a.clone())
    }

    pub fn agent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.agents.iter().map(|a| a.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Assemble the aggregator input for one agent.
    /// Returns None if the agent is unknown.
    pub fn snapshot(&self, agent_id: &str) -> Option<ActorSnapshot> {
        let agent = self.agent(agent_id)?;

        let assessments = {
            let ledger = self.ledger.read();
            let records: Vec<AssessmentRecord> = match self.by_assessor.get(agent_id) {
                Some(indices) => indices
                    .iter()
                    .map(|&i| {
                        let entry = &ledger[i];
                        AssessmentRecord::new(
                            entry.score,
                            self.population_average(&entry.contribution_id),
                        )
                    })
                    .collect(),
                None => Vec::new(),
            };
            records
        };

        self.snapshots_built.fetch_add(1, Ordering::Relaxed);

        Some(ActorSnapshot {
            tier: agent.tier,
            contribution_count: agent.contribution_count,
            token_balance: agent.token_balance,
            lifetime_earned: agent.lifetime_earned,
            last_active_at: agent.last_active_at,
            assessments,
        })
    }

    pub fn get_stats(&self) -> serde_json::Value {
        let ledger = self.ledger.read();
        let assessors = {
            let mut ids: Vec<&str> = ledger.iter().map(|e| e.assessor_id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            ids.len()
        };
        serde_json::json!({
            "agents": self.agents.len(),
            "contributions": self.contributions.len(),
            "assessments": ledger.len(),
            "assessors": assessors,
            "snapshots_built": self.snapshots_built.load(Ordering::Relaxed),
        })
    }
}

impl Default for ActorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn bump_last_active(agent: &mut AgentRecord, ts: DateTime<Utc>) {
    if agent.last_active_at.map_or(true, |last| ts > last) {
        agent.last_active_at = Some(ts);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn agent(id: &str, tier: u8) -> AgentRecord {
        AgentRecord {
            id: id.to_string(),
            name: format!("agent {}", id),
            tier: Tier::from_level(tier),
            token_balance: 0.0,
            lifetime_earned: 0.0,
            created_at: Utc::now() - Duration::days(30),
            last_active_at: None,
            contribution_count: 0,
        }
    }

    pub(crate) fn contribution(id: &str, author: &str) -> ContributionRecord {
        ContributionRecord {
            id: id.to_string(),
            author_id: author.to_string(),
            title: format!("pattern {}", id),
            created_at: Utc::now() - Duration::days(10),
        }
    }

    #[test]
    fn test_contribution_counts_toward_author() {
        let store = ActorStore::new();
        store.upsert_agent(agent("a", 2));
        store.record_contribution(contribution("p1", "a")).unwrap();
        store.record_contribution(contribution("p2", "a")).unwrap();

        let snap = store.snapshot("a").unwrap();
        assert_eq!(snap.contribution_count, 2);
        assert!(snap.last_active_at.is_some());
    }

    #[test]
    fn test_upsert_keeps_contribution_count() {
        let store = ActorStore::new();
        store.upsert_agent(agent("a", 3));
        store.record_contribution(contribution("p1", "a")).unwrap();

        let mut updated = agent("a", 1);
        updated.contribution_count = 99;
        store.upsert_agent(updated);

        let record = store.agent("a").unwrap();
        assert_eq!(record.tier, Tier::Founding);
        assert_eq!(record.contribution_count, 1);
    }

    #[test]
    fn test_rejects_unknown_references() {
        let store = ActorStore::new();
        store.upsert_agent(agent("a", 2));
        assert!(store.record_contribution(contribution("p1", "ghost")).is_err());

        store.record_contribution(contribution("p1", "a")).unwrap();
        assert!(store.record_contribution(contribution("p1", "a")).is_err());
        assert!(store.record_assessment("nope", "a", 5.0, None).is_err());
        assert!(store.record_assessment("p1", "ghost", 5.0, None).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_and_duplicate_scores() {
        let store = ActorStore::new();
        store.upsert_agent(agent("a", 2));
        store.record_contribution(contribution("p1", "a")).unwrap();

        assert!(store.record_assessment("p1", "a", 10.5, None).is_err());
        assert!(store.record_assessment("p1", "a", -1.0, None).is_err());
        assert!(store.record_assessment("p1", "a", f64::NAN, None).is_err());

        store.record_assessment("p1", "a", 7.0, None).unwrap();
        assert!(store.record_assessment("p1", "a", 6.0, None).is_err());
    }

    #[test]
    fn test_population_average_includes_own_score() {
        let store = ActorStore::new();
        store.upsert_agent(agent("author", 2));
        store.upsert_agent(agent("x", 3));
        store.upsert_agent(agent("y", 3));
        store.record_contribution(contribution("p1", "author")).unwrap();

        assert_eq!(store.population_average("p1"), None);

        store.record_assessment("p1", "x", 8.0, None).unwrap();
        store.record_assessment("p1", "y", 4.0, None).unwrap();
        assert_eq!(store.population_average("p1"), Some(6.0));

        let snap = store.snapshot("x").unwrap();
        assert_eq!(snap.assessments, vec![AssessmentRecord::new(8.0, Some(6.0))]);
    }

    #[test]
    fn test_assessment_bumps_last_active() {
        let store = ActorStore::new();
        store.upsert_agent(agent("author", 2));
        store.upsert_agent(agent("x", 3));
        store.record_contribution(contribution("p1", "author")).unwrap();

        let when = Utc::now() - Duration::days(1);
        store.record_assessment("p1", "x", 5.0, Some(when)).unwrap();
        assert_eq!(store.agent("x").unwrap().last_active_at, Some(when));
    }

    #[test]
    fn test_older_activity_does_not_rewind() {
        let mut a = agent("a", 2);
        let recent = Utc::now();
        a.last_active_at = Some(recent);
        bump_last_active(&mut a, recent - Duration::days(5));
        assert_eq!(a.last_active_at, Some(recent));
    }

    #[test]
    fn test_unknown_agent_has_no_snapshot() {
        let store = ActorStore::new();
        assert!(store.snapshot("ghost").is_none());
    }

    #[test]
    fn test_stats() {
        let store = ActorStore::new();
        store.upsert_agent(agent("a", 1));
        store.upsert_agent(agent("b", 2));
        store.record_contribution(contribution("p1", "a")).unwrap();
        store.record_assessment("p1", "a", 9.0, None).unwrap();
        store.record_assessment("p1", "b", 7.0, None).unwrap();

        let stats = store.get_stats();
        assert_eq!(stats["agents"], 2);
        assert_eq!(stats["contributions"], 1);
        assert_eq!(stats["assessments"], 2);
        assert_eq!(stats["assessors"], 2);
    }
}
