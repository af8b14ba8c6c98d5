use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::reputation::Tier;
use crate::store::{ActorStore, AgentRecord, ContributionRecord};

/// Dataset file format
///
/// ```json
/// {
///   "agents": [{ "id": "a1", "name": "scout", "tier": 2, "tokenBalance": 50 }],
///   "contributions": [{ "id": "p1", "authorId": "a1", "title": "retry loop" }],
///   "assessments": [{ "contributionId": "p1", "assessorId": "a1", "score": 8 }]
/// }
/// ```
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Dataset {
    pub agents: Vec<SeedAgent>,
    pub contributions: Vec<SeedContribution>,
    pub assessments: Vec<SeedAssessment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAgent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub token_balance: f64,
    #[serde(default)]
    pub lifetime_earned: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedContribution {
    pub id: String,
    pub author_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAssessment {
    pub contribution_id: String,
    pub assessor_id: String,
    pub score: f64,
    #[serde(default)]
    pub assessed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SeedSummary {
    pub agents: usize,
    pub contributions: usize,
    pub assessments: usize,
    pub skipped: usize,
}

/// Read a dataset file and load it into the store
pub fn load(path: &str, store: &ActorStore) -> anyhow::Result<SeedSummary> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read seed file '{}': {}", path, e))?;
    let dataset: Dataset = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse seed file '{}': {}", path, e))?;

    let summary = apply(dataset, store, Utc::now());
    info!(
        "Seeded {} agents, {} contributions, {} assessments from {} ({} skipped)",
        summary.agents, summary.contributions, summary.assessments, path, summary.skipped
    );
    Ok(summary)
}

/// Insert in dependency order: agents, then contributions, then assessments.
/// Rows that reference unknown ids or break store rules are skipped.
pub fn apply(dataset: Dataset, store: &ActorStore, now: DateTime<Utc>) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for a in dataset.agents {
        if a.id.trim().is_empty() {
            warn!("Skipping agent with empty id");
            summary.skipped += 1;
            continue;
        }
        store.upsert_agent(AgentRecord {
            name: a.name.unwrap_or_else(|| a.id.clone()),
            id: a.id,
            tier: a.tier,
            token_balance: a.token_balance,
            lifetime_earned: a.lifetime_earned,
            created_at: a.created_at.unwrap_or(now),
            last_active_at: a.last_active_at,
            contribution_count: 0,
        });
        summary.agents += 1;
    }

    for c in dataset.contributions {
        let id = c.id.clone();
        let result = store.record_contribution(ContributionRecord {
            id: c.id,
            author_id: c.author_id,
            title: c.title,
            created_at: c.created_at.unwrap_or(now),
        });
        match result {
            Ok(()) => summary.contributions += 1,
            Err(e) => {
                warn!("Skipping contribution {}: {}", id, e);
                summary.skipped += 1;
            }
        }
    }

    for a in dataset.assessments {
        match store.record_assessment(&a.contribution_id, &a.assessor_id, a.score, a.assessed_at) {
            Ok(()) => summary.assessments += 1,
            Err(e) => {
                warn!("Skipping assessment of {} by {}: {}", a.contribution_id, a.assessor_id, e);
                summary.skipped += 1;
            }
        }
    }

    summary
}
