use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Trust tier - 審査済みの信頼レベル
///
/// Lower level = more trusted. Founding members are hand-vetted,
/// Unclaimed agents have never been claimed by an owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Founding = 1,
    Trusted = 2,
    General = 3,
    #[default]
    Unclaimed = 4,
}

impl Tier {
    /// Map a raw tier level to a Tier. Out-of-range levels are clamped
    /// to the nearest valid tier instead of being rejected.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Tier::Founding,
            2 => Tier::Trusted,
            3 => Tier::General,
            _ => Tier::Unclaimed,
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Founding => "Founding",
            Tier::Trusted => "Trusted",
            Tier::General => "General",
            Tier::Unclaimed => "Unclaimed",
        }
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let level = u8::deserialize(deserializer)?;
        Ok(Tier::from_level(level))
    }
}

/// One assessment submitted by the actor, joined against the current
/// average of every assessment the same contribution has received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentRecord {
    pub assessor_score: f64,
    /// None when the contribution has no population average yet
    pub population_average_score: Option<f64>,
}

impl AssessmentRecord {
    pub fn new(assessor_score: f64, population_average_score: Option<f64>) -> Self {
        Self {
            assessor_score,
            population_average_score,
        }
    }
}

/// Everything the aggregator needs to know about one actor.
/// Assembled by the store per request; the aggregator only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSnapshot {
    pub tier: Tier,
    pub contribution_count: u32,
    pub token_balance: f64,
    pub lifetime_earned: f64,
    pub last_active_at: Option<DateTime<Utc>>,
    pub assessments: Vec<AssessmentRecord>,
}
