//! Data models for the member database.

use serde::{Deserialize, Serialize};

/// One persisted community member, keyed naturally by normalized full name.
///
/// All attributes except `id` and `ingested_at` are overwritten on every
/// re-ingestion of the same name (last-write-wins).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub date_joined: Option<String>,
    pub last_activity: Option<String>,
    pub persona: Option<String>,
    pub confidence_score: f64,
    pub is_enriched: bool,
    /// Unix epoch seconds, set once at first creation.
    pub ingested_at: i64,
}

/// One globally unique normalized skill label. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

/// Outcome of merging one batch of enriched records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MergeStats {
    pub members_created: usize,
    pub members_updated: usize,
    pub skills_created: usize,
}

/// Summary counts for operator reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub members: usize,
    pub skills: usize,
}
