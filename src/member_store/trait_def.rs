//! MemberStore trait definition.

use super::models::{Member, MergeStats, StoreStats};
use crate::enrichment::EnrichedRecord;
use anyhow::Result;

/// Trait for member storage backends.
pub trait MemberStore: Send + Sync {
    /// Merge a batch of enriched records into the store.
    ///
    /// The whole batch commits as one unit: members are upserted by
    /// normalized name (last-write-wins), skill labels are resolved or
    /// created exactly once per label, and each member's skill set is
    /// replaced by the deduplicated set from its record. Any failure rolls
    /// the entire batch back.
    fn merge_batch(&self, records: &[EnrichedRecord]) -> Result<MergeStats>;

    /// Look up a member by normalized full name.
    fn get_member_by_name(&self, full_name: &str) -> Result<Option<Member>>;

    /// The member's current skill labels, sorted for determinism.
    fn get_member_skills(&self, member_id: i64) -> Result<Vec<String>>;

    /// Summary counts for operator reporting.
    fn get_stats(&self) -> Result<StoreStats>;
}
