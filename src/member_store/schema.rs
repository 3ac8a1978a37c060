//! SQLite schema definitions for the member database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table, VersionedSchema};

const MEMBER_FK: ForeignKey = ForeignKey {
    foreign_table: "members",
    foreign_column: "id",
};

const SKILL_FK: ForeignKey = ForeignKey {
    foreign_table: "skills",
    foreign_column: "id",
};

/// One row per distinct person; full_name is the natural key.
const MEMBERS_TABLE: Table = Table {
    name: "members",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("full_name", SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("email", SqlType::Text),
        sqlite_column!("bio", SqlType::Text),
        // ISO date strings
        sqlite_column!("date_joined", SqlType::Text),
        sqlite_column!("last_activity", SqlType::Text),
        // Enrichment data
        sqlite_column!("persona", SqlType::Text),
        sqlite_column!("confidence_score", SqlType::Real, non_null = true, default_value = Some("0.0")),
        sqlite_column!("is_enriched", SqlType::Integer, non_null = true, default_value = Some("0")),
        // Epoch seconds, set once at creation
        sqlite_column!("ingested_at", SqlType::Integer, non_null = true),
    ],
    unique_constraints: &[],
};

/// One row per distinct normalized skill label.
const SKILLS_TABLE: Table = Table {
    name: "skills",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", SqlType::Text, non_null = true, is_unique = true),
    ],
    unique_constraints: &[],
};

/// Unordered many-to-many association between members and skills.
const MEMBER_SKILLS_TABLE: Table = Table {
    name: "member_skills",
    columns: &[
        sqlite_column!("member_id", SqlType::Integer, non_null = true, foreign_key = Some(&MEMBER_FK)),
        sqlite_column!("skill_id", SqlType::Integer, non_null = true, foreign_key = Some(&SKILL_FK)),
    ],
    unique_constraints: &[&["member_id", "skill_id"]],
};

pub const MEMBER_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[MEMBERS_TABLE, SKILLS_TABLE, MEMBER_SKILLS_TABLE],
    migration: None,
}];
