//! SQLite-backed member store implementation.

use super::models::{Member, MergeStats, StoreStats};
use super::schema::MEMBER_VERSIONED_SCHEMAS;
use super::trait_def::MemberStore;
use crate::enrichment::EnrichedRecord;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// SQLite-backed member store.
#[derive(Clone)]
pub struct SqliteMemberStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = MEMBER_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &MEMBER_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating member db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let mut current_version = if db_version < BASE_DB_VERSION as i64 {
        0
    } else {
        (db_version - BASE_DB_VERSION as i64) as usize
    };

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in MEMBER_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating member db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
                current_version = schema.version;
            }
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Member db schema validation failed")?;
    Ok(())
}

impl SqliteMemberStore {
    /// Create a new SqliteMemberStore, bootstrapping the schema on first use.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open member database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on member write connection")?;
        write_conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let read_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open member database for reading")?;

        read_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on member read connection")?;

        let stats = Self::count_rows(&read_conn)?;
        info!(
            "Member store ready: {} members, {} skills",
            stats.members, stats.skills
        );

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    fn count_rows(conn: &Connection) -> Result<StoreStats> {
        let members: usize = conn.query_row("SELECT COUNT(*) FROM members", [], |r| r.get(0))?;
        let skills: usize = conn.query_row("SELECT COUNT(*) FROM skills", [], |r| r.get(0))?;
        Ok(StoreStats { members, skills })
    }
}

/// Normalize a skill label for global uniqueness: trim and lower-case.
/// Returns `None` for labels that are empty after trimming.
fn normalize_skill_label(raw: &str) -> Option<String> {
    let label = raw.trim().to_lowercase();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

impl MemberStore for SqliteMemberStore {
    fn merge_batch(&self, records: &[EnrichedRecord]) -> Result<MergeStats> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> Result<MergeStats> {
            let mut stats = MergeStats::default();

            // Pre-fetch all skills into a batch-scoped label -> id cache so
            // the same new label appearing in two records of one batch
            // resolves to a single row instead of a unique-constraint
            // violation.
            let mut skill_cache: HashMap<String, i64> = {
                let mut stmt = conn.prepare_cached("SELECT name, id FROM skills")?;
                let rows = stmt
                    .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows.into_iter().collect()
            };

            for record in records {
                let name = &record.record.name;

                let existing_id: Option<i64> = conn
                    .query_row(
                        "SELECT id FROM members WHERE full_name = ?1",
                        params![name],
                        |r| r.get(0),
                    )
                    .optional()?;

                // Upsert the member: every mutable attribute is overwritten
                // (last-write-wins); ingested_at is set once at creation.
                let member_id = match existing_id {
                    Some(id) => {
                        conn.execute(
                            "UPDATE members SET email = ?1, bio = ?2, date_joined = ?3,
                                 last_activity = ?4, persona = ?5, confidence_score = ?6,
                                 is_enriched = ?7
                             WHERE id = ?8",
                            params![
                                record.record.email,
                                record.record.biography,
                                record.record.date_joined,
                                record.record.last_activity,
                                record.persona,
                                record.confidence_score,
                                record.enriched as i32,
                                id,
                            ],
                        )?;
                        stats.members_updated += 1;
                        id
                    }
                    None => {
                        conn.execute(
                            "INSERT INTO members (full_name, email, bio, date_joined,
                                 last_activity, persona, confidence_score, is_enriched,
                                 ingested_at)
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                            params![
                                name,
                                record.record.email,
                                record.record.biography,
                                record.record.date_joined,
                                record.record.last_activity,
                                record.persona,
                                record.confidence_score,
                                record.enriched as i32,
                                Utc::now().timestamp(),
                            ],
                        )?;
                        stats.members_created += 1;
                        conn.last_insert_rowid()
                    }
                };

                // Resolve or create each normalized skill label, deduplicated
                // within the record.
                let mut skill_ids: Vec<i64> = Vec::new();
                for raw_label in &record.skills {
                    let Some(label) = normalize_skill_label(raw_label) else {
                        continue;
                    };
                    let skill_id = match skill_cache.get(&label) {
                        Some(&id) => id,
                        None => {
                            conn.execute(
                                "INSERT INTO skills (name) VALUES (?1)",
                                params![label],
                            )?;
                            let id = conn.last_insert_rowid();
                            skill_cache.insert(label, id);
                            stats.skills_created += 1;
                            id
                        }
                    };
                    if !skill_ids.contains(&skill_id) {
                        skill_ids.push(skill_id);
                    }
                }

                // Replace-set: the member's skill set becomes exactly this
                // record's set; nothing from a prior ingestion survives.
                let prior_count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM member_skills WHERE member_id = ?1",
                    params![member_id],
                    |r| r.get(0),
                )?;
                if skill_ids.is_empty() && prior_count > 0 {
                    debug!(
                        member = %name,
                        prior_skills = prior_count,
                        "Re-ingestion with empty skill list clears prior skills"
                    );
                }
                conn.execute(
                    "DELETE FROM member_skills WHERE member_id = ?1",
                    params![member_id],
                )?;
                for skill_id in &skill_ids {
                    conn.execute(
                        "INSERT INTO member_skills (member_id, skill_id) VALUES (?1, ?2)",
                        params![member_id, skill_id],
                    )?;
                }
            }

            Ok(stats)
        })();

        match result {
            Ok(stats) => {
                conn.execute("COMMIT", [])?;
                Ok(stats)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn get_member_by_name(&self, full_name: &str) -> Result<Option<Member>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, full_name, email, bio, date_joined, last_activity,
                    persona, confidence_score, is_enriched, ingested_at
             FROM members WHERE full_name = ?1",
        )?;
        let member = stmt
            .query_row(params![full_name], |row| {
                Ok(Member {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                    email: row.get(2)?,
                    bio: row.get(3)?,
                    date_joined: row.get(4)?,
                    last_activity: row.get(5)?,
                    persona: row.get(6)?,
                    confidence_score: row.get(7)?,
                    is_enriched: row.get::<_, i32>(8)? != 0,
                    ingested_at: row.get(9)?,
                })
            })
            .optional()?;
        Ok(member)
    }

    fn get_member_skills(&self, member_id: i64) -> Result<Vec<String>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT s.name FROM skills s
             JOIN member_skills ms ON ms.skill_id = s.id
             WHERE ms.member_id = ?1
             ORDER BY s.name",
        )?;
        let labels = stmt
            .query_map(params![member_id], |r| r.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(labels)
    }

    fn get_stats(&self) -> Result<StoreStats> {
        let conn = self.read_conn.lock().unwrap();
        Self::count_rows(&conn)
    }
}
