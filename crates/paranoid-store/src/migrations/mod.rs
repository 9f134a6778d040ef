//! Ordered, idempotent schema migrations keyed off the `schema_version`
//! metadata row. Each migration runs inside its own transaction.

use paranoid_core::CoreError;
use sqlx::{Sqlite, SqlitePool, Transaction};

#[async_trait::async_trait]
pub trait Migration: Send + Sync {
    fn version(&self) -> u32;
    async fn apply(&self, tx: &mut Transaction<'_, Sqlite>) -> sqlx::Result<()>;
}

pub struct V1CoreSchema;

#[async_trait::async_trait]
impl Migration for V1CoreSchema {
    fn version(&self) -> u32 {
        1
    }

    async fn apply(&self, tx: &mut Transaction<'_, Sqlite>) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metadata (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS summaries (
                path            TEXT PRIMARY KEY,
                kind            TEXT NOT NULL,
                hash            TEXT NOT NULL,
                description     TEXT NOT NULL,
                extension       TEXT,
                language        TEXT,
                error           TEXT,
                needs_update    INTEGER NOT NULL DEFAULT 0,
                model           TEXT NOT NULL,
                model_version   TEXT,
                prompt_version  INTEGER NOT NULL DEFAULT 1,
                context_level   INTEGER NOT NULL DEFAULT 0,
                generated_at    TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entities (
                id              TEXT PRIMARY KEY,
                file_path       TEXT NOT NULL,
                kind            TEXT NOT NULL,
                name            TEXT NOT NULL,
                qualified_name  TEXT NOT NULL,
                parent_entity   TEXT,
                start_line      INTEGER NOT NULL,
                end_line        INTEGER NOT NULL,
                docstring       TEXT,
                signature       TEXT,
                language        TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entities_file_path ON entities(file_path);
            CREATE INDEX IF NOT EXISTS idx_entities_qualified_name ON entities(qualified_name);
            CREATE INDEX IF NOT EXISTS idx_entities_name ON entities(name);

            CREATE TABLE IF NOT EXISTS relationships (
                id          TEXT PRIMARY KEY,
                from_entity TEXT,
                to_entity   TEXT,
                from_file   TEXT NOT NULL,
                to_file     TEXT,
                kind        TEXT NOT NULL,
                location    TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_relationships_from_entity ON relationships(from_entity);
            CREATE INDEX IF NOT EXISTS idx_relationships_to_entity ON relationships(to_entity);
            CREATE INDEX IF NOT EXISTS idx_relationships_from_file ON relationships(from_file);

            CREATE TABLE IF NOT EXISTS summary_context (
                path            TEXT PRIMARY KEY,
                imports_hash    TEXT NOT NULL,
                callers_count   INTEGER NOT NULL,
                callees_count   INTEGER NOT NULL,
                context_version INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analysis_file_hash (
                path          TEXT PRIMARY KEY,
                content_hash  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS doc_quality (
                entity_id       TEXT PRIMARY KEY,
                has_docstring   INTEGER NOT NULL,
                has_examples    INTEGER NOT NULL,
                has_type_hints  INTEGER NOT NULL,
                priority_score  REAL NOT NULL,
                last_reviewed   TEXT
            );

            CREATE TABLE IF NOT EXISTS ignore_patterns (
                pattern   TEXT NOT NULL,
                added_at  TEXT NOT NULL,
                source    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS vectors (
                kind       TEXT NOT NULL,
                object_id  TEXT NOT NULL,
                model      TEXT NOT NULL,
                embedding  BLOB NOT NULL,
                PRIMARY KEY (kind, object_id, model)
            );
            "#,
        )
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// Adds generation bookkeeping columns to `summaries`, defaulting existing
/// rows to NULL (no prior call recorded that usage).
pub struct V2SummaryGenerationStats;

#[async_trait::async_trait]
impl Migration for V2SummaryGenerationStats {
    fn version(&self) -> u32 {
        2
    }

    async fn apply(&self, tx: &mut Transaction<'_, Sqlite>) -> sqlx::Result<()> {
        for stmt in [
            "ALTER TABLE summaries ADD COLUMN tokens_used INTEGER",
            "ALTER TABLE summaries ADD COLUMN generation_time_ms INTEGER",
        ] {
            // Idempotent: ignore "duplicate column" errors on a re-applied migration.
            if let Err(err) = sqlx::query(stmt).execute(&mut **tx).await {
                if !err.to_string().contains("duplicate column") {
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

/// Adds the source-hash column vectors need to distinguish "embedding model
/// changed" from "source content changed" staleness without re-embedding.
pub struct V3VectorSourceHash;

#[async_trait::async_trait]
impl Migration for V3VectorSourceHash {
    fn version(&self) -> u32 {
        3
    }

    async fn apply(&self, tx: &mut Transaction<'_, Sqlite>) -> sqlx::Result<()> {
        if let Err(err) = sqlx::query("ALTER TABLE vectors ADD COLUMN source_hash TEXT NOT NULL DEFAULT ''")
            .execute(&mut **tx)
            .await
        {
            if !err.to_string().contains("duplicate column") {
                return Err(err);
            }
        }
        Ok(())
    }
}

pub fn all_migrations() -> Vec<Box<dyn Migration>> {
    vec![Box::new(V1CoreSchema), Box::new(V2SummaryGenerationStats), Box::new(V3VectorSourceHash)]
}

pub const CURRENT_SCHEMA_VERSION: u32 = 3;

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
        .execute(pool)
        .await?;

    let current: Option<String> = sqlx::query_scalar("SELECT value FROM metadata WHERE key = 'schema_version'")
        .fetch_optional(pool)
        .await?;
    let mut current: u32 = current.and_then(|v| v.parse().ok()).unwrap_or(0);

    if current > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::SchemaIncompatible { found: current, supported: CURRENT_SCHEMA_VERSION }.into());
    }

    for migration in all_migrations() {
        if migration.version() <= current {
            continue;
        }
        let mut tx = pool.begin().await?;
        migration.apply(&mut tx).await?;
        sqlx::query(
            "INSERT INTO metadata (key, value) VALUES ('schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(migration.version().to_string())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        current = migration.version();
    }

    Ok(())
}
