//! SQLite-backed implementation of [`Store`], grounded on `sqlx` the way
//! `codegraph-orchestration`'s Cargo.toml pulls it in — async, rustls TLS
//! runtime feature set unused here since the connection is always local.

use crate::migrations::run_migrations;
use crate::traits::{Store, StoreStats, VectorMatch};
use async_trait::async_trait;
use paranoid_core::{
    ContextLevel, DocQuality, Entity, EntityId, EntityKind, IgnorePattern, IgnorePatternSource,
    Relationship, RelationshipId, RelationshipKind, Summary, SummaryContext, SummaryKind, Vector,
    VectorKind,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(8).connect_with(options).await?;
        run_migrations(&pool).await?;
        Ok(SqliteStore { pool })
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        run_migrations(&pool).await?;
        Ok(SqliteStore { pool })
    }
}

fn encode_embedding(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn summary_kind_str(kind: SummaryKind) -> &'static str {
    match kind {
        SummaryKind::File => "file",
        SummaryKind::Directory => "directory",
    }
}

fn summary_kind_from_str(s: &str) -> SummaryKind {
    match s {
        "directory" => SummaryKind::Directory,
        _ => SummaryKind::File,
    }
}

fn entity_kind_str(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Class => "class",
        EntityKind::Function => "function",
        EntityKind::Method => "method",
    }
}

fn entity_kind_from_str(s: &str) -> EntityKind {
    match s {
        "class" => EntityKind::Class,
        "method" => EntityKind::Method,
        _ => EntityKind::Function,
    }
}

fn relationship_kind_str(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Calls => "calls",
        RelationshipKind::Imports => "imports",
        RelationshipKind::Inherits => "inherits",
        RelationshipKind::Instantiates => "instantiates",
    }
}

fn relationship_kind_from_str(s: &str) -> RelationshipKind {
    match s {
        "imports" => RelationshipKind::Imports,
        "inherits" => RelationshipKind::Inherits,
        "instantiates" => RelationshipKind::Instantiates,
        _ => RelationshipKind::Calls,
    }
}

fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> Summary {
    Summary {
        path: PathBuf::from(row.get::<String, _>("path")),
        kind: summary_kind_from_str(&row.get::<String, _>("kind")),
        hash: row.get("hash"),
        description: row.get("description"),
        extension: row.get("extension"),
        language: row.get("language"),
        error: row.get("error"),
        needs_update: row.get::<i64, _>("needs_update") != 0,
        model: row.get("model"),
        model_version: row.get("model_version"),
        prompt_version: row.get::<i64, _>("prompt_version") as u32,
        context_level: ContextLevel::from_u8(row.get::<i64, _>("context_level") as u8)
            .unwrap_or(ContextLevel::Isolated),
        generated_at: row.get::<String, _>("generated_at").parse().unwrap_or_else(|_| chrono::Utc::now()),
        updated_at: row.get::<String, _>("updated_at").parse().unwrap_or_else(|_| chrono::Utc::now()),
        tokens_used: row.try_get::<Option<i64>, _>("tokens_used").ok().flatten().map(|v| v as u32),
        generation_time_ms: row.try_get::<Option<i64>, _>("generation_time_ms").ok().flatten().map(|v| v as u64),
    }
}

fn row_to_entity(row: &sqlx::sqlite::SqliteRow) -> Entity {
    Entity {
        id: EntityId(row.get::<String, _>("id").parse().unwrap_or(0)),
        file_path: PathBuf::from(row.get::<String, _>("file_path")),
        kind: entity_kind_from_str(&row.get::<String, _>("kind")),
        name: row.get("name"),
        qualified_name: row.get("qualified_name"),
        parent_entity: row
            .get::<Option<String>, _>("parent_entity")
            .and_then(|s| s.parse().ok())
            .map(EntityId),
        start_line: row.get::<i64, _>("start_line") as u32,
        end_line: row.get::<i64, _>("end_line") as u32,
        docstring: row.get("docstring"),
        signature: row.get("signature"),
        language: row.get("language"),
    }
}

fn row_to_relationship(row: &sqlx::sqlite::SqliteRow) -> Relationship {
    Relationship {
        id: RelationshipId(row.get::<String, _>("id").parse().unwrap_or(0)),
        from_entity: row
            .get::<Option<String>, _>("from_entity")
            .and_then(|s| s.parse().ok())
            .map(EntityId),
        to_entity: row
            .get::<Option<String>, _>("to_entity")
            .and_then(|s| s.parse().ok())
            .map(EntityId),
        from_file: PathBuf::from(row.get::<String, _>("from_file")),
        to_file: row.get("to_file"),
        kind: relationship_kind_from_str(&row.get::<String, _>("kind")),
        location: row.get("location"),
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_summary(&self, path: &Path) -> anyhow::Result<Option<Summary>> {
        let row = sqlx::query("SELECT * FROM summaries WHERE path = ?1")
            .bind(path.to_string_lossy().to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_summary(&r)))
    }

    async fn upsert_summary(&self, summary: &Summary) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO summaries
                (path, kind, hash, description, extension, language, error, needs_update,
                 model, model_version, prompt_version, context_level, generated_at, updated_at,
                 tokens_used, generation_time_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ON CONFLICT(path) DO UPDATE SET
                kind = excluded.kind,
                hash = excluded.hash,
                description = excluded.description,
                extension = excluded.extension,
                language = excluded.language,
                error = excluded.error,
                needs_update = excluded.needs_update,
                model = excluded.model,
                model_version = excluded.model_version,
                prompt_version = excluded.prompt_version,
                context_level = excluded.context_level,
                generated_at = excluded.generated_at,
                updated_at = excluded.updated_at,
                tokens_used = excluded.tokens_used,
                generation_time_ms = excluded.generation_time_ms
            "#,
        )
        .bind(summary.path.to_string_lossy().to_string())
        .bind(summary_kind_str(summary.kind))
        .bind(&summary.hash)
        .bind(&summary.description)
        .bind(&summary.extension)
        .bind(&summary.language)
        .bind(&summary.error)
        .bind(summary.needs_update as i64)
        .bind(&summary.model)
        .bind(&summary.model_version)
        .bind(summary.prompt_version as i64)
        .bind(summary.context_level as i64)
        .bind(summary.generated_at.to_rfc3339())
        .bind(summary.updated_at.to_rfc3339())
        .bind(summary.tokens_used.map(|v| v as i64))
        .bind(summary.generation_time_ms.map(|v| v as i64))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_summary(&self, path: &Path) -> anyhow::Result<()> {
        let path_str = path.to_string_lossy().to_string();
        let mut tx = self.pool.begin().await?;

        let entity_ids: Vec<String> = sqlx::query_scalar("SELECT id FROM entities WHERE file_path = ?1")
            .bind(&path_str)
            .fetch_all(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM relationships WHERE from_file = ?1")
            .bind(&path_str)
            .execute(&mut *tx)
            .await?;
        for id in &entity_ids {
            sqlx::query("DELETE FROM relationships WHERE from_entity = ?1 OR to_entity = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM vectors WHERE kind = 'entity' AND object_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM doc_quality WHERE entity_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM entities WHERE file_path = ?1").bind(&path_str).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM summary_context WHERE path = ?1").bind(&path_str).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM analysis_file_hash WHERE path = ?1").bind(&path_str).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM vectors WHERE kind = 'summary' AND object_id = ?1")
            .bind(&path_str)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM summaries WHERE path = ?1").bind(&path_str).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_children(&self, path: &Path) -> anyhow::Result<Vec<Summary>> {
        let prefix = format!("{}/", path.to_string_lossy());
        let rows = sqlx::query("SELECT * FROM summaries WHERE path LIKE ?1 || '%'")
            .bind(&prefix)
            .fetch_all(&self.pool)
            .await?;
        let children = rows
            .into_iter()
            .filter(|r| {
                let p: String = r.get("path");
                p.strip_prefix(&prefix).map(|rest| !rest.contains('/')).unwrap_or(false)
            })
            .map(|r| row_to_summary(&r))
            .collect();
        Ok(children)
    }

    async fn all_summaries(&self, scope: &Path) -> anyhow::Result<Vec<Summary>> {
        let prefix = scope.to_string_lossy().to_string();
        let rows = sqlx::query("SELECT * FROM summaries WHERE path LIKE ?1 || '%' ORDER BY path")
            .bind(&prefix)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_summary).collect())
    }

    async fn summary_stats(&self, scope: &Path) -> anyhow::Result<StoreStats> {
        let summaries = self.all_summaries(scope).await?;
        let mut stats = StoreStats { total: summaries.len() as u64, ..Default::default() };

        let mut by_kind = std::collections::HashMap::new();
        let mut by_language = std::collections::HashMap::new();
        let mut by_model = std::collections::HashMap::new();
        for s in &summaries {
            *by_kind.entry(summary_kind_str(s.kind).to_string()).or_insert(0u64) += 1;
            *by_language.entry(s.language.clone().unwrap_or_else(|| "unknown".to_string())).or_insert(0u64) += 1;
            *by_model.entry(s.model.clone()).or_insert(0u64) += 1;
            if s.error.is_some() {
                stats.errored += 1;
            }
        }
        stats.by_kind = by_kind.into_iter().collect();
        stats.by_language = by_language.into_iter().collect();
        stats.by_model = by_model.into_iter().collect();
        Ok(stats)
    }

    async fn put_entities_for_file(&self, file: &Path, entities: &[Entity]) -> anyhow::Result<()> {
        let file_str = file.to_string_lossy().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM relationships WHERE from_file = ?1").bind(&file_str).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM entities WHERE file_path = ?1").bind(&file_str).execute(&mut *tx).await?;

        for entity in entities {
            sqlx::query(
                r#"INSERT INTO entities
                    (id, file_path, kind, name, qualified_name, parent_entity,
                     start_line, end_line, docstring, signature, language)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            )
            .bind(entity.id.0.to_string())
            .bind(&file_str)
            .bind(entity_kind_str(entity.kind))
            .bind(&entity.name)
            .bind(&entity.qualified_name)
            .bind(entity.parent_entity.map(|id| id.0.to_string()))
            .bind(entity.start_line as i64)
            .bind(entity.end_line as i64)
            .bind(&entity.docstring)
            .bind(&entity.signature)
            .bind(&entity.language)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_entity_by_id(&self, id: EntityId) -> anyhow::Result<Option<Entity>> {
        let row = sqlx::query("SELECT * FROM entities WHERE id = ?1")
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_entity(&r)))
    }

    async fn get_entities_by_qualified_name(&self, name: &str) -> anyhow::Result<Vec<Entity>> {
        let rows = sqlx::query("SELECT * FROM entities WHERE qualified_name = ?1")
            .bind(name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_entity).collect())
    }

    async fn get_entities_by_simple_name(&self, name: &str) -> anyhow::Result<Vec<Entity>> {
        let rows = sqlx::query("SELECT * FROM entities WHERE name = ?1").bind(name).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_entity).collect())
    }

    async fn all_entities(&self, scope: &Path) -> anyhow::Result<Vec<Entity>> {
        let prefix = scope.to_string_lossy().to_string();
        let rows = sqlx::query("SELECT * FROM entities WHERE file_path LIKE ?1 || '%'")
            .bind(&prefix)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_entity).collect())
    }

    async fn put_relationships(&self, file: &Path, rels: &[Relationship]) -> anyhow::Result<()> {
        let file_str = file.to_string_lossy().to_string();
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM relationships WHERE from_file = ?1").bind(&file_str).execute(&mut *tx).await?;

        for rel in rels {
            sqlx::query(
                r#"INSERT INTO relationships (id, from_entity, to_entity, from_file, to_file, kind, location)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            )
            .bind(rel.id.0.to_string())
            .bind(rel.from_entity.map(|id| id.0.to_string()))
            .bind(rel.to_entity.map(|id| id.0.to_string()))
            .bind(&file_str)
            .bind(&rel.to_file)
            .bind(relationship_kind_str(rel.kind))
            .bind(&rel.location)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn callers_of(&self, entity: EntityId) -> anyhow::Result<Vec<Relationship>> {
        let rows = sqlx::query("SELECT * FROM relationships WHERE kind = 'calls' AND to_entity = ?1")
            .bind(entity.0.to_string())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_relationship).collect())
    }

    async fn callees_of(&self, entity: EntityId) -> anyhow::Result<Vec<Relationship>> {
        let rows = sqlx::query("SELECT * FROM relationships WHERE kind = 'calls' AND from_entity = ?1")
            .bind(entity.0.to_string())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_relationship).collect())
    }

    async fn importers_of(&self, module: &str) -> anyhow::Result<Vec<Relationship>> {
        let rows = sqlx::query("SELECT * FROM relationships WHERE kind = 'imports' AND to_file = ?1")
            .bind(module)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_relationship).collect())
    }

    async fn imports_of(&self, file: &Path) -> anyhow::Result<Vec<Relationship>> {
        let rows = sqlx::query("SELECT * FROM relationships WHERE kind = 'imports' AND from_file = ?1")
            .bind(file.to_string_lossy().to_string())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_relationship).collect())
    }

    async fn parents_of(&self, class: EntityId) -> anyhow::Result<Vec<Relationship>> {
        let rows = sqlx::query("SELECT * FROM relationships WHERE kind = 'inherits' AND from_entity = ?1")
            .bind(class.0.to_string())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_relationship).collect())
    }

    async fn children_of(&self, class: EntityId) -> anyhow::Result<Vec<Relationship>> {
        let rows = sqlx::query("SELECT * FROM relationships WHERE kind = 'inherits' AND to_entity = ?1")
            .bind(class.0.to_string())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_relationship).collect())
    }

    async fn get_summary_context(&self, path: &Path) -> anyhow::Result<Option<SummaryContext>> {
        let row = sqlx::query("SELECT * FROM summary_context WHERE path = ?1")
            .bind(path.to_string_lossy().to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| SummaryContext {
            path: PathBuf::from(r.get::<String, _>("path")),
            imports_hash: r.get("imports_hash"),
            callers_count: r.get::<i64, _>("callers_count") as u32,
            callees_count: r.get::<i64, _>("callees_count") as u32,
            context_version: r.get::<i64, _>("context_version") as u32,
        }))
    }

    async fn set_summary_context(&self, context: &SummaryContext) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO summary_context (path, imports_hash, callers_count, callees_count, context_version)
               VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(path) DO UPDATE SET
                   imports_hash = excluded.imports_hash,
                   callers_count = excluded.callers_count,
                   callees_count = excluded.callees_count,
                   context_version = excluded.context_version"#,
        )
        .bind(context.path.to_string_lossy().to_string())
        .bind(&context.imports_hash)
        .bind(context.callers_count as i64)
        .bind(context.callees_count as i64)
        .bind(context.context_version as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_analysis_hash(&self, path: &Path) -> anyhow::Result<Option<String>> {
        let hash: Option<String> = sqlx::query_scalar("SELECT content_hash FROM analysis_file_hash WHERE path = ?1")
            .bind(path.to_string_lossy().to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(hash)
    }

    async fn set_analysis_hash(&self, path: &Path, hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO analysis_file_hash (path, content_hash) VALUES (?1, ?2)
               ON CONFLICT(path) DO UPDATE SET content_hash = excluded.content_hash"#,
        )
        .bind(path.to_string_lossy().to_string())
        .bind(hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn put_vector(&self, vector: &Vector) -> anyhow::Result<()> {
        let kind_str = match vector.kind {
            VectorKind::Summary => "summary",
            VectorKind::Entity => "entity",
        };
        sqlx::query(
            r#"INSERT INTO vectors (kind, object_id, model, embedding, source_hash) VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(kind, object_id, model) DO UPDATE SET embedding = excluded.embedding, source_hash = excluded.source_hash"#,
        )
        .bind(kind_str)
        .bind(&vector.object_id)
        .bind(&vector.model)
        .bind(encode_embedding(&vector.embedding))
        .bind(&vector.source_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn vector_for(&self, kind: VectorKind, object_id: &str) -> anyhow::Result<Option<Vector>> {
        let kind_str = match kind {
            VectorKind::Summary => "summary",
            VectorKind::Entity => "entity",
        };
        let row = sqlx::query("SELECT * FROM vectors WHERE kind = ?1 AND object_id = ?2")
            .bind(kind_str)
            .bind(object_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Vector {
            kind,
            object_id: r.get("object_id"),
            embedding: decode_embedding(&r.get::<Vec<u8>, _>("embedding")),
            model: r.get("model"),
            source_hash: r.get("source_hash"),
        }))
    }

    /// Brute-force cosine similarity scan. No approximate-nearest-neighbor
    /// crate exists among this workspace's dependencies; for the scale of a
    /// single project's summaries and entities a full scan is fast enough,
    /// and it keeps the store to a single embedded file.
    async fn nearest(&self, kind: VectorKind, query: &[f32], k: usize) -> anyhow::Result<Vec<VectorMatch>> {
        let kind_str = match kind {
            VectorKind::Summary => "summary",
            VectorKind::Entity => "entity",
        };
        let rows = sqlx::query("SELECT object_id, embedding FROM vectors WHERE kind = ?1")
            .bind(kind_str)
            .fetch_all(&self.pool)
            .await?;

        let mut scored: Vec<VectorMatch> = rows
            .iter()
            .map(|r| {
                let embedding = decode_embedding(&r.get::<Vec<u8>, _>("embedding"));
                VectorMatch {
                    kind,
                    object_id: r.get("object_id"),
                    similarity: cosine_similarity(query, &embedding),
                }
            })
            .collect();

        scored.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn get_metadata(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM metadata WHERE key = ?1").bind(key).fetch_optional(&self.pool).await?;
        Ok(value)
    }

    async fn set_metadata(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO metadata (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_ignore_pattern(&self, pattern: &IgnorePattern) -> anyhow::Result<()> {
        let source = match pattern.source {
            IgnorePatternSource::File => "file",
            IgnorePatternSource::Command => "command",
        };
        sqlx::query("INSERT INTO ignore_patterns (pattern, added_at, source) VALUES (?1, ?2, ?3)")
            .bind(&pattern.pattern)
            .bind(pattern.added_at.to_rfc3339())
            .bind(source)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_ignore_patterns(&self) -> anyhow::Result<Vec<IgnorePattern>> {
        let rows = sqlx::query("SELECT * FROM ignore_patterns ORDER BY added_at").fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|r| IgnorePattern {
                pattern: r.get("pattern"),
                added_at: r.get::<String, _>("added_at").parse().unwrap_or_else(|_| chrono::Utc::now()),
                source: match r.get::<String, _>("source").as_str() {
                    "command" => IgnorePatternSource::Command,
                    _ => IgnorePatternSource::File,
                },
            })
            .collect())
    }

    async fn get_doc_quality(&self, entity: EntityId) -> anyhow::Result<Option<DocQuality>> {
        let row = sqlx::query("SELECT * FROM doc_quality WHERE entity_id = ?1")
            .bind(entity.0.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| DocQuality {
            entity_id: entity,
            has_docstring: r.get::<i64, _>("has_docstring") != 0,
            has_examples: r.get::<i64, _>("has_examples") != 0,
            has_type_hints: r.get::<i64, _>("has_type_hints") != 0,
            priority_score: r.get("priority_score"),
            last_reviewed: r.get::<Option<String>, _>("last_reviewed").and_then(|s| s.parse().ok()),
        }))
    }

    async fn set_doc_quality(&self, quality: &DocQuality) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO doc_quality
                (entity_id, has_docstring, has_examples, has_type_hints, priority_score, last_reviewed)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               ON CONFLICT(entity_id) DO UPDATE SET
                   has_docstring = excluded.has_docstring,
                   has_examples = excluded.has_examples,
                   has_type_hints = excluded.has_type_hints,
                   priority_score = excluded.priority_score,
                   last_reviewed = excluded.last_reviewed"#,
        )
        .bind(quality.entity_id.0.to_string())
        .bind(quality.has_docstring as i64)
        .bind(quality.has_examples as i64)
        .bind(quality.has_type_hints as i64)
        .bind(quality.priority_score)
        .bind(quality.last_reviewed.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
