//! Routes a classified question to the graph fast paths (USAGE/DEFINITION)
//! or to retrieval-augmented generation (EXPLANATION/GENERATION), per §4.G.

use crate::classifier::{classify, QuestionKind};
use crate::entities::extract_entity_name;
use paranoid_core::{CoreError, EntityId, VectorKind};
use paranoid_modelhost::{GenerateOptions, ModelHost};
use paranoid_store::{graph_api, Store};
use std::path::Path;
use std::sync::Arc;

const TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerSource {
    Caller { qualified_name: String, file: String, line: u32 },
    Definition { qualified_name: String, file: String, line: u32, signature: Option<String>, docstring: Option<String> },
    Retrieved { path: String, similarity: f32, preview: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<AnswerSource>,
    /// `false` when the answer came straight from the graph, with no call
    /// to the generation model.
    pub used_generation: bool,
}

pub struct QueryRouter<S: Store + ?Sized, M: ModelHost + ?Sized> {
    store: Arc<S>,
    model_host: Arc<M>,
    classifier_model: String,
    generation_model: String,
    embedding_model: String,
}

impl<S: Store + ?Sized + 'static, M: ModelHost + ?Sized + 'static> QueryRouter<S, M> {
    pub fn new(
        store: Arc<S>,
        model_host: Arc<M>,
        classifier_model: impl Into<String>,
        generation_model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            model_host,
            classifier_model: classifier_model.into(),
            generation_model: generation_model.into(),
            embedding_model: embedding_model.into(),
        }
    }

    pub async fn ask(&self, question: &str, force_rag: bool) -> anyhow::Result<Answer> {
        let kind = if force_rag {
            QuestionKind::Explanation
        } else {
            classify(self.model_host.as_ref(), &self.classifier_model, question).await
        };

        match kind {
            QuestionKind::Usage => match self.try_usage(question).await? {
                Some(answer) => Ok(answer),
                None => self.rag(question, kind).await,
            },
            QuestionKind::Definition => match self.try_definition(question).await? {
                Some(answer) => Ok(answer),
                None => self.rag(question, kind).await,
            },
            QuestionKind::Explanation | QuestionKind::Generation => self.rag(question, kind).await,
        }
    }

    /// `Ok(None)` means "fall back to RAG": no entity name found, or the
    /// name is ambiguous/unresolved.
    async fn try_usage(&self, question: &str) -> anyhow::Result<Option<Answer>> {
        let Some(name) = extract_entity_name(question) else { return Ok(None) };
        let matches = graph_api::find_definition(self.store.as_ref(), &name).await?;
        let [entity] = matches.as_slice() else { return Ok(None) };

        let callers = graph_api::get_callers(self.store.as_ref(), entity.id).await?;
        let sources: Vec<AnswerSource> = callers
            .iter()
            .filter_map(|c| {
                let caller = c.entity.as_ref()?;
                Some(AnswerSource::Caller {
                    qualified_name: caller.qualified_name.clone(),
                    file: caller.file_path.display().to_string(),
                    line: caller.start_line,
                })
            })
            .collect();

        let text = if sources.is_empty() {
            format!("`{}` has no recorded callers.", entity.qualified_name)
        } else {
            format!("`{}` is called from {} site(s).", entity.qualified_name, sources.len())
        };

        Ok(Some(Answer { text, sources, used_generation: false }))
    }

    async fn try_definition(&self, question: &str) -> anyhow::Result<Option<Answer>> {
        let Some(name) = extract_entity_name(question) else { return Ok(None) };
        let matches = graph_api::find_definition(self.store.as_ref(), &name).await?;
        let [entity] = matches.as_slice() else { return Ok(None) };

        let text = entity
            .docstring
            .clone()
            .unwrap_or_else(|| format!("`{}` is defined at {}:{}", entity.qualified_name, entity.file_path.display(), entity.start_line));

        let source = AnswerSource::Definition {
            qualified_name: entity.qualified_name.clone(),
            file: entity.file_path.display().to_string(),
            line: entity.start_line,
            signature: entity.signature.clone(),
            docstring: entity.docstring.clone(),
        };

        Ok(Some(Answer { text, sources: vec![source], used_generation: false }))
    }

    /// Retrieval-augmented answer: requires a non-empty vector index.
    async fn rag(&self, question: &str, kind: QuestionKind) -> anyhow::Result<Answer> {
        let embedding = self.model_host.embed(&self.embedding_model, question).await?;

        let summary_hits = self.store.nearest(VectorKind::Summary, &embedding, TOP_K).await?;
        let entity_hits = self.store.nearest(VectorKind::Entity, &embedding, TOP_K).await?;
        if summary_hits.is_empty() && entity_hits.is_empty() {
            return Err(CoreError::IndexEmpty.into());
        }

        #[derive(Clone, Copy)]
        enum HitKind {
            Summary,
            Entity,
        }

        // Each list is already sorted descending by similarity; merge them
        // so the combined sources stay sorted rather than all summaries
        // outranking all entities regardless of score.
        let mut merged: Vec<(HitKind, &paranoid_store::VectorMatch)> = summary_hits
            .iter()
            .map(|hit| (HitKind::Summary, hit))
            .chain(entity_hits.iter().map(|hit| (HitKind::Entity, hit)))
            .collect();
        merged.sort_by(|a, b| b.1.similarity.total_cmp(&a.1.similarity));

        let mut context_lines = Vec::new();
        let mut sources = Vec::new();
        for (kind, hit) in merged {
            match kind {
                HitKind::Summary => {
                    let path = Path::new(&hit.object_id);
                    if let Some(summary) = self.store.get_summary(path).await? {
                        let preview = first_line(&summary.description);
                        context_lines.push(format!("{}: {}", hit.object_id, summary.description));
                        sources.push(AnswerSource::Retrieved { path: hit.object_id.clone(), similarity: hit.similarity, preview });
                    }
                }
                HitKind::Entity => {
                    let Ok(id) = hit.object_id.parse::<u64>() else { continue };
                    if let Some(entity) = self.store.get_entity_by_id(EntityId(id)).await? {
                        let preview = entity.docstring.clone().unwrap_or_else(|| entity.qualified_name.clone());
                        context_lines.push(format!("{}: {}", entity.qualified_name, preview));
                        sources.push(AnswerSource::Retrieved {
                            path: entity.file_path.display().to_string(),
                            similarity: hit.similarity,
                            preview: first_line(&preview),
                        });
                    }
                }
            }
        }

        let system = match kind {
            QuestionKind::Generation => {
                "You write new code for this project. Use the retrieved context below for conventions and existing definitions."
            }
            _ => "You explain how this project's code works. Use the retrieved context below to ground your answer.",
        };
        let prompt = format!("{system}\n\nContext:\n{}\n\nQuestion: {question}\n", context_lines.join("\n"));

        let generated = self.model_host.generate(&self.generation_model, &prompt, GenerateOptions::default()).await?;
        Ok(Answer { text: generated.text, sources, used_generation: true })
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_takes_only_the_opening_sentence() {
        assert_eq!(first_line("hello\nworld"), "hello");
        assert_eq!(first_line(""), "");
    }
}
