//! Question classification (§4.G): a cheap `generate_simple` call routes a
//! question to one of four handling strategies before any expensive
//! retrieval work happens.

use paranoid_modelhost::ModelHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// "Where is X called from?"
    Usage,
    /// "What is X?" / "Where is X defined?"
    Definition,
    /// "How does X work?" — needs retrieved context.
    Explanation,
    /// "Write a function that..." — needs retrieved context.
    Generation,
}

const CLASSIFIER_PROMPT_PREFIX: &str = "\
Classify the following question about a codebase as exactly one word: \
USAGE, DEFINITION, EXPLANATION, or GENERATION.

USAGE: asks where or how often something is called/used.
DEFINITION: asks what something is or where it is defined.
EXPLANATION: asks how or why something works.
GENERATION: asks to write new code.

Question: ";

/// Classifies `question` via `model`. Any failure to reach the model host,
/// a timeout, or an unrecognized response falls back to `Explanation` — the
/// path that still produces a useful answer without trusting a label.
pub async fn classify(model_host: &dyn ModelHost, model: &str, question: &str) -> QuestionKind {
    let prompt = format!("{CLASSIFIER_PROMPT_PREFIX}{question}");
    match model_host.generate_simple(model, &prompt).await {
        Ok(text) => parse_label(&text).unwrap_or(QuestionKind::Explanation),
        Err(e) => {
            tracing::debug!(error = %e, "question classification failed, falling back to EXPLANATION");
            QuestionKind::Explanation
        }
    }
}

fn parse_label(text: &str) -> Option<QuestionKind> {
    let upper = text.to_uppercase();
    if upper.contains("USAGE") {
        Some(QuestionKind::Usage)
    } else if upper.contains("DEFINITION") {
        Some(QuestionKind::Definition)
    } else if upper.contains("GENERATION") {
        Some(QuestionKind::Generation)
    } else if upper.contains("EXPLANATION") {
        Some(QuestionKind::Explanation)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_label_is_case_insensitive_and_tolerates_surrounding_text() {
        assert_eq!(parse_label("usage"), Some(QuestionKind::Usage));
        assert_eq!(parse_label("Answer: DEFINITION."), Some(QuestionKind::Definition));
        assert_eq!(parse_label("I think this is an EXPLANATION question"), Some(QuestionKind::Explanation));
    }

    #[test]
    fn parse_label_returns_none_on_garbage() {
        assert_eq!(parse_label("uhh not sure"), None);
    }
}
