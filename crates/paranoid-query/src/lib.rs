//! The Query router (§4.G): classifies a question, answers USAGE/DEFINITION
//! questions straight from the graph when possible, and falls back to
//! retrieval-augmented generation otherwise.

pub mod classifier;
pub mod entities;
pub mod router;

pub use classifier::QuestionKind;
pub use router::{Answer, AnswerSource, QueryRouter};
