//! Quiz generation cascade.
//!
//! Tiers, in priority order: model-based question generation over randomly sampled candidate
//! sentences, then entity-masked cloze questions, then verbatim true/false statements. A tier
//! activates only when every higher tier is unavailable or produced nothing usable. Total
//! absence of usable content yields an empty quiz, which is a valid terminal state.
//!
//! Sampling is randomized on purpose so repeated calls vary the quiz; the RNG is injectable
//! so tests can pin a seed.

use crate::analysis::entities::{Entity, EntityTagger};
use crate::analysis::normalize::split_sentences;
use crate::analysis::types::{QuizItem, QuizResult};
use crate::generation::{ModelOutcome, ModelSet};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Candidate sentences for the model tier must have strictly more words than this.
const MODEL_TIER_MIN_WORDS: usize = 10;
/// ...and strictly fewer than this.
const MODEL_TIER_MAX_WORDS: usize = 100;
/// Heuristic-tier sentences must have strictly more words than this.
const HEURISTIC_TIER_MIN_WORDS: usize = 5;

const QUESTION_MARKER: &str = "question:";
const ANSWER_MARKER: &str = "answer:";
const BLANK_PLACEHOLDER: &str = "______";

/// Orchestrates candidate selection, model invocation, and the fallback tiers.
pub struct QuizGenerator {
    models: Arc<ModelSet>,
    tagger: Option<Arc<dyn EntityTagger>>,
}

impl QuizGenerator {
    /// Build a generator over the given model set and entity-tagging capability.
    ///
    /// Passing `None` for the tagger disables the heuristic tier entirely, in which case the
    /// cascade can terminate with an empty quiz.
    pub fn new(models: Arc<ModelSet>, tagger: Option<Arc<dyn EntityTagger>>) -> Self {
        Self { models, tagger }
    }

    /// Generate up to `count` quiz items from the text.
    pub async fn generate(&self, text: &str, count: usize) -> QuizResult {
        self.generate_with_rng(text, count, &mut StdRng::from_entropy())
            .await
    }

    /// Lower-level entry point accepting an explicit RNG. Exists for tests and for callers
    /// that need reproducible quizzes.
    pub async fn generate_with_rng<R: Rng>(
        &self,
        text: &str,
        count: usize,
        rng: &mut R,
    ) -> QuizResult {
        if count == 0 {
            return QuizResult::default();
        }

        if !self.models.question_ready() {
            tracing::debug!("Question model absent; using heuristic quiz tier");
            return self.heuristic_quiz(text, count, rng);
        }

        let sentences = split_sentences(text);
        let candidates: Vec<&String> = sentences
            .iter()
            .filter(|sentence| {
                let words = sentence.split_whitespace().count();
                words > MODEL_TIER_MIN_WORDS && words < MODEL_TIER_MAX_WORDS
            })
            .collect();

        if candidates.is_empty() {
            tracing::debug!("No candidate sentences for the model tier; falling back");
            return self.heuristic_quiz(text, count, rng);
        }

        // Oversample to compensate for per-sentence generation failures. `count` is
        // caller-controlled, so the doubling must not overflow.
        let sample_size = candidates.len().min(count.saturating_mul(2));
        let selected: Vec<&String> = candidates
            .choose_multiple(rng, sample_size)
            .copied()
            .collect();

        let mut items = Vec::new();
        for sentence in selected {
            match self.models.generate_question(sentence).await {
                ModelOutcome::Generated(output) => {
                    if let Some(item) = parse_question_output(&output) {
                        items.push(item);
                        if items.len() == count {
                            break;
                        }
                    }
                }
                ModelOutcome::Unavailable => break,
                ModelOutcome::Failed(reason) => {
                    tracing::debug!(reason, "Question generation failed for a sentence; skipping");
                }
            }
        }

        if items.is_empty() {
            tracing::debug!("Model tier produced no usable pairs; falling back");
            return self.heuristic_quiz(text, count, rng);
        }

        QuizResult { items }
    }

    /// Heuristic tier: entity-masked cloze questions with a true/false fallback per sentence.
    fn heuristic_quiz<R: Rng>(&self, text: &str, count: usize, rng: &mut R) -> QuizResult {
        let Some(tagger) = self.tagger.as_ref() else {
            return QuizResult::default();
        };

        let sentences: Vec<String> = split_sentences(text)
            .into_iter()
            .filter(|sentence| sentence.split_whitespace().count() > HEURISTIC_TIER_MIN_WORDS)
            .collect();

        if sentences.is_empty() {
            return QuizResult::default();
        }

        let sample_size = sentences.len().min(count);
        let selected: Vec<&String> = sentences.choose_multiple(rng, sample_size).collect();

        let items = selected
            .into_iter()
            .map(|sentence| match tagger.tag(sentence).into_iter().next() {
                Some(entity) => cloze_item(sentence, &entity),
                None => true_false_item(sentence),
            })
            .collect();

        QuizResult { items }
    }
}

/// Parse model output into a question/answer pair.
///
/// Output must contain both literal markers; anything else is unusable and skipped silently.
fn parse_question_output(output: &str) -> Option<QuizItem> {
    if !output.contains(QUESTION_MARKER) || !output.contains(ANSWER_MARKER) {
        return None;
    }
    let (question_part, answer_part) = output.split_once(ANSWER_MARKER)?;
    let question = question_part.replace(QUESTION_MARKER, "").trim().to_string();
    let answer = answer_part.trim().to_string();
    if question.is_empty() || answer.is_empty() {
        return None;
    }
    Some(QuizItem { question, answer })
}

fn cloze_item(sentence: &str, entity: &Entity) -> QuizItem {
    let masked = sentence.replacen(&entity.text, BLANK_PLACEHOLDER, 1);
    QuizItem {
        question: format!("Fill in the blank: {masked}"),
        answer: entity.text.clone(),
    }
}

fn true_false_item(sentence: &str) -> QuizItem {
    QuizItem {
        question: format!("Is the following statement true: {sentence}?"),
        answer: "True".to_string(),
    }
}
