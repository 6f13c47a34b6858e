//! Lexicon-based sentiment scoring.
//!
//! Polarity is the signed share of opinionated words among all lexicon hits, mapped onto a
//! three-way label with a ±0.1 dead zone. Documents without any opinionated vocabulary are
//! neutral by definition.

use serde::Serialize;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "positive", "fortunate", "correct", "superior", "best",
    "brilliant", "success", "successful", "beneficial", "effective", "improved", "improvement",
    "remarkable", "outstanding", "impressive", "valuable", "innovative", "clear", "helpful",
    "efficient", "strong", "robust", "reliable", "accurate", "notable", "celebrated", "praised",
    "thriving", "popular", "favorable", "optimistic", "promising", "win", "winning", "achievement",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "poor", "negative", "unfortunate", "wrong", "inferior", "worst", "failure",
    "failed", "harmful", "ineffective", "broken", "flawed", "weak", "unreliable", "inaccurate",
    "decline", "declining", "loss", "losses", "crisis", "problem", "problems", "difficult",
    "danger", "dangerous", "severe", "damage", "damaged", "criticized", "controversial",
    "pessimistic", "disappointing", "disaster", "threat", "risk", "unstable",
];

/// Three-way polarity label attached to an analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Polarity above +0.1.
    Positive,
    /// Polarity below -0.1.
    Negative,
    /// Polarity within the dead zone, or no opinionated vocabulary at all.
    Neutral,
}

const POLARITY_THRESHOLD: f32 = 0.1;

/// Score the overall sentiment of a document.
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let mut positive = 0usize;
    let mut negative = 0usize;

    for token in text.split_whitespace() {
        let word: String = token
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        if POSITIVE_WORDS.contains(&word.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            negative += 1;
        }
    }

    let hits = positive + negative;
    if hits == 0 {
        return Sentiment::Neutral;
    }

    let polarity = (positive as f32 - negative as f32) / hits as f32;
    if polarity > POLARITY_THRESHOLD {
        Sentiment::Positive
    } else if polarity < -POLARITY_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn praise_scores_positive() {
        let text = "The results were excellent and the method proved remarkably effective.";
        assert_eq!(analyze_sentiment(text), Sentiment::Positive);
    }

    #[test]
    fn criticism_scores_negative() {
        let text = "A terrible failure; the flawed design caused severe damage.";
        assert_eq!(analyze_sentiment(text), Sentiment::Negative);
    }

    #[test]
    fn plain_exposition_is_neutral() {
        let text = "Water boils at one hundred degrees Celsius at sea level.";
        assert_eq!(analyze_sentiment(text), Sentiment::Neutral);
    }

    #[test]
    fn balanced_vocabulary_is_neutral() {
        let text = "The good results followed a bad start.";
        assert_eq!(analyze_sentiment(text), Sentiment::Neutral);
    }
}
