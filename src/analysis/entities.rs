//! Entity tagging used by the heuristic quiz tier.
//!
//! The quiz fallback only needs coarse person/organization/location spans, so the default
//! tagger is a capitalization heuristic with small lexicons rather than a statistical model.
//! The trait seam exists so hosts can plug in a real NER backend and so tests can script
//! exact tags.

/// Category of a tagged entity. Categories outside this set are never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    /// A person's name.
    Person,
    /// A company, institution, or other organization.
    Organization,
    /// A geographic or political location.
    Location,
}

/// A tagged span within a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Exact text of the span as it appears in the sentence.
    pub text: String,
    /// Assigned category.
    pub category: EntityCategory,
}

/// Interface for sentence-level entity tagging.
pub trait EntityTagger: Send + Sync {
    /// Tag entities within a single sentence, in sentence order.
    fn tag(&self, sentence: &str) -> Vec<Entity>;
}

const ORGANIZATION_MARKERS: &[&str] = &[
    "Inc",
    "Inc.",
    "Corp",
    "Corp.",
    "Ltd",
    "Ltd.",
    "Company",
    "University",
    "Institute",
    "Association",
    "Agency",
    "Bank",
    "Laboratories",
    "Foundation",
    "Committee",
    "Ministry",
];

const KNOWN_LOCATIONS: &[&str] = &[
    "Paris",
    "London",
    "Berlin",
    "Rome",
    "Madrid",
    "Vienna",
    "Moscow",
    "Tokyo",
    "Beijing",
    "Cairo",
    "France",
    "Germany",
    "Italy",
    "Spain",
    "England",
    "Britain",
    "Russia",
    "Japan",
    "China",
    "Egypt",
    "Europe",
    "Asia",
    "Africa",
    "America",
    "India",
    "Australia",
    "Canada",
    "Mexico",
    "Brazil",
];

const PERSON_TITLES: &[&str] = &["Mr", "Mr.", "Mrs", "Mrs.", "Ms", "Ms.", "Dr", "Dr.", "Professor"];

/// Capitalization-driven tagger with organization and location lexicons.
#[derive(Debug, Default)]
pub struct HeuristicEntityTagger;

impl HeuristicEntityTagger {
    /// Construct the default tagger.
    pub fn new() -> Self {
        Self
    }
}

impl EntityTagger for HeuristicEntityTagger {
    fn tag(&self, sentence: &str) -> Vec<Entity> {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let mut entities = Vec::new();
        let mut span: Vec<&str> = Vec::new();
        let mut span_start = 0usize;

        for (position, &word) in words.iter().chain(std::iter::once(&"")).enumerate() {
            if is_capitalized_token(word) {
                if span.is_empty() {
                    span_start = position;
                }
                span.push(word);
                continue;
            }
            if !span.is_empty() {
                if let Some(entity) = classify_span(&span, span_start) {
                    entities.push(entity);
                }
                span.clear();
            }
        }

        entities
    }
}

fn is_capitalized_token(word: &str) -> bool {
    let stripped = strip_trailing_punctuation(word);
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.is_uppercase() && stripped.chars().any(|c| c.is_alphabetic()),
        None => false,
    }
}

fn strip_trailing_punctuation(word: &str) -> &str {
    word.trim_end_matches(|c: char| !c.is_alphanumeric())
}

fn classify_span(span: &[&str], span_start: usize) -> Option<Entity> {
    let cleaned: Vec<&str> = span
        .iter()
        .map(|word| strip_trailing_punctuation(word))
        .filter(|word| !word.is_empty())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let text = cleaned.join(" ");

    if cleaned
        .iter()
        .any(|word| ORGANIZATION_MARKERS.contains(word))
    {
        return Some(Entity {
            text,
            category: EntityCategory::Organization,
        });
    }

    if cleaned.iter().any(|word| KNOWN_LOCATIONS.contains(word)) {
        return Some(Entity {
            text,
            category: EntityCategory::Location,
        });
    }

    if cleaned.first().is_some_and(|word| PERSON_TITLES.contains(word)) {
        return Some(Entity {
            text,
            category: EntityCategory::Person,
        });
    }

    // A lone capitalized word opening the sentence is usually just sentence case.
    if span_start == 0 && cleaned.len() == 1 {
        return None;
    }

    Some(Entity {
        text,
        category: EntityCategory::Person,
    })
}
