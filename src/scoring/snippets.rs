// Naive containment-based topic probabilities for text snippets.
//
// Each snippet is tokenized (ASCII lowercase, split on anything that is not
// a letter or digit). At every position both the unigram and the bigram with
// the next token (joined by `_`, matching how seed phrases are normalized)
// are looked up in the term → topics map. Every hit increments a counter for
// each topic the term belongs to, so a term shared by N topics counts N
// times. Counters are divided by the total number of tokens.
//
// This is a heuristic score, not a normalized distribution: values for one
// snippet need not sum to 1.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::topics::document::TermTopicsMap;

/// Topic id → score.
pub type TopicScores = BTreeMap<String, f64>;

fn token_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^0-9a-z]+").expect("token separator regex is valid"))
}

/// Lowercase `text` and split it into ASCII alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_separator()
        .split(&lower)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score a collection of snippets pooled together.
///
/// Returns an empty map when the snippets contain no tokens at all. Scores
/// are rounded to six decimal places.
pub fn topic_probabilities<'a, I>(snippets: I, term_to_topics: &TermTopicsMap) -> TopicScores
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut num_tokens = 0usize;

    for snippet in snippets {
        let tokens = tokenize(snippet);
        num_tokens += tokens.len();

        for (i, token) in tokens.iter().enumerate() {
            let bigram = tokens.get(i + 1).map(|next| format!("{}_{}", token, next));
            for candidate in std::iter::once(token.as_str()).chain(bigram.as_deref()) {
                if let Some(topics) = term_to_topics.get(candidate) {
                    for topic in topics {
                        *counts.entry(topic.as_str()).or_default() += 1;
                    }
                }
            }
        }
    }

    if num_tokens == 0 {
        return TopicScores::new();
    }

    counts
        .into_iter()
        .map(|(topic, count)| (topic.to_string(), round6(count as f64 / num_tokens as f64)))
        .collect()
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// A snippet document: `snips` maps snippet id → text. Any other fields are
/// carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnippetDocument {
    pub snips: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_topic_probs: Option<BTreeMap<String, TopicScores>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_topic_probs: Option<TopicScores>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SnippetDocument {
    /// Score every snippet on its own and all snippets pooled, storing the
    /// results in `snippet_topic_probs` and `overall_topic_probs`.
    pub fn annotate(&mut self, term_to_topics: &TermTopicsMap) {
        let per_snippet: BTreeMap<String, TopicScores> = self
            .snips
            .iter()
            .map(|(id, text)| {
                (
                    id.clone(),
                    topic_probabilities([text.as_str()], term_to_topics),
                )
            })
            .collect();
        let overall = topic_probabilities(self.snips.values().map(String::as_str), term_to_topics);

        info!(
            snippets = self.snips.len(),
            topics = overall.len(),
            "Scored snippets"
        );

        self.snippet_topic_probs = Some(per_snippet);
        self.overall_topic_probs = Some(overall);
    }
}
