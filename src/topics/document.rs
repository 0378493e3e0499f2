// The generated topic-terms document and the term → topics lookup built
// from it.
//
// On disk the document looks like:
//
//   {"topics": {"finance": [{"term": "money", "canonicalized_term": "money",
//                            "strength": 1.0}, ...], ...}}

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::expansion::MatchRecord;

/// Term → topic ids claiming it, in document topic order without repeats.
pub type TermTopicsMap = HashMap<String, Vec<String>>;

/// One term of a topic's output list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerm {
    pub term: String,
    #[serde(rename = "canonicalized_term")]
    pub canonical_term: String,
    pub strength: f64,
}

/// Generated vocabularies for every topic, strongest terms first.
///
/// Every declared topic has a key, including topics left with an empty list
/// after disjoint enforcement, and keys serialize in sorted order rather than
/// declaration order. Consumers should treat an empty list the same as an
/// absent topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicTermsDocument {
    pub topics: BTreeMap<String, Vec<TopicTerm>>,
}

impl TopicTermsDocument {
    /// Build the document from globally ranked records. Every id in
    /// `topic_ids` gets an entry, even if all its terms were dropped.
    pub fn from_ranked<'a, I>(topic_ids: I, ranked: Vec<MatchRecord>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut topics: BTreeMap<String, Vec<TopicTerm>> = topic_ids
            .into_iter()
            .map(|id| (id.to_string(), Vec::new()))
            .collect();

        for record in ranked {
            topics.entry(record.topic_id).or_default().push(TopicTerm {
                term: record.term,
                canonical_term: record.canonical_cluster,
                strength: record.strength,
            });
        }

        Self { topics }
    }

    /// Read a document previously written by `softmatch expand`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read topic map {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse topic map {}", path.display()))
    }

    /// Total number of terms across all topics.
    pub fn term_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    /// Invert the document into a term → topics lookup.
    pub fn term_to_topics(&self) -> TermTopicsMap {
        let mut map: TermTopicsMap = HashMap::new();
        for (topic, terms) in &self.topics {
            for entry in terms {
                let topics = map.entry(entry.term.clone()).or_default();
                if !topics.contains(topic) {
                    topics.push(topic.clone());
                }
            }
        }
        map
    }
}
