// Term expansion — grow a topic's seed terms into a weighted match set.
//
// Seeds go in first with strength 1.0. If the topic enables softmatch, each
// seed known to the model is looked up and its neighbor list scanned once,
// feeding two criteria:
//
//   min_similarity_any:  add a neighbor whose similarity to this seed meets
//                        the threshold. Lists are sorted, so the scan stops at
//                        the first unseen neighbor below it.
//   min_similarity_mean: accumulate squared similarity per candidate across
//                        all seeds; after the scan, add candidates whose
//                        mean of squares meets the threshold, best first.
//
// Both criteria draw on one addition budget (`max_to_add`), any-mode first.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::cluster::assign_clusters;
use super::spec::TopicSpec;
use crate::model::traits::EmbeddingModel;

/// Neighbor list size for expansion queries; effectively the whole vocabulary
/// with non-negligible similarity.
pub const EXPANSION_NEIGHBORS: usize = 200_000;

/// One matched term of one topic, ready for global ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub topic_id: String,
    pub term: String,
    /// Representative term of the near-synonym group this term belongs to
    pub canonical_cluster: String,
    /// 1.0 for seeds, similarity-derived for softmatched terms
    pub strength: f64,
}

/// Matched terms of a topic in first-insertion order.
///
/// Reinserting a term is a no-op: the first strength assigned sticks.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    order: Vec<String>,
    strengths: HashMap<String, f64>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `term` unless already present. Returns true if it was added.
    pub fn insert(&mut self, term: &str, strength: f64) -> bool {
        if self.strengths.contains_key(term) {
            return false;
        }
        self.strengths.insert(term.to_string(), strength);
        self.order.push(term.to_string());
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        self.strengths.contains_key(term)
    }

    pub fn strength(&self, term: &str) -> Option<f64> {
        self.strengths.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(term, strength)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.order
            .iter()
            .map(|t| (t.as_str(), self.strengths[t.as_str()]))
    }
}

/// Running count of non-seed additions, shared by both softmatch criteria
/// and all seeds of a topic.
#[derive(Debug, Clone, Copy)]
struct AdditionBudget {
    used: usize,
    cap: Option<usize>,
}

impl AdditionBudget {
    fn new(cap: Option<usize>) -> Self {
        Self { used: 0, cap }
    }

    fn has_room(&self) -> bool {
        self.cap.is_none_or(|cap| self.used < cap)
    }

    fn record(&mut self) {
        self.used += 1;
    }
}

/// Per-topic sums of squared similarity and occurrence counts, keyed by
/// candidate term in first-observation order.
#[derive(Debug, Default)]
struct SimilarityAccumulator {
    order: Vec<String>,
    stats: HashMap<String, (f64, usize)>,
}

impl SimilarityAccumulator {
    fn observe(&mut self, term: &str, similarity: f64) {
        match self.stats.get_mut(term) {
            Some((sum, count)) => {
                *sum += similarity * similarity;
                *count += 1;
            }
            None => {
                self.stats.insert(term.to_string(), (similarity * similarity, 1));
                self.order.push(term.to_string());
            }
        }
    }

    /// Candidates whose mean squared similarity is at least `min_mean`,
    /// highest mean first. Equal means keep first-observation order.
    ///
    /// This is the mean of the squares, not the mean similarity or its RMS.
    fn candidates(self, min_mean: f64) -> Vec<(String, f64)> {
        let Self { order, stats } = self;
        let mut candidates: Vec<(String, f64)> = order
            .into_iter()
            .filter_map(|term| {
                let (sum, count) = stats[&term];
                let mean = sum / count as f64;
                (mean >= min_mean).then_some((term, mean))
            })
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates
    }
}

/// Compute a topic's match set: its normalized seeds plus any softmatched
/// neighbors, in insertion order.
pub fn expand_matches<M>(topic: &TopicSpec, model: &M) -> MatchSet
where
    M: EmbeddingModel + ?Sized,
{
    let seeds = topic.seed_terms();
    let mut matches = MatchSet::new();
    for seed in &seeds {
        matches.insert(seed, 1.0);
    }

    if !topic.softmatch_enabled() {
        return matches;
    }

    let any_active = topic.min_similarity_any > 0.0;
    let mut budget = AdditionBudget::new(topic.max_additions);
    let mut accumulator = (topic.min_similarity_mean > 0.0).then(SimilarityAccumulator::default);

    for seed in &seeds {
        if accumulator.is_none() && !budget.has_room() {
            break;
        }
        if !model.contains(seed) {
            debug!(topic = %topic.id, seed = %seed, "Seed not in model vocabulary");
            continue;
        }

        for neighbor in model.neighbors(seed, EXPANSION_NEIGHBORS) {
            if any_active && !matches.contains(&neighbor.term) {
                if neighbor.similarity < topic.min_similarity_any {
                    break;
                }
                if budget.has_room() {
                    matches.insert(&neighbor.term, neighbor.similarity);
                    budget.record();
                    debug!(
                        topic = %topic.id,
                        term = %neighbor.term,
                        seed = %seed,
                        similarity = neighbor.similarity,
                        "Adding similar term"
                    );
                }
            }
            if let Some(acc) = accumulator.as_mut() {
                acc.observe(&neighbor.term, neighbor.similarity);
            }
        }
    }

    if let Some(acc) = accumulator {
        for (term, mean) in acc.candidates(topic.min_similarity_mean) {
            if !budget.has_room() {
                break;
            }
            if matches.insert(&term, mean) {
                budget.record();
                debug!(
                    topic = %topic.id,
                    term = %term,
                    mean_similarity = mean,
                    "Adding term by mean similarity"
                );
            }
        }
    }

    matches
}

/// Expand and cluster one topic, producing one record per matched term in
/// match-set order.
pub fn expand_topic<M>(topic: &TopicSpec, model: &M) -> Vec<MatchRecord>
where
    M: EmbeddingModel + ?Sized,
{
    let matches = expand_matches(topic, model);
    let clusters = assign_clusters(matches.terms(), model);

    let records: Vec<MatchRecord> = clusters
        .into_iter()
        .map(|(term, canonical_cluster)| MatchRecord {
            topic_id: topic.id.clone(),
            strength: matches.strength(&term).unwrap_or(1.0),
            term,
            canonical_cluster,
        })
        .collect();

    let seed_count = topic.seed_terms().iter().collect::<HashSet<_>>().len();
    info!(
        topic = %topic.id,
        seeds = seed_count,
        added = records.len().saturating_sub(seed_count),
        "Expanded topic"
    );

    records
}
