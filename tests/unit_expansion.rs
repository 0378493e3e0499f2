// Unit tests for term expansion, clustering and global ranking.
//
// Every test drives the engine through a hand-written neighbor table, so
// similarities are exact and neighbor order is fully controlled.

use std::collections::HashMap;

use softmatch::model::traits::{EmbeddingModel, Neighbor};
use softmatch::topics::cluster::assign_clusters;
use softmatch::topics::expansion::{expand_matches, expand_topic};
use softmatch::topics::{generate, generate_with_progress};
use softmatch::topics::spec::TopicSpec;

/// Embedding model backed by fixed, pre-sorted neighbor lists.
struct TableModel {
    neighbors: HashMap<String, Vec<Neighbor>>,
}

impl TableModel {
    fn new(entries: &[(&str, &[(&str, f64)])]) -> Self {
        let neighbors = entries
            .iter()
            .map(|(term, list)| {
                (
                    term.to_string(),
                    list.iter().map(|(t, s)| Neighbor::new(*t, *s)).collect(),
                )
            })
            .collect();
        Self { neighbors }
    }
}

impl EmbeddingModel for TableModel {
    fn contains(&self, term: &str) -> bool {
        self.neighbors.contains_key(term)
    }

    fn neighbors(&self, term: &str, top_k: usize) -> Vec<Neighbor> {
        self.neighbors
            .get(term)
            .map(|list| list.iter().take(top_k).cloned().collect())
            .unwrap_or_default()
    }

    fn vocab_size(&self) -> usize {
        self.neighbors.len()
    }
}

fn finance_model() -> TableModel {
    TableModel::new(&[(
        "money",
        &[("cash", 0.9), ("bank", 0.85), ("weather", 0.3)],
    )])
}

fn strengths(topic: &TopicSpec, model: &TableModel) -> Vec<(String, f64)> {
    expand_matches(topic, model)
        .iter()
        .map(|(t, s)| (t.to_string(), s))
        .collect()
}

fn pairs(expected: &[(&str, f64)]) -> Vec<(String, f64)> {
    expected.iter().map(|(t, s)| (t.to_string(), *s)).collect()
}

// ============================================================
// Seeds only
// ============================================================

#[test]
fn seeds_only_without_softmatch() {
    let topic = TopicSpec::new("finance", ["Money", "Credit Card"]);
    let result = strengths(&topic, &finance_model());
    assert_eq!(result, pairs(&[("money", 1.0), ("credit_card", 1.0)]));
}

#[test]
fn duplicate_seeds_collapse() {
    let topic = TopicSpec::new("finance", ["money", "MONEY", " money "]);
    assert_eq!(strengths(&topic, &finance_model()), pairs(&[("money", 1.0)]));
}

#[test]
fn empty_seed_list_yields_empty_match_set() {
    let topic = TopicSpec::new("empty", Vec::<String>::new()).with_min_similarity_any(0.5);
    assert!(expand_matches(&topic, &finance_model()).is_empty());
    assert!(expand_topic(&topic, &finance_model()).is_empty());
}

#[test]
fn unknown_seed_has_no_neighbors() {
    let topic = TopicSpec::new("t", ["bitcoin"]).with_min_similarity_any(0.1);
    assert_eq!(strengths(&topic, &finance_model()), pairs(&[("bitcoin", 1.0)]));
}

// ============================================================
// min_similarity_any
// ============================================================

#[test]
fn any_mode_stops_at_first_weak_neighbor() {
    let topic = TopicSpec::new("finance", ["money"]).with_min_similarity_any(0.8);
    let result = strengths(&topic, &finance_model());
    assert_eq!(
        result,
        pairs(&[("money", 1.0), ("cash", 0.9), ("bank", 0.85)])
    );
}

#[test]
fn any_mode_respects_max_additions() {
    let topic = TopicSpec::new("finance", ["money"])
        .with_min_similarity_any(0.8)
        .with_max_additions(1);
    let result = strengths(&topic, &finance_model());
    assert_eq!(result, pairs(&[("money", 1.0), ("cash", 0.9)]));
}

#[test]
fn any_mode_zero_cap_adds_nothing() {
    let topic = TopicSpec::new("finance", ["money"])
        .with_min_similarity_any(0.8)
        .with_max_additions(0);
    assert_eq!(strengths(&topic, &finance_model()), pairs(&[("money", 1.0)]));
}

#[test]
fn any_mode_cap_is_shared_across_seeds() {
    let model = TableModel::new(&[
        ("money", &[("cash", 0.9), ("bank", 0.85)]),
        ("river", &[("stream", 0.95)]),
    ]);
    let topic = TopicSpec::new("t", ["money", "river"])
        .with_min_similarity_any(0.8)
        .with_max_additions(2);
    let result = strengths(&topic, &model);
    assert_eq!(
        result,
        pairs(&[("money", 1.0), ("river", 1.0), ("cash", 0.9), ("bank", 0.85)])
    );
}

#[test]
fn any_mode_skips_matched_terms_without_stopping() {
    // "coin" is a seed, so it is skipped rather than checked against the
    // threshold; "cash" further down the list is still added.
    let model = TableModel::new(&[("money", &[("coin", 0.95), ("cash", 0.85), ("tax", 0.2)])]);
    let topic = TopicSpec::new("t", ["money", "coin"]).with_min_similarity_any(0.8);
    let result = strengths(&topic, &model);
    assert_eq!(
        result,
        pairs(&[("money", 1.0), ("coin", 1.0), ("cash", 0.85)])
    );
}

#[test]
fn any_mode_first_strength_is_kept() {
    let model = TableModel::new(&[
        ("money", &[("cash", 0.9)]),
        ("coin", &[("cash", 0.99)]),
    ]);
    let topic = TopicSpec::new("t", ["money", "coin"]).with_min_similarity_any(0.5);
    let result = expand_matches(&topic, &model);
    assert_eq!(result.strength("cash"), Some(0.9));
}

#[test]
fn seed_strength_wins_over_neighbor_similarity() {
    let model = TableModel::new(&[("money", &[("cash", 0.9)]), ("cash", &[("money", 0.9)])]);
    let topic = TopicSpec::new("t", ["money", "cash"]).with_min_similarity_any(0.5);
    let result = expand_matches(&topic, &model);
    assert_eq!(result.strength("cash"), Some(1.0));
    assert_eq!(result.strength("money"), Some(1.0));
}

// ============================================================
// min_similarity_mean
// ============================================================

fn mean_model() -> TableModel {
    TableModel::new(&[
        ("money", &[("cash", 0.9), ("loan", 0.6), ("weather", 0.1)]),
        ("bank", &[("cash", 0.8), ("loan", 0.7), ("river", 0.6)]),
    ])
}

#[test]
fn mean_mode_uses_mean_of_squares() {
    let topic = TopicSpec::new("t", ["money", "bank"]).with_min_similarity_mean(0.4);
    let result = strengths(&topic, &mean_model());

    assert_eq!(result.len(), 4);
    assert_eq!(result[0], ("money".to_string(), 1.0));
    assert_eq!(result[1], ("bank".to_string(), 1.0));
    // cash: (0.81 + 0.64) / 2, loan: (0.36 + 0.49) / 2
    assert_eq!(result[2].0, "cash");
    assert!((result[2].1 - 0.725).abs() < 1e-12);
    assert_eq!(result[3].0, "loan");
    assert!((result[3].1 - 0.425).abs() < 1e-12);
}

#[test]
fn mean_mode_respects_max_additions() {
    let topic = TopicSpec::new("t", ["money", "bank"])
        .with_min_similarity_mean(0.4)
        .with_max_additions(1);
    let result = strengths(&topic, &mean_model());
    let terms: Vec<&str> = result.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(terms, vec!["money", "bank", "cash"]);
}

#[test]
fn mean_mode_skipped_matches_do_not_use_budget() {
    // Each seed is the other's nearest neighbor, so both seeds outrank cash
    let model = TableModel::new(&[
        ("money", &[("bank", 0.95), ("cash", 0.6)]),
        ("bank", &[("money", 0.95), ("cash", 0.5)]),
    ]);
    let topic = TopicSpec::new("t", ["money", "bank"])
        .with_min_similarity_mean(0.2)
        .with_max_additions(1);
    let result = strengths(&topic, &model);

    assert_eq!(result.len(), 3);
    assert_eq!(result[0], ("money".to_string(), 1.0));
    assert_eq!(result[1], ("bank".to_string(), 1.0));
    // cash: (0.36 + 0.25) / 2
    assert_eq!(result[2].0, "cash");
    assert!((result[2].1 - 0.305).abs() < 1e-12);
}

#[test]
fn mean_mode_single_seed_is_squared_similarity() {
    let topic = TopicSpec::new("t", ["money"]).with_min_similarity_mean(0.3);
    let result = strengths(&topic, &mean_model());
    // cash 0.81 and loan 0.36 pass; weather 0.01 does not
    let terms: Vec<&str> = result.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(terms, vec!["money", "cash", "loan"]);
}

#[test]
fn both_modes_share_one_budget() {
    let model = TableModel::new(&[("money", &[("cash", 0.9), ("bank", 0.85)])]);
    let topic = TopicSpec::new("t", ["money"])
        .with_min_similarity_any(0.8)
        .with_min_similarity_mean(0.1)
        .with_max_additions(1);
    let result = strengths(&topic, &model);
    assert_eq!(result, pairs(&[("money", 1.0), ("cash", 0.9)]));
}

#[test]
fn any_mode_cutoff_also_ends_mean_observation() {
    let topic = TopicSpec::new("t", ["money", "bank"])
        .with_min_similarity_any(0.85)
        .with_min_similarity_mean(0.4);
    let result = expand_matches(&topic, &mean_model());
    // loan falls below the any threshold in both lists before it is observed
    assert!(!result.contains("loan"));
    assert_eq!(result.strength("cash"), Some(0.9));
}

// ============================================================
// Properties over a larger table
// ============================================================

fn wide_model() -> TableModel {
    let sims_a: Vec<(String, f64)> = (0..40)
        .map(|i| (format!("a{i}"), 0.99 - i as f64 * 0.02))
        .collect();
    let sims_b: Vec<(String, f64)> = (0..40)
        .map(|i| (format!("a{}", 39 - i), 0.95 - i as f64 * 0.02))
        .collect();
    let to_neighbors = |v: &[(String, f64)]| -> Vec<Neighbor> {
        v.iter().map(|(t, s)| Neighbor::new(t.clone(), *s)).collect()
    };

    let mut neighbors = HashMap::new();
    neighbors.insert("alpha".to_string(), to_neighbors(&sims_a));
    neighbors.insert("beta".to_string(), to_neighbors(&sims_b));
    TableModel { neighbors }
}

#[test]
fn any_mode_strengths_meet_threshold_and_cap() {
    let model = wide_model();
    for (threshold, cap) in [(0.5, None), (0.7, Some(5)), (0.9, Some(100)), (0.3, Some(0))] {
        let mut topic = TopicSpec::new("t", ["alpha", "beta"]).with_min_similarity_any(threshold);
        if let Some(cap) = cap {
            topic = topic.with_max_additions(cap);
        }
        let matches = expand_matches(&topic, &model);
        let derived: Vec<f64> = matches
            .iter()
            .filter(|(t, _)| *t != "alpha" && *t != "beta")
            .map(|(_, s)| s)
            .collect();

        assert!(derived.iter().all(|&s| s >= threshold), "threshold {threshold}");
        if let Some(cap) = cap {
            assert!(derived.len() <= cap, "cap {cap} exceeded: {}", derived.len());
        }
    }
}

#[test]
fn mean_mode_strengths_meet_threshold() {
    let model = wide_model();
    let topic = TopicSpec::new("t", ["alpha", "beta"]).with_min_similarity_mean(0.4);
    let matches = expand_matches(&topic, &model);
    assert!(matches.len() > 2);
    for (term, strength) in matches.iter() {
        if term != "alpha" && term != "beta" {
            assert!(strength >= 0.4, "{term} has mean {strength}");
        }
    }
}

// ============================================================
// Clustering
// ============================================================

#[test]
fn cluster_adopts_resolved_similar_peer() {
    let model = TableModel::new(&[
        ("money", &[("cash", 0.9)]),
        ("cash", &[("money", 0.9)]),
        ("bank", &[("money", 0.5)]),
    ]);
    let clusters = assign_clusters(["money", "cash", "bank"], &model);
    assert_eq!(
        clusters,
        vec![
            ("money".to_string(), "money".to_string()),
            ("cash".to_string(), "money".to_string()),
            ("bank".to_string(), "bank".to_string()),
        ]
    );
}

#[test]
fn cluster_threshold_is_strict() {
    let model = TableModel::new(&[("a", &[]), ("b", &[("a", 0.75)])]);
    let clusters = assign_clusters(["a", "b"], &model);
    assert_eq!(clusters[1].1, "b");
}

#[test]
fn cluster_depends_on_visit_order() {
    let model = TableModel::new(&[
        ("a", &[("b", 0.8)]),
        ("b", &[("a", 0.8), ("c", 0.8)]),
        ("c", &[("b", 0.8)]),
    ]);
    let forward = assign_clusters(["a", "b", "c"], &model);
    assert!(forward.iter().all(|(_, canonical)| canonical == "a"));

    let backward = assign_clusters(["c", "b", "a"], &model);
    assert!(backward.iter().all(|(_, canonical)| canonical == "c"));
}

#[test]
fn cluster_last_qualifying_neighbor_wins() {
    let model = TableModel::new(&[
        ("p", &[]),
        ("q", &[]),
        ("x", &[("p", 0.95), ("q", 0.8)]),
    ]);
    let clusters = assign_clusters(["p", "q", "x"], &model);
    assert_eq!(clusters[2], ("x".to_string(), "q".to_string()));
}

#[test]
fn cluster_unknown_term_is_its_own_label() {
    let model = TableModel::new(&[]);
    let clusters = assign_clusters(["zzz"], &model);
    assert_eq!(clusters, vec![("zzz".to_string(), "zzz".to_string())]);
}

#[test]
fn expand_topic_emits_one_record_per_match() {
    let model = TableModel::new(&[
        ("money", &[("cash", 0.9), ("bank", 0.85), ("weather", 0.3)]),
        ("cash", &[("money", 0.9)]),
    ]);
    let topic = TopicSpec::new("finance", ["money"]).with_min_similarity_any(0.8);
    let records = expand_topic(&topic, &model);

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.topic_id == "finance"));
    let cash = records.iter().find(|r| r.term == "cash").unwrap();
    assert_eq!(cash.canonical_cluster, "money");
    assert_eq!(cash.strength, 0.9);
    let bank = records.iter().find(|r| r.term == "bank").unwrap();
    assert_eq!(bank.canonical_cluster, "bank");
}

// ============================================================
// Global ranking and disjointness
// ============================================================

fn overlapping_topics() -> Vec<TopicSpec> {
    vec![
        TopicSpec::new("finance", ["money"]).with_min_similarity_any(0.8),
        TopicSpec::new("banking", ["cash", "money"]),
    ]
}

#[test]
fn generate_without_disjoint_keeps_shared_terms() {
    let doc = generate(&overlapping_topics(), &finance_model(), false);
    let finance: Vec<&str> = doc.topics["finance"].iter().map(|t| t.term.as_str()).collect();
    let banking: Vec<&str> = doc.topics["banking"].iter().map(|t| t.term.as_str()).collect();
    assert_eq!(finance, vec!["money", "cash", "bank"]);
    assert_eq!(banking, vec!["cash", "money"]);
}

#[test]
fn generate_disjoint_assigns_each_term_once() {
    let doc = generate(&overlapping_topics(), &finance_model(), true);
    let finance: Vec<&str> = doc.topics["finance"].iter().map(|t| t.term.as_str()).collect();
    let banking: Vec<&str> = doc.topics["banking"].iter().map(|t| t.term.as_str()).collect();

    // money ties at 1.0: finance is declared first and keeps it.
    // cash is 1.0 in banking but 0.9 in finance: banking keeps it.
    assert_eq!(finance, vec!["money", "bank"]);
    assert_eq!(banking, vec!["cash"]);

    let map = doc.term_to_topics();
    assert!(map.values().all(|topics| topics.len() == 1));
}

#[test]
fn generate_topic_lists_are_strength_descending() {
    let doc = generate(&overlapping_topics(), &finance_model(), false);
    for terms in doc.topics.values() {
        assert!(terms.windows(2).all(|w| w[0].strength >= w[1].strength));
    }
}

#[test]
fn generate_with_progress_reports_each_topic_in_order() {
    let mut seen = Vec::new();
    let doc = generate_with_progress(&overlapping_topics(), &finance_model(), true, |topic| {
        seen.push(topic.id.clone())
    });
    assert_eq!(seen, vec!["finance", "banking"]);
    assert_eq!(doc, generate(&overlapping_topics(), &finance_model(), true));
}

#[test]
fn generate_is_deterministic() {
    let topics = vec![
        TopicSpec::new("a", ["alpha"]).with_min_similarity_any(0.5),
        TopicSpec::new("b", ["beta"]).with_min_similarity_mean(0.3),
    ];
    let model = wide_model();
    let first = serde_json::to_string(&generate(&topics, &model, true)).unwrap();
    let second = serde_json::to_string(&generate(&topics, &model, true)).unwrap();
    assert_eq!(first, second);
}
